pub mod analytics;
mod budget;
mod category;
mod money;
mod owner;
mod transaction;

pub use budget::*;
pub use category::*;
pub use money::*;
pub use owner::*;
pub use transaction::*;
