// Application layer - use cases and orchestration.
// `FinanceService` is split across files by concern; each file adds its own
// `impl FinanceService` block.

mod budgets;
mod categories;
pub mod error;
pub mod reporting;
mod service;
mod transactions;

pub use budgets::*;
pub use error::*;
pub use reporting::*;
pub use service::*;
