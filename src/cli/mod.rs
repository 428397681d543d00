use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use uuid::Uuid;

use crate::application::{BudgetStatus, FinanceService};
use crate::domain::{
    AmountError, BudgetType, Cents, DeleteStrategy, Owner, TransactionFilter, TransactionPatch,
    TransactionType, format_cents, format_cents_f64, parse_amount,
};
use crate::settings::Settings;

/// fintrack - Personal Finance Tracker
#[derive(Parser)]
#[command(name = "fintrack")]
#[command(about = "Track income and expenses by category, with monthly budgets and spending reports")]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Database file path (overrides the configuration)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Email of the account to act as
    #[arg(short, long, global = true, env = "FINTRACK_USER")]
    pub user: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Category management commands
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Transaction commands
    #[command(subcommand)]
    Tx(TxCommands),

    /// Budget management commands
    #[command(subcommand)]
    Budget(BudgetCommands),

    /// Generate reports and analytics
    #[command(subcommand)]
    Report(ReportCommands),

    /// Account lifecycle commands
    #[command(subcommand)]
    Account(AccountCommands),
}

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List categories
    List {
        /// Only categories of this type (expense, income)
        #[arg(long = "type")]
        kind: Option<TransactionType>,
    },

    /// Create a category (no-op if it already exists)
    Add {
        /// Category type: expense or income
        kind: TransactionType,
        /// Category name
        name: String,
    },

    /// Rename or retype a category
    Update {
        /// Category ID
        id: String,
        /// New type: expense or income
        kind: TransactionType,
        /// New name
        name: String,
    },

    /// Delete a category
    Delete {
        /// Category type: expense or income
        kind: TransactionType,
        /// Category name
        name: String,
        /// What to do with referencing transactions and budgets: block, reassign, cascade
        #[arg(short, long, default_value = "block")]
        strategy: DeleteStrategy,
    },
}

#[derive(Subcommand)]
pub enum TxCommands {
    /// Record a transaction
    Add {
        /// Transaction type: expense or income
        kind: TransactionType,
        /// Category name (must exist for the type)
        category: String,
        /// Amount (e.g., "50.00" or "50")
        amount: String,
        /// Date (YYYY-MM-DD, defaults to now)
        #[arg(long)]
        date: Option<String>,
        /// Description
        #[arg(short = 'm', long)]
        description: Option<String>,
    },

    /// List transactions, newest first
    List {
        /// Filter by type
        #[arg(long = "type")]
        kind: Option<TransactionType>,
        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,
        /// Minimum amount (inclusive)
        #[arg(long)]
        min: Option<String>,
        /// Maximum amount (inclusive)
        #[arg(long)]
        max: Option<String>,
        /// From date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        from_date: Option<String>,
        /// To date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to_date: Option<String>,
        /// Text to look for in descriptions
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show one transaction
    Show {
        /// Transaction ID
        id: String,
    },

    /// Change fields of a transaction
    Update {
        /// Transaction ID
        id: String,
        #[arg(long = "type")]
        kind: Option<TransactionType>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        amount: Option<String>,
        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        #[arg(short = 'm', long, conflicts_with = "clear_description")]
        description: Option<String>,
        /// Remove the description
        #[arg(long)]
        clear_description: bool,
    },

    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Set the limit for a category (creates or replaces)
    Set {
        /// Category name
        category: String,
        /// Limit (e.g., "400.00")
        amount: String,
        /// Budget type: weekly, monthly, yearly
        #[arg(short = 't', long = "type", default_value = "monthly")]
        budget_type: BudgetType,
        /// Month (1-12, defaults to the current month)
        #[arg(long)]
        month: Option<u32>,
        /// Year (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,
    },

    /// List budgets
    List {
        #[arg(long)]
        month: Option<u32>,
        #[arg(long)]
        year: Option<i32>,
    },

    /// Change a budget's limit
    Update {
        /// Budget ID
        id: String,
        /// New limit
        amount: String,
    },

    /// Show spending against one category's budget
    Progress {
        /// Category name
        category: String,
        #[arg(long)]
        month: Option<u32>,
        #[arg(long)]
        year: Option<i32>,
    },

    /// Show every budget of a month with its progress
    Status {
        #[arg(long)]
        month: Option<u32>,
        #[arg(long)]
        year: Option<i32>,
    },

    /// Delete a budget
    Delete {
        /// Budget ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Totals, averages and counts
    Summary {
        /// From date (YYYY-MM-DD)
        #[arg(long)]
        from_date: Option<String>,
        /// To date (YYYY-MM-DD)
        #[arg(long)]
        to_date: Option<String>,
    },

    /// Spending by category
    Categories {
        /// From date (YYYY-MM-DD)
        #[arg(long)]
        from_date: Option<String>,
        /// To date (YYYY-MM-DD)
        #[arg(long)]
        to_date: Option<String>,
    },

    /// Income and expense per month
    Trend {
        /// Number of months to look back
        #[arg(short, long, default_value = "6")]
        months: u32,
    },

    /// Unusually large or small expenses
    Anomalies {
        /// Z-score above which an expense is reported
        #[arg(short, long, default_value = "2.0")]
        threshold: f64,
    },

    /// Expected spending next month
    Forecast,
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Deactivate the account; it can no longer log in
    Deactivate,

    /// Delete the account and all of its data
    Delete {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Serialize)]
struct SummaryReport {
    #[serde(flatten)]
    totals: crate::domain::analytics::TypeTotals,
    statistics: crate::domain::analytics::StatisticsSummary,
    daily_average_spending: f64,
}

impl Cli {
    /// Resolve settings: configuration file and environment first, then flags.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::load(self.config.as_deref())?;
        if let Some(database) = &self.database {
            settings.database = database.clone();
        }
        if self.verbose {
            settings.log_level = "debug".to_string();
        }
        Ok(settings)
    }

    pub async fn run(self, settings: Settings) -> Result<()> {
        let service = FinanceService::init(&settings.database)
            .await
            .with_context(|| format!("Failed to open database {}", settings.database))?;

        let result = self.dispatch(&service).await;
        service.close().await;
        result
    }

    async fn dispatch(self, service: &FinanceService) -> Result<()> {
        let email = self
            .user
            .as_deref()
            .ok_or_else(|| anyhow!("No user given. Pass --user <email> or set FINTRACK_USER"))?;
        let out = Output { json: self.json };

        match self.command {
            Commands::Account(cmd) => run_account_command(service, email, cmd, out).await?,
            Commands::Category(cmd) => {
                let owner = service.login_or_create(email).await?;
                run_category_command(service, &owner, cmd, out).await?
            }
            Commands::Tx(cmd) => {
                let owner = service.login_or_create(email).await?;
                run_tx_command(service, &owner, cmd, out).await?
            }
            Commands::Budget(cmd) => {
                let owner = service.login_or_create(email).await?;
                run_budget_command(service, &owner, cmd, out).await?
            }
            Commands::Report(cmd) => {
                let owner = service.login_or_create(email).await?;
                run_report_command(service, &owner, cmd, out).await?
            }
        }

        Ok(())
    }
}

#[derive(Clone, Copy)]
struct Output {
    json: bool,
}

impl Output {
    /// Print `value` as JSON, or run `human` for the table/text rendering.
    fn emit<T: Serialize>(self, value: &T, human: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            human(value);
        }
        Ok(())
    }
}

async fn run_category_command(
    service: &FinanceService,
    owner: &Owner,
    cmd: CategoryCommands,
    out: Output,
) -> Result<()> {
    match cmd {
        CategoryCommands::List { kind } => {
            let categories = service.list_categories(owner.id, kind).await?;
            out.emit(&categories, |categories| {
                if categories.is_empty() {
                    println!("No categories found.");
                    return;
                }
                println!("{:<36} {:<8} {:<20}", "ID", "TYPE", "NAME");
                println!("{}", "-".repeat(66));
                for category in categories {
                    println!(
                        "{:<36} {:<8} {:<20}",
                        category.id,
                        category.category_type.as_str(),
                        category.name
                    );
                }
            })?;
        }

        CategoryCommands::Add { kind, name } => {
            let (category, created) = service.upsert_category(owner.id, kind, &name).await?;
            out.emit(&category, |category| {
                let verb = if created { "Created" } else { "Already exists" };
                println!(
                    "{verb}: {} category '{}' ({})",
                    category.category_type, category.name, category.id
                );
            })?;
        }

        CategoryCommands::Update { id, kind, name } => {
            let id = parse_id(&id, "category")?;
            let update = service.update_category(owner.id, id, kind, &name).await?;
            out.emit(&update, |update| {
                if update.updated {
                    println!(
                        "Updated category: {} '{}' ({} transactions renamed)",
                        update.category.category_type,
                        update.category.name,
                        update.renamed_transactions
                    );
                } else {
                    println!("Nothing to change.");
                }
            })?;
        }

        CategoryCommands::Delete {
            kind,
            name,
            strategy,
        } => {
            let outcome = service
                .delete_category(owner.id, kind, &name, strategy)
                .await?;
            out.emit(&outcome, |outcome| println!("{}", outcome.message))?;
        }
    }

    Ok(())
}

async fn run_tx_command(
    service: &FinanceService,
    owner: &Owner,
    cmd: TxCommands,
    out: Output,
) -> Result<()> {
    match cmd {
        TxCommands::Add {
            kind,
            category,
            amount,
            date,
            description,
        } => {
            let amount_cents = parse_money(&amount)?;
            let date = match date {
                Some(date_str) => parse_date(&date_str)?,
                None => Utc::now(),
            };

            let transaction = service
                .add_transaction(owner.id, kind, &category, amount_cents, date, description)
                .await?;
            out.emit(&transaction, |tx| {
                println!(
                    "Recorded {}: {} in {} ({})",
                    tx.transaction_type.as_str().to_lowercase(),
                    format_cents(tx.amount_cents),
                    tx.category,
                    tx.id
                );
            })?;
        }

        TxCommands::List {
            kind,
            category,
            min,
            max,
            from_date,
            to_date,
            search,
        } => {
            let filter = TransactionFilter {
                transaction_type: kind,
                category,
                min_amount: min.as_deref().map(parse_money).transpose()?,
                max_amount: max.as_deref().map(parse_money).transpose()?,
                start_date: from_date.as_deref().map(parse_date).transpose()?,
                end_date: to_date.as_deref().map(parse_end_of_day).transpose()?,
                search_text: search,
            };

            let transactions = service.list_transactions(owner.id, &filter).await?;
            out.emit(&transactions, |transactions| {
                if transactions.is_empty() {
                    println!("No transactions found.");
                    return;
                }
                println!(
                    "{:<10} {:<8} {:<16} {:>12} {:<30}",
                    "DATE", "TYPE", "CATEGORY", "AMOUNT", "DESCRIPTION"
                );
                println!("{}", "-".repeat(80));
                for tx in transactions {
                    println!(
                        "{:<10} {:<8} {:<16} {:>12} {:<30}",
                        tx.date.format("%Y-%m-%d").to_string(),
                        tx.transaction_type.as_str(),
                        truncate(&tx.category, 16),
                        signed_amount(tx.is_income(), tx.amount_cents),
                        truncate(tx.description.as_deref().unwrap_or(""), 30)
                    );
                }
            })?;
        }

        TxCommands::Show { id } => {
            let id = parse_id(&id, "transaction")?;
            let tx = service.get_transaction(owner.id, id).await?;
            out.emit(&tx, |tx| {
                println!("Transaction: {}", tx.id);
                println!("  Type:        {}", tx.transaction_type);
                println!("  Category:    {}", tx.category);
                println!("  Amount:      {}", format_cents(tx.amount_cents));
                println!("  Date:        {}", tx.date.format("%Y-%m-%d"));
                if let Some(desc) = &tx.description {
                    println!("  Description: {}", desc);
                }
                println!("  Created:     {}", tx.created_at.format("%Y-%m-%d %H:%M:%S"));
                println!("  Modified:    {}", tx.last_modified.format("%Y-%m-%d %H:%M:%S"));
            })?;
        }

        TxCommands::Update {
            id,
            kind,
            category,
            amount,
            date,
            description,
            clear_description,
        } => {
            let id = parse_id(&id, "transaction")?;
            let patch = TransactionPatch {
                transaction_type: kind,
                category,
                amount_cents: amount.as_deref().map(parse_money).transpose()?,
                date: date.as_deref().map(parse_date).transpose()?,
                description: if clear_description {
                    Some(None)
                } else {
                    description.map(Some)
                },
            };
            if patch.is_empty() {
                println!("Nothing to update.");
                return Ok(());
            }

            if !service.update_transaction(owner.id, id, patch).await? {
                return Err(anyhow!("Transaction not found: {}", id));
            }
            let tx = service.get_transaction(owner.id, id).await?;
            out.emit(&tx, |tx| println!("Updated transaction: {}", tx.id))?;
        }

        TxCommands::Delete { id } => {
            let id = parse_id(&id, "transaction")?;
            if !service.delete_transaction(owner.id, id).await? {
                return Err(anyhow!("Transaction not found: {}", id));
            }
            println!("Deleted transaction: {}", id);
        }
    }

    Ok(())
}

async fn run_budget_command(
    service: &FinanceService,
    owner: &Owner,
    cmd: BudgetCommands,
    out: Output,
) -> Result<()> {
    match cmd {
        BudgetCommands::Set {
            category,
            amount,
            budget_type,
            month,
            year,
        } => {
            let amount_cents = parse_limit(&amount)?;
            let (budget, created) = service
                .set_budget(owner.id, &category, amount_cents, budget_type, month, year)
                .await?;
            out.emit(&budget, |budget| {
                let verb = if created { "Created" } else { "Updated" };
                println!(
                    "{verb} budget: {} {:04}-{:02}, {} ({})",
                    budget.category,
                    budget.year,
                    budget.month,
                    format_cents(budget.amount_cents),
                    budget.id
                );
            })?;
        }

        BudgetCommands::List { month, year } => {
            let budgets = service.list_budgets(owner.id, month, year).await?;
            out.emit(&budgets, |budgets| {
                if budgets.is_empty() {
                    println!("No budgets found.");
                    return;
                }
                println!(
                    "{:<36} {:<8} {:<16} {:>12} {:<8}",
                    "ID", "PERIOD", "CATEGORY", "LIMIT", "TYPE"
                );
                println!("{}", "-".repeat(84));
                for budget in budgets {
                    println!(
                        "{:<36} {:<8} {:<16} {:>12} {:<8}",
                        budget.id,
                        format!("{:04}-{:02}", budget.year, budget.month),
                        truncate(&budget.category, 16),
                        format_cents(budget.amount_cents),
                        budget.budget_type.as_str()
                    );
                }
            })?;
        }

        BudgetCommands::Update { id, amount } => {
            let id = parse_id(&id, "budget")?;
            let amount_cents = parse_limit(&amount)?;
            if !service.update_budget_amount(owner.id, id, amount_cents).await? {
                return Err(anyhow!("Budget not found: {}", id));
            }
            println!("Updated budget {}: {}", id, format_cents(amount_cents));
        }

        BudgetCommands::Progress {
            category,
            month,
            year,
        } => {
            let (month, year) = period_or_current(month, year);
            let progress = service
                .budget_progress(owner.id, &category, month, year)
                .await?;
            out.emit(&progress, |progress| {
                println!("{} {:04}-{:02}", category, year, month);
                println!("  Budget:    {}", format_cents(progress.budget));
                println!("  Spent:     {}", format_cents(progress.spent));
                println!("  Remaining: {}", format_cents(progress.remaining));
                println!("  Used:      {:.1}%", progress.percentage);
                if progress.is_exceeded() {
                    println!("  Over budget!");
                }
            })?;
        }

        BudgetCommands::Status { month, year } => {
            let (month, year) = period_or_current(month, year);
            let statuses = service.budget_overview(owner.id, month, year).await?;
            out.emit(&statuses, |statuses| print_budget_statuses(statuses))?;
        }

        BudgetCommands::Delete { id } => {
            let id = parse_id(&id, "budget")?;
            if !service.delete_budget(owner.id, id).await? {
                return Err(anyhow!("Budget not found: {}", id));
            }
            println!("Deleted budget: {}", id);
        }
    }

    Ok(())
}

fn print_budget_statuses(statuses: &[BudgetStatus]) {
    if statuses.is_empty() {
        println!("No budgets found.");
        return;
    }
    println!(
        "{:<16} {:>12} {:>12} {:>12} {:>8}",
        "CATEGORY", "LIMIT", "SPENT", "REMAINING", "USED"
    );
    println!("{}", "-".repeat(64));
    for status in statuses {
        let marker = if status.progress.is_exceeded() { " !" } else { "" };
        println!(
            "{:<16} {:>12} {:>12} {:>12} {:>7.1}%{}",
            truncate(&status.budget.category, 16),
            format_cents(status.progress.budget),
            format_cents(status.progress.spent),
            format_cents(status.progress.remaining),
            status.progress.percentage,
            marker
        );
    }
}

async fn run_report_command(
    service: &FinanceService,
    owner: &Owner,
    cmd: ReportCommands,
    out: Output,
) -> Result<()> {
    match cmd {
        ReportCommands::Summary { from_date, to_date } => {
            let start = from_date.as_deref().map(parse_date).transpose()?;
            let end = to_date.as_deref().map(parse_end_of_day).transpose()?;

            let report = SummaryReport {
                totals: service.totals_by_type(owner.id, start, end).await?,
                statistics: service.statistics_summary(owner.id, start, end).await?,
                daily_average_spending: service
                    .daily_average_spending(owner.id, start, end)
                    .await?,
            };
            out.emit(&report, |report| {
                println!("Income:          {:>12}", format_cents(report.totals.income));
                println!("Expenses:        {:>12}", format_cents(report.totals.expense));
                println!("Net:             {:>12}", format_cents(report.totals.net));
                println!();
                let stats = &report.statistics;
                println!(
                    "Transactions:    {:>12} ({} expenses, {} income)",
                    stats.transaction_count, stats.expense_count, stats.income_count
                );
                println!("Average expense: {:>12}", format_cents_f64(stats.avg_expense));
                println!("Median expense:  {:>12}", format_cents_f64(stats.median_expense));
                println!("Average income:  {:>12}", format_cents_f64(stats.avg_income));
                println!(
                    "Daily spending:  {:>12}",
                    format_cents_f64(report.daily_average_spending)
                );
            })?;
        }

        ReportCommands::Categories { from_date, to_date } => {
            let start = from_date.as_deref().map(parse_date).transpose()?;
            let end = to_date.as_deref().map(parse_end_of_day).transpose()?;

            let spending = service.spending_by_category(owner.id, start, end).await?;
            out.emit(&spending, |spending| {
                if spending.is_empty() {
                    println!("No expenses found.");
                    return;
                }
                let total: Cents = spending.iter().map(|s| s.total).sum();
                println!(
                    "{:<20} {:>12} {:>6} {:>12} {:>7}",
                    "CATEGORY", "TOTAL", "COUNT", "AVERAGE", "SHARE"
                );
                println!("{}", "-".repeat(61));
                for entry in spending {
                    println!(
                        "{:<20} {:>12} {:>6} {:>12} {:>6.1}%",
                        truncate(&entry.category, 20),
                        format_cents(entry.total),
                        entry.count,
                        format_cents_f64(entry.average),
                        entry.total as f64 / total as f64 * 100.0
                    );
                }
            })?;
        }

        ReportCommands::Trend { months } => {
            let trend = service.monthly_trend(owner.id, months, Utc::now()).await?;
            out.emit(&trend, |trend| {
                if trend.is_empty() {
                    println!("No transactions in the last {} months.", months);
                    return;
                }
                println!("{:<8} {:>12} {:>12} {:>12}", "MONTH", "INCOME", "EXPENSE", "NET");
                println!("{}", "-".repeat(47));
                for month in trend {
                    println!(
                        "{:<8} {:>12} {:>12} {:>12}",
                        format!("{:04}-{:02}", month.year, month.month),
                        format_cents(month.income),
                        format_cents(month.expense),
                        format_cents(month.income - month.expense)
                    );
                }
            })?;
        }

        ReportCommands::Anomalies { threshold } => {
            let anomalies = service.detect_anomalies(owner.id, threshold).await?;
            out.emit(&anomalies, |anomalies| {
                if anomalies.is_empty() {
                    println!("No unusual expenses found.");
                    return;
                }
                println!(
                    "{:<10} {:<16} {:>12} {:>8}",
                    "DATE", "CATEGORY", "AMOUNT", "Z-SCORE"
                );
                println!("{}", "-".repeat(49));
                for anomaly in anomalies {
                    let tx = &anomaly.transaction;
                    println!(
                        "{:<10} {:<16} {:>12} {:>8.2}",
                        tx.date.format("%Y-%m-%d").to_string(),
                        truncate(&tx.category, 16),
                        format_cents(tx.amount_cents),
                        anomaly.z_score
                    );
                }
            })?;
        }

        ReportCommands::Forecast => {
            let forecast = service.forecast_next_month(owner.id, Utc::now()).await?;
            out.emit(&forecast, |forecast| {
                println!("Expected spending next month: {}", format_cents_f64(*forecast));
            })?;
        }
    }

    Ok(())
}

async fn run_account_command(
    service: &FinanceService,
    email: &str,
    cmd: AccountCommands,
    out: Output,
) -> Result<()> {
    let owner = service.find_owner(email).await?;

    match cmd {
        AccountCommands::Deactivate => {
            service.deactivate(owner.id).await?;
            println!("Deactivated account: {}", owner.email);
        }

        AccountCommands::Delete { yes } => {
            if !yes {
                return Err(anyhow!(
                    "Refusing to delete {} without --yes; this removes all of its data",
                    owner.email
                ));
            }
            let deletion = service.delete_with_data(owner.id).await?;
            out.emit(&deletion, |deletion| println!("{}", deletion))?;
        }
    }

    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

fn signed_amount(is_income: bool, cents: Cents) -> String {
    let sign = if is_income { "+" } else { "-" };
    format!("{}{}", sign, format_cents(cents))
}

fn parse_id(id: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(id).with_context(|| format!("Invalid {} ID: {}", what, id))
}

fn parse_money(amount: &str) -> Result<Cents> {
    parse_amount(amount).context("Invalid amount format. Use '50.00' or '50'")
}

/// Like `parse_money`, but a budget limit may be zero.
fn parse_limit(amount: &str) -> Result<Cents> {
    match parse_amount(amount) {
        Err(AmountError::NotPositive) => Ok(0),
        other => other.context("Invalid amount format. Use '400.00' or '400'"),
    }
}

fn parse_naive_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .with_context(|| format!("Invalid date format '{}'. Use YYYY-MM-DD", date_str))
}

fn parse_date(date_str: &str) -> Result<DateTime<Utc>> {
    parse_naive_date(date_str)?
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| anyhow!("Invalid date: {}", date_str))
}

/// Last representable instant of the day, for inclusive upper bounds.
fn parse_end_of_day(date_str: &str) -> Result<DateTime<Utc>> {
    parse_naive_date(date_str)?
        .and_hms_micro_opt(23, 59, 59, 999_999)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| anyhow!("Invalid date: {}", date_str))
}

fn period_or_current(month: Option<u32>, year: Option<i32>) -> (u32, i32) {
    let today = Utc::now();
    (
        month.unwrap_or_else(|| today.month()),
        year.unwrap_or_else(|| today.year()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_end_of_day_is_inclusive() {
        let start = parse_date("2024-03-10").unwrap();
        let end = parse_end_of_day("2024-03-10").unwrap();
        assert!(end > start);
        assert_eq!(end.date_naive(), start.date_naive());
        assert!(parse_date("10/03/2024").is_err());
    }

    #[test]
    fn test_parse_limit_allows_zero() {
        assert_eq!(parse_limit("0").unwrap(), 0);
        assert_eq!(parse_limit("12.50").unwrap(), 1250);
        assert!(parse_limit("abc").is_err());
        assert!(parse_money("0").is_err());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Groceries", 16), "Groceries");
        assert_eq!(truncate("Transportation costs", 10), "Transpo...");
    }

    #[test]
    fn test_cli_parses_global_user_after_subcommand() {
        let cli = Cli::try_parse_from([
            "fintrack", "tx", "add", "expense", "Shopping", "12.50", "--user", "a@b.c",
        ])
        .unwrap();
        assert_eq!(cli.user.as_deref(), Some("a@b.c"));
        assert!(matches!(cli.command, Commands::Tx(TxCommands::Add { .. })));
    }
}
