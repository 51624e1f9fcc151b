//! # Command-Line Arguments
//!
//! ```text
//! geststock [--json] [--data-dir DIR] <command>
//!
//!   dashboard                              headline figures
//!   report <today|week|month|year>         period report [--export FILE]
//!   products|customers|suppliers           lists [--search Q]
//!   sell PRODUCT:QTY...                    record a sale [--customer ID] [--method M]
//!   cancel-sale <sale>
//!   order <supplier> PRODUCT:QTY...        create a purchase order
//!   receive <purchase>
//!   adjust <product> <delta>               [--loss] [--note TEXT]
//!   pay <customer> <amount>
//!   audit
//!   backup export|import <FILE>
//!   reset --yes                            delete every stored record
//!   lang <fr|en>
//! ```

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use geststock_core::report::ReportRange;
use geststock_core::PaymentMethod;

#[derive(Debug, Parser)]
#[command(
    name = "geststock",
    about = "Stock, credit and sales reports for small shops",
    version
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    pub json: bool,

    #[arg(long, global = true, help = "Data directory (overrides GESTSTOCK_DATA_DIR)")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Today's and this month's sales, stock alerts, recent movements
    Dashboard,
    /// Revenue, top products and payment methods over a period
    Report(ReportArgs),
    /// List or search products
    Products(SearchArgs),
    /// List or search customers
    Customers(SearchArgs),
    /// List or search suppliers
    Suppliers(SearchArgs),
    /// Record a sale
    Sell(SellArgs),
    /// Cancel a completed sale and put its items back in stock
    CancelSale(IdArgs),
    /// Create a purchase order
    Order(OrderArgs),
    /// Receive a pending purchase order
    Receive(IdArgs),
    /// Correct a product's stock by hand
    Adjust(AdjustArgs),
    /// Record a customer repayment
    Pay(PayArgs),
    /// Replay the movement log and check every product's stock
    Audit,
    /// Export or import a full backup
    #[command(subcommand)]
    Backup(BackupCommand),
    /// Delete every stored record and start over
    Reset(ResetArgs),
    /// Set the display language
    Lang(LangArgs),
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[arg(help = "today, week, month or year")]
    pub range: ReportRange,
    #[arg(long, help = "Also write the report as JSON to this file")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    #[arg(long, short, help = "Case-insensitive search text")]
    pub search: Option<String>,
}

#[derive(Debug, Args)]
pub struct IdArgs {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct SellArgs {
    #[arg(required = true, value_parser = parse_line, help = "Lines as PRODUCT_ID:QUANTITY")]
    pub lines: Vec<(String, i64)>,
    #[arg(long, help = "Customer id; required for credit")]
    pub customer: Option<String>,
    #[arg(long, value_enum, default_value_t = MethodArg::Cash)]
    pub method: MethodArg,
    #[arg(long)]
    pub note: Option<String>,
}

#[derive(Debug, Args)]
pub struct OrderArgs {
    pub supplier: String,
    #[arg(required = true, value_parser = parse_line, help = "Lines as PRODUCT_ID:QUANTITY")]
    pub lines: Vec<(String, i64)>,
    #[arg(long)]
    pub note: Option<String>,
}

#[derive(Debug, Args)]
pub struct AdjustArgs {
    pub product: String,
    #[arg(allow_negative_numbers = true, help = "Signed change, e.g. -3")]
    pub delta: i64,
    #[arg(long, action = ArgAction::SetTrue, help = "Record as a loss (delta must be negative)")]
    pub loss: bool,
    #[arg(long)]
    pub note: Option<String>,
}

#[derive(Debug, Args)]
pub struct PayArgs {
    pub customer: String,
    #[arg(help = "Amount in F CFA")]
    pub amount: i64,
}

#[derive(Debug, Subcommand)]
pub enum BackupCommand {
    /// Write every collection to a JSON file
    Export { file: PathBuf },
    /// Replace every collection with a JSON backup
    Import { file: PathBuf },
}

#[derive(Debug, Args)]
pub struct ResetArgs {
    #[arg(long, action = ArgAction::SetTrue, help = "Confirm that all data may be deleted")]
    pub yes: bool,
}

#[derive(Debug, Args)]
pub struct LangArgs {
    #[arg(help = "fr or en")]
    pub language: String,
}

/// Payment method as typed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MethodArg {
    Cash,
    MobileMoney,
    Credit,
    Card,
}

impl From<MethodArg> for PaymentMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Cash => PaymentMethod::Cash,
            MethodArg::MobileMoney => PaymentMethod::MobileMoney,
            MethodArg::Credit => PaymentMethod::Credit,
            MethodArg::Card => PaymentMethod::Card,
        }
    }
}

/// Parses `PRODUCT_ID:QUANTITY`.
pub fn parse_line(value: &str) -> Result<(String, i64), String> {
    let (id, quantity) = value
        .rsplit_once(':')
        .ok_or_else(|| format!("expected PRODUCT_ID:QUANTITY, got '{}'", value))?;
    if id.trim().is_empty() {
        return Err(format!("missing product id in '{}'", value));
    }
    let quantity = quantity
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("invalid quantity in '{}'", value))?;
    Ok((id.trim().to_string(), quantity))
}
