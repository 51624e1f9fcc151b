//! # Command Handlers
//!
//! Each handler calls one store or ledger operation and prints the result,
//! either as text in the display language or as JSON with `--json`.
//!
//! ## Command Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Command::Adjust(args)                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  App::adjust ──► inventory.adjust_stock(..) ──► Recorded<StockMovement> │
//! │       │                                                                 │
//! │       ├── --json ──► {"value": {...}, "warnings": [...]}                │
//! │       └── text   ──► "Stock ajusté: Riz 5kg -4 → 26" + ⚠ warnings       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fs;
use std::io::Write;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use tracing::info;

use geststock_core::report::{ReportExport, ReportRange};
use geststock_core::{
    AdjustmentReason, LedgerWarning, Locale, Money, PaymentMethod, PurchaseDraft, PurchaseLine,
    SaleDraft, SaleLine,
};
use geststock_store::{Inventory, KeyValueStore};

use crate::cli::{
    AdjustArgs, BackupCommand, Command, OrderArgs, PayArgs, ReportArgs, ResetArgs, SellArgs,
};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::i18n::Dictionary;

/// Everything a command needs.
#[derive(Debug)]
pub struct App<S: KeyValueStore> {
    pub inventory: Inventory<S>,
    pub config: CliConfig,
    pub json: bool,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(inventory: Inventory<S>, config: CliConfig, json: bool) -> Self {
        App {
            inventory,
            config,
            json,
        }
    }

    /// Display language: the environment override, else the stored one.
    pub fn dictionary(&self) -> Dictionary {
        Dictionary::new(self.config.language.unwrap_or(self.inventory.language()))
    }

    fn as_of(&self) -> CliResult<DateTime<FixedOffset>> {
        self.config.as_of(self.inventory.now())
    }

    /// Runs one command, writing its output to `out`.
    pub fn execute(&mut self, command: Command, out: &mut dyn Write) -> CliResult<()> {
        match command {
            Command::Dashboard => self.dashboard(out),
            Command::Report(args) => self.report(args, out),
            Command::Products(args) => self.products(args.search.as_deref(), out),
            Command::Customers(args) => self.customers(args.search.as_deref(), out),
            Command::Suppliers(args) => self.suppliers(args.search.as_deref(), out),
            Command::Sell(args) => self.sell(args, out),
            Command::CancelSale(args) => self.cancel_sale(&args.id, out),
            Command::Order(args) => self.order(args, out),
            Command::Receive(args) => self.receive(&args.id, out),
            Command::Adjust(args) => self.adjust(args, out),
            Command::Pay(args) => self.pay(args, out),
            Command::Audit => self.audit(out),
            Command::Backup(command) => self.backup(command, out),
            Command::Reset(args) => self.reset(args, out),
            Command::Lang(args) => self.lang(&args.language, out),
        }
    }

    // =========================================================================
    // Reports
    // =========================================================================

    fn dashboard(&mut self, out: &mut dyn Write) -> CliResult<()> {
        let stats = self
            .inventory
            .dashboard_stats(self.as_of()?, self.config.recent_limit);
        if self.json {
            return print_json(out, &stats);
        }

        let d = self.dictionary();
        let company = self.inventory.settings().company_name.clone();
        writeln!(out, "{} - {}", d.t("dashboard.title"), company)?;
        writeln!(out, "  {:<24} {}", d.t("dashboard.today_sales"), stats.today_sales)?;
        writeln!(out, "  {:<24} {}", d.t("dashboard.month_sales"), stats.month_sales)?;
        writeln!(out, "  {:<24} {}", d.t("dashboard.products"), stats.total_products)?;
        writeln!(out, "  {:<24} {}", d.t("dashboard.low_stock"), stats.low_stock_count)?;
        writeln!(out, "  {:<24} {}", d.t("dashboard.suppliers"), stats.total_suppliers)?;
        writeln!(out, "  {:<24} {}", d.t("dashboard.customers"), stats.total_customers)?;
        writeln!(out, "  {:<24} {}", d.t("dashboard.pending_orders"), stats.pending_orders)?;
        writeln!(out, "{}", d.t("dashboard.recent_movements"))?;
        for movement in &stats.recent_movements {
            writeln!(
                out,
                "  {}  {:<12} {:<28} {:>+6} → {}",
                movement.created_at.with_timezone(&self.config.offset()?).format("%d/%m %H:%M"),
                d.movement(movement.movement_type),
                movement.product_name,
                movement.quantity,
                movement.balance_after
            )?;
        }
        Ok(())
    }

    fn report(&mut self, args: ReportArgs, out: &mut dyn Write) -> CliResult<()> {
        let report = self.inventory.period_report(args.range, self.as_of()?);

        if let Some(path) = &args.export {
            let text = serde_json::to_string_pretty(&ReportExport::from(&report))?;
            fs::write(path, text)?;
            info!(path = %path.display(), range = %args.range, "Report exported");
        }

        if self.json {
            return print_json(out, &report);
        }

        let d = self.dictionary();
        writeln!(out, "{}: {}", d.t("report.title"), d.t(range_key(args.range)))?;
        writeln!(out, "  {:<24} {}", d.t("report.revenue"), report.total_revenue)?;
        writeln!(out, "  {:<24} {}", d.t("report.sales_count"), report.total_sales_count)?;
        writeln!(out, "  {:<24} {}", d.t("report.average_sale"), report.average_sale)?;

        writeln!(out, "{}", d.t("report.top_products"))?;
        for (rank, product) in report.top_products.iter().enumerate() {
            writeln!(
                out,
                "  {}. {:<28} {:>5}  {}",
                rank + 1,
                product.name,
                product.quantity,
                product.revenue
            )?;
        }

        writeln!(out, "{}", d.t("report.payment_methods"))?;
        for breakdown in &report.payment_methods {
            writeln!(
                out,
                "  {:<14} {:>4}  {}  ({:.1}%)",
                d.payment(breakdown.method),
                breakdown.count,
                breakdown.amount,
                breakdown.percentage
            )?;
        }

        writeln!(out, "{}", d.t("dashboard.low_stock"))?;
        for product in &report.low_stock_products {
            writeln!(
                out,
                "  {:<28} {} / {}",
                product.name, product.current_stock, product.min_stock
            )?;
        }

        if let Some(path) = &args.export {
            writeln!(out, "{} {}", d.t("report.exported"), path.display())?;
        }
        Ok(())
    }

    // =========================================================================
    // Lists
    // =========================================================================

    fn products(&mut self, search: Option<&str>, out: &mut dyn Write) -> CliResult<()> {
        let products = self.inventory.products().search(search.unwrap_or(""))?;
        if self.json {
            return print_json(out, &products);
        }

        let d = self.dictionary();
        writeln!(out, "{} ({})", d.t("products.title"), products.len())?;
        if products.is_empty() {
            writeln!(out, "  {}", d.t("common.none"))?;
        }
        for product in &products {
            let flag = if product.is_low_stock() { "!" } else { " " };
            writeln!(
                out,
                "{} {:<36} {:<28} {}: {:>5}  {}",
                flag,
                product.id,
                product.name,
                d.t("common.stock"),
                product.current_stock,
                product.sell_price
            )?;
        }
        Ok(())
    }

    fn customers(&mut self, search: Option<&str>, out: &mut dyn Write) -> CliResult<()> {
        let customers = self.inventory.customers().search(search.unwrap_or(""))?;
        if self.json {
            return print_json(out, &customers);
        }

        let d = self.dictionary();
        writeln!(out, "{} ({})", d.t("customers.title"), customers.len())?;
        if customers.is_empty() {
            writeln!(out, "  {}", d.t("common.none"))?;
        }
        for customer in &customers {
            writeln!(
                out,
                "  {:<36} {:<24} {:<18} {}: {}  {}: {}",
                customer.id,
                customer.name,
                customer.phone,
                d.t("common.debt"),
                customer.current_debt,
                d.t("common.limit"),
                customer.credit_limit
            )?;
        }
        Ok(())
    }

    fn suppliers(&mut self, search: Option<&str>, out: &mut dyn Write) -> CliResult<()> {
        let suppliers = self.inventory.suppliers().search(search.unwrap_or(""))?;
        if self.json {
            return print_json(out, &suppliers);
        }

        let d = self.dictionary();
        writeln!(out, "{} ({})", d.t("suppliers.title"), suppliers.len())?;
        if suppliers.is_empty() {
            writeln!(out, "  {}", d.t("common.none"))?;
        }
        for supplier in &suppliers {
            writeln!(
                out,
                "  {:<36} {:<30} {:<20} {}",
                supplier.id, supplier.name, supplier.contact, supplier.phone
            )?;
        }
        Ok(())
    }

    // =========================================================================
    // Ledger Operations
    // =========================================================================

    fn sell(&mut self, args: SellArgs, out: &mut dyn Write) -> CliResult<()> {
        let draft = SaleDraft {
            customer_id: args.customer,
            items: args
                .lines
                .into_iter()
                .map(|(product_id, quantity)| SaleLine {
                    product_id,
                    quantity,
                })
                .collect(),
            payment_method: PaymentMethod::from(args.method),
            notes: args.note,
        };
        let recorded = self.inventory.record_sale(draft)?;
        if self.json {
            return print_json(out, &recorded);
        }

        let d = self.dictionary();
        let sale = &recorded.value;
        writeln!(
            out,
            "{}: {}  {}  ({})",
            d.t("ops.sold"),
            sale.id,
            sale.total_amount,
            d.payment(sale.payment_method)
        )?;
        print_warnings(out, &d, &recorded.warnings)
    }

    fn cancel_sale(&mut self, sale_id: &str, out: &mut dyn Write) -> CliResult<()> {
        let recorded = self.inventory.cancel_sale(sale_id)?;
        if self.json {
            return print_json(out, &recorded);
        }

        let d = self.dictionary();
        writeln!(
            out,
            "{}: {}  {}",
            d.t("ops.sale_cancelled"),
            recorded.value.id,
            recorded.value.total_amount
        )?;
        print_warnings(out, &d, &recorded.warnings)
    }

    fn order(&mut self, args: OrderArgs, out: &mut dyn Write) -> CliResult<()> {
        let purchase = self.inventory.create_purchase(PurchaseDraft {
            supplier_id: args.supplier,
            items: args
                .lines
                .into_iter()
                .map(|(product_id, quantity)| PurchaseLine {
                    product_id,
                    quantity,
                })
                .collect(),
            notes: args.note,
        })?;
        if self.json {
            return print_json(out, &purchase);
        }

        let d = self.dictionary();
        writeln!(
            out,
            "{}: {}  {}  {}",
            d.t("ops.ordered"),
            purchase.id,
            purchase.supplier_name,
            purchase.total_amount
        )?;
        Ok(())
    }

    fn receive(&mut self, purchase_id: &str, out: &mut dyn Write) -> CliResult<()> {
        let recorded = self.inventory.record_purchase_receipt(purchase_id)?;
        if self.json {
            return print_json(out, &recorded);
        }

        let d = self.dictionary();
        writeln!(
            out,
            "{}: {}  {}",
            d.t("ops.received"),
            recorded.value.id,
            recorded.value.supplier_name
        )?;
        print_warnings(out, &d, &recorded.warnings)
    }

    fn adjust(&mut self, args: AdjustArgs, out: &mut dyn Write) -> CliResult<()> {
        let reason = if args.loss {
            AdjustmentReason::Loss
        } else {
            AdjustmentReason::Correction
        };
        let recorded = self
            .inventory
            .adjust_stock(&args.product, args.delta, reason, args.note)?;
        if self.json {
            return print_json(out, &recorded);
        }

        let d = self.dictionary();
        let movement = &recorded.value;
        writeln!(
            out,
            "{}: {} {:+} → {} ({})",
            d.t("ops.adjusted"),
            movement.product_name,
            movement.quantity,
            movement.balance_after,
            d.movement(movement.movement_type)
        )?;
        print_warnings(out, &d, &recorded.warnings)
    }

    fn pay(&mut self, args: PayArgs, out: &mut dyn Write) -> CliResult<()> {
        let recorded = self
            .inventory
            .record_payment(&args.customer, Money::from_units(args.amount))?;
        if self.json {
            return print_json(out, &recorded);
        }

        let d = self.dictionary();
        writeln!(
            out,
            "{}: {}  {}: {}",
            d.t("ops.paid"),
            recorded.value.name,
            d.t("common.debt"),
            recorded.value.current_debt
        )?;
        print_warnings(out, &d, &recorded.warnings)
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    fn audit(&mut self, out: &mut dyn Write) -> CliResult<()> {
        let report = self.inventory.audit();
        if self.json {
            return print_json(out, &report);
        }

        let d = self.dictionary();
        if report.is_clean() {
            writeln!(
                out,
                "{} ({} / {})",
                d.t("audit.clean"),
                report.products_checked,
                report.movements_checked
            )?;
        } else {
            writeln!(out, "{}: {}", d.t("audit.discrepancies"), report.discrepancies.len())?;
            for discrepancy in &report.discrepancies {
                writeln!(out, "  {}", serde_json::to_string(discrepancy)?)?;
            }
        }
        Ok(())
    }

    fn backup(&mut self, command: BackupCommand, out: &mut dyn Write) -> CliResult<()> {
        let d = self.dictionary();
        match command {
            BackupCommand::Export { file } => {
                fs::write(&file, self.inventory.export_backup_json()?)?;
                info!(path = %file.display(), "Backup exported");
                if self.json {
                    return print_json(out, &serde_json::json!({ "path": file }));
                }
                writeln!(out, "{} {}", d.t("backup.exported"), file.display())?;
            }
            BackupCommand::Import { file } => {
                let text = fs::read_to_string(&file)?;
                let summary = self.inventory.import_backup_json(&text)?;
                if self.json {
                    return print_json(out, &summary);
                }
                writeln!(
                    out,
                    "{}: {} {}, {} {}",
                    d.t("backup.imported"),
                    summary.products,
                    d.t("products.title"),
                    summary.customers,
                    d.t("customers.title")
                )?;
            }
        }
        Ok(())
    }

    fn reset(&mut self, args: ResetArgs, out: &mut dyn Write) -> CliResult<()> {
        if !args.yes {
            return Err(CliError::invalid_argument(
                "reset deletes every record; pass --yes to confirm",
            ));
        }
        self.inventory.clear_all()?;
        info!("Data reset from the command line");
        if self.json {
            return print_json(out, &serde_json::json!({ "cleared": true }));
        }

        writeln!(out, "{}", self.dictionary().t("reset.done"))?;
        Ok(())
    }

    fn lang(&mut self, value: &str, out: &mut dyn Write) -> CliResult<()> {
        let locale = Locale::parse(value)
            .ok_or_else(|| CliError::invalid_argument(format!("unknown language: {}", value)))?;
        self.inventory.set_language(locale)?;
        if self.json {
            return print_json(out, &locale);
        }

        let d = Dictionary::new(locale);
        writeln!(out, "{}: {}", d.t("ops.language"), locale.as_str())?;
        Ok(())
    }
}

// =============================================================================
// Output Helpers
// =============================================================================

fn print_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> CliResult<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn print_warnings(out: &mut dyn Write, d: &Dictionary, warnings: &[LedgerWarning]) -> CliResult<()> {
    for warning in warnings {
        writeln!(out, "⚠ {}: {}", d.t("common.warning"), warning)?;
    }
    Ok(())
}

fn range_key(range: ReportRange) -> &'static str {
    match range {
        ReportRange::Today => "report.range.today",
        ReportRange::Week => "report.range.week",
        ReportRange::Month => "report.range.month",
        ReportRange::Year => "report.range.year",
    }
}
