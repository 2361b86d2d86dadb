use std::path::{Path, PathBuf};

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::fmt::money;
use crate::importer::read_transactions;
use crate::reports::{self, TaxableReport};
use crate::settings::{load_settings, resolve_catalog};

fn create_file(path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(std::fs::File::create(path)?)
}

fn print_summary(report: &TaxableReport) {
    let mut table = Table::new();
    table.set_header(vec!["Account", "Qualified Div", "Unqualified Div", "Interest", "Taxable"]);
    for a in &report.accounts {
        table.add_row(vec![
            Cell::new(&a.account),
            Cell::new(money(a.qualified_div)),
            Cell::new(money(a.unqualified_div)),
            Cell::new(money(a.interest)),
            Cell::new(money(a.taxable).yellow().to_string()),
        ]);
    }
    let t = &report.totals;
    table.add_row(vec![
        Cell::new("TOTAL".bold()),
        Cell::new(money(t.qualified_div)),
        Cell::new(money(t.unqualified_div)),
        Cell::new(money(t.interest)),
        Cell::new(money(t.taxable).yellow().bold().to_string()),
    ]);
    println!("Taxable Investment Income\n{table}");
}

pub fn run(
    file: &str,
    catalog: Option<&str>,
    output: Option<&str>,
    filtered: Option<&str>,
) -> Result<()> {
    let settings = load_settings();
    let catalog = resolve_catalog(catalog.map(Path::new), &settings)?;
    let rows = read_transactions(Path::new(file))?;
    let total_rows = rows.len();

    let report = reports::get_taxable_summary(rows, &catalog)?;
    println!(
        "{} rows read, {} classified, {} accounts",
        total_rows,
        report.classified,
        report.accounts.len()
    );
    print_summary(&report);

    let output = output
        .map(PathBuf::from)
        .unwrap_or_else(|| settings.results_path("taxable_summary.csv"));
    reports::write_summary_csv(&report.accounts, create_file(&output)?)?;
    println!("Summary saved to {}", output.display());

    if let Some(path) = filtered {
        let path = PathBuf::from(path);
        reports::write_rows_csv(&report.rows, create_file(&path)?)?;
        println!("Classified rows saved to {}", path.display());
    }

    Ok(())
}
