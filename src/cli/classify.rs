use std::path::Path;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::classifier::{check_exhaustive, classify_rows};
use crate::error::Result;
use crate::importer::read_transactions;
use crate::models::Category;
use crate::settings::{load_settings, resolve_catalog};

fn category_cell(category: Option<Category>) -> Cell {
    match category {
        Some(Category::Interest) => Cell::new("interest".blue().to_string()),
        Some(Category::UnqualifiedDiv) => Cell::new("unqualified_div".white().to_string()),
        Some(Category::QualifiedDiv) => Cell::new("qualified_div".yellow().to_string()),
        None => Cell::new("UNMATCHED".red().bold().to_string()),
    }
}

pub fn run(file: &str, catalog: Option<&str>) -> Result<()> {
    let catalog = resolve_catalog(catalog.map(Path::new), &load_settings())?;
    let rows = read_transactions(Path::new(file))?;

    let pending: Vec<bool> = rows.iter().map(|r| r.is_pending()).collect();
    let result = classify_rows(rows, &catalog)?;

    let mut table = Table::new();
    table.set_header(vec!["Date", "Account", "Amount", "Description", "Category"]);
    for (row, _) in result.rows.iter().zip(&pending).filter(|(_, p)| **p) {
        table.add_row(vec![
            Cell::new(&row.date),
            Cell::new(&row.account),
            Cell::new(&row.amount),
            Cell::new(&row.description),
            category_cell(row.category()),
        ]);
    }
    println!("Investment Income\n{table}");
    println!(
        "{} classified, {} unmatched",
        result.classified, result.unmatched
    );

    check_exhaustive(&result.rows)
}
