use std::path::{Path, PathBuf};

use comfy_table::{Cell, Table};

use crate::catalog::{save_catalog, RuleCatalog};
use crate::cli::parse_category;
use crate::error::{InvtaxError, Result};
use crate::settings::{load_settings, resolve_catalog};

/// File that edits go to: the explicit path, else the configured one.
fn target_path(catalog: Option<&str>) -> PathBuf {
    catalog
        .map(PathBuf::from)
        .unwrap_or_else(|| load_settings().catalog_file())
}

fn load_for_edit(path: &Path) -> Result<RuleCatalog> {
    if path.is_file() {
        resolve_catalog(Some(path), &load_settings())
    } else {
        Ok(RuleCatalog::default())
    }
}

pub fn list(catalog: Option<&str>) -> Result<()> {
    let catalog = resolve_catalog(catalog.map(Path::new), &load_settings())?;

    let mut table = Table::new();
    table.set_header(vec!["Precedence", "Category", "Match Key"]);
    for (rank, (category, keys)) in catalog.rule_sets().enumerate() {
        for key in keys {
            table.add_row(vec![Cell::new(rank + 1), Cell::new(category), Cell::new(key)]);
        }
    }
    println!("Catalog ({} keys)\n{table}", catalog.len());
    Ok(())
}

pub fn add(key: &str, category: &str, catalog: Option<&str>) -> Result<()> {
    let category = parse_category(category)?;
    let path = target_path(catalog);
    let mut rules = load_for_edit(&path)?;

    if !rules.add_key(category, key)? {
        println!("'{key}' is already a {category} key");
        return Ok(());
    }
    for (dup, first, second) in rules.overlaps() {
        if dup.eq_ignore_ascii_case(key.trim()) {
            println!("Warning: '{dup}' is now in both {first} and {second}; matching rows will conflict");
        }
    }
    save_catalog(&rules, &path)?;
    println!("Added key: '{}' \u{2192} {category}", key.trim());
    Ok(())
}

pub fn remove(key: &str, category: &str, catalog: Option<&str>) -> Result<()> {
    let category = parse_category(category)?;
    let path = target_path(catalog);
    let mut rules = load_for_edit(&path)?;

    if !rules.remove_key(category, key) {
        return Err(InvtaxError::Catalog(format!("no {category} key '{key}'")));
    }
    save_catalog(&rules, &path)?;
    println!("Removed key: '{}' from {category}", key.trim());
    Ok(())
}

pub fn init(force: bool) -> Result<()> {
    let path = load_settings().catalog_file();
    if path.exists() && !force {
        return Err(InvtaxError::Catalog(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    save_catalog(&RuleCatalog::default(), &path)?;
    println!("Wrote built-in catalog to {}", path.display());
    Ok(())
}
