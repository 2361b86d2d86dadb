pub mod catalog;
pub mod classify;
pub mod init;
pub mod taxable;

use clap::{Parser, Subcommand};

use crate::error::{InvtaxError, Result};
use crate::models::Category;

pub(crate) fn parse_category(label: &str) -> Result<Category> {
    Category::from_label(label).ok_or_else(|| InvtaxError::UnknownCategory(label.to_string()))
}

#[derive(Parser)]
#[command(
    name = "invtax",
    about = "Classify investment income and compute taxable totals per account."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write settings: where results go and which catalog to use.
    Init {
        /// Directory for output files (default: results)
        #[arg(long = "results-dir")]
        results_dir: Option<String>,
        /// Path to the match-key catalog (default: ~/.config/invtax/catalog.json)
        #[arg(long)]
        catalog: Option<String>,
    },
    /// Classify investment income and summarize taxable income per account.
    Taxable {
        /// Transactions CSV (date, account, description, amount, category)
        file: String,
        /// Catalog JSON to use instead of the configured one
        #[arg(long)]
        catalog: Option<String>,
        /// Summary CSV path (default: <results_dir>/taxable_summary.csv)
        #[arg(long)]
        output: Option<String>,
        /// Also write the classified investment income rows to this CSV
        #[arg(long)]
        filtered: Option<String>,
    },
    /// Show how each investment income row is classified.
    Classify {
        /// Transactions CSV (date, account, description, amount, category)
        file: String,
        /// Catalog JSON to use instead of the configured one
        #[arg(long)]
        catalog: Option<String>,
    },
    /// Manage the match-key catalog.
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },
}

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// List match keys in precedence order.
    List {
        #[arg(long)]
        catalog: Option<String>,
    },
    /// Add a match key to a category.
    Add {
        /// Case-insensitive text to look for in descriptions
        key: String,
        /// interest, unqualified_div or qualified_div
        #[arg(long)]
        category: String,
        #[arg(long)]
        catalog: Option<String>,
    },
    /// Remove a match key from a category.
    Remove {
        key: String,
        /// interest, unqualified_div or qualified_div
        #[arg(long)]
        category: String,
        #[arg(long)]
        catalog: Option<String>,
    },
    /// Write the built-in catalog to the configured path.
    Init {
        /// Overwrite an existing catalog file
        #[arg(long)]
        force: bool,
    },
}
