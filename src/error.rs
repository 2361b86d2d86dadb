use thiserror::Error;

use crate::models::Category;

#[derive(Error, Debug)]
pub enum InvtaxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error(
        "Conflict in classification for '{description}' ({date} - {account} - {amount}): \
         matched both {first} and {second}"
    )]
    ClassificationConflict {
        date: String,
        account: String,
        amount: String,
        description: String,
        first: Category,
        second: Category,
    },

    #[error(
        "{category} description '{description}' does not match any defined \
         interest, qualified or unqualified symbols"
    )]
    UnclassifiedIncome {
        category: String,
        description: String,
    },

    #[error("Invalid amount '{amount}' for account {account}")]
    InvalidAmount { account: String, amount: String },

    #[error("{column} total for account {account} is too large")]
    AmountOverflow { account: String, column: String },

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("File '{0}' not found")]
    InputNotFound(String),

    #[error("Unknown category: {0} (expected interest, unqualified_div or qualified_div)")]
    UnknownCategory(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, InvtaxError>;
