use std::io::Read;
use std::path::Path;

use regex::Regex;

use crate::error::{InvtaxError, Result};
use crate::models::TransactionRow;

const REQUIRED_COLUMNS: [&str; 5] = ["date", "account", "description", "amount", "category"];

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// "Account " and "account" name the same column; "Posting  Date" becomes
/// "posting_date".
pub fn normalize_header(raw: &str, whitespace: &Regex) -> String {
    whitespace
        .replace_all(raw.trim(), "_")
        .to_lowercase()
}

/// Strip currency formatting so the amount parses later. Anything that is
/// not a number stays as it was and is rejected at aggregation.
pub fn normalize_amount(raw: &str) -> String {
    let s = raw.replace(',', "").replace('$', "");
    let s = s.trim();
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return format!("-{}", inner.trim());
    }
    s.to_string()
}

pub fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();
    ["%m/%d/%Y", "%Y-%m-%d"]
        .iter()
        .find_map(|fmt| chrono::NaiveDate::parse_from_str(raw, fmt).ok())
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| raw.to_string())
}

// ---------------------------------------------------------------------------
// read_transactions
// ---------------------------------------------------------------------------

pub fn read_transactions(file_path: &Path) -> Result<Vec<TransactionRow>> {
    if !file_path.is_file() {
        return Err(InvtaxError::InputNotFound(file_path.display().to_string()));
    }
    let file = std::fs::File::open(file_path)?;
    read_transactions_from(std::io::BufReader::new(file))
}

pub fn read_transactions_from(reader: impl Read) -> Result<Vec<TransactionRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let whitespace = Regex::new(r"\s+")?;
    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| normalize_header(h, &whitespace))
        .collect();

    let mut idx = [0usize; 5];
    for (slot, name) in idx.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| InvtaxError::MissingColumn(name.to_string()))?;
    }
    let [idx_date, idx_account, idx_desc, idx_amount, idx_category] = idx;

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let field = |i: usize| record.get(i).unwrap_or("");
        rows.push(TransactionRow {
            date: normalize_date(field(idx_date)),
            account: field(idx_account).trim().to_string(),
            description: field(idx_desc).trim().to_string(),
            amount: normalize_amount(field(idx_amount)),
            category: field(idx_category).trim().to_lowercase(),
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_header() {
        let ws = Regex::new(r"\s+").unwrap();
        assert_eq!(normalize_header("Account ", &ws), "account");
        assert_eq!(normalize_header(" Posting  Date", &ws), "posting_date");
        assert_eq!(normalize_header("CATEGORY", &ws), "category");
    }

    #[test]
    fn test_normalize_amount() {
        assert_eq!(normalize_amount("1,234.56"), "1234.56");
        assert_eq!(normalize_amount("  -42.50 "), "-42.50");
        assert_eq!(normalize_amount("$50.00"), "50.00");
        assert_eq!(normalize_amount("(500.00)"), "-500.00");
        assert_eq!(normalize_amount("n/a"), "n/a");
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("01/15/2025"), "2025-01-15");
        assert_eq!(normalize_date("2025-01-15"), "2025-01-15");
        assert_eq!(normalize_date("02/30/2025"), "02/30/2025");
        assert_eq!(normalize_date(" Jan 15 "), "Jan 15");
    }

    #[test]
    fn test_reads_rows_with_messy_headers() {
        let content = "\
Date ,Account ,Description,Amount,Category,Tags
01/15/2025,Brokerage,AAPL Dividend,100.00, Investment Income ,div
01/16/2025,Checking,Coffee,-4.50,Restaurants,
";
        let rows = read_transactions_from(content.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, "2025-01-15");
        assert_eq!(rows[0].account, "Brokerage");
        assert_eq!(rows[0].category, "investment income");
        assert!(rows[0].is_pending());
        assert_eq!(rows[1].category, "restaurants");
        assert_eq!(rows[1].amount, "-4.50");
    }

    #[test]
    fn test_column_order_does_not_matter() {
        let content = "category,amount,description,account,date\ninterest,5,Int,Brokerage,2025-02-01\n";
        let rows = read_transactions_from(content.as_bytes()).unwrap();
        assert_eq!(rows[0].description, "Int");
        assert_eq!(rows[0].amount, "5");
        assert_eq!(rows[0].category, "interest");
    }

    #[test]
    fn test_missing_column() {
        let content = "date,account,description,amount\n2025-01-01,A,B,1\n";
        let err = read_transactions_from(content.as_bytes()).unwrap_err();
        assert!(matches!(err, InvtaxError::MissingColumn(ref c) if c == "category"));
    }

    #[test]
    fn test_blank_lines_skipped() {
        let content = "date,account,description,amount,category\n,,,,\n2025-01-01,A,B,1,interest\n";
        let rows = read_transactions_from(content.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_transactions(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, InvtaxError::InputNotFound(_)));
    }

    #[test]
    fn test_read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tx.csv");
        std::fs::write(
            &path,
            "Date,Account,Description,Amount,Category\n2025-01-01,My IRA,Fdrxx Dividend,50,Investment Income\n",
        )
        .unwrap();
        let rows = read_transactions(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].account, "My IRA");
    }
}
