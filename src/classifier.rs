use crate::catalog::RuleCatalog;
use crate::error::{InvtaxError, Result};
use crate::models::{Category, TransactionRow};

/// Outcome of testing one row against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: Option<Category>,
    pub matched_key: Option<String>,
}

/// First key in `keys` contained in `description`, case-insensitively.
fn first_match<'a>(description: &str, keys: &'a [String]) -> Option<&'a str> {
    let desc_lower = description.to_lowercase();
    keys.iter()
        .map(String::as_str)
        .find(|key| desc_lower.contains(&key.to_lowercase()))
}

/// Test a row's description against every rule set in precedence order.
///
/// A match in a second, different category is a conflict. Within a set only
/// the first matching key counts.
pub fn classify(row: &TransactionRow, catalog: &RuleCatalog) -> Result<Classification> {
    let mut assigned: Option<(Category, &str)> = None;

    for (category, keys) in catalog.rule_sets() {
        let Some(key) = first_match(&row.description, keys) else {
            continue;
        };
        match assigned {
            Some((first, _)) if first != category => {
                return Err(InvtaxError::ClassificationConflict {
                    date: row.date.clone(),
                    account: row.account.clone(),
                    amount: row.amount.clone(),
                    description: row.description.clone(),
                    first,
                    second: category,
                });
            }
            Some(_) => {}
            None => assigned = Some((category, key)),
        }
    }

    Ok(Classification {
        category: assigned.map(|(c, _)| c),
        matched_key: assigned.map(|(_, k)| k.to_string()),
    })
}

pub struct ClassifyResult {
    pub rows: Vec<TransactionRow>,
    pub classified: usize,
    pub unmatched: usize,
}

/// Classify every pending row, returning new row values. Rows that are not
/// pending pass through unchanged. The first conflict aborts the run.
pub fn classify_rows(rows: Vec<TransactionRow>, catalog: &RuleCatalog) -> Result<ClassifyResult> {
    let mut classified = 0usize;
    let mut unmatched = 0usize;
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        if !row.is_pending() {
            out.push(row);
            continue;
        }
        let result = classify(&row, catalog)?;
        match result.category {
            Some(category) => {
                tracing::info!(
                    date = %row.date,
                    account = %row.account,
                    amount = %row.amount,
                    description = %row.description,
                    %category,
                    key = result.matched_key.as_deref().unwrap_or_default(),
                    "classified investment income"
                );
                classified += 1;
                out.push(row.with_category(category));
            }
            None => {
                tracing::warn!(
                    date = %row.date,
                    account = %row.account,
                    amount = %row.amount,
                    description = %row.description,
                    "investment income does not match any catalog key"
                );
                unmatched += 1;
                out.push(row);
            }
        }
    }

    Ok(ClassifyResult {
        rows: out,
        classified,
        unmatched,
    })
}

/// Fail on the first row still waiting for classification.
pub fn check_exhaustive(rows: &[TransactionRow]) -> Result<()> {
    match rows.iter().find(|r| r.is_pending()) {
        Some(row) => Err(InvtaxError::UnclassifiedIncome {
            category: row.category.clone(),
            description: row.description.clone(),
        }),
        None => Ok(()),
    }
}
