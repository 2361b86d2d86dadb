use std::collections::BTreeMap;
use std::io::Write;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::catalog::RuleCatalog;
use crate::classifier::{check_exhaustive, classify_rows};
use crate::error::{InvtaxError, Result};
use crate::models::{AccountSummary, TransactionRow};

// ---------------------------------------------------------------------------
// Taxable-income rule
// ---------------------------------------------------------------------------

/// IRA and HSA income is not currently taxable. The check is a case-sensitive
/// substring match on the account name.
pub fn is_tax_advantaged(account: &str) -> bool {
    account.contains("IRA") || account.contains("HSA")
}

/// Unqualified dividends plus interest, rounded half-to-even to cents.
/// Qualified dividends never count here.
pub fn compute_taxable(summary: &AccountSummary) -> Result<Decimal> {
    if is_tax_advantaged(&summary.account) {
        return Ok(Decimal::new(0, 2));
    }
    let sum = summary
        .unqualified_div
        .checked_add(summary.interest)
        .ok_or_else(|| InvtaxError::AmountOverflow {
            account: summary.account.clone(),
            column: "taxable".to_string(),
        })?;
    Ok(cents(sum.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)))
}

// ---------------------------------------------------------------------------
// Per-account aggregation
// ---------------------------------------------------------------------------

/// Pad to at least two decimal places without rounding away precision.
fn cents(mut value: Decimal) -> Decimal {
    if value.scale() < 2 {
        value.rescale(2);
    }
    value
}

fn parse_amount(row: &TransactionRow) -> Result<Decimal> {
    let invalid = || InvtaxError::InvalidAmount {
        account: row.account.clone(),
        amount: row.amount.clone(),
    };
    let raw = row.amount.trim();
    // Decimal::from_str takes "1_000" as a digit separator
    if raw.contains('_') {
        return Err(invalid());
    }
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| invalid())
}

/// Sum classified rows into one summary per account, ordered by account name.
/// Rows outside the three tax categories are ignored.
pub fn summarize_by_account(rows: &[TransactionRow]) -> Result<Vec<AccountSummary>> {
    let mut by_account: BTreeMap<&str, AccountSummary> = BTreeMap::new();

    for row in rows {
        let Some(category) = row.category() else {
            continue;
        };
        let amount = parse_amount(row)?;
        by_account
            .entry(row.account.as_str())
            .or_insert_with(|| AccountSummary::new(&row.account))
            .add(category, amount)
            .ok_or_else(|| InvtaxError::AmountOverflow {
                account: row.account.clone(),
                column: category.label().to_string(),
            })?;
    }

    by_account
        .into_values()
        .map(|mut summary| {
            summary.taxable = compute_taxable(&summary)?;
            summary.qualified_div = cents(summary.qualified_div);
            summary.unqualified_div = cents(summary.unqualified_div);
            summary.interest = cents(summary.interest);
            Ok(summary)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Taxable summary
// ---------------------------------------------------------------------------

pub struct TaxableTotals {
    pub qualified_div: Decimal,
    pub unqualified_div: Decimal,
    pub interest: Decimal,
    pub taxable: Decimal,
}

pub struct TaxableReport {
    pub accounts: Vec<AccountSummary>,
    pub totals: TaxableTotals,
    /// Classified rows that fed the summary.
    pub rows: Vec<TransactionRow>,
    pub classified: usize,
}

fn column_total(
    accounts: &[AccountSummary],
    column: &str,
    value: impl Fn(&AccountSummary) -> Decimal,
) -> Result<Decimal> {
    accounts
        .iter()
        .try_fold(Decimal::ZERO, |acc, a| acc.checked_add(value(a)))
        .map(cents)
        .ok_or_else(|| InvtaxError::AmountOverflow {
            account: "TOTAL".to_string(),
            column: column.to_string(),
        })
}

fn totals(accounts: &[AccountSummary]) -> Result<TaxableTotals> {
    Ok(TaxableTotals {
        qualified_div: column_total(accounts, "qualified_div", |a| a.qualified_div)?,
        unqualified_div: column_total(accounts, "unqualified_div", |a| a.unqualified_div)?,
        interest: column_total(accounts, "interest", |a| a.interest)?,
        taxable: column_total(accounts, "taxable", |a| a.taxable)?,
    })
}

/// Classify, gate on exhaustiveness, then aggregate. Either every row is
/// accounted for or nothing is returned.
pub fn get_taxable_summary(rows: Vec<TransactionRow>, catalog: &RuleCatalog) -> Result<TaxableReport> {
    let result = classify_rows(rows, catalog)?;
    check_exhaustive(&result.rows)?;

    let rows: Vec<TransactionRow> = result
        .rows
        .into_iter()
        .filter(|r| r.category().is_some())
        .collect();
    let accounts = summarize_by_account(&rows)?;

    Ok(TaxableReport {
        totals: totals(&accounts)?,
        accounts,
        rows,
        classified: result.classified,
    })
}

// ---------------------------------------------------------------------------
// CSV writers
// ---------------------------------------------------------------------------

pub fn write_summary_csv(accounts: &[AccountSummary], writer: impl Write) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for summary in accounts {
        wtr.serialize(summary)?;
    }
    if accounts.is_empty() {
        wtr.write_record(["account", "qualified_div", "unqualified_div", "interest", "taxable"])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_rows_csv(rows: &[TransactionRow], writer: impl Write) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    if rows.is_empty() {
        wtr.write_record(["date", "account", "description", "amount", "category"])?;
    }
    wtr.flush()?;
    Ok(())
}
