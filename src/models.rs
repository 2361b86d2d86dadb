use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Category label carried by rows that still need classification.
pub const INVESTMENT_INCOME: &str = "investment income";

/// Tax category assigned to an investment income row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Interest,
    UnqualifiedDiv,
    QualifiedDiv,
}

impl Category {
    /// Order in which rule sets are tested.
    pub const PRECEDENCE: [Category; 3] = [
        Category::Interest,
        Category::UnqualifiedDiv,
        Category::QualifiedDiv,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Interest => "interest",
            Self::UnqualifiedDiv => "unqualified_div",
            Self::QualifiedDiv => "qualified_div",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::PRECEDENCE
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRow {
    pub date: String,
    pub account: String,
    pub description: String,
    /// Raw amount text; only parsed once the row reaches aggregation.
    pub amount: String,
    pub category: String,
}

impl TransactionRow {
    pub fn is_pending(&self) -> bool {
        self.category.trim().eq_ignore_ascii_case(INVESTMENT_INCOME)
    }

    pub fn category(&self) -> Option<Category> {
        Category::from_label(&self.category)
    }

    pub fn with_category(&self, category: Category) -> Self {
        Self {
            category: category.label().to_string(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSummary {
    pub account: String,
    pub qualified_div: Decimal,
    pub unqualified_div: Decimal,
    pub interest: Decimal,
    pub taxable: Decimal,
}

impl AccountSummary {
    pub fn new(account: &str) -> Self {
        Self {
            account: account.to_string(),
            qualified_div: Decimal::ZERO,
            unqualified_div: Decimal::ZERO,
            interest: Decimal::ZERO,
            taxable: Decimal::ZERO,
        }
    }

    /// Add to the category total. `None` if the sum no longer fits a `Decimal`.
    pub fn add(&mut self, category: Category, amount: Decimal) -> Option<()> {
        let total = match category {
            Category::Interest => &mut self.interest,
            Category::UnqualifiedDiv => &mut self.unqualified_div,
            Category::QualifiedDiv => &mut self.qualified_div,
        };
        *total = total.checked_add(amount)?;
        Some(())
    }
}
