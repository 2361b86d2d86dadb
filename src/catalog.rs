use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{InvtaxError, Result};
use crate::models::Category;

/// Match keys per category. Keys are matched as case-insensitive substrings
/// of the transaction description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleCatalog {
    #[serde(default)]
    pub interest: Vec<String>,
    #[serde(default)]
    pub unqualified_div: Vec<String>,
    #[serde(default)]
    pub qualified_div: Vec<String>,
}

fn strings(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self {
            interest: strings(&[
                "Interest",
                "Fully Paid - Interest Fully Paid",
                "Cad Credit Int",
            ]),
            unqualified_div: strings(&[
                "Fidelity Government Money Market",
                "Fdrxx",
                "Allspring",
                "Ishares 0-3 Month Treasury Bond Etf",
                "3 Mnth Treasury Bnd Etf",
                "3 Mnth Treasry",
                "Sgov",
                "Wisdomtree Japan Hedged",
                "Dxj",
            ]),
            qualified_div: strings(&[
                "AAPL",
                "Apple Inc",
                "MSFT",
                "Microsoft Corp",
                "Eaton",
                "Nvidia",
                "SPY",
                "Dividend Reinvestment \u{2013} Long-term Growth",
                "Q4 2024 Dividends",
                "2025 Dividends",
                "Nav Distribution",
                "S&p 500 Etf",
                "Splg",
                "Qqq",
                "Select Sector Spdr Trust Technology",
                "Invesco Nasdaq 100 Etf",
                "Xlk",
                "Googl",
                // Long-term cap gain distribution, taxed like a qualified dividend
                "Baron Partners Fund - Long-term Cap Gain",
            ]),
        }
    }
}

impl RuleCatalog {
    pub fn keys(&self, category: Category) -> &[String] {
        match category {
            Category::Interest => &self.interest,
            Category::UnqualifiedDiv => &self.unqualified_div,
            Category::QualifiedDiv => &self.qualified_div,
        }
    }

    fn keys_mut(&mut self, category: Category) -> &mut Vec<String> {
        match category {
            Category::Interest => &mut self.interest,
            Category::UnqualifiedDiv => &mut self.unqualified_div,
            Category::QualifiedDiv => &mut self.qualified_div,
        }
    }

    /// Rule sets in the order they are tested.
    pub fn rule_sets(&self) -> impl Iterator<Item = (Category, &[String])> + '_ {
        Category::PRECEDENCE
            .into_iter()
            .map(move |c| (c, self.keys(c)))
    }

    pub fn len(&self) -> usize {
        self.interest.len() + self.unqualified_div.len() + self.qualified_div.len()
    }

    pub fn validate(&self) -> Result<()> {
        for (category, keys) in self.rule_sets() {
            if keys.iter().any(|k| k.trim().is_empty()) {
                return Err(InvtaxError::Catalog(format!(
                    "empty match key in {category}"
                )));
            }
        }
        Ok(())
    }

    /// Keys present in more than one set. Any description containing one of
    /// these is guaranteed to conflict.
    pub fn overlaps(&self) -> Vec<(String, Category, Category)> {
        let sets: Vec<_> = self.rule_sets().collect();
        let mut out = Vec::new();
        for (i, (first, first_keys)) in sets.iter().enumerate() {
            for (second, second_keys) in &sets[i + 1..] {
                for key in first_keys.iter() {
                    if second_keys.iter().any(|k| k.eq_ignore_ascii_case(key)) {
                        out.push((key.clone(), *first, *second));
                    }
                }
            }
        }
        out
    }

    /// Returns false if the key was already present in that set.
    pub fn add_key(&mut self, category: Category, key: &str) -> Result<bool> {
        let key = key.trim();
        if key.is_empty() {
            return Err(InvtaxError::Catalog("match key cannot be empty".to_string()));
        }
        let keys = self.keys_mut(category);
        if keys.iter().any(|k| k.eq_ignore_ascii_case(key)) {
            return Ok(false);
        }
        keys.push(key.to_string());
        Ok(true)
    }

    /// Returns false if no such key existed in that set.
    pub fn remove_key(&mut self, category: Category, key: &str) -> bool {
        let key = key.trim();
        let keys = self.keys_mut(category);
        let before = keys.len();
        keys.retain(|k| !k.eq_ignore_ascii_case(key));
        keys.len() != before
    }
}

pub fn load_catalog(path: &Path) -> Result<RuleCatalog> {
    let content = std::fs::read_to_string(path)?;
    let catalog: RuleCatalog = serde_json::from_str(&content)
        .map_err(|e| InvtaxError::Catalog(format!("{}: {e}", path.display())))?;
    catalog.validate()?;
    for (key, first, second) in catalog.overlaps() {
        tracing::warn!(%key, %first, %second, "match key appears in two rule sets");
    }
    Ok(catalog)
}

pub fn save_catalog(catalog: &RuleCatalog, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(catalog)?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_sets_follow_precedence() {
        let catalog = RuleCatalog::default();
        let order: Vec<Category> = catalog.rule_sets().map(|(c, _)| c).collect();
        assert_eq!(
            order,
            vec![Category::Interest, Category::UnqualifiedDiv, Category::QualifiedDiv]
        );
    }

    #[test]
    fn test_default_catalog_is_valid_and_disjoint() {
        let catalog = RuleCatalog::default();
        assert!(catalog.validate().is_ok());
        assert!(catalog.overlaps().is_empty());
        assert_eq!(catalog.len(), 31);
    }

    #[test]
    fn test_empty_key_rejected() {
        let mut catalog = RuleCatalog::default();
        catalog.qualified_div.push("  ".to_string());
        assert!(matches!(catalog.validate(), Err(InvtaxError::Catalog(_))));
    }

    #[test]
    fn test_overlaps_reported() {
        let mut catalog = RuleCatalog::default();
        catalog.qualified_div.push("sgov".to_string());
        let overlaps = catalog.overlaps();
        assert_eq!(overlaps.len(), 1);
        assert_eq!(overlaps[0].1, Category::UnqualifiedDiv);
        assert_eq!(overlaps[0].2, Category::QualifiedDiv);
    }

    #[test]
    fn test_add_and_remove_key() {
        let mut catalog = RuleCatalog::default();
        assert!(catalog.add_key(Category::QualifiedDiv, "Vti").unwrap());
        assert!(!catalog.add_key(Category::QualifiedDiv, "VTI").unwrap());
        assert!(catalog.add_key(Category::Interest, "").is_err());
        assert!(catalog.remove_key(Category::QualifiedDiv, "vti"));
        assert!(!catalog.remove_key(Category::QualifiedDiv, "vti"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("catalog.json");
        let catalog = RuleCatalog::default();
        save_catalog(&catalog, &path).unwrap();
        let loaded = load_catalog(&path).unwrap();
        assert_eq!(loaded, catalog);
    }

    #[test]
    fn test_load_fills_missing_sets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, r#"{"interest": ["Int Paid"]}"#).unwrap();
        let loaded = load_catalog(&path).unwrap();
        assert_eq!(loaded.interest, vec!["Int Paid".to_string()]);
        assert!(loaded.qualified_div.is_empty());
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_catalog(&path), Err(InvtaxError::Catalog(_))));
    }
}
