use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::{load_catalog, RuleCatalog};
use crate::error::{InvtaxError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_results_dir")]
    pub results_dir: String,
    #[serde(default)]
    pub catalog_path: Option<String>,
}

fn default_results_dir() -> String {
    "results".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
            catalog_path: None,
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("invtax")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| InvtaxError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}

impl Settings {
    /// Where the editable catalog lives, whether or not it exists yet.
    pub fn catalog_file(&self) -> PathBuf {
        match &self.catalog_path {
            Some(p) => PathBuf::from(shellexpand_path(p)),
            None => config_dir().join("catalog.json"),
        }
    }

    pub fn results_path(&self, file_name: &str) -> PathBuf {
        PathBuf::from(shellexpand_path(&self.results_dir)).join(file_name)
    }
}

/// An explicit path must exist; otherwise the configured catalog is used if
/// present, falling back to the built-in one.
pub fn resolve_catalog(explicit: Option<&Path>, settings: &Settings) -> Result<RuleCatalog> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(InvtaxError::InputNotFound(path.display().to_string()));
        }
        return load_catalog(path);
    }
    let configured = settings.catalog_file();
    if configured.is_file() {
        load_catalog(&configured)
    } else {
        tracing::debug!(path = %configured.display(), "no catalog file, using built-in catalog");
        Ok(RuleCatalog::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::save_catalog;

    // The only test that touches HOME; everything else passes explicit paths.
    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("HOME", dir.path());

        assert_eq!(load_settings().results_dir, "results");

        let settings = Settings {
            results_dir: "/tmp/out".to_string(),
            catalog_path: Some("/tmp/catalog.json".to_string()),
        };
        save_settings(&settings).unwrap();
        let path = dir.path().join(".config").join("invtax").join("settings.json");
        assert!(path.exists());

        let loaded = load_settings();
        assert_eq!(loaded.results_dir, "/tmp/out");
        assert_eq!(loaded.catalog_path.as_deref(), Some("/tmp/catalog.json"));

        std::fs::write(&path, "{broken").unwrap();
        let fallback = load_settings();
        assert_eq!(fallback.results_dir, "results");
        assert!(fallback.catalog_path.is_none());
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let s: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(s.results_dir, "results");
        assert!(s.catalog_path.is_none());
    }

    #[test]
    fn test_results_path() {
        let s = Settings::default();
        assert_eq!(
            s.results_path("taxable_summary.csv"),
            PathBuf::from("results").join("taxable_summary.csv")
        );
    }

    #[test]
    fn test_resolve_explicit_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let mut catalog = RuleCatalog::default();
        catalog.interest.push("Bond Coupon".to_string());
        save_catalog(&catalog, &path).unwrap();

        let resolved = resolve_catalog(Some(&path), &Settings::default()).unwrap();
        assert_eq!(resolved, catalog);
    }

    #[test]
    fn test_resolve_missing_explicit_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_catalog(Some(&dir.path().join("none.json")), &Settings::default()).unwrap_err();
        assert!(matches!(err, InvtaxError::InputNotFound(_)));
    }

    #[test]
    fn test_resolve_configured_catalog_or_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let settings = Settings {
            results_dir: default_results_dir(),
            catalog_path: Some(path.to_string_lossy().to_string()),
        };
        assert_eq!(resolve_catalog(None, &settings).unwrap(), RuleCatalog::default());

        let catalog = RuleCatalog {
            interest: vec!["Int".to_string()],
            unqualified_div: vec![],
            qualified_div: vec![],
        };
        save_catalog(&catalog, &path).unwrap();
        assert_eq!(resolve_catalog(None, &settings).unwrap(), catalog);
    }
}
