//! Site configuration module.
//!
//! Handles loading, validating, and merging the `config.toml` at the site
//! root. Stock defaults are the base layer; the user file only needs the keys
//! it wants to override.
//!
//! ## Config File Location
//!
//! ```text
//! site/
//! ├── config.toml              # Site config (optional)
//! ├── codelabs/                # One directory per exported codelab
//! │   └── intro-web/
//! │       └── codelab.json
//! └── views/                   # One directory per index view
//!     ├── default/
//!     │   └── view.json
//!     └── kiosk/
//!         └── view.json
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! codelabs_dir = "codelabs"        # Exported codelabs, relative to the site root
//! views_dir = "views"              # View definitions, relative to the site root
//! default_category = "Default"     # Category for codelabs without one
//! base_url = "https://example.com" # Canonical site URL, no trailing slash
//!
//! [index]
//! default_sort = "alpha"           # alpha | duration | recent
//!
//! [processing]
//! max_processes = 4                # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::sort::Order;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Directory holding `*/codelab.json`, relative to the site root.
    pub codelabs_dir: String,
    /// Directory holding `*/view.json`, relative to the site root.
    pub views_dir: String,
    /// Main category for codelabs that declare none.
    pub default_category: String,
    /// Canonical base URL, protocol included, no trailing slash.
    pub base_url: String,
    /// Index page behaviour.
    pub index: IndexConfig,
    /// Parallel metadata parsing.
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            codelabs_dir: "codelabs".to_string(),
            views_dir: "views".to_string(),
            default_category: "Default".to_string(),
            base_url: "https://example.com".to_string(),
            index: IndexConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Validation(
                "base_url must start with http:// or https://".into(),
            ));
        }
        if self.base_url.ends_with('/') {
            return Err(ConfigError::Validation(
                "base_url must not end with a slash".into(),
            ));
        }
        if self.default_category.trim().is_empty() {
            return Err(ConfigError::Validation(
                "default_category must not be empty".into(),
            ));
        }
        if self.codelabs_dir.trim().is_empty() || self.views_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "codelabs_dir and views_dir must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Index page settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    /// Order used when a page URL carries no `sort` param.
    pub default_sort: Order,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel metadata parsing workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SiteConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given site root.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Codelab Index Configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# Directory with one sub-directory per exported codelab, each holding a
# codelab.json. Relative to the site root.
codelabs_dir = "codelabs"

# Directory with one sub-directory per index view, each holding a view.json.
views_dir = "views"

# Main category for codelabs that declare no category.
default_category = "Default"

# Canonical URL the site is served from: protocol included, no trailing slash.
base_url = "https://example.com"

# ---------------------------------------------------------------------------
# Index page
# ---------------------------------------------------------------------------
[index]
# Order used when the page URL has no sort param: alpha, duration or recent.
default_sort = "alphabetical"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for parsing codelab metadata.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = SiteConfig::default();
        assert_eq!(config.codelabs_dir, "codelabs");
        assert_eq!(config.views_dir, "views");
        assert_eq!(config.default_category, "Default");
        assert_eq!(config.base_url, "https://example.com");
        assert_eq!(config.index.default_sort, Order::Alphabetical);
    }

    #[test]
    fn parse_partial_config() {
        let config: SiteConfig = toml::from_str(
            r#"
[index]
default_sort = "recent"
"#,
        )
        .unwrap();
        assert_eq!(config.index.default_sort, Order::Recent);
        assert_eq!(config.codelabs_dir, "codelabs");
    }

    #[test]
    fn default_sort_accepts_alpha_alias() {
        let config: SiteConfig = toml::from_str("[index]\ndefault_sort = \"alpha\"\n").unwrap();
        assert_eq!(config.index.default_sort, Order::Alphabetical);
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.default_category, "Default");
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
codelabs_dir = "exported"
base_url = "https://codelabs.example.org"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.codelabs_dir, "exported");
        assert_eq!(config.base_url, "https://codelabs.example.org");
        assert_eq!(config.views_dir, "views");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not toml [[[").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "codelab_dir = \"typo\"\n").unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn unknown_sort_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[index]\ndefault_sort = \"random\"\n");
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_base_url_protocol() {
        let mut config = SiteConfig::default();
        config.base_url = "example.com".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn validate_base_url_trailing_slash() {
        let mut config = SiteConfig::default();
        config.base_url = "https://example.com/".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_default_category_blank() {
        let mut config = SiteConfig::default();
        config.default_category = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "base_url = \"ftp://x\"\n").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"views_dir = "views""#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"views_dir = "pages""#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("views_dir").unwrap().as_str(), Some("pages"));
    }

    #[test]
    fn merge_toml_preserves_base_keys() {
        let base: toml::Value = toml::from_str(
            r#"
codelabs_dir = "codelabs"
[index]
default_sort = "duration"
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(r#"codelabs_dir = "out""#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("codelabs_dir").unwrap().as_str(), Some("out"));
        assert_eq!(
            merged
                .get("index")
                .and_then(|i| i.get("default_sort"))
                .and_then(|v| v.as_str()),
            Some("duration")
        );
    }

    // =========================================================================
    // Processing config tests
    // =========================================================================

    #[test]
    fn effective_threads_auto() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&ProcessingConfig::default()), cores);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn effective_threads_never_zero() {
        let config = ProcessingConfig {
            max_processes: Some(0),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    // =========================================================================
    // stock config tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.codelabs_dir, defaults.codelabs_dir);
        assert_eq!(config.views_dir, defaults.views_dir);
        assert_eq!(config.default_category, defaults.default_category);
        assert_eq!(config.base_url, defaults.base_url);
        assert_eq!(config.index.default_sort, defaults.index.default_sort);
        assert_eq!(config.processing.max_processes, None);
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value().unwrap();
        assert!(val.is_table());
        assert!(val.get("index").is_some());
        assert!(val.get("processing").is_some());
    }
}
