//! Settings for the overseer subsystem.
//!
//! A small, serde-backed configuration struct loadable from TOML. The
//! embedding application builds one [`Settings`] at startup and passes it
//! to [`setup_logging`](crate::logging::setup_logging) and to the layers
//! that page query results.

use serde::{Deserialize, Serialize};

use crate::error::{OverseerError, OverseerResult};

/// The default number of history rows per page.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 20;

/// Subsystem configuration.
///
/// # Examples
///
/// ```
/// use overseer_core::settings::Settings;
///
/// let settings = Settings::from_toml_str(r#"
///     debug = true
///     log_level = "debug"
///     items_per_page = 50
/// "#).unwrap();
/// assert!(settings.debug);
/// assert_eq!(settings.items_per_page, 50);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whether to run in debug mode (pretty log output, verbose spans).
    pub debug: bool,
    /// The tracing filter directive (e.g. "info", "overseer=debug").
    pub log_level: String,
    /// Page size used when a caller does not supply one.
    pub items_per_page: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            log_level: "info".to_string(),
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
        }
    }
}

impl Settings {
    /// Parses settings from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> OverseerResult<Self> {
        toml::from_str(toml_str)
            .map_err(|e| OverseerError::Configuration(format!("invalid settings TOML: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();
        assert!(!settings.debug);
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.items_per_page, DEFAULT_ITEMS_PER_PAGE);
    }

    #[test]
    fn test_from_toml_str() {
        let settings = Settings::from_toml_str("debug = true\nlog_level = \"warn\"").unwrap();
        assert!(settings.debug);
        assert_eq!(settings.log_level, "warn");
        // Unspecified keys fall back to defaults
        assert_eq!(settings.items_per_page, 20);
    }

    #[test]
    fn test_from_toml_str_empty() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings.items_per_page, 20);
    }

    #[test]
    fn test_from_toml_str_invalid() {
        let result = Settings::from_toml_str("debug = ???");
        assert!(matches!(result, Err(OverseerError::Configuration(_))));
    }

    #[test]
    fn test_settings_round_trip() {
        let settings = Settings {
            debug: true,
            log_level: "overseer=debug".to_string(),
            items_per_page: 50,
        };
        let toml_str = toml::to_string(&settings).unwrap();
        let parsed = Settings::from_toml_str(&toml_str).unwrap();
        assert_eq!(parsed.items_per_page, 50);
        assert_eq!(parsed.log_level, "overseer=debug");
    }
}
