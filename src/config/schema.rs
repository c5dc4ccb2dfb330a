use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::matrix::DEFAULT_HEADER_ROW;
use crate::scoring::MissingValuePolicy;

/// Spreadsheet read when neither the CLI nor the config names one
pub const DEFAULT_SOURCE: &str = "Clarkson-Columbia.xlsx";

/// Configuration file contents.
///
/// Every field is optional; command-line flags take precedence.
///
/// Example YAML:
/// ```yaml
/// source: ~/decisions/Clarkson-Columbia.xlsx
/// header_row: 1
/// missing_values: fail
/// theme: auto
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Path to the decision matrix (.xlsx, .xls, .ods or .csv)
    #[serde(default)]
    pub source: Option<PathBuf>,

    /// Zero-based row holding the column headers (default: 1)
    #[serde(default)]
    pub header_row: Option<usize>,

    /// Blank option values: "fail" (default) or "zero"
    #[serde(default)]
    pub missing_values: Option<MissingValuePolicy>,

    /// TUI palette: "auto" (default), "dark" or "light"
    #[serde(default)]
    pub theme: Option<ThemeMode>,
}

impl Config {
    /// Source path, with a leading `~` expanded to the home directory
    pub fn source(&self) -> PathBuf {
        let Some(source) = &self.source else {
            return PathBuf::from(DEFAULT_SOURCE);
        };
        match (source.strip_prefix("~"), dirs::home_dir()) {
            (Ok(rest), Some(home)) => home.join(rest),
            _ => source.clone(),
        }
    }

    pub fn header_row(&self) -> usize {
        self.header_row.unwrap_or(DEFAULT_HEADER_ROW)
    }

    pub fn missing_values(&self) -> MissingValuePolicy {
        self.missing_values.unwrap_or_default()
    }

    pub fn theme(&self) -> ThemeMode {
        self.theme.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Auto,
    Dark,
    Light,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_expands_home() {
        let config = Config {
            source: Some(PathBuf::from("~/decisions/Clarkson-Columbia.xlsx")),
            ..Config::default()
        };
        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                config.source(),
                home.join("decisions").join("Clarkson-Columbia.xlsx")
            );
        }

        let config = Config {
            source: Some(PathBuf::from("data/~matrix.xlsx")),
            ..Config::default()
        };
        assert_eq!(config.source(), PathBuf::from("data/~matrix.xlsx"));
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.source(), PathBuf::from("Clarkson-Columbia.xlsx"));
        assert_eq!(config.header_row(), 1);
        assert_eq!(config.missing_values(), MissingValuePolicy::Fail);
        assert_eq!(config.theme(), ThemeMode::Auto);
    }

    #[test]
    fn test_full_config_parse() {
        let yaml = r#"
source: data/matrix.csv
header_row: 0
missing_values: zero
theme: light
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.source(), PathBuf::from("data/matrix.csv"));
        assert_eq!(config.header_row(), 0);
        assert_eq!(config.missing_values(), MissingValuePolicy::Zero);
        assert_eq!(config.theme(), ThemeMode::Light);
    }

    #[test]
    fn test_empty_config_parse() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<Config, _> = serde_saphyr::from_str("weights:\n  Cost: 20\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config {
            source: Some(PathBuf::from("matrix.xlsx")),
            header_row: Some(2),
            missing_values: Some(MissingValuePolicy::Zero),
            theme: Some(ThemeMode::Dark),
        };
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: Config = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }
}
