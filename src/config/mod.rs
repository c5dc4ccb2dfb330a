mod schema;

pub use schema::{Config, ThemeMode, DEFAULT_SOURCE};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Header rows beyond this are almost certainly a typo
const MAX_HEADER_ROW: usize = 1000;

const SUPPORTED_EXTENSIONS: [&str; 6] = ["xlsx", "xlsm", "xlsb", "xls", "ods", "csv"];

/// Get the config directory path (~/.config/decision-matrix/)
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("decision-matrix"))
}

/// Get the default config file path (~/.config/decision-matrix/config.yaml)
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.yaml"))
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional explicit path. If None, the default path is tried and a
///   missing default file yields the built-in defaults.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed or contains unknown keys
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                anyhow::bail!("Config file not found at {}", p.display());
            }
            p
        }
        None => match get_config_path() {
            Some(p) if p.exists() => p,
            _ => return Ok(Config::default()),
        },
    };

    read_config(&config_path)
}

fn read_config(path: &Path) -> Result<Config> {
    let config_content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", path.display()))?;

    Ok(config)
}

/// Validate the effective configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(row) = config.header_row {
        if row > MAX_HEADER_ROW {
            errors.push(format!(
                "header_row: {} is larger than the maximum of {}",
                row, MAX_HEADER_ROW
            ));
        }
    }

    let source = config.source();
    let extension = source
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension {
        Some(ext) if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) => {}
        _ => errors.push(format!(
            "source: '{}' is not a supported format ({})",
            source.display(),
            SUPPORTED_EXTENSIONS.join(", ")
        )),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_missing_config_fails() {
        let err = load_config(Some(PathBuf::from("/nonexistent/config.yaml")))
            .unwrap_err()
            .to_string();
        assert!(err.contains("Config file not found"));
    }

    #[test]
    fn test_load_explicit_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "header_row: 3\nmissing_values: zero\n").unwrap();

        let config = load_config(Some(path)).unwrap();
        assert_eq!(config.header_row(), 3);
    }

    #[test]
    fn test_invalid_yaml_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "header_row: [not a number\n").unwrap();

        let err = load_config(Some(path)).unwrap_err().to_string();
        assert!(err.contains("invalid YAML"));
    }

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let config = Config {
            source: Some(PathBuf::from("matrix.numbers")),
            header_row: Some(5000),
            missing_values: None,
            theme: None,
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("header_row"));
        assert!(errors[1].contains("source"));
    }
}
