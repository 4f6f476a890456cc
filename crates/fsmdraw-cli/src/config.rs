//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory).

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use fsmdraw::{FsmError, config::AppConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<ConfigError> for FsmError {
    fn from(err: ConfigError) -> Self {
        FsmError::Config(err.to_string())
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (fsmdraw/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
/// - Config values are out of range
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, FsmError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("fsmdraw/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "fsmdraw", "fsmdraw") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load and validate configuration from a TOML file
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, FsmError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    debug!(config:?; "Configuration loaded");

    Ok(config)
}

fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig =
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    let positive = |value: f64| value.is_finite() && value > 0.0;

    let canvas = config.canvas();
    if !positive(canvas.width()) || !positive(canvas.height()) {
        return Err(ConfigError::Validation(format!(
            "canvas size must be positive, got {}x{}",
            canvas.width(),
            canvas.height()
        )));
    }
    if !positive(config.raster().scale()) {
        return Err(ConfigError::Validation(format!(
            "raster scale must be positive, got {}",
            config.raster().scale()
        )));
    }
    if !positive(config.style().font_size()) {
        return Err(ConfigError::Validation(format!(
            "font size must be positive, got {}",
            config.style().font_size()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use fsmdraw::style::Style;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            [canvas]
            width = 1024
            height = 768

            [raster]
            scale = 1.5

            [style]
            palette = "style2"
            font_family = "DejaVu Serif"
            font_size = 18
            "#,
        )
        .unwrap();

        assert_eq!(config.canvas().width(), 1024.0);
        assert_eq!(config.canvas().height(), 768.0);
        assert_eq!(config.raster().scale(), 1.5);
        assert_eq!(config.style().palette(), Some(Style::Style2));
        assert_eq!(config.style().font_family(), "DejaVu Serif");
        assert_eq!(config.style().font_size(), 18.0);
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(parse_config("").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            parse_config("[canvas\nwidth = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_out_of_range_values() {
        assert!(matches!(
            parse_config("[raster]\nscale = 0"),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            parse_config("[canvas]\nwidth = -5"),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_explicit_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[raster]\nscale = 3.0\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.raster().scale(), 3.0);
    }

    #[test]
    fn test_missing_explicit_path() {
        let dir = tempdir().unwrap();
        let result = load_config(Some(dir.path().join("absent.toml")));
        assert!(matches!(result, Err(FsmError::Config(_))));
    }

    #[test]
    fn test_invalid_file_is_a_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[raster]\nscale = -1.0\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, FsmError::Config(_)));
        assert_eq!(
            err.to_string(),
            "Configuration error: Validation error: raster scale must be positive, got -1"
        );
    }
}
