use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::ExecutorConfig, ConfigError};

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<ExecutorConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: ExecutorConfig = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("CONVOY_"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<ExecutorConfig, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
concurrency = 25
submit_delay_ms = 250
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.concurrency, 25);
        assert_eq!(config.submit_delay_ms, 250);
    }

    #[test]
    fn test_load_config_from_str_defaults_apply() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.concurrency, 100);
        assert_eq!(config.io_concurrency, 4);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
concurrency = 12
io_concurrency = 2
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.concurrency, 12);
        assert_eq!(config.io_concurrency, 2);
    }

    #[test]
    fn test_load_config_rejects_bad_types() {
        let result = load_config_from_str("concurrency = \"lots\"");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
