//! Option file loading and validation.

use crate::error::ConfigError;
use crate::types::{DetectorOptions, InplaceConfig};
use std::path::Path;

/// Name of the option file looked up in a project directory.
pub const CONFIG_FILE: &str = "inplace.toml";

/// Loads and validates detector options from a project directory.
///
/// Reads `<project_dir>/inplace.toml` and returns its `[detector]` table.
pub fn load_options(project_dir: &Path) -> Result<DetectorOptions, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    let content = std::fs::read_to_string(&config_path)?;
    load_options_from_str(&content)
}

/// Parses and validates detector options from a TOML string.
pub fn load_options_from_str(content: &str) -> Result<DetectorOptions, ConfigError> {
    let config: InplaceConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    let options = config.detector.normalized();
    validate_options(&options)?;
    Ok(options)
}

fn validate_options(options: &DetectorOptions) -> Result<(), ConfigError> {
    if let Some(base) = &options.base_path {
        if base.to_string_lossy().contains('\0') {
            return Err(ConfigError::ValidationError(
                "base_path contains a NUL byte".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Strategy;
    use std::path::PathBuf;

    #[test]
    fn empty_file_gives_defaults() {
        let opts = load_options_from_str("").unwrap();
        assert_eq!(opts, DetectorOptions::default());
    }

    #[test]
    fn parse_full_options() {
        let toml = r#"
[detector]
strategy = "modification-time"
first_pass = true
base_path = "/home/me/project"
"#;
        let opts = load_options_from_str(toml).unwrap();
        assert_eq!(opts.strategy, Strategy::ModificationTime);
        assert!(opts.first_pass);
        assert_eq!(opts.base_path, Some(PathBuf::from("/home/me/project")));
    }

    #[test]
    fn camel_case_aliases() {
        let toml = r#"
[detector]
howToDetermineDifference = "modification-time"
firstPass = true
basePath = "src"
"#;
        let opts = load_options_from_str(toml).unwrap();
        assert_eq!(opts.strategy, Strategy::ModificationTime);
        assert!(opts.first_pass);
        assert_eq!(opts.base_path, Some(PathBuf::from("src")));
    }

    #[test]
    fn unknown_strategy_falls_back_to_hash() {
        let opts = load_options_from_str("[detector]\nstrategy = \"crc32\"\n").unwrap();
        assert_eq!(opts.strategy, Strategy::Hash);
    }

    #[test]
    fn empty_base_path_is_dropped() {
        let opts = load_options_from_str("[detector]\nbase_path = \"\"\n").unwrap();
        assert!(opts.base_path.is_none());
    }

    #[test]
    fn nul_in_base_path_rejected() {
        let opts = DetectorOptions::new(Strategy::Hash).with_base_path("a\0b");
        let result = validate_options(&opts);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let result = load_options_from_str("[detector\nstrategy = ");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn first_pass_must_be_bool() {
        let result = load_options_from_str("[detector]\nfirst_pass = \"yes\"\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[detector]\nfirst_pass = true\n",
        )
        .unwrap();
        let opts = load_options(dir.path()).unwrap();
        assert!(opts.first_pass);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_options(dir.path());
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }
}
