//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::MixConfig;
use hardmix_arch::HardBlockType;
use std::path::Path;

/// Name of the configuration file inside a project directory.
pub const CONFIG_FILE_NAME: &str = "hardmix.toml";

/// Loads and validates `hardmix.toml` from a project directory.
pub fn load_config(project_dir: &Path) -> Result<MixConfig, ConfigError> {
    let content = std::fs::read_to_string(project_dir.join(CONFIG_FILE_NAME))?;
    load_config_from_str(&content)
}

/// Parses and validates a `hardmix.toml` document from a string.
pub fn load_config_from_str(content: &str) -> Result<MixConfig, ConfigError> {
    let config: MixConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Rejects empty tags and two kinds sharing one tag.
fn validate_config(config: &MixConfig) -> Result<(), ConfigError> {
    for kind in HardBlockType::ALL {
        if config.mix.tags.get(kind).is_some_and(|tag| tag.trim().is_empty()) {
            return Err(ConfigError::ValidationError(format!("empty {kind} tag")));
        }
    }

    // Reverse lookup finds the first kind with a tag, so a later kind
    // sharing it maps back to someone else.
    let catalog = config.mix.tag_catalog();
    for kind in HardBlockType::ALL {
        let tag = catalog.tag(kind);
        if let Some(owner) = catalog.kind_of(tag).filter(|owner| *owner != kind) {
            return Err(ConfigError::ValidationError(format!(
                "{owner} and {kind} share the tag `{tag}`"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_minimal_config() {
        let config = load_config_from_str("[mix]\noptimizations = 3\n").unwrap();
        assert_eq!(config.mix.optimizations, 3);
        assert!(config.mix.tags.multiplier.is_none());
    }

    #[test]
    fn parse_with_tags() {
        let toml = r#"
[mix]
optimizations = 1

[mix.tags]
multiplier = "mult_27"
adder = "fa_chain"
"#;
        let config = load_config_from_str(toml).unwrap();
        let catalog = config.mix.tag_catalog();
        assert_eq!(catalog.tag(HardBlockType::Multiplier), "mult_27");
        assert_eq!(catalog.tag(HardBlockType::Adder), "fa_chain");
    }

    #[test]
    fn empty_document_is_default() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.mix.optimizations, 0);
    }

    #[test]
    fn negative_setting_is_parse_error() {
        let err = load_config_from_str("[mix]\noptimizations = -1\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn empty_tag_rejected() {
        let err = load_config_from_str("[mix.tags]\nadder = \"  \"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref m) if m == "empty adder tag"));
    }

    #[test]
    fn shared_tag_rejected() {
        let err = load_config_from_str("[mix.tags]\nmultiplier = \"adder\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref m) if m == "multiplier and adder share the tag `adder`"));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join(CONFIG_FILE_NAME)).unwrap();
        writeln!(file, "[mix]\noptimizations = 2").unwrap();

        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.mix.optimizations, 2);
    }

    #[test]
    fn io_error_from_nonexistent_dir() {
        let err = load_config(Path::new("/nonexistent/dir")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
