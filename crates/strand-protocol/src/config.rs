use std::path::Path;

use serde::{Deserialize, Serialize};
use strand_types::{TypeError, TypeTag, DEFAULT_DISCRIMINATOR};
use strand_wire::DEFAULT_MAX_DEPTH;

use crate::error::ConfigError;

/// Settings shared by the read and write sessions of one deployment.
///
/// Loaded from TOML; every key is optional:
///
/// ```toml
/// discriminator = "type"
/// drop_nulls = false
/// max_depth = 128
/// collect_references = false
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Member name carrying the variant of polymorphic objects.
    pub discriminator: String,
    /// Advises schema walkers to omit null-valued members when writing.
    pub drop_nulls: bool,
    /// Deepest structure nesting accepted on read.
    pub max_depth: usize,
    /// Accumulate every reference decoded by a read session.
    pub collect_references: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            discriminator: DEFAULT_DISCRIMINATOR.into(),
            drop_nulls: false,
            max_depth: DEFAULT_MAX_DEPTH,
            collect_references: false,
        }
    }
}

impl SessionConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.discriminator.is_empty() {
            return Err(ConfigError::Invalid("discriminator must not be empty".into()));
        }
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth must be at least 1".into()));
        }
        Ok(())
    }

    /// A discriminator descriptor using this configuration's member name.
    pub fn type_tag<I, S>(&self, variants: I) -> Result<TypeTag, TypeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TypeTag::new(self.discriminator.clone(), variants)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn default_config() {
        let c = SessionConfig::default();
        assert_eq!(c.discriminator, "type");
        assert!(!c.drop_nulls);
        assert_eq!(c.max_depth, 128);
        assert!(!c.collect_references);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = SessionConfig::from_toml_str("drop_nulls = true\n").unwrap();
        assert!(c.drop_nulls);
        assert_eq!(c.discriminator, "type");
    }

    #[test]
    fn full_toml() {
        let toml = r#"
            discriminator = "@kind"
            drop_nulls = true
            max_depth = 16
            collect_references = true
        "#;
        let c = SessionConfig::from_toml_str(toml).unwrap();
        assert_eq!(c.discriminator, "@kind");
        assert_eq!(c.max_depth, 16);
        assert!(c.collect_references);
        assert_eq!(c.type_tag(["A"]).unwrap().field(), "@kind");
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(matches!(
            SessionConfig::from_toml_str("dorp_nulls = true"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            SessionConfig::from_toml_str("max_depth = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SessionConfig::from_toml_str("discriminator = \"\""),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_depth = 8").unwrap();
        let c = SessionConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(c.max_depth, 8);
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = SessionConfig::from_toml_file(&path).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }
}
