//! Runtime configuration.
//!
//! The only setting is where the schema file lives. It comes from the
//! `MXTOOL_XSD` environment variable, or from an explicit path (the CLI's
//! `--schema` flag), with the explicit path taking precedence.

use crate::error::{MxError, Result};
use crate::schema::Schema;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming the schema file.
pub const SCHEMA_ENV_VAR: &str = "MXTOOL_XSD";

/// Configuration for reading collections.
///
/// # Examples
///
/// ```ignore
/// use mxtool::MxConfig;
///
/// let config = MxConfig::from_env().with_schema_path("MARC21slim.xsd");
/// let schema = config.load_schema()?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MxConfig {
    /// Path of the `.xsd` file to validate input against
    pub schema_path: Option<PathBuf>,
}

impl MxConfig {
    /// Configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        let schema_path = std::env::var_os(SCHEMA_ENV_VAR)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        MxConfig { schema_path }
    }

    /// Use `path` as the schema file.
    #[must_use]
    pub fn with_schema_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_path = Some(path.into());
        self
    }

    /// The configured schema path, if any.
    #[must_use]
    pub fn schema_path(&self) -> Option<&Path> {
        self.schema_path.as_deref()
    }

    /// Load the configured schema.
    ///
    /// # Errors
    ///
    /// Returns [`MxError::SchemaLoad`] if no path is configured or the file
    /// cannot be loaded.
    pub fn load_schema(&self) -> Result<Schema> {
        let path = self.schema_path().ok_or_else(|| {
            MxError::SchemaLoad(format!(
                "no schema configured; set {SCHEMA_ENV_VAR} or pass --schema"
            ))
        })?;
        debug!(path = %path.display(), "loading schema");
        Schema::from_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const XSD: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
        targetNamespace="http://www.loc.gov/MARC21/slim">
      <xs:element name="collection"/>
      <xs:element name="record"/>
    </xs:schema>"#;

    #[test]
    fn test_default_has_no_schema() {
        let config = MxConfig::default();
        assert!(config.schema_path().is_none());
        assert!(matches!(config.load_schema(), Err(MxError::SchemaLoad(_))));
    }

    #[test]
    fn test_load_schema_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(XSD.as_bytes()).unwrap();

        let config = MxConfig::default().with_schema_path(file.path());
        let schema = config.load_schema().unwrap();
        assert_eq!(
            schema.target_namespace(),
            Some("http://www.loc.gov/MARC21/slim")
        );
    }

    #[test]
    fn test_missing_file_is_schema_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = MxConfig::default().with_schema_path(dir.path().join("absent.xsd"));
        assert!(matches!(config.load_schema(), Err(MxError::SchemaLoad(_))));
    }
}
