//! Backend configuration
//!
//! `BackendOptions` carries the values the CLI backend writes into the image
//! that are not dictated by the input program: which runtime library the
//! entry point binds to, the metadata version string, and an optional fixed
//! module GUID for reproducible output. Options come from defaults, an
//! optional TOML file, and then environment variable overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendOptions {
    /// Assembly that provides `System.Console`
    pub runtime_library: String,
    /// Version of the runtime library as major, minor, build, revision
    pub runtime_library_version: [u16; 4],
    /// Public key token of the runtime library
    pub runtime_public_key_token: [u8; 8],
    /// Version string written into the metadata root
    pub metadata_version: String,
    /// Module version id; a fresh one is generated per image when unset
    pub module_guid: Option<Uuid>,
    /// Suffix appended to the module name to form the output file name
    pub output_suffix: String,
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self {
            runtime_library: "mscorlib".to_string(),
            runtime_library_version: [2, 0, 0, 0],
            runtime_public_key_token: [0xb7, 0x7a, 0x5c, 0x56, 0x19, 0x34, 0xe0, 0x89],
            metadata_version: "v2.0.50727".to_string(),
            module_guid: None,
            output_suffix: ".exe".to_string(),
        }
    }
}

impl BackendOptions {
    /// Parse options from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let options: Self = toml::from_str(text).context("Failed to parse backend options")?;
        Ok(options)
    }

    /// Load options from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read backend options {}", path.display()))?;
        Self::from_toml_str(&text)
    }

    /// Apply environment variable overrides (see [`crate::env::names`]).
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Some(guid) = crate::env::get_module_guid() {
            let parsed = Uuid::parse_str(guid.trim()).with_context(|| {
                format!(
                    "{} is not a valid GUID: {}",
                    crate::env::names::MODULE_GUID,
                    guid
                )
            })?;
            self.module_guid = Some(parsed);
        }
        if let Some(version) = crate::env::get_metadata_version() {
            self.metadata_version = version;
        }
        Ok(self)
    }

    /// The module GUID for one image.
    pub fn module_guid(&self) -> Uuid {
        self.module_guid.unwrap_or_else(Uuid::new_v4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_the_v2_runtime() {
        let options = BackendOptions::default();
        assert_eq!(options.runtime_library, "mscorlib");
        assert_eq!(options.runtime_library_version, [2, 0, 0, 0]);
        assert_eq!(options.metadata_version, "v2.0.50727");
        assert_eq!(options.output_suffix, ".exe");
        assert!(options.module_guid.is_none());
    }

    #[test]
    fn toml_overrides_only_given_keys() -> Result<()> {
        let options = BackendOptions::from_toml_str(
            r#"
            metadata_version = "v4.0.30319"
            module_guid = "2c1b0d3a-8f6e-4b8e-9a43-0f8a7c4d2e11"
            "#,
        )?;
        assert_eq!(options.metadata_version, "v4.0.30319");
        assert_eq!(
            options.module_guid,
            Some(Uuid::parse_str("2c1b0d3a-8f6e-4b8e-9a43-0f8a7c4d2e11")?)
        );
        assert_eq!(options.runtime_library, "mscorlib");
        Ok(())
    }

    #[test]
    fn fixed_guid_is_reused() -> Result<()> {
        let guid = Uuid::parse_str("00112233-4455-6677-8899-aabbccddeeff")?;
        let options = BackendOptions {
            module_guid: Some(guid),
            ..BackendOptions::default()
        };
        assert_eq!(options.module_guid(), guid);
        assert_eq!(options.module_guid(), guid);
        Ok(())
    }

    #[test]
    fn malformed_toml_is_rejected() {
        assert!(BackendOptions::from_toml_str("metadata_version = ").is_err());
    }
}
