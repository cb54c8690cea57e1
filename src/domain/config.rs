use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{ComplexityLevel, ContentId};

/// Configuration for a content library.
///
/// This struct holds settings that control how a content directory is loaded
/// and which integrity rules validation enforces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Levels every level-organized record must provide.
    ///
    /// Missing levels in this list are errors. Other levels are optional.
    /// Defaults to all five levels.
    required_levels: Vec<ComplexityLevel>,

    /// Whether to allow the content directory to contain YAML files that
    /// cannot be parsed as records.
    pub allow_unrecognised: bool,

    /// Whether a missing localized name is an error rather than a warning.
    pub require_localized_name: bool,

    /// Cross-reference targets that intentionally live outside this library.
    external_ids: Vec<String>,

    /// Id prefixes of cross-reference targets that intentionally live outside
    /// this library (for example `condition-`).
    external_prefixes: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            required_levels: default_required_levels(),
            allow_unrecognised: false,
            require_localized_name: false,
            external_ids: Vec::new(),
            external_prefixes: Vec::new(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the levels every level-organized record must provide.
    #[must_use]
    pub fn required_levels(&self) -> &[ComplexityLevel] {
        &self.required_levels
    }

    /// Replaces the required levels.
    pub fn set_required_levels(&mut self, levels: Vec<ComplexityLevel>) {
        self.required_levels = levels;
    }

    /// Returns the ids documented as external.
    #[must_use]
    pub fn external_ids(&self) -> &[String] {
        &self.external_ids
    }

    /// Returns the id prefixes documented as external.
    #[must_use]
    pub fn external_prefixes(&self) -> &[String] {
        &self.external_prefixes
    }

    /// Documents an id as intentionally external.
    ///
    /// Returns `true` if the id was added, `false` if it was already listed.
    pub fn add_external_id(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.external_ids.contains(&id) {
            false
        } else {
            self.external_ids.push(id);
            true
        }
    }

    /// Documents an id prefix as intentionally external.
    ///
    /// Returns `true` if the prefix was added, `false` if it was already
    /// listed.
    pub fn add_external_prefix(&mut self, prefix: impl Into<String>) -> bool {
        let prefix = prefix.into();
        if self.external_prefixes.contains(&prefix) {
            false
        } else {
            self.external_prefixes.push(prefix);
            true
        }
    }

    /// Checks whether a cross-reference target is documented as external.
    #[must_use]
    pub fn is_external(&self, id: &ContentId) -> bool {
        self.external_ids.iter().any(|external| external == id.as_str())
            || self
                .external_prefixes
                .iter()
                .any(|prefix| id.as_str().starts_with(prefix.as_str()))
    }
}

fn default_required_levels() -> Vec<ComplexityLevel> {
    ComplexityLevel::ALL.to_vec()
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_required_levels")]
        required_levels: Vec<ComplexityLevel>,

        #[serde(default)]
        allow_unrecognised: bool,

        #[serde(default)]
        require_localized_name: bool,

        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        external_ids: Vec<String>,

        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        external_prefixes: Vec<String>,
    },
}

impl From<Versions> for super::Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                required_levels,
                allow_unrecognised,
                require_localized_name,
                external_ids,
                external_prefixes,
            } => Self {
                required_levels,
                allow_unrecognised,
                require_localized_name,
                external_ids,
                external_prefixes,
            },
        }
    }
}

impl From<super::Config> for Versions {
    fn from(config: super::Config) -> Self {
        Self::V1 {
            required_levels: config.required_levels,
            allow_unrecognised: config.allow_unrecognised,
            require_localized_name: config.require_localized_name,
            external_ids: config.external_ids,
            external_prefixes: config.external_prefixes,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\nrequired_levels = [\"level1\", \"level2\"]\nallow_unrecognised = true\nrequire_localized_name = true\nexternal_ids = [\"condition-osteoarthritis\"]\nexternal_prefixes = [\"anatomy-\"]\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(
            config.required_levels(),
            &[ComplexityLevel::Level1, ComplexityLevel::Level2]
        );
        assert!(config.allow_unrecognised);
        assert!(config.require_localized_name);
        assert_eq!(config.external_ids(), &["condition-osteoarthritis".to_string()]);
        assert_eq!(config.external_prefixes(), &["anatomy-".to_string()]);
    }

    #[test]
    fn numeric_levels_are_accepted() {
        let config: Config = toml::from_str("_version = \"1\"\nrequired_levels = [1, 3]\n").unwrap();
        assert_eq!(
            config.required_levels(),
            &[ComplexityLevel::Level1, ComplexityLevel::Level3]
        );
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nallow_unrecognised = \"sometimes\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn empty_file_returns_default() {
        // Tests that deserialising an empty file returns the default configuration.
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
        assert_eq!(actual.required_levels(), &ComplexityLevel::ALL);
    }

    #[test]
    fn save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");

        let mut config = Config::default();
        config.add_external_prefix("condition-");
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn external_ids_and_prefixes() {
        let mut config = Config::default();
        assert!(config.add_external_id("condition-fibromyalgia"));
        assert!(!config.add_external_id("condition-fibromyalgia"));
        assert!(config.add_external_prefix("anatomy-"));

        let listed: ContentId = "condition-fibromyalgia".parse().unwrap();
        let prefixed: ContentId = "anatomy-knee".parse().unwrap();
        let internal: ContentId = "topic-medication-ibuprofen".parse().unwrap();

        assert!(config.is_external(&listed));
        assert!(config.is_external(&prefixed));
        assert!(!config.is_external(&internal));
    }
}
