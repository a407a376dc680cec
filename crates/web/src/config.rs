// ABOUTME: Tests configuration of a rulebook site, loaded from YAML and validated eagerly.
// ABOUTME: Exposes has_tables, some_expected_table_ids, has_table_of_contents and site URLs.

//! Tests configuration.
//!
//! Recognized keys:
//! - `has_tables` (default `true`)
//! - `some_expected_table_ids` (required sequence of strings when `has_tables`)
//! - `has_table_of_contents` (default `true`)
//! - `public_url` (optional, https)
//! - `local_url` (optional, derived from `public_url` when missing)
//!
//! Flags follow loose truthiness: `0`, `""`, `"0"` and empty collections are
//! false, a missing key or `null` keeps the default.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_yaml_ng::Value;
use tracing::debug;
use url::Url;

use crate::error::ConfigError;
use crate::links::turn_to_local_link;

pub const HAS_TABLES: &str = "has_tables";
pub const SOME_EXPECTED_TABLE_IDS: &str = "some_expected_table_ids";
pub const HAS_TABLE_OF_CONTENTS: &str = "has_table_of_contents";
pub const PUBLIC_URL: &str = "public_url";
pub const LOCAL_URL: &str = "local_url";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestsConfiguration {
    has_tables: bool,
    some_expected_table_ids: Vec<String>,
    has_table_of_contents: bool,
    public_url: Option<Url>,
    local_url: Option<Url>,
}

impl TestsConfiguration {
    /// Reads and validates a YAML configuration file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loading tests configuration");
        Self::from_yaml_str(&content)
    }

    /// Parses and validates YAML content. An empty document means all defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let values: Value = serde_yaml_ng::from_str(yaml)?;
        Self::from_values(&values)
    }

    /// Validates already loaded values.
    pub fn from_values(values: &Value) -> Result<Self, ConfigError> {
        match values {
            Value::Null | Value::Mapping(_) => {}
            other => return Err(ConfigError::NotAMapping(describe(other))),
        }

        let has_tables = flag(values, HAS_TABLES, true);
        let some_expected_table_ids = expected_table_ids(values, has_tables)?;
        let has_table_of_contents = flag(values, HAS_TABLE_OF_CONTENTS, true);
        let public_url = public_url(values)?;
        let local_url = local_url(values, public_url.as_ref())?;

        Ok(Self {
            has_tables,
            some_expected_table_ids,
            has_table_of_contents,
            public_url,
            local_url,
        })
    }

    pub fn has_tables(&self) -> bool {
        self.has_tables
    }

    /// Table ids the site is expected to contain. Always empty without tables.
    pub fn some_expected_table_ids(&self) -> &[String] {
        &self.some_expected_table_ids
    }

    pub fn has_table_of_contents(&self) -> bool {
        self.has_table_of_contents
    }

    pub fn public_url(&self) -> Option<&Url> {
        self.public_url.as_ref()
    }

    pub fn local_url(&self) -> Option<&Url> {
        self.local_url.as_ref()
    }
}

impl Default for TestsConfiguration {
    fn default() -> Self {
        Self {
            has_tables: true,
            some_expected_table_ids: Vec::new(),
            has_table_of_contents: true,
            public_url: None,
            local_url: None,
        }
    }
}

fn lookup<'v>(values: &'v Value, key: &str) -> Option<&'v Value> {
    match values.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value),
    }
}

fn flag(values: &Value, key: &str, default: bool) -> bool {
    lookup(values, key).map(truthy).unwrap_or(default)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Sequence(seq) => !seq.is_empty(),
        Value::Mapping(map) => !map.is_empty(),
        Value::Tagged(tagged) => truthy(&tagged.value),
    }
}

fn expected_table_ids(values: &Value, has_tables: bool) -> Result<Vec<String>, ConfigError> {
    if !has_tables {
        return Ok(Vec::new());
    }

    let Some(value) = lookup(values, SOME_EXPECTED_TABLE_IDS) else {
        return Err(ConfigError::MissingSomeExpectedTableIds(format!(
            "Expected some '{SOME_EXPECTED_TABLE_IDS}', got nothing"
        )));
    };
    let Value::Sequence(entries) = value else {
        return Err(ConfigError::MissingSomeExpectedTableIds(format!(
            "Expected some '{SOME_EXPECTED_TABLE_IDS}', got {}",
            describe(value)
        )));
    };

    entries
        .iter()
        .map(|entry| match entry {
            Value::String(id) => Ok(id.clone()),
            _ => Err(ConfigError::SomeExpectedTableIdsNotStrings(format!(
                "Expected flat array of strings for '{SOME_EXPECTED_TABLE_IDS}', got {}",
                describe(value)
            ))),
        })
        .collect()
}

fn public_url(values: &Value) -> Result<Option<Url>, ConfigError> {
    let Some(value) = lookup(values, PUBLIC_URL) else {
        return Ok(None);
    };
    let Value::String(raw) = value else {
        return Err(ConfigError::invalid_public_url(describe(value), "expected a string"));
    };
    let url = Url::parse(raw).map_err(|err| ConfigError::invalid_public_url(raw.as_str(), err))?;
    if url.scheme() != "https" {
        return Err(ConfigError::PublicUrlShouldUseHttps(raw.clone()));
    }
    Ok(Some(url))
}

fn local_url(values: &Value, public_url: Option<&Url>) -> Result<Option<Url>, ConfigError> {
    let raw = match lookup(values, LOCAL_URL) {
        Some(Value::String(raw)) => raw.clone(),
        Some(other) => {
            return Err(ConfigError::invalid_local_url(describe(other), "expected a string"));
        }
        None => match public_url {
            Some(public_url) => turn_to_local_link(public_url.as_str()),
            None => return Ok(None),
        },
    };
    Url::parse(&raw)
        .map(Some)
        .map_err(|err| ConfigError::invalid_local_url(raw, err))
}

/// Renders a YAML value for error messages.
fn describe(value: &Value) -> String {
    serde_yaml_ng::to_string(value)
        .map(|rendered| rendered.trim_end().to_string())
        .unwrap_or_else(|_| format!("{value:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_require_expected_table_ids() {
        let err = TestsConfiguration::from_yaml_str("").unwrap_err();
        assert!(matches!(err, ConfigError::MissingSomeExpectedTableIds(_)));
        assert_eq!(err.to_string(), "Expected some 'some_expected_table_ids', got nothing");
    }

    #[test]
    fn test_without_tables_ids_are_forced_empty() {
        let config = TestsConfiguration::from_yaml_str(
            "has_tables: false\nsome_expected_table_ids: [1, 2]\n",
        )
        .unwrap();
        assert!(!config.has_tables());
        assert!(config.some_expected_table_ids().is_empty());
        assert!(config.has_table_of_contents());
    }

    #[test]
    fn test_valid_configuration() {
        let config = TestsConfiguration::from_yaml_str(
            "some_expected_table_ids:\n  - tabulka_casu\n  - Tabulka vzdálenosti\nhas_table_of_contents: false\n",
        )
        .unwrap();
        assert!(config.has_tables());
        assert_eq!(config.some_expected_table_ids(), ["tabulka_casu", "Tabulka vzdálenosti"]);
        assert!(!config.has_table_of_contents());
        assert_eq!(config.public_url(), None);
    }

    #[test]
    fn test_non_sequence_ids_are_rejected() {
        let err = TestsConfiguration::from_yaml_str("some_expected_table_ids: tabulka_casu\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingSomeExpectedTableIds(_)));
        assert_eq!(
            err.to_string(),
            "Expected some 'some_expected_table_ids', got tabulka_casu"
        );
    }

    #[test]
    fn test_non_string_ids_are_rejected() {
        let err = TestsConfiguration::from_yaml_str(
            "some_expected_table_ids:\n  - tabulka_casu\n  - [nested]\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::SomeExpectedTableIdsNotStrings(_)));
        assert!(err
            .to_string()
            .starts_with("Expected flat array of strings for 'some_expected_table_ids'"));
    }

    #[test]
    fn test_loose_truthiness() {
        let value: Value = serde_yaml_ng::from_str("a: 0\nb: '0'\nc: ''\nd: 1\ne: yes please\nf: []\n").unwrap();
        assert!(!flag(&value, "a", true));
        assert!(!flag(&value, "b", true));
        assert!(!flag(&value, "c", true));
        assert!(flag(&value, "d", false));
        assert!(flag(&value, "e", false));
        assert!(!flag(&value, "f", true));
        assert!(flag(&value, "missing", true));
    }

    #[test]
    fn test_null_keeps_default() {
        let config = TestsConfiguration::from_yaml_str(
            "has_tables: ~\nsome_expected_table_ids: [x]\nhas_table_of_contents: null\n",
        )
        .unwrap();
        assert!(config.has_tables());
        assert!(config.has_table_of_contents());
    }

    #[test]
    fn test_top_level_must_be_mapping() {
        let err = TestsConfiguration::from_yaml_str("- has_tables\n").unwrap_err();
        assert!(matches!(err, ConfigError::NotAMapping(_)));
    }

    #[test]
    fn test_local_url_is_derived_from_public_url() {
        let config = TestsConfiguration::from_yaml_str(
            "has_tables: false\npublic_url: https://hranicar.drdplus.info\n",
        )
        .unwrap();
        assert_eq!(config.public_url().map(Url::as_str), Some("https://hranicar.drdplus.info/"));
        assert_eq!(config.local_url().map(Url::as_str), Some("http://hranicar.drdplus.loc/"));
    }

    #[test]
    fn test_public_url_should_use_https() {
        let err = TestsConfiguration::from_yaml_str(
            "has_tables: false\npublic_url: http://hranicar.drdplus.info\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::PublicUrlShouldUseHttps(_)));
    }

    #[test]
    fn test_invalid_urls() {
        let err = TestsConfiguration::from_yaml_str("has_tables: false\npublic_url: not a url\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPublicUrl { .. }));

        let err = TestsConfiguration::from_yaml_str("has_tables: false\nlocal_url: 42\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLocalUrl { .. }));
    }
}
