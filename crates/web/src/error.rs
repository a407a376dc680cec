// ABOUTME: Error types for tests configuration loading and HTML helper passes.
// ABOUTME: Provides ConfigError with one variant per violated shape, and HelperError.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating the tests configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read tests configuration {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid YAML.
    #[error("failed to parse tests configuration: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// The top level of the configuration is not a key-value mapping.
    #[error("tests configuration has to be a mapping, got {0}")]
    NotAMapping(String),

    /// `some_expected_table_ids` is missing or not a sequence.
    #[error("{0}")]
    MissingSomeExpectedTableIds(String),

    /// `some_expected_table_ids` holds something other than strings.
    #[error("{0}")]
    SomeExpectedTableIdsNotStrings(String),

    /// `public_url` is not a URL.
    #[error("invalid public URL {url}: {reason}")]
    InvalidPublicUrl { url: String, reason: String },

    /// `public_url` does not use https.
    #[error("public URL should use https, got {0}")]
    PublicUrlShouldUseHttps(String),

    /// `local_url` is not a URL.
    #[error("invalid local URL {url}: {reason}")]
    InvalidLocalUrl { url: String, reason: String },
}

impl ConfigError {
    pub fn invalid_public_url(url: impl Into<String>, reason: impl fmt::Display) -> Self {
        ConfigError::InvalidPublicUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_local_url(url: impl Into<String>, reason: impl fmt::Display) -> Self {
        ConfigError::InvalidLocalUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

/// Errors raised by HTML helper passes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HelperError {
    /// The remote tables injector was handed a document whose external links were not marked.
    #[error("external links have to be marked before remote tables are injected")]
    ExternalLinksNotMarked,
}
