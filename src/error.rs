//! Error Handling
//!
//! Error type definitions used in gh-branch-guard

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Error types for gh-branch-guard
#[derive(Error, Debug)]
pub enum Error {
    #[error("GitHub API error: {0}")]
    GitHubApi(#[from] octocrab::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid repository format: {0} (expected 'owner/repo')")]
    InvalidRepositoryFormat(String),

    #[error("Invalid branch pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

impl Error {
    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Error::Configuration(message.into())
    }

    /// Whether this error belongs to the fatal tier (bad input, not a remote failure)
    pub fn is_fatal_configuration(&self) -> bool {
        matches!(
            self,
            Error::Configuration(_)
                | Error::Yaml(_)
                | Error::Io(_)
                | Error::InvalidRepositoryFormat(_)
                | Error::InvalidPattern(_)
        )
    }
}
