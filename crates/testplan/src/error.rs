//! Error types for the test-plan pipeline.

use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised by the Jira/Xray clients, the organizer and the pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// A required setting is absent from flags and environment
    #[error("missing required setting {0}")]
    MissingEnv(&'static str),

    /// A setting is present but unusable
    #[error("invalid setting {name}: {reason}")]
    InvalidConfig { name: &'static str, reason: String },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Jira answered with an unexpected status
    #[error("Jira returned {status}: {body}")]
    Jira { status: StatusCode, body: String },

    /// Xray authentication or GraphQL failure
    #[error("Xray error: {0}")]
    Xray(String),

    /// File-system failure
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Test-plan template failed to register
    #[error("invalid test plan template: {0}")]
    TemplateSyntax(#[from] handlebars::TemplateError),

    /// Test-plan template failed to render
    #[error("failed to render test plan: {0}")]
    Template(#[from] handlebars::RenderError),

    /// Serialization error
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
