//! Notification event types for the test-plan pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity levels for notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational - normal operations
    Info,
    /// Warning - something needs attention
    Warning,
}

impl Severity {
    /// Get display name for this severity.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Warning => "Warning",
        }
    }
}

/// Events that can trigger notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotifyEvent {
    /// Test plans were generated for the HUs attached to an issue
    TestPlansGenerated {
        issue_key: String,
        /// Generated test plans and the HU attachments they came from
        files: Vec<String>,
        /// Non-fatal problems hit while processing
        #[serde(default)]
        errors: Vec<String>,
        #[serde(default = "Utc::now")]
        timestamp: DateTime<Utc>,
    },

    /// Connectivity check for a channel's configuration
    ConnectionTest {
        #[serde(default = "Utc::now")]
        timestamp: DateTime<Utc>,
    },
}

impl NotifyEvent {
    /// Get a short title for this event type.
    #[must_use]
    pub fn title(&self) -> String {
        match self {
            Self::TestPlansGenerated { issue_key, .. } => {
                format!("Test Plans generados - {issue_key}")
            }
            Self::ConnectionTest { .. } => "Test Plans - correo de prueba".to_string(),
        }
    }

    /// Get the severity for this event.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::TestPlansGenerated { errors, .. } if !errors.is_empty() => Severity::Warning,
            Self::TestPlansGenerated { .. } | Self::ConnectionTest { .. } => Severity::Info,
        }
    }

    /// Get the timestamp for this event.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::TestPlansGenerated { timestamp, .. } | Self::ConnectionTest { timestamp } => {
                *timestamp
            }
        }
    }
}
