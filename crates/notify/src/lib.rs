//! Notification system for the HU test-plan pipeline.
//!
//! This crate delivers the end-of-run summary (which HU attachments were
//! processed and which test plans were generated) to the people who follow
//! the Jira issue.
//!
//! # Usage
//!
//! ```no_run
//! use notify::{Notifier, NotifyEvent};
//!
//! # async fn example() {
//! // Create notifier from environment variables
//! let notifier = Notifier::from_env();
//!
//! let results = notifier
//!     .notify_and_wait(NotifyEvent::TestPlansGenerated {
//!         issue_key: "QA-42".to_string(),
//!         files: vec!["Test Plan - HU_login.txt".to_string()],
//!         errors: vec![],
//!         timestamp: chrono::Utc::now(),
//!     })
//!     .await;
//! # }
//! ```
//!
//! # Configuration
//!
//! The notifier is configured via environment variables:
//!
//! - `EMAIL_TO`: comma-separated recipients (enables the email channel)
//! - `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD`, `EMAIL_FROM`, `SMTP_TLS`
//! - `NOTIFY_DISABLED`: Set to "true" to disable all notifications
//!
//! # Architecture
//!
//! - [`NotifyChannel`] trait defines the interface for notification channels
//! - [`EmailChannel`] implements SMTP delivery
//! - [`Notifier`] dispatches events to all enabled channels

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod channels;
pub mod error;
pub mod events;

pub use channels::email::{EmailChannel, EmailConfig};
pub use channels::NotifyChannel;
pub use error::ChannelError;
pub use events::{NotifyEvent, Severity};

use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Environment variable to disable all notifications.
const ENV_NOTIFY_DISABLED: &str = "NOTIFY_DISABLED";

/// Central notification dispatcher.
pub struct Notifier {
    channels: Vec<Arc<dyn NotifyChannel>>,
    disabled: bool,
}

impl Notifier {
    /// Create a new notifier from environment variables.
    ///
    /// This will auto-detect which channels are configured based on
    /// environment variables and enable them accordingly.
    #[must_use]
    pub fn from_env() -> Self {
        let disabled = std::env::var(ENV_NOTIFY_DISABLED)
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);

        if disabled {
            info!("Notifications disabled via NOTIFY_DISABLED");
            return Self::disabled();
        }

        let mut channels: Vec<Arc<dyn NotifyChannel>> = vec![];

        let email = EmailChannel::from_env();
        if email.enabled() {
            info!("Email notifications enabled");
            channels.push(Arc::new(email));
        }

        if channels.is_empty() {
            warn!("No notification channels configured");
        } else {
            info!(
                channel_count = channels.len(),
                "Notification system initialized"
            );
        }

        Self {
            channels,
            disabled: false,
        }
    }

    /// Create a notifier with specific channels.
    #[must_use]
    pub fn with_channels(channels: Vec<Arc<dyn NotifyChannel>>) -> Self {
        Self {
            channels,
            disabled: false,
        }
    }

    /// Create a disabled notifier (for testing or when notifications are off).
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            channels: vec![],
            disabled: true,
        }
    }

    /// Check if any notification channels are enabled.
    #[must_use]
    pub fn has_channels(&self) -> bool {
        !self.disabled && !self.channels.is_empty()
    }

    /// Get the number of enabled channels.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        if self.disabled {
            0
        } else {
            self.channels.len()
        }
    }

    /// Send a notification and wait for all channels to complete.
    ///
    /// Errors are logged and returned per channel; one failing channel does
    /// not stop delivery to the others.
    pub async fn notify_and_wait(
        &self,
        event: NotifyEvent,
    ) -> Vec<(String, Result<(), ChannelError>)> {
        if self.disabled {
            debug!("Notifications disabled, skipping event");
            return vec![];
        }

        let mut results = vec![];

        for channel in &self.channels {
            let channel_name = channel.name().to_string();

            if !channel.enabled() {
                debug!(channel = %channel_name, "Channel disabled, skipping");
                continue;
            }

            let result = channel.send(&event).await;
            match &result {
                Ok(()) => debug!(channel = %channel_name, "Notification sent"),
                Err(e) => error!(
                    channel = %channel_name,
                    error = %e,
                    "Failed to send notification"
                ),
            }
            results.push((channel_name, result));
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingChannel {
        titles: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl NotifyChannel for RecordingChannel {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn enabled(&self) -> bool {
            true
        }

        async fn send(&self, event: &NotifyEvent) -> Result<(), ChannelError> {
            self.titles.lock().unwrap().push(event.title());
            if self.fail {
                Err(ChannelError::Other("boom".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn event(errors: Vec<String>) -> NotifyEvent {
        NotifyEvent::TestPlansGenerated {
            issue_key: "QA-7".to_string(),
            files: vec!["HU_alta.docx".to_string()],
            errors,
            timestamp: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_disabled_notifier() {
        let notifier = Notifier::disabled();
        assert!(!notifier.has_channels());
        assert_eq!(notifier.channel_count(), 0);
    }

    #[test]
    fn test_event_titles_and_severity() {
        assert_eq!(event(vec![]).title(), "Test Plans generados - QA-7");
        assert_eq!(event(vec![]).severity(), Severity::Info);
        assert_eq!(
            event(vec!["upload failed".to_string()]).severity(),
            Severity::Warning
        );
    }

    #[tokio::test]
    async fn test_notify_and_wait_collects_results() {
        let ok = Arc::new(RecordingChannel::default());
        let failing = Arc::new(RecordingChannel {
            fail: true,
            ..Default::default()
        });
        let notifier = Notifier::with_channels(vec![
            ok.clone() as Arc<dyn NotifyChannel>,
            failing.clone() as Arc<dyn NotifyChannel>,
        ]);
        assert_eq!(notifier.channel_count(), 2);

        let results = notifier.notify_and_wait(event(vec![])).await;
        assert_eq!(results.len(), 2);
        assert!(results[0].1.is_ok());
        assert!(results[1].1.is_err());
        assert_eq!(ok.titles.lock().unwrap().len(), 1);
        assert_eq!(failing.titles.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_disabled_notifier_sends_nothing() {
        let results = Notifier::disabled().notify_and_wait(event(vec![])).await;
        assert!(results.is_empty());
    }
}
