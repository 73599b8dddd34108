//! SMTP email notification channel.

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::fmt::{self, Write};
use tracing::{debug, info, warn};

use crate::error::ChannelError;
use crate::events::NotifyEvent;
use crate::NotifyChannel;

/// Default SMTP host.
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// Default SMTP port (STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// SMTP settings for the email channel.
#[derive(Clone)]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port.
    pub smtp_port: u16,
    /// SMTP username; `None` sends unauthenticated (local relays).
    pub smtp_username: Option<String>,
    /// SMTP password.
    pub smtp_password: Option<String>,
    /// Sender address.
    pub from_email: String,
    /// Recipient addresses.
    pub to_emails: Vec<String>,
    /// Use STARTTLS. Disable only for local relays and tests.
    pub tls: bool,
}

impl fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &self.smtp_password.as_ref().map(|_| "***"))
            .field("from_email", &self.from_email)
            .field("to_emails", &self.to_emails)
            .field("tls", &self.tls)
            .finish()
    }
}

impl EmailConfig {
    /// Create configuration from environment variables.
    ///
    /// # Required Environment Variables
    /// - `EMAIL_TO`: comma-separated recipients
    /// - `EMAIL_FROM` or `SMTP_USERNAME`: sender address
    ///
    /// # Optional Environment Variables
    /// - `SMTP_HOST` (default: smtp.gmail.com), `SMTP_PORT` (default: 587)
    /// - `SMTP_USERNAME`, `SMTP_PASSWORD`: credentials
    /// - `SMTP_TLS`: set to "false" to skip STARTTLS
    pub fn from_env() -> Result<Self, ChannelError> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        let to_emails: Vec<String> = var("EMAIL_TO")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default();
        if to_emails.is_empty() {
            return Err(ChannelError::NotConfigured("EMAIL_TO".to_string()));
        }

        let smtp_username = var("SMTP_USERNAME");
        let from_email = var("EMAIL_FROM")
            .or_else(|| smtp_username.clone())
            .ok_or_else(|| ChannelError::NotConfigured("EMAIL_FROM".to_string()))?;

        Ok(Self {
            smtp_host: var("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            smtp_port: var("SMTP_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            smtp_username,
            smtp_password: var("SMTP_PASSWORD"),
            from_email,
            to_emails,
            tls: var("SMTP_TLS").map_or(true, |v| !(v.eq_ignore_ascii_case("false") || v == "0")),
        })
    }
}

/// Email notification channel.
pub struct EmailChannel {
    config: Option<EmailConfig>,
}

impl EmailChannel {
    /// Create a new email channel from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        match EmailConfig::from_env() {
            Ok(config) => {
                debug!(to = ?config.to_emails, "Email notifications enabled");
                Self {
                    config: Some(config),
                }
            }
            Err(e) => {
                debug!(reason = %e, "Email notifications disabled");
                Self { config: None }
            }
        }
    }

    /// Create an email channel with a specific configuration.
    #[must_use]
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config: Some(config),
        }
    }

    fn config(&self) -> Result<&EmailConfig, ChannelError> {
        self.config
            .as_ref()
            .ok_or_else(|| ChannelError::NotConfigured("EMAIL_TO".to_string()))
    }

    /// Assemble the multipart (text + HTML) message for an event.
    pub fn build_message(&self, event: &NotifyEvent) -> Result<Message, ChannelError> {
        let config = self.config()?;

        let mut builder = Message::builder()
            .from(config.from_email.parse::<Mailbox>()?)
            .subject(event.title());
        for to in &config.to_emails {
            builder = builder.to(to.parse::<Mailbox>()?);
        }

        let message = builder.multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(format_text(event)),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(format_html(event)),
                ),
        )?;

        Ok(message)
    }

    fn transport(config: &EmailConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>, ChannelError> {
        let builder = if config.tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
        } else {
            warn!(host = %config.smtp_host, "Sending email without TLS");
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
        };

        let builder = builder.port(config.smtp_port);
        let builder = match (&config.smtp_username, &config.smtp_password) {
            (Some(user), Some(password)) => {
                builder.credentials(Credentials::new(user.clone(), password.clone()))
            }
            _ => builder,
        };

        Ok(builder.build())
    }
}

#[async_trait]
impl NotifyChannel for EmailChannel {
    fn name(&self) -> &'static str {
        "email"
    }

    fn enabled(&self) -> bool {
        self.config.is_some()
    }

    async fn send(&self, event: &NotifyEvent) -> Result<(), ChannelError> {
        let config = self.config()?;
        let message = self.build_message(event)?;

        debug!(channel = "email", event_type = ?event.title(), "Sending notification");

        let mailer = Self::transport(config)?;
        mailer.send(message).await?;

        info!(
            to = ?config.to_emails,
            subject = %event.title(),
            "Email sent successfully"
        );
        Ok(())
    }
}

/// Plain-text body for an event.
#[must_use]
pub fn format_text(event: &NotifyEvent) -> String {
    let mut text = String::new();

    match event {
        NotifyEvent::TestPlansGenerated {
            issue_key,
            files,
            errors,
            timestamp,
        } => {
            let _ = writeln!(text, "Hola,\n");
            let _ = writeln!(
                text,
                "Se procesaron las HU adjuntas al ticket {issue_key} y se generaron sus Test Plans."
            );
            let _ = writeln!(text, "\nArchivos:");
            for file in files {
                let _ = writeln!(text, "  - {file}");
            }
            if !errors.is_empty() {
                let _ = writeln!(text, "\nIncidencias ({}):", errors.len());
                for error in errors {
                    let _ = writeln!(text, "  - {error}");
                }
            }
            let _ = writeln!(
                text,
                "\nGenerado: {}",
                timestamp.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
        NotifyEvent::ConnectionTest { timestamp } => {
            let _ = writeln!(text, "La configuración de correo funciona correctamente.");
            let _ = writeln!(
                text,
                "\nEnviado: {}",
                timestamp.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
    }

    text
}

/// HTML body for an event.
#[must_use]
pub fn format_html(event: &NotifyEvent) -> String {
    let mut body = String::new();

    match event {
        NotifyEvent::TestPlansGenerated {
            issue_key,
            files,
            errors,
            ..
        } => {
            let _ = write!(
                body,
                "<p>Se procesaron las HU adjuntas al ticket <strong>{}</strong> y se generaron sus Test Plans.</p>",
                html_escape(issue_key)
            );
            body.push_str("<ul>");
            for file in files {
                let _ = write!(body, "<li>{}</li>", html_escape(file));
            }
            body.push_str("</ul>");
            if !errors.is_empty() {
                body.push_str(r#"<p class="muted">Incidencias:</p><ul>"#);
                for error in errors {
                    let _ = write!(body, "<li>{}</li>", html_escape(error));
                }
                body.push_str("</ul>");
            }
        }
        NotifyEvent::ConnectionTest { .. } => {
            body.push_str("<p>La configuración de correo funciona correctamente.</p>");
        }
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; padding: 20px; }}
        .container {{ max-width: 600px; margin: 0 auto; }}
        h1 {{ color: #2563eb; font-size: 20px; }}
        .muted {{ color: #6b7280; }}
    </style>
</head>
<body>
    <div class="container">
        <h1>{title}</h1>
        {body}
        <hr>
        <p class="muted" style="font-size: 12px;">{severity} | {timestamp}</p>
    </div>
</body>
</html>
"#,
        title = html_escape(&event.title()),
        severity = event.severity().as_str(),
        timestamp = event.timestamp().format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn config() -> EmailConfig {
        EmailConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 2525,
            smtp_username: None,
            smtp_password: None,
            from_email: "qa-bot@example.com".to_string(),
            to_emails: vec![
                "lead@example.com".to_string(),
                "tester@example.com".to_string(),
            ],
            tls: false,
        }
    }

    fn event() -> NotifyEvent {
        NotifyEvent::TestPlansGenerated {
            issue_key: "QA-42".to_string(),
            files: vec![
                "HU_login.docx".to_string(),
                "Test Plan - HU_login.txt".to_string(),
            ],
            errors: vec![],
            timestamp: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_text_body_lists_files() {
        let text = format_text(&event());
        assert!(text.contains("QA-42"));
        assert!(text.contains("  - HU_login.docx"));
        assert!(text.contains("  - Test Plan - HU_login.txt"));
        assert!(!text.contains("Incidencias"));
    }

    #[test]
    fn test_html_body_escapes() {
        let event = NotifyEvent::TestPlansGenerated {
            issue_key: "QA-1".to_string(),
            files: vec!["HU <a&b>.txt".to_string()],
            errors: vec!["upload failed".to_string()],
            timestamp: chrono::Utc::now(),
        };
        let html = format_html(&event);
        assert!(html.contains("HU &lt;a&amp;b&gt;.txt"));
        assert!(html.contains("Incidencias"));
        assert!(html.contains("Warning"));
    }

    #[test]
    fn test_build_message_envelope() {
        let channel = EmailChannel::new(config());
        let message = channel.build_message(&event()).unwrap();

        let envelope = message.envelope();
        assert_eq!(envelope.to().len(), 2);
        assert_eq!(
            envelope.from().map(ToString::to_string).as_deref(),
            Some("qa-bot@example.com")
        );
    }

    #[test]
    fn test_invalid_recipient() {
        let mut config = config();
        config.to_emails = vec!["not an address".to_string()];
        let channel = EmailChannel::new(config);

        assert!(matches!(
            channel.build_message(&event()),
            Err(ChannelError::Address(_))
        ));
    }

    #[test]
    fn test_debug_redacts_password() {
        let mut config = config();
        config.smtp_password = Some("hunter2".to_string());
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    #[serial]
    fn test_from_env() {
        std::env::set_var("EMAIL_TO", "a@example.com, b@example.com");
        std::env::set_var("SMTP_USERNAME", "bot@example.com");
        std::env::remove_var("EMAIL_FROM");
        std::env::set_var("SMTP_PORT", "465");
        std::env::set_var("SMTP_TLS", "false");

        let config = EmailConfig::from_env().unwrap();
        assert_eq!(config.to_emails, vec!["a@example.com", "b@example.com"]);
        assert_eq!(config.from_email, "bot@example.com");
        assert_eq!(config.smtp_port, 465);
        assert!(!config.tls);

        std::env::remove_var("EMAIL_TO");
        assert!(matches!(
            EmailConfig::from_env(),
            Err(ChannelError::NotConfigured(var)) if var == "EMAIL_TO"
        ));
        assert!(!EmailChannel::from_env().enabled());

        std::env::remove_var("SMTP_USERNAME");
        std::env::remove_var("SMTP_PORT");
        std::env::remove_var("SMTP_TLS");
    }
}
