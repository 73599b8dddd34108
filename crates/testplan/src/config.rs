//! Configuration for the test-plan pipeline.
//!
//! Every setting comes from the environment (optionally pre-loaded from a
//! `.env` file by the binary). The CLI overrides the per-run values.

use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Default Jira issue type used for phase subtasks.
pub const DEFAULT_SUBTASK_TYPE: &str = "Subtask";

/// Default Xray cloud endpoint.
pub const DEFAULT_XRAY_BASE_URL: &str = "https://xray.cloud.getxray.app";

/// Default number of attachments downloaded/processed at once.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Default number of HU characters copied into the test plan.
pub const DEFAULT_EXCERPT_CHARS: usize = 1_500;

fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn required(name: &'static str) -> Result<String> {
    var(name).ok_or(Error::MissingEnv(name))
}

fn flag(name: &str, default: bool) -> bool {
    var(name).map_or(default, |v| v == "1" || v.eq_ignore_ascii_case("true"))
}

/// Jira REST connection settings.
#[derive(Clone)]
pub struct JiraConfig {
    /// Instance URL, e.g. `https://your-domain.atlassian.net` (no trailing slash).
    pub base_url: String,
    /// Account email used for basic auth.
    pub user: String,
    /// API token used for basic auth.
    pub token: String,
    /// Issue type name for phase subtasks.
    pub subtask_type: String,
}

impl fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraConfig")
            .field("base_url", &self.base_url)
            .field("user", &self.user)
            .field("token", &"***")
            .field("subtask_type", &self.subtask_type)
            .finish()
    }
}

impl JiraConfig {
    /// Create configuration from environment variables.
    ///
    /// # Required Environment Variables
    /// - `URL_JIRA`: Jira instance URL
    /// - `USER_JIRA`: account email
    /// - `JIRA_TOKEN`: API token
    ///
    /// # Optional Environment Variables
    /// - `JIRA_SUBTASK_TYPE`: subtask issue type name (default: Subtask)
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            base_url: normalize_url(&required("URL_JIRA")?),
            user: required("USER_JIRA")?,
            token: required("JIRA_TOKEN")?,
            subtask_type: var("JIRA_SUBTASK_TYPE")
                .unwrap_or_else(|| DEFAULT_SUBTASK_TYPE.to_string()),
        })
    }
}

/// Xray cloud API credentials.
#[derive(Clone)]
pub struct XrayConfig {
    /// API root, e.g. `https://xray.cloud.getxray.app`.
    pub base_url: String,
    /// API key client id.
    pub client_id: String,
    /// API key client secret.
    pub client_secret: String,
}

impl fmt::Debug for XrayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XrayConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

impl XrayConfig {
    /// Read Xray credentials; `None` when `XRAY_CLIENT_ID` or
    /// `XRAY_CLIENT_SECRET` is unset, which disables the integration.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Some(Self {
            base_url: normalize_url(
                &var("XRAY_BASE_URL").unwrap_or_else(|| DEFAULT_XRAY_BASE_URL.to_string()),
            ),
            client_id: var("XRAY_CLIENT_ID")?,
            client_secret: var("XRAY_CLIENT_SECRET")?,
        })
    }
}

/// Per-run settings.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Parent issue holding the HU attachments.
    pub issue_key: String,
    /// Directory attachments are downloaded into and folders created under.
    pub target_dir: PathBuf,
    /// Maximum concurrent downloads / HU processing tasks.
    pub concurrency: usize,
    /// Maximum HU characters copied into the test plan (0 disables).
    pub excerpt_chars: usize,
    /// Send the summary notification at the end of the run.
    pub send_email: bool,
}

impl PipelineConfig {
    /// Create configuration from environment variables.
    ///
    /// # Required Environment Variables
    /// - `ISSUE_KEY`: parent Jira issue
    /// - `TARGET_DIR`: working directory for downloads and folders
    ///
    /// # Optional Environment Variables
    /// - `PIPELINE_CONCURRENCY` (default: 4)
    /// - `HU_EXCERPT_CHARS` (default: 1500)
    /// - `SEND_EMAIL` (default: true)
    pub fn from_env() -> Result<Self> {
        Self::new(
            required("ISSUE_KEY")?,
            PathBuf::from(required("TARGET_DIR")?),
        )
    }

    /// Build configuration for an explicit issue and directory, reading the
    /// optional tuning variables from the environment.
    pub fn new(issue_key: String, target_dir: PathBuf) -> Result<Self> {
        validate_issue_key(&issue_key)?;

        let concurrency = match var("PIPELINE_CONCURRENCY") {
            Some(v) => v
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| Error::InvalidConfig {
                    name: "PIPELINE_CONCURRENCY",
                    reason: format!("expected a positive integer, got '{v}'"),
                })?,
            None => DEFAULT_CONCURRENCY,
        };

        Ok(Self {
            issue_key,
            target_dir,
            concurrency,
            excerpt_chars: var("HU_EXCERPT_CHARS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_EXCERPT_CHARS),
            send_email: flag("SEND_EMAIL", true),
        })
    }
}

/// Complete configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct Config {
    pub jira: JiraConfig,
    pub xray: Option<XrayConfig>,
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load every section from the environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            jira: JiraConfig::from_env()?,
            xray: XrayConfig::from_env(),
            pipeline: PipelineConfig::from_env()?,
        })
    }
}

/// Reject keys that cannot name a Jira issue (`PROJECT-123`).
pub fn validate_issue_key(key: &str) -> Result<()> {
    let valid = key
        .split_once('-')
        .is_some_and(|(project, number)| {
            !project.is_empty()
                && project.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                && !number.is_empty()
                && number.chars().all(|c| c.is_ascii_digit())
        });

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidConfig {
            name: "ISSUE_KEY",
            reason: format!("'{key}' is not a Jira issue key like PROJ-123"),
        })
    }
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
