//! REST client for Jira Cloud.
//!
//! Covers the four calls the pipeline makes: reading an issue's attachment
//! list, downloading an attachment, creating a phase subtask and uploading
//! the generated test plan.

mod models;

pub use models::{Attachment, CreatedIssue};

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::config::JiraConfig;
use crate::error::{Error, Result};
use models::{CreateIssueRequest, IssueAttachments, KeyRef, NameRef, SubtaskFields};

/// Timeout for metadata calls. Downloads and uploads have none.
const METADATA_TIMEOUT: Duration = Duration::from_secs(30);

/// Project key of an issue key (`QA-12` -> `QA`).
#[must_use]
pub fn project_key(issue_key: &str) -> &str {
    issue_key.split('-').next().unwrap_or(issue_key)
}

/// Jira REST client using basic auth (account email + API token).
#[derive(Debug, Clone)]
pub struct JiraClient {
    client: reqwest::Client,
    base_url: String,
    user: String,
    token: String,
    subtask_type: String,
}

impl JiraClient {
    /// Create a new Jira client.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be constructed
    pub fn new(config: &JiraConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user: config.user.clone(),
            token: config.token.clone(),
            subtask_type: config.subtask_type.clone(),
        })
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .basic_auth(&self.user, Some(&self.token))
    }

    fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .basic_auth(&self.user, Some(&self.token))
    }

    /// Turn a non-success response into [`Error::Jira`].
    async fn ensure_status(response: Response, expected: Option<StatusCode>) -> Result<Response> {
        let status = response.status();
        let ok = expected.map_or(status.is_success(), |code| status == code);
        if ok {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(Error::Jira { status, body })
    }

    /// List the attachments of an issue.
    #[instrument(skip(self))]
    pub async fn fetch_attachments(&self, issue_key: &str) -> Result<Vec<Attachment>> {
        let url = format!("{}/rest/api/3/issue/{issue_key}", self.base_url);

        let response = self
            .get(&url)
            .query(&[("fields", "attachment")])
            .timeout(METADATA_TIMEOUT)
            .send()
            .await?;
        let response = Self::ensure_status(response, None).await?;

        let issue: IssueAttachments = response.json().await?;
        debug!(count = issue.fields.attachment.len(), "Retrieved attachment list");
        Ok(issue.fields.attachment)
    }

    /// Download an attachment into `target_dir`, returning the written path.
    ///
    /// Redirects to the media host are followed.
    #[instrument(skip(self, attachment), fields(filename = %attachment.filename))]
    pub async fn download_attachment(
        &self,
        attachment: &Attachment,
        target_dir: &Path,
    ) -> Result<PathBuf> {
        // Only the final component is trusted; Jira file names may contain separators.
        let filename = Path::new(&attachment.filename)
            .file_name()
            .ok_or_else(|| Error::InvalidConfig {
                name: "attachment filename",
                reason: format!("'{}' has no file name", attachment.filename),
            })?;
        let path = target_dir.join(filename);

        let response = self
            .get(&attachment.content)
            .header(ACCEPT, "*/*")
            .send()
            .await?;
        let response = Self::ensure_status(response, None).await?;
        let bytes = response.bytes().await?;

        tokio::fs::create_dir_all(target_dir)
            .await
            .map_err(|e| Error::io(target_dir, e))?;
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| Error::io(&path, e))?;

        info!(path = %path.display(), bytes = bytes.len(), "Saved attachment");
        Ok(path)
    }

    /// Create a subtask under `parent_key` in the parent's project.
    #[instrument(skip(self))]
    pub async fn create_subtask(&self, parent_key: &str, summary: &str) -> Result<CreatedIssue> {
        let url = format!("{}/rest/api/3/issue", self.base_url);
        let request = CreateIssueRequest {
            fields: SubtaskFields {
                project: KeyRef {
                    key: project_key(parent_key),
                },
                parent: KeyRef { key: parent_key },
                summary,
                issuetype: NameRef {
                    name: &self.subtask_type,
                },
            },
        };

        let response = self
            .post(&url)
            .json(&request)
            .timeout(METADATA_TIMEOUT)
            .send()
            .await?;
        let response = Self::ensure_status(response, Some(StatusCode::CREATED)).await?;

        let created: CreatedIssue = response.json().await?;
        info!(key = %created.key, "Created subtask");
        Ok(created)
    }

    /// Attach a local file to an issue.
    #[instrument(skip(self, file), fields(file = %file.display()))]
    pub async fn upload_attachment(&self, issue_key: &str, file: &Path) -> Result<Vec<Attachment>> {
        let url = format!("{}/rest/api/3/issue/{issue_key}/attachments", self.base_url);

        let bytes = tokio::fs::read(file).await.map_err(|e| Error::io(file, e))?;
        let filename = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let part = Part::bytes(bytes)
            .file_name(filename)
            .mime_str("text/plain; charset=utf-8")?;
        let form = Form::new().part("file", part);

        let response = self
            .post(&url)
            .header("X-Atlassian-Token", "no-check")
            .multipart(form)
            .send()
            .await?;
        let response = Self::ensure_status(response, None).await?;

        let attachments: Vec<Attachment> = response.json().await?;
        info!(count = attachments.len(), "Uploaded attachment");
        Ok(attachments)
    }
}
