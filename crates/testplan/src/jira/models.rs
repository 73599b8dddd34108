//! Jira REST payloads used by the pipeline.

use serde::{Deserialize, Serialize};

/// Attachment metadata as returned by `GET /rest/api/3/issue/{key}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub filename: String,
    /// Download URL; Jira redirects it to the media host.
    pub content: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// Key and id of an issue created through the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedIssue {
    pub id: String,
    pub key: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IssueAttachments {
    #[serde(default)]
    pub fields: AttachmentFields,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AttachmentFields {
    #[serde(default)]
    pub attachment: Vec<Attachment>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateIssueRequest<'a> {
    pub fields: SubtaskFields<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubtaskFields<'a> {
    pub project: KeyRef<'a>,
    pub parent: KeyRef<'a>,
    pub summary: &'a str,
    pub issuetype: NameRef<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct KeyRef<'a> {
    pub key: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct NameRef<'a> {
    pub name: &'a str,
}
