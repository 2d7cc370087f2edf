//! GitLab REST types and error definitions.
//!
//! Response types keep the fields the bridge relays to its callers; anything
//! else GitLab sends is ignored. Option types only serialize what is set.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The merge request a bridge instance is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    /// Numeric id or `namespace/project` path.
    pub project_id: String,
    /// Merge request iid (project-scoped number).
    pub merge_request_iid: u64,
}

/// A user as embedded in merge requests and notes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicUser {
    pub id: u64,
    pub username: String,
    pub name: String,
    pub state: String,
    pub avatar_url: Option<String>,
    pub web_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeRequest {
    pub id: u64,
    pub iid: u64,
    pub project_id: u64,
    pub title: String,
    pub state: String,
    pub source_branch: String,
    pub target_branch: String,
    pub web_url: String,
    pub author: Option<BasicUser>,
    pub assignees: Vec<BasicUser>,
}

/// One side of a multi-line position as reported by GitLab.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteLinePosition {
    pub line_code: String,
    #[serde(rename = "type")]
    pub line_type: Option<String>,
    pub old_line: Option<u32>,
    pub new_line: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteLineRange {
    pub start: NoteLinePosition,
    pub end: NoteLinePosition,
}

/// Where a diff note is attached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotePosition {
    pub base_sha: String,
    pub start_sha: String,
    pub head_sha: String,
    pub position_type: String,
    pub new_path: Option<String>,
    pub old_path: Option<String>,
    pub new_line: Option<u32>,
    pub old_line: Option<u32>,
    pub line_range: Option<NoteLineRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Note {
    pub id: u64,
    #[serde(rename = "type")]
    pub note_type: Option<String>,
    pub body: String,
    pub author: BasicUser,
    pub system: bool,
    pub resolvable: bool,
    pub resolved: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub noteable_iid: Option<u64>,
    pub position: Option<NotePosition>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Discussion {
    pub id: String,
    pub individual_note: bool,
    pub notes: Vec<Note>,
}

/// Body of `PUT /projects/:id/merge_requests/:iid`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateMergeRequestOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_ids: Option<Vec<u64>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinePositionOptions {
    #[serde(rename = "type")]
    pub line_type: String,
    pub line_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineRangeOptions {
    pub start: LinePositionOptions,
    pub end: LinePositionOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PositionOptions {
    pub base_sha: String,
    pub start_sha: String,
    pub head_sha: String,
    pub position_type: String,
    pub new_path: String,
    pub old_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_range: Option<LineRangeOptions>,
}

/// Body of `POST /projects/:id/merge_requests/:iid/discussions`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateDiscussionOptions {
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<PositionOptions>,
}

/// Body of `PUT .../discussions/:discussion_id/notes/:note_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateNoteOptions {
    pub body: String,
}

/// Errors that can occur while talking to GitLab.
#[derive(Debug, Error)]
pub enum GitlabError {
    /// Connection, TLS or timeout failure.
    #[error("request to GitLab failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// GitLab answered with a status of 300 or above.
    #[error("GitLab returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not the JSON we expected.
    #[error("could not decode GitLab response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid GitLab URL: {0}")]
    InvalidUrl(String),
}

impl GitlabError {
    /// Upstream status code, when GitLab produced a response at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            GitlabError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for GitLab operations.
pub type GitlabResult<T> = Result<T, GitlabError>;
