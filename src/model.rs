//! Core data types: the persisted [`Document`] and every record it holds.
//!
//! All persisted types are plain serde structs. Collections and flags carry
//! `#[serde(default)]` so that older or partially populated documents load
//! without errors. IDs are plain integers, unique and monotonically
//! increasing within each collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StoreError;

/// The single unit of storage: every collection of the forum lives in here,
/// and every operation is a load–mutate–save cycle over one of these.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub boards: Vec<Board>,
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub votes: Vec<Vote>,
    #[serde(default)]
    pub moderation: Moderation,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Moderation {
    #[serde(default)]
    pub reports: Vec<Report>,
    #[serde(default)]
    pub actions: Vec<ActionLogEntry>,
}

impl Document {
    pub fn user(&self, id: u64) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn user_mut(&mut self, id: u64) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    pub fn board(&self, id: u64) -> Option<&Board> {
        self.boards.iter().find(|b| b.id == id)
    }

    pub fn board_mut(&mut self, id: u64) -> Option<&mut Board> {
        self.boards.iter_mut().find(|b| b.id == id)
    }

    pub fn post(&self, id: u64) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    pub fn post_mut(&mut self, id: u64) -> Option<&mut Post> {
        self.posts.iter_mut().find(|p| p.id == id)
    }

    pub fn comment(&self, id: u64) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == id)
    }

    pub fn comment_mut(&mut self, id: u64) -> Option<&mut Comment> {
        self.comments.iter_mut().find(|c| c.id == id)
    }
}

// --- Users ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Mod,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    /// Stored normalized (trimmed, lowercased); unique across users.
    pub email: String,
    /// Opaque hash produced by the auth layer above; never interpreted here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Always contains [`Role::User`].
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Denormalized back-reference: ids of posts authored by this user.
    /// Recomputed after every mutation that touches posts or users.
    #[serde(default)]
    pub posts: Vec<u64>,
    #[serde(default)]
    pub removed: bool,
    #[serde(default)]
    pub banned: bool,
    #[serde(default)]
    pub shadowbanned: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

/// Fields accepted when creating a user.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
}

/// Allow-listed partial update for a user. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
}

// --- Boards ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct NewBoard {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct BoardPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// A board with its derived post count, computed at read time.
#[derive(Debug, Clone, Serialize)]
pub struct BoardView {
    #[serde(flatten)]
    pub board: Board,
    pub post_count: usize,
}

// --- Posts ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub body: String,
    pub board_id: u64,
    pub user_id: u64,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Denormalized aggregate, kept equal to `score` by the vote ledger.
    #[serde(default)]
    pub votes: i64,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub removed: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub sticky: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub body: String,
    pub board_id: u64,
    pub user_id: u64,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub board_id: Option<u64>,
    pub tags: Option<Vec<String>>,
}

/// A post with its comments attached. The join is computed at read time so
/// it always reflects current comment state; `comment_count` is derived,
/// never stored.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub comments: Vec<Comment>,
    pub comment_count: usize,
}

// --- Comments ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub body: String,
    pub post_id: u64,
    pub user_id: u64,
    #[serde(default)]
    pub votes: i64,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub removed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct NewComment {
    pub body: String,
    pub post_id: u64,
    pub user_id: u64,
}

#[derive(Debug, Clone, Default)]
pub struct CommentPatch {
    pub body: Option<String>,
}

// --- Votes ---

/// What a vote points at. At most one vote row exists per
/// (user, target_type, target_id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteTarget {
    Post,
    Comment,
}

impl FromStr for VoteTarget {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "post" => Ok(VoteTarget::Post),
            "comment" => Ok(VoteTarget::Comment),
            other => Err(StoreError::Validation(format!(
                "unsupported target_type: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for VoteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteTarget::Post => write!(f, "post"),
            VoteTarget::Comment => write!(f, "comment"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    pub id: u64,
    pub user_id: u64,
    pub target_type: VoteTarget,
    pub target_id: u64,
    /// Always -1 or 1; "no vote" is the absence of the row, never a zero.
    pub value: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Moderation ---

/// Entities a report or moderator action can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModTarget {
    User,
    Post,
    Comment,
}

impl FromStr for ModTarget {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(ModTarget::User),
            "post" => Ok(ModTarget::Post),
            "comment" => Ok(ModTarget::Comment),
            other => Err(StoreError::Validation(format!(
                "unsupported target_type: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for ModTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModTarget::User => write!(f, "user"),
            ModTarget::Post => write!(f, "post"),
            ModTarget::Comment => write!(f, "comment"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: u64,
    pub reporter_id: u64,
    pub target_type: ModTarget,
    pub target_id: u64,
    #[serde(default)]
    pub reason: String,
    pub status: ReportStatus,
    /// Set when the report is closed by an applied action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_by: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    /// The target did not exist when the report was filed. Reports against
    /// missing targets are accepted but flagged, never rejected.
    #[serde(default)]
    pub invalid_target: bool,
    pub created_at: DateTime<Utc>,
}

/// One line of the moderation audit log. Append-only: entries are never
/// mutated or deleted by any operation.
///
/// `target_type` and `action` keep the raw strings the caller supplied so
/// that rejected inputs (unknown actions, bad target kinds) stay auditable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub id: u64,
    pub ts: DateTime<Utc>,
    pub moderator_id: u64,
    pub target_type: String,
    pub target_id: u64,
    pub action: String,
    #[serde(default)]
    pub reason: String,
    pub applied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_id: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_parses_from_empty_object() {
        let doc: Document = serde_json::from_str("{}").unwrap();
        assert!(doc.users.is_empty());
        assert!(doc.moderation.reports.is_empty());
        assert!(doc.moderation.actions.is_empty());
    }

    #[test]
    fn vote_target_normalizes_case() {
        assert_eq!("POST".parse::<VoteTarget>().unwrap(), VoteTarget::Post);
        assert_eq!(
            "Comment".parse::<VoteTarget>().unwrap(),
            VoteTarget::Comment
        );
        assert!("board".parse::<VoteTarget>().is_err());
    }

    #[test]
    fn document_with_unknown_extra_fields_still_loads() {
        // Older deployments carried extra collections (tags, attachments).
        let raw = r#"{"users": [], "tags": [], "attachments": []}"#;
        let doc: Document = serde_json::from_str(raw).unwrap();
        assert!(doc.users.is_empty());
    }
}
