//! # API Facade
//!
//! [`Forum`] is the single entry point for callers. It is a thin facade
//! over the command layer: no business logic lives here, only dispatch
//! plus the one concurrency guarantee the command layer does not give.
//!
//! ## Serialized cycles
//!
//! Every operation is a full load–mutate–save cycle over one shared
//! document. Two interleaved cycles silently lose the earlier write, so
//! the facade owns the store behind a process-wide mutex and runs each
//! cycle inside it. With a single `Forum` per document, concurrent callers
//! serialize and ids never collide.
//!
//! ## Generic over DocumentStore
//!
//! `Forum<S: DocumentStore>` works against any backend: `FileStore` in
//! production, `InMemoryStore` in tests.

use crate::commands::{self, boards, comments, moderation, posts, users, votes};
use crate::error::Result;
use crate::model::{
    ActionLogEntry, Board, BoardPatch, BoardView, Comment, CommentPatch, NewBoard, NewComment,
    NewPost, NewUser, PostView, PostPatch, Report, ReportStatus, Role, User, UserPatch,
};
use crate::page::Page;
use crate::store::fs::FileStore;
use crate::store::DocumentStore;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

/// The forum document store facade.
///
/// All operations take `&self`; exclusion is handled internally so a
/// single instance can be shared (e.g. in an `Arc`) across threads.
pub struct Forum<S: DocumentStore> {
    store: Mutex<S>,
}

impl Forum<FileStore> {
    /// Open (or create) the document at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(FileStore::new(path))
    }
}

impl<S: DocumentStore> Forum<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    fn store(&self) -> MutexGuard<'_, S> {
        // A panicked holder can only have been mid-cycle before a save;
        // the document on disk is still consistent, so keep serving.
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }

    // --- Users ---

    pub fn create_user(&self, new: NewUser) -> Result<User> {
        users::create(&mut *self.store(), new)
    }

    pub fn get_user(&self, id: u64) -> Result<User> {
        users::get(&*self.store(), id)
    }

    pub fn list_users(&self, limit: usize, cursor: Option<u64>) -> Result<Page<User>> {
        users::list(&*self.store(), limit, cursor)
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        users::find_by_email(&*self.store(), email)
    }

    pub fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        users::find_by_username(&*self.store(), username)
    }

    pub fn update_user(&self, id: u64, patch: UserPatch) -> Result<User> {
        users::update(&mut *self.store(), id, patch)
    }

    pub fn update_user_roles(&self, id: u64, roles: &[Role]) -> Result<User> {
        users::update_roles(&mut *self.store(), id, roles)
    }

    pub fn update_user_password(&self, id: u64, new_hash: String) -> Result<()> {
        users::update_password(&mut *self.store(), id, new_hash)
    }

    pub fn delete_user(&self, id: u64) -> Result<bool> {
        users::delete(&mut *self.store(), id)
    }

    // --- Boards ---

    pub fn create_board(&self, new: NewBoard) -> Result<Board> {
        boards::create(&mut *self.store(), new)
    }

    pub fn get_board(&self, id: u64) -> Result<BoardView> {
        boards::get(&*self.store(), id)
    }

    pub fn list_boards(&self, limit: usize, cursor: Option<u64>) -> Result<Page<BoardView>> {
        boards::list(&*self.store(), limit, cursor)
    }

    pub fn update_board(&self, id: u64, patch: BoardPatch) -> Result<Board> {
        boards::update(&mut *self.store(), id, patch)
    }

    pub fn delete_board(&self, id: u64) -> Result<bool> {
        boards::delete(&mut *self.store(), id)
    }

    // --- Posts ---

    pub fn create_post(&self, new: NewPost) -> Result<PostView> {
        posts::create(&mut *self.store(), new)
    }

    pub fn get_post(&self, id: u64) -> Result<PostView> {
        posts::get(&*self.store(), id)
    }

    pub fn list_posts(
        &self,
        board_id: Option<u64>,
        limit: usize,
        cursor: Option<u64>,
    ) -> Result<Page<PostView>> {
        posts::list(&*self.store(), board_id, limit, cursor)
    }

    pub fn update_post(&self, id: u64, patch: PostPatch) -> Result<PostView> {
        posts::update(&mut *self.store(), id, patch)
    }

    pub fn delete_post(&self, id: u64) -> Result<bool> {
        posts::delete(&mut *self.store(), id)
    }

    // --- Comments ---

    pub fn create_comment(&self, new: NewComment) -> Result<Comment> {
        comments::create(&mut *self.store(), new)
    }

    pub fn get_comment(&self, id: u64) -> Result<Comment> {
        comments::get(&*self.store(), id)
    }

    pub fn list_comments(
        &self,
        post_id: u64,
        limit: usize,
        cursor: Option<u64>,
    ) -> Result<Page<Comment>> {
        comments::list(&*self.store(), post_id, limit, cursor)
    }

    pub fn update_comment(&self, id: u64, patch: CommentPatch) -> Result<Comment> {
        comments::update(&mut *self.store(), id, patch)
    }

    pub fn delete_comment(&self, id: u64) -> Result<bool> {
        comments::delete(&mut *self.store(), id)
    }

    // --- Votes ---

    pub fn apply_vote(
        &self,
        user_id: u64,
        target_type: &str,
        target_id: u64,
        value: i32,
    ) -> Result<commands::votes::VoteReceipt> {
        votes::apply_vote(&mut *self.store(), user_id, target_type, target_id, value)
    }

    pub fn vote_summary(
        &self,
        target_type: &str,
        target_id: u64,
        user_id: Option<u64>,
    ) -> Result<commands::votes::VoteSummary> {
        votes::summary(&*self.store(), target_type, target_id, user_id)
    }

    // --- Moderation ---

    pub fn create_report(
        &self,
        reporter_id: u64,
        target_type: &str,
        target_id: u64,
        reason: &str,
    ) -> Result<Report> {
        moderation::create_report(&mut *self.store(), reporter_id, target_type, target_id, reason)
    }

    pub fn list_reports(&self, status: Option<ReportStatus>) -> Result<Vec<Report>> {
        moderation::list_reports(&*self.store(), status)
    }

    pub fn apply_action(
        &self,
        moderator_id: u64,
        target_type: &str,
        target_id: u64,
        action: &str,
        reason: &str,
        report_id: Option<u64>,
    ) -> Result<commands::moderation::ActionReceipt> {
        moderation::apply_action(
            &mut *self.store(),
            moderator_id,
            target_type,
            target_id,
            action,
            reason,
            report_id,
        )
    }

    pub fn moderation_actions(&self) -> Result<Vec<ActionLogEntry>> {
        moderation::actions(&*self.store())
    }
}

pub use crate::commands::moderation::ActionReceipt;
pub use crate::commands::votes::{VoteReceipt, VoteSummary};
