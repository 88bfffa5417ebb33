use crate::commands::helpers::next_id;
use crate::error::{Result, StoreError};
use crate::model::{Comment, CommentPatch, NewComment, VoteTarget};
use crate::page::{paginate, Page};
use crate::store::DocumentStore;
use chrono::Utc;

pub fn create<S: DocumentStore>(store: &mut S, new: NewComment) -> Result<Comment> {
    if new.body.trim().is_empty() {
        return Err(StoreError::Validation("missing field: body".into()));
    }

    let mut doc = store.load()?;
    if doc.post(new.post_id).is_none() {
        return Err(StoreError::not_found("post", new.post_id));
    }
    if doc.user(new.user_id).is_none() {
        return Err(StoreError::not_found("user", new.user_id));
    }

    let comment = Comment {
        id: next_id(doc.comments.iter().map(|c| c.id)),
        body: new.body,
        post_id: new.post_id,
        user_id: new.user_id,
        votes: 0,
        score: 0,
        removed: false,
        created_at: Utc::now(),
        updated_at: None,
    };
    doc.comments.push(comment.clone());
    store.save(&doc)?;
    Ok(comment)
}

pub fn get<S: DocumentStore>(store: &S, id: u64) -> Result<Comment> {
    let doc = store.load()?;
    doc.comment(id)
        .cloned()
        .ok_or(StoreError::not_found("comment", id))
}

/// List the comments on one post, sorted by id, one page at a time.
pub fn list<S: DocumentStore>(
    store: &S,
    post_id: u64,
    limit: usize,
    cursor: Option<u64>,
) -> Result<Page<Comment>> {
    let doc = store.load()?;
    if doc.post(post_id).is_none() {
        return Err(StoreError::not_found("post", post_id));
    }
    let mut comments: Vec<Comment> = doc
        .comments
        .iter()
        .filter(|c| c.post_id == post_id)
        .cloned()
        .collect();
    comments.sort_by_key(|c| c.id);
    Ok(paginate(comments, limit, cursor, |c| c.id))
}

pub fn update<S: DocumentStore>(store: &mut S, id: u64, patch: CommentPatch) -> Result<Comment> {
    let mut doc = store.load()?;
    let comment = doc
        .comment_mut(id)
        .ok_or(StoreError::not_found("comment", id))?;

    if let Some(body) = patch.body {
        comment.body = body;
    }
    comment.updated_at = Some(Utc::now());

    let comment = comment.clone();
    store.save(&doc)?;
    Ok(comment)
}

/// Delete a comment and any votes targeting it. Returns `Ok(false)` if the
/// comment did not exist.
pub fn delete<S: DocumentStore>(store: &mut S, id: u64) -> Result<bool> {
    let mut doc = store.load()?;
    let before = doc.comments.len();
    doc.comments.retain(|c| c.id != id);
    if doc.comments.len() == before {
        return Ok(false);
    }

    doc.votes
        .retain(|v| !(v.target_type == VoteTarget::Comment && v.target_id == id));

    store.save(&doc)?;
    Ok(true)
}
