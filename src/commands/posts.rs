use crate::commands::helpers::{next_id, sync_user_posts};
use crate::error::{Result, StoreError};
use crate::model::{Document, NewPost, Post, PostPatch, PostView, VoteTarget};
use crate::page::{paginate, Page};
use crate::store::DocumentStore;
use chrono::Utc;
use std::collections::HashSet;

/// Attach a post's comments, grouped and sorted by id, plus the derived
/// count. Always computed from the current document, never stored.
fn view_of(doc: &Document, post: Post) -> PostView {
    let mut comments: Vec<_> = doc
        .comments
        .iter()
        .filter(|c| c.post_id == post.id)
        .cloned()
        .collect();
    comments.sort_by_key(|c| c.id);
    let comment_count = comments.len();
    PostView {
        post,
        comments,
        comment_count,
    }
}

pub fn create<S: DocumentStore>(store: &mut S, new: NewPost) -> Result<PostView> {
    if new.title.trim().is_empty() {
        return Err(StoreError::Validation("missing field: title".into()));
    }

    let mut doc = store.load()?;
    if doc.user(new.user_id).is_none() {
        return Err(StoreError::not_found("user", new.user_id));
    }
    if doc.board(new.board_id).is_none() {
        return Err(StoreError::not_found("board", new.board_id));
    }

    let post = Post {
        id: next_id(doc.posts.iter().map(|p| p.id)),
        title: new.title,
        body: new.body,
        board_id: new.board_id,
        user_id: new.user_id,
        tags: new.tags,
        votes: 0,
        score: 0,
        removed: false,
        locked: false,
        sticky: false,
        created_at: Utc::now(),
        updated_at: None,
    };
    doc.posts.push(post.clone());
    sync_user_posts(&mut doc);
    store.save(&doc)?;
    Ok(view_of(&doc, post))
}

pub fn get<S: DocumentStore>(store: &S, id: u64) -> Result<PostView> {
    let doc = store.load()?;
    let post = doc
        .post(id)
        .cloned()
        .ok_or(StoreError::not_found("post", id))?;
    Ok(view_of(&doc, post))
}

pub fn list<S: DocumentStore>(
    store: &S,
    board_id: Option<u64>,
    limit: usize,
    cursor: Option<u64>,
) -> Result<Page<PostView>> {
    let doc = store.load()?;
    let mut posts: Vec<Post> = match board_id {
        Some(board_id) => doc
            .posts
            .iter()
            .filter(|p| p.board_id == board_id)
            .cloned()
            .collect(),
        None => doc.posts.clone(),
    };
    posts.sort_by_key(|p| p.id);
    let views: Vec<PostView> = posts.into_iter().map(|p| view_of(&doc, p)).collect();
    Ok(paginate(views, limit, cursor, |v| v.post.id))
}

pub fn update<S: DocumentStore>(store: &mut S, id: u64, patch: PostPatch) -> Result<PostView> {
    let mut doc = store.load()?;
    if let Some(board_id) = patch.board_id {
        // A dangling board reference would break the board delete cascade.
        if doc.board(board_id).is_none() {
            return Err(StoreError::not_found("board", board_id));
        }
    }
    let post = doc.post_mut(id).ok_or(StoreError::not_found("post", id))?;

    if let Some(title) = patch.title {
        post.title = title;
    }
    if let Some(body) = patch.body {
        post.body = body;
    }
    if let Some(board_id) = patch.board_id {
        post.board_id = board_id;
    }
    if let Some(tags) = patch.tags {
        post.tags = tags;
    }
    post.updated_at = Some(Utc::now());

    let post = post.clone();
    store.save(&doc)?;
    Ok(view_of(&doc, post))
}

/// Delete a post and cascade: its comments, every vote targeting the post
/// or those comments, and the owner's back-reference. Returns `Ok(false)`
/// if the post did not exist.
pub fn delete<S: DocumentStore>(store: &mut S, id: u64) -> Result<bool> {
    let mut doc = store.load()?;
    let before = doc.posts.len();
    doc.posts.retain(|p| p.id != id);
    if doc.posts.len() == before {
        return Ok(false);
    }

    let comment_ids: HashSet<u64> = doc
        .comments
        .iter()
        .filter(|c| c.post_id == id)
        .map(|c| c.id)
        .collect();

    doc.comments.retain(|c| c.post_id != id);
    doc.votes.retain(|v| {
        !((v.target_type == VoteTarget::Post && v.target_id == id)
            || (v.target_type == VoteTarget::Comment && comment_ids.contains(&v.target_id)))
    });

    sync_user_posts(&mut doc);
    store.save(&doc)?;
    Ok(true)
}
