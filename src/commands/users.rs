use crate::commands::helpers::{next_id, normalize_email, sync_user_posts};
use crate::error::{Result, StoreError};
use crate::model::{NewUser, Role, User, UserPatch, VoteTarget};
use crate::page::{paginate, Page};
use crate::store::DocumentStore;
use chrono::Utc;
use std::collections::HashSet;

pub fn create<S: DocumentStore>(store: &mut S, new: NewUser) -> Result<User> {
    if new.username.trim().is_empty() {
        return Err(StoreError::Validation("missing field: username".into()));
    }
    if new.email.trim().is_empty() {
        return Err(StoreError::Validation("missing field: email".into()));
    }

    let mut doc = store.load()?;
    let email = normalize_email(&new.email);
    if doc.users.iter().any(|u| normalize_email(&u.email) == email) {
        return Err(StoreError::Conflict(format!(
            "email already in use: {}",
            email
        )));
    }
    if doc.users.iter().any(|u| u.username == new.username) {
        return Err(StoreError::Conflict(format!(
            "username already taken: {}",
            new.username
        )));
    }

    let user = User {
        id: next_id(doc.users.iter().map(|u| u.id)),
        username: new.username,
        email,
        password_hash: new.password_hash,
        display_name: new.display_name,
        bio: new.bio,
        roles: vec![Role::User],
        is_active: true,
        posts: Vec::new(),
        removed: false,
        banned: false,
        shadowbanned: false,
        created_at: Utc::now(),
        updated_at: None,
    };
    doc.users.push(user.clone());
    store.save(&doc)?;
    Ok(user)
}

pub fn get<S: DocumentStore>(store: &S, id: u64) -> Result<User> {
    let doc = store.load()?;
    doc.user(id)
        .cloned()
        .ok_or(StoreError::not_found("user", id))
}

pub fn list<S: DocumentStore>(store: &S, limit: usize, cursor: Option<u64>) -> Result<Page<User>> {
    let doc = store.load()?;
    let mut users = doc.users;
    users.sort_by_key(|u| u.id);
    Ok(paginate(users, limit, cursor, |u| u.id))
}

pub fn find_by_email<S: DocumentStore>(store: &S, email: &str) -> Result<Option<User>> {
    let doc = store.load()?;
    let target = normalize_email(email);
    Ok(doc
        .users
        .iter()
        .find(|u| normalize_email(&u.email) == target)
        .cloned())
}

pub fn find_by_username<S: DocumentStore>(store: &S, username: &str) -> Result<Option<User>> {
    let doc = store.load()?;
    Ok(doc.users.iter().find(|u| u.username == username).cloned())
}

pub fn update<S: DocumentStore>(store: &mut S, id: u64, patch: UserPatch) -> Result<User> {
    let mut doc = store.load()?;
    let pos = doc
        .users
        .iter()
        .position(|u| u.id == id)
        .ok_or(StoreError::not_found("user", id))?;

    if let Some(email) = &patch.email {
        let email = normalize_email(email);
        if normalize_email(&doc.users[pos].email) != email {
            let taken = doc
                .users
                .iter()
                .any(|u| u.id != id && normalize_email(&u.email) == email);
            if taken {
                return Err(StoreError::Conflict(format!(
                    "email already in use: {}",
                    email
                )));
            }
            doc.users[pos].email = email;
        }
    }
    if let Some(username) = patch.username {
        doc.users[pos].username = username;
    }
    if let Some(display_name) = patch.display_name {
        doc.users[pos].display_name = Some(display_name);
    }
    if let Some(bio) = patch.bio {
        doc.users[pos].bio = Some(bio);
    }
    doc.users[pos].updated_at = Some(Utc::now());

    let user = doc.users[pos].clone();
    store.save(&doc)?;
    Ok(user)
}

/// Replace the role set for a user. The base role is always retained.
pub fn update_roles<S: DocumentStore>(store: &mut S, id: u64, roles: &[Role]) -> Result<User> {
    let mut doc = store.load()?;
    let user = doc.user_mut(id).ok_or(StoreError::not_found("user", id))?;

    let mut safe = vec![Role::User];
    for role in roles {
        if !safe.contains(role) {
            safe.push(*role);
        }
    }
    user.roles = safe;
    user.updated_at = Some(Utc::now());

    let user = user.clone();
    store.save(&doc)?;
    Ok(user)
}

/// Store a new (already hashed) credential for a user.
pub fn update_password<S: DocumentStore>(store: &mut S, id: u64, new_hash: String) -> Result<()> {
    let mut doc = store.load()?;
    let user = doc.user_mut(id).ok_or(StoreError::not_found("user", id))?;
    user.password_hash = Some(new_hash);
    user.updated_at = Some(Utc::now());
    store.save(&doc)?;
    Ok(())
}

/// Delete a user and cascade: their posts and comments go too, along with
/// every vote cast by the user or targeting any of the removed records.
/// Returns `Ok(false)` if the user did not exist.
pub fn delete<S: DocumentStore>(store: &mut S, id: u64) -> Result<bool> {
    let mut doc = store.load()?;
    let before = doc.users.len();
    doc.users.retain(|u| u.id != id);
    if doc.users.len() == before {
        return Ok(false);
    }

    // Collect ids before removing anything the vote sweep needs.
    let post_ids: HashSet<u64> = doc
        .posts
        .iter()
        .filter(|p| p.user_id == id)
        .map(|p| p.id)
        .collect();
    let comment_ids: HashSet<u64> = doc
        .comments
        .iter()
        .filter(|c| c.user_id == id)
        .map(|c| c.id)
        .collect();

    doc.posts.retain(|p| p.user_id != id);
    doc.comments.retain(|c| c.user_id != id);
    doc.votes.retain(|v| {
        !(v.user_id == id
            || (v.target_type == VoteTarget::Post && post_ids.contains(&v.target_id))
            || (v.target_type == VoteTarget::Comment && comment_ids.contains(&v.target_id)))
    });

    sync_user_posts(&mut doc);
    store.save(&doc)?;
    Ok(true)
}
