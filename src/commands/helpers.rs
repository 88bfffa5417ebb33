use crate::model::Document;

/// Next unique id within a collection: max existing id + 1, or 1 if empty.
pub fn next_id(ids: impl Iterator<Item = u64>) -> u64 {
    ids.max().unwrap_or(0) + 1
}

/// Normalize an email for storage and comparison: trimmed, lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Recompute every user's denormalized `posts` list from the posts
/// collection. Called after any mutation that touches posts or users, so
/// the back-reference is a derived view instead of something patched by
/// hand in multiple places.
pub fn sync_user_posts(doc: &mut Document) {
    for user in &mut doc.users {
        let mut ids: Vec<u64> = doc
            .posts
            .iter()
            .filter(|p| p.user_id == user.id)
            .map(|p| p.id)
            .collect();
        ids.sort_unstable();
        user.posts = ids;
    }
}
