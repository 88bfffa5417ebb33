//! The vote ledger: at most one vote row per (user, target), aggregate
//! score recomputed from scratch after every mutation.
//!
//! The recompute-over-all-rows design is deliberate. Incremental +/-1
//! deltas drift when prior state was hand-edited or reset after
//! corruption; recounting the rows for the exact target makes the
//! denormalized `votes`/`score` cache self-correcting at the cost of O(n)
//! work per vote.

use crate::commands::helpers::next_id;
use crate::error::{Result, StoreError};
use crate::model::{Document, Vote, VoteTarget};
use crate::store::DocumentStore;
use chrono::Utc;
use serde::Serialize;

/// Result of applying a vote.
#[derive(Debug, Clone, Serialize)]
pub struct VoteReceipt {
    pub target_type: VoteTarget,
    pub target_id: u64,
    /// The value that was requested (0 means the vote was withdrawn).
    pub value: i32,
    pub score: i64,
    pub upvotes: usize,
    pub downvotes: usize,
}

/// Aggregate standings for one target.
#[derive(Debug, Clone, Serialize)]
pub struct VoteSummary {
    pub target_type: VoteTarget,
    pub target_id: u64,
    pub score: i64,
    pub upvotes: usize,
    pub downvotes: usize,
    /// The asking user's current vote, when a user id was supplied.
    pub user_vote: Option<i32>,
}

fn aggregate(votes: &[Vote], target_type: VoteTarget, target_id: u64) -> (i64, usize, usize) {
    let rows = votes
        .iter()
        .filter(|v| v.target_type == target_type && v.target_id == target_id);
    let mut upvotes = 0;
    let mut downvotes = 0;
    for vote in rows {
        match vote.value {
            1 => upvotes += 1,
            -1 => downvotes += 1,
            _ => {}
        }
    }
    (upvotes as i64 - downvotes as i64, upvotes, downvotes)
}

fn target_exists(doc: &Document, target_type: VoteTarget, target_id: u64) -> bool {
    match target_type {
        VoteTarget::Post => doc.post(target_id).is_some(),
        VoteTarget::Comment => doc.comment(target_id).is_some(),
    }
}

fn target_kind(target_type: VoteTarget) -> &'static str {
    match target_type {
        VoteTarget::Post => "post",
        VoteTarget::Comment => "comment",
    }
}

/// Write the recomputed score back onto the target's denormalized fields.
fn write_back(doc: &mut Document, target_type: VoteTarget, target_id: u64, score: i64) {
    match target_type {
        VoteTarget::Post => {
            if let Some(post) = doc.post_mut(target_id) {
                post.votes = score;
                post.score = score;
            }
        }
        VoteTarget::Comment => {
            if let Some(comment) = doc.comment_mut(target_id) {
                comment.votes = score;
                comment.score = score;
            }
        }
    }
}

/// Upsert (or withdraw, for `value == 0`) the caller's vote on one target.
///
/// A value of zero removes the row entirely: "no vote" is the absence of a
/// row, never a stored zero. Applying the same nonzero value twice is
/// idempotent with respect to the aggregate.
pub fn apply_vote<S: DocumentStore>(
    store: &mut S,
    user_id: u64,
    target_type: &str,
    target_id: u64,
    value: i32,
) -> Result<VoteReceipt> {
    if !matches!(value, -1 | 0 | 1) {
        return Err(StoreError::Validation(
            "value must be -1, 0, or 1".to_string(),
        ));
    }
    let target_type: VoteTarget = target_type.parse()?;

    let mut doc = store.load()?;
    if !target_exists(&doc, target_type, target_id) {
        return Err(StoreError::not_found(target_kind(target_type), target_id));
    }

    let existing = doc.votes.iter().position(|v| {
        v.user_id == user_id && v.target_type == target_type && v.target_id == target_id
    });

    if value == 0 {
        if let Some(pos) = existing {
            doc.votes.remove(pos);
        }
    } else {
        let now = Utc::now();
        match existing {
            Some(pos) => {
                doc.votes[pos].value = value;
                doc.votes[pos].updated_at = now;
            }
            None => {
                let vote = Vote {
                    id: next_id(doc.votes.iter().map(|v| v.id)),
                    user_id,
                    target_type,
                    target_id,
                    value,
                    created_at: now,
                    updated_at: now,
                };
                doc.votes.push(vote);
            }
        }
    }

    let (score, upvotes, downvotes) = aggregate(&doc.votes, target_type, target_id);
    write_back(&mut doc, target_type, target_id, score);
    store.save(&doc)?;

    Ok(VoteReceipt {
        target_type,
        target_id,
        value,
        score,
        upvotes,
        downvotes,
    })
}

pub fn summary<S: DocumentStore>(
    store: &S,
    target_type: &str,
    target_id: u64,
    user_id: Option<u64>,
) -> Result<VoteSummary> {
    let target_type: VoteTarget = target_type.parse()?;
    let doc = store.load()?;
    if !target_exists(&doc, target_type, target_id) {
        return Err(StoreError::not_found(target_kind(target_type), target_id));
    }

    let (score, upvotes, downvotes) = aggregate(&doc.votes, target_type, target_id);
    let user_vote = user_id.and_then(|user_id| {
        doc.votes
            .iter()
            .find(|v| {
                v.user_id == user_id && v.target_type == target_type && v.target_id == target_id
            })
            .map(|v| v.value)
    });

    Ok(VoteSummary {
        target_type,
        target_id,
        score,
        upvotes,
        downvotes,
        user_vote,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::memory::InMemoryStore;
    use crate::store::DocumentStore as _;

    fn seeded() -> InMemoryStore {
        StoreFixture::new()
            .with_board("General")
            .with_user("alice", "alice@x.com")
            .with_user("bob", "bob@x.com")
            .with_post("Hi", 1, 1)
            .with_comment("first", 1, 2)
            .store
    }

    #[test]
    fn upvote_then_downvote_overwrites_single_row() {
        let mut store = seeded();
        let receipt = apply_vote(&mut store, 2, "post", 1, 1).unwrap();
        assert_eq!(receipt.score, 1);

        let receipt = apply_vote(&mut store, 2, "post", 1, -1).unwrap();
        assert_eq!(receipt.score, -1);
        assert_eq!(receipt.upvotes, 0);
        assert_eq!(receipt.downvotes, 1);

        let doc = store.load().unwrap();
        assert_eq!(doc.votes.len(), 1);
    }

    #[test]
    fn repeated_same_vote_is_idempotent() {
        let mut store = seeded();
        apply_vote(&mut store, 2, "post", 1, 1).unwrap();
        let receipt = apply_vote(&mut store, 2, "post", 1, 1).unwrap();

        assert_eq!(receipt.score, 1);
        let doc = store.load().unwrap();
        assert_eq!(doc.votes.len(), 1);
    }

    #[test]
    fn zero_removes_the_row_and_is_a_noop_when_absent() {
        let mut store = seeded();
        apply_vote(&mut store, 2, "post", 1, 1).unwrap();
        let receipt = apply_vote(&mut store, 2, "post", 1, 0).unwrap();
        assert_eq!(receipt.score, 0);
        assert!(store.load().unwrap().votes.is_empty());

        let summary = summary(&store, "post", 1, Some(2)).unwrap();
        assert_eq!(summary.user_vote, None);

        // Withdrawing again is fine.
        apply_vote(&mut store, 2, "post", 1, 0).unwrap();
    }

    #[test]
    fn score_is_written_back_onto_the_target() {
        let mut store = seeded();
        apply_vote(&mut store, 1, "post", 1, 1).unwrap();
        apply_vote(&mut store, 2, "post", 1, 1).unwrap();

        let doc = store.load().unwrap();
        assert_eq!(doc.post(1).unwrap().score, 2);
        assert_eq!(doc.post(1).unwrap().votes, 2);

        apply_vote(&mut store, 1, "comment", 1, -1).unwrap();
        let doc = store.load().unwrap();
        assert_eq!(doc.comment(1).unwrap().score, -1);
    }

    #[test]
    fn recompute_corrects_hand_edited_aggregates() {
        let mut store = seeded();
        let mut doc = store.load().unwrap();
        doc.post_mut(1).unwrap().score = 999;
        store.save(&doc).unwrap();

        apply_vote(&mut store, 2, "post", 1, 1).unwrap();
        assert_eq!(store.load().unwrap().post(1).unwrap().score, 1);
    }

    #[test]
    fn rejects_bad_value_and_bad_target_type() {
        let mut store = seeded();
        assert!(matches!(
            apply_vote(&mut store, 2, "post", 1, 5).unwrap_err(),
            StoreError::Validation(_)
        ));
        assert!(matches!(
            apply_vote(&mut store, 2, "board", 1, 1).unwrap_err(),
            StoreError::Validation(_)
        ));
    }

    #[test]
    fn missing_target_fails_and_creates_no_row() {
        let mut store = seeded();
        let err = apply_vote(&mut store, 2, "comment", 99, 1).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: "comment", .. }));
        assert!(store.load().unwrap().votes.is_empty());

        assert!(summary(&store, "comment", 99, None).is_err());
    }

    #[test]
    fn target_type_is_case_insensitive() {
        let mut store = seeded();
        apply_vote(&mut store, 2, "POST", 1, 1).unwrap();
        let summary = summary(&store, "Post", 1, Some(2)).unwrap();
        assert_eq!(summary.user_vote, Some(1));
    }
}
