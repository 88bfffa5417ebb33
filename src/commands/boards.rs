use crate::commands::helpers::{next_id, sync_user_posts};
use crate::error::{Result, StoreError};
use crate::model::{Board, BoardPatch, BoardView, Document, NewBoard, VoteTarget};
use crate::page::{paginate, Page};
use crate::store::DocumentStore;
use chrono::Utc;
use std::collections::HashSet;

fn view_of(doc: &Document, board: Board) -> BoardView {
    let post_count = doc.posts.iter().filter(|p| p.board_id == board.id).count();
    BoardView { board, post_count }
}

pub fn create<S: DocumentStore>(store: &mut S, new: NewBoard) -> Result<Board> {
    if new.name.trim().is_empty() {
        return Err(StoreError::Validation("missing field: name".into()));
    }

    let mut doc = store.load()?;
    let board = Board {
        id: next_id(doc.boards.iter().map(|b| b.id)),
        name: new.name,
        description: new.description,
        created_at: Utc::now(),
        updated_at: None,
    };
    doc.boards.push(board.clone());
    store.save(&doc)?;
    Ok(board)
}

pub fn get<S: DocumentStore>(store: &S, id: u64) -> Result<BoardView> {
    let doc = store.load()?;
    let board = doc
        .board(id)
        .cloned()
        .ok_or(StoreError::not_found("board", id))?;
    Ok(view_of(&doc, board))
}

pub fn list<S: DocumentStore>(
    store: &S,
    limit: usize,
    cursor: Option<u64>,
) -> Result<Page<BoardView>> {
    let doc = store.load()?;
    let mut boards = doc.boards.clone();
    boards.sort_by_key(|b| b.id);
    let views: Vec<BoardView> = boards.into_iter().map(|b| view_of(&doc, b)).collect();
    Ok(paginate(views, limit, cursor, |v| v.board.id))
}

pub fn update<S: DocumentStore>(store: &mut S, id: u64, patch: BoardPatch) -> Result<Board> {
    let mut doc = store.load()?;
    let board = doc.board_mut(id).ok_or(StoreError::not_found("board", id))?;

    if let Some(name) = patch.name {
        board.name = name;
    }
    if let Some(description) = patch.description {
        board.description = description;
    }
    board.updated_at = Some(Utc::now());

    let board = board.clone();
    store.save(&doc)?;
    Ok(board)
}

/// Delete a board and cascade: all posts on it, all comments on those posts,
/// and every vote targeting any of them. Returns `Ok(false)` if the board
/// did not exist.
pub fn delete<S: DocumentStore>(store: &mut S, id: u64) -> Result<bool> {
    let mut doc = store.load()?;
    let before = doc.boards.len();
    doc.boards.retain(|b| b.id != id);
    if doc.boards.len() == before {
        return Ok(false);
    }

    let post_ids: HashSet<u64> = doc
        .posts
        .iter()
        .filter(|p| p.board_id == id)
        .map(|p| p.id)
        .collect();
    let comment_ids: HashSet<u64> = doc
        .comments
        .iter()
        .filter(|c| post_ids.contains(&c.post_id))
        .map(|c| c.id)
        .collect();

    doc.posts.retain(|p| p.board_id != id);
    doc.comments.retain(|c| !post_ids.contains(&c.post_id));
    doc.votes.retain(|v| {
        !((v.target_type == VoteTarget::Post && post_ids.contains(&v.target_id))
            || (v.target_type == VoteTarget::Comment && comment_ids.contains(&v.target_id)))
    });

    sync_user_posts(&mut doc);
    store.save(&doc)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{comments, posts, users, votes};
    use crate::model::{NewComment, NewPost, NewUser};
    use crate::store::memory::InMemoryStore;

    fn seeded() -> InMemoryStore {
        let mut store = InMemoryStore::new();
        create(
            &mut store,
            NewBoard {
                name: "General".into(),
                description: "talk".into(),
            },
        )
        .unwrap();
        users::create(
            &mut store,
            NewUser {
                username: "alice".into(),
                email: "alice@x.com".into(),
                ..NewUser::default()
            },
        )
        .unwrap();
        store
    }

    #[test]
    fn create_requires_name() {
        let mut store = InMemoryStore::new();
        let err = create(
            &mut store,
            NewBoard {
                name: " ".into(),
                description: String::new(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::Validation(msg) if msg.contains("name")));
    }

    #[test]
    fn get_includes_derived_post_count() {
        let mut store = seeded();
        assert_eq!(get(&store, 1).unwrap().post_count, 0);

        posts::create(
            &mut store,
            NewPost {
                title: "Hi".into(),
                body: "x".into(),
                board_id: 1,
                user_id: 1,
                tags: Vec::new(),
            },
        )
        .unwrap();
        assert_eq!(get(&store, 1).unwrap().post_count, 1);
    }

    #[test]
    fn update_is_partial() {
        let mut store = seeded();
        let board = update(
            &mut store,
            1,
            BoardPatch {
                description: Some("rules".into()),
                ..BoardPatch::default()
            },
        )
        .unwrap();
        assert_eq!(board.name, "General");
        assert_eq!(board.description, "rules");
    }

    #[test]
    fn delete_cascades_posts_comments_and_votes() {
        let mut store = seeded();
        posts::create(
            &mut store,
            NewPost {
                title: "Hi".into(),
                body: "x".into(),
                board_id: 1,
                user_id: 1,
                tags: Vec::new(),
            },
        )
        .unwrap();
        comments::create(
            &mut store,
            NewComment {
                body: "first".into(),
                post_id: 1,
                user_id: 1,
            },
        )
        .unwrap();
        votes::apply_vote(&mut store, 1, "post", 1, 1).unwrap();
        votes::apply_vote(&mut store, 1, "comment", 1, -1).unwrap();

        assert!(delete(&mut store, 1).unwrap());
        assert!(get(&store, 1).is_err());
        assert!(posts::get(&store, 1).is_err());
        assert!(comments::get(&store, 1).is_err());

        let doc = crate::store::DocumentStore::load(&store).unwrap();
        assert!(doc.votes.is_empty());
        // The owner's denormalized post list was resynced.
        assert!(doc.user(1).unwrap().posts.is_empty());
    }

    #[test]
    fn delete_missing_board_returns_false() {
        let mut store = InMemoryStore::new();
        assert!(!delete(&mut store, 9).unwrap());
    }
}
