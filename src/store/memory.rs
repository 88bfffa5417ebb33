use super::DocumentStore;
use crate::error::Result;
use crate::model::Document;

/// In-memory storage for testing and development.
/// Does NOT persist data.
#[derive(Default)]
pub struct InMemoryStore {
    doc: Document,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for InMemoryStore {
    fn load(&self) -> Result<Document> {
        Ok(self.doc.clone())
    }

    fn save(&mut self, doc: &Document) -> Result<()> {
        self.doc = doc.clone();
        Ok(())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::commands::{boards, comments, posts, users};
    use crate::model::{NewBoard, NewComment, NewPost, NewUser};

    /// Builder that seeds an [`InMemoryStore`] through the real command
    /// layer, so fixture data always satisfies the document invariants.
    #[derive(Default)]
    pub struct StoreFixture {
        pub store: InMemoryStore,
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_board(mut self, name: &str) -> Self {
            boards::create(
                &mut self.store,
                NewBoard {
                    name: name.to_string(),
                    description: String::new(),
                },
            )
            .unwrap();
            self
        }

        pub fn with_user(mut self, username: &str, email: &str) -> Self {
            users::create(
                &mut self.store,
                NewUser {
                    username: username.to_string(),
                    email: email.to_string(),
                    ..NewUser::default()
                },
            )
            .unwrap();
            self
        }

        pub fn with_post(mut self, title: &str, board_id: u64, user_id: u64) -> Self {
            posts::create(
                &mut self.store,
                NewPost {
                    title: title.to_string(),
                    body: "body".to_string(),
                    board_id,
                    user_id,
                    tags: Vec::new(),
                },
            )
            .unwrap();
            self
        }

        pub fn with_comment(mut self, body: &str, post_id: u64, user_id: u64) -> Self {
            comments::create(
                &mut self.store,
                NewComment {
                    body: body.to_string(),
                    post_id,
                    user_id,
                },
            )
            .unwrap();
            self
        }
    }
}
