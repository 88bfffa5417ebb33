//! # Palaver
//!
//! Palaver is the persistence and integrity layer of a forum application.
//! It owns one denormalized JSON document — users, boards, posts, comments,
//! votes, and moderation records — and everything the surrounding service
//! cannot get wrong: atomic durability, referential integrity across
//! hand-rolled foreign keys, idempotent vote aggregation, and a moderation
//! state machine with an append-only audit trail. Routing, auth, and rate
//! limiting live above this crate and only talk to it through [`Forum`].
//!
//! ## The Three-Layer Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Serializes every load–mutate–save cycle behind one lock  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Pure business logic: CRUD, cascades, votes, moderation   │
//! │  - Operates on Rust types, returns Rust types               │
//! │  - No I/O beyond the store round trip                       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Abstract DocumentStore trait                             │
//! │  - FileStore (production), InMemoryStore (testing)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: the Document Is the Unit of Everything
//!
//! Storage holds exactly one serialized [`model::Document`]. Every public
//! operation loads it, mutates it in memory, and persists it atomically as
//! one unit; there are no partial writes and no cross-document
//! transactions. A corrupted file is reset to the empty structure on load
//! rather than failing the caller — availability over durability, by
//! documented contract.
//!
//! ## Testing Strategy
//!
//! 1. **Commands** (`commands/*.rs`): unit tests of the business logic
//!    against `InMemoryStore`. The lion's share of testing lives here.
//! 2. **Storage** (`store/fs.rs`, `tests/fs_store.rs`): durability,
//!    corruption self-healing, and atomic-write behavior on real files.
//! 3. **Facade** (`tests/forum_flow.rs`): end-to-end flows and concurrent
//!    callers against a shared `Forum`.
//!
//! ## Module Overview
//!
//! - [`api`]: the [`Forum`] facade — entry point for all operations
//! - [`commands`]: business logic for each operation
//! - [`store`]: storage abstraction and implementations
//! - [`model`]: the document and its record types
//! - [`page`]: cursor-style pagination
//! - [`error`]: error types

pub mod api;
pub mod commands;
pub mod error;
pub mod model;
pub mod page;
pub mod store;

pub use api::Forum;
pub use error::{Result, StoreError};
