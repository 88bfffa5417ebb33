//! Business logic for every store operation.
//!
//! Each module exposes free functions generic over [`DocumentStore`]
//! (`crate::store::DocumentStore`), one per operation. Every function runs
//! a full load–mutate–save cycle and returns plain Rust types; nothing in
//! here does I/O beyond the store round trip, assumes a caller, or writes
//! partial state on failure.
//!
//! Serializing concurrent cycles is the facade's job, not this layer's:
//! see [`crate::api::Forum`].

pub mod boards;
pub mod comments;
pub mod helpers;
pub mod moderation;
pub mod posts;
pub mod users;
pub mod votes;
