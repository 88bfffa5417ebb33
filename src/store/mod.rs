//! # Storage Layer
//!
//! This module defines the storage abstraction for the forum document. The
//! [`DocumentStore`] trait allows the command layer to work with different
//! backends.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: production file-based storage. One JSON file holds
//!   the whole [`Document`]; saves go through a temp file and an atomic
//!   rename so a crash can never leave a partial document behind.
//!
//! - [`memory::InMemoryStore`]: in-memory storage for testing. No
//!   persistence, fast, isolated test execution.
//!
//! ## Granularity
//!
//! The unit of storage is the entire document. There are no partial or
//! delta writes: `save` replaces everything, and the unit of atomicity is
//! exactly one save. Callers are expected to run their whole
//! load–mutate–save cycle under a single lock (see [`crate::api::Forum`]).

use crate::error::Result;
use crate::model::Document;

pub mod fs;
pub mod memory;

/// Abstract interface for document storage.
pub trait DocumentStore {
    /// Load the full document, creating the backing resource (as an empty
    /// valid structure) if it does not exist yet.
    ///
    /// Implementations must not fail on corrupted content: the contract is
    /// to reset the backing resource to the empty structure and return it.
    fn load(&self) -> Result<Document>;

    /// Persist the full document. MUST be atomic with respect to process
    /// crashes (write to a temp location, then rename over the real one).
    fn save(&mut self, doc: &Document) -> Result<()>;
}
