//! Search-engine side of the docsync pipeline.
//!
//! - [`IndexWriter`]: upserts a batch of records by primary key and returns
//!   the engine's task handle
//! - [`SearchEngine`]: query and health access used by surrounding features
//! - [`MeiliClient`]: Meilisearch over HTTP
//! - [`MemoryIndex`]: in-memory upsert-by-key index for tests
//!
//! Submission is asynchronous on the engine side. A returned handle means
//! the batch was accepted, not that it is searchable.

mod error;
pub mod meili;
pub mod memory;
mod writer;

pub use error::{IndexError, IndexResult};
pub use meili::{MeiliClient, MeiliConfig};
pub use memory::MemoryIndex;
pub use writer::{IndexWriter, SearchEngine};
