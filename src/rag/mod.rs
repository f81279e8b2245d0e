//! Retrieval pipeline: chunking, the persisted vector index, index
//! builds, and query answering.

pub mod answerer;
pub mod chunker;
pub mod indexer;
pub mod sqlite;
pub mod store;

pub use answerer::{Answer, Answerer, NO_MATCH_MESSAGE};
pub use chunker::{Chunk, Chunker};
pub use indexer::{rebuild_index, IndexReport};
pub use sqlite::SqliteVectorStore;
pub use store::{IndexStats, IndexedChunk, SearchResult, VectorStore};
