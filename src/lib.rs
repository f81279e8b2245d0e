//! Document QA backend: indexes a directory of .docx files into a
//! persisted vector store and answers questions grounded on the most
//! similar chunks.

pub mod core;
pub mod ingest;
pub mod llm;
pub mod rag;
pub mod server;
pub mod state;
