//! Document ingestion: corpus enumeration and .docx text extraction.

pub mod docx;
pub mod loader;

pub use loader::{load_documents, LoadReport, SkippedFile, SourceDocument};
