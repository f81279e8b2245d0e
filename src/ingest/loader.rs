//! Corpus loading: one `.docx` file becomes one source document.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::docx;
use crate::core::errors::ApiError;

const SUPPORTED_EXTENSION: &str = "docx";

/// Extracted content of one input file.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub text: String,
    /// File name, uniquely identifying provenance within an ingestion run.
    pub title: String,
}

/// A file that could not be ingested. Reported, never fatal to the batch.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub file: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct LoadReport {
    pub documents: Vec<SourceDocument>,
    pub skipped: Vec<SkippedFile>,
}

/// Loads every supported document under `data_dir`.
///
/// A missing directory yields an empty report with a logged warning; "no
/// documents" is a valid terminal state for the caller. Files that fail to
/// parse are skipped and reported individually.
pub fn load_documents(data_dir: &Path) -> LoadReport {
    let mut report = LoadReport::default();

    if !data_dir.is_dir() {
        tracing::warn!("data directory not found: {}", data_dir.display());
        return report;
    }

    let entries = match fs::read_dir(data_dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("failed to read data directory {}: {}", data_dir.display(), e);
            return report;
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case(SUPPORTED_EXTENSION))
                .unwrap_or(false)
        })
        .collect();
    paths.sort();

    for path in paths {
        let title = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        match docx::extract_text(&path) {
            Ok(text) if !text.trim().is_empty() => {
                report.documents.push(SourceDocument { text, title });
            }
            Ok(_) => {
                tracing::warn!("skipping {}: document contains no text", title);
                report.skipped.push(SkippedFile {
                    file: title,
                    reason: "document contains no text".to_string(),
                });
            }
            Err(e) => {
                tracing::warn!("skipping {}: {}", title, e);
                let reason = match e {
                    ApiError::Ingest { reason, .. } => reason,
                    other => other.to_string(),
                };
                report.skipped.push(SkippedFile {
                    file: title,
                    reason,
                });
            }
        }
    }

    report
}
