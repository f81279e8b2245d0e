//! Plain-text extraction for .docx files.
//!
//! A .docx is a zip container; the document body lives in
//! `word/document.xml`. Text is carried by `w:t` runs grouped into `w:p`
//! paragraphs, which we join with newlines.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::core::errors::ApiError;

const DOCUMENT_ENTRY: &str = "word/document.xml";

/// Extract the paragraph text of a single .docx file.
pub fn extract_text(path: &Path) -> Result<String, ApiError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let file = File::open(path).map_err(|e| ApiError::ingest(&file_name, e))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| ApiError::ingest(&file_name, e))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_ENTRY)
        .map_err(|e| ApiError::ingest(&file_name, e))?
        .read_to_string(&mut xml)
        .map_err(|e| ApiError::ingest(&file_name, e))?;

    parse_document_xml(&xml).map_err(|e| ApiError::ingest(&file_name, e))
}

/// Pull paragraph texts out of a WordprocessingML body.
pub(crate) fn parse_document_xml(xml: &str) -> Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);

    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut buf = Vec::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"t" => in_text_run = true,
                _ => {}
            },
            Event::Empty(ref e) => match e.local_name().as_ref() {
                b"tab" => current.push('\t'),
                b"br" | b"cr" => current.push('\n'),
                _ => {}
            },
            Event::Text(e) => {
                if in_text_run {
                    current.push_str(&e.unescape()?);
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    // An unterminated trailing run still counts as a paragraph.
    if !current.is_empty() {
        paragraphs.push(current);
    }

    Ok(paragraphs.join("\n"))
}
