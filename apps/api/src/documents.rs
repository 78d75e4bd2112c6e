//! Document source — loads resume and job-description text from disk.
//!
//! Any failure here ends the screening at the error exit, with the error's display text as
//! the reasoning summary, so messages are written for the person reading the result.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

/// Resume extensions the filesystem source can read.
pub const SUPPORTED_RESUME_FORMATS: &[&str] = &[".pdf", ".docx", ".txt", ".md"];

/// Body part of a WordprocessingML package.
const DOCX_DOCUMENT_PART: &str = "word/document.xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Resume,
    JobDescription,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Resume => f.write_str("Resume"),
            DocumentKind::JobDescription => f.write_str("Job description"),
        }
    }
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("{kind} file not found: {}", path.display())]
    NotFound { kind: DocumentKind, path: PathBuf },

    #[error("Unsupported resume format: {extension}. Supported formats: {}", SUPPORTED_RESUME_FORMATS.join(", "))]
    UnsupportedFormat { extension: String },

    #[error("{kind} file appears to be empty or could not be read.")]
    Empty { kind: DocumentKind },

    #[error("Failed to read {kind} file {}: {source}", path.display())]
    Read {
        kind: DocumentKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse resume: {0}")]
    Pdf(String),

    #[error("Failed to parse resume: {0}")]
    Docx(String),
}

/// Source of raw document text. Both operations fail on a missing file, an unsupported
/// format or empty content.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn load_candidate_text(&self, path: &Path) -> Result<String, DocumentError>;
    async fn load_requirement_text(&self, path: &Path) -> Result<String, DocumentError>;
}

/// Reads documents from the local filesystem. PDF text goes through `pdf-extract`, DOCX
/// paragraphs are read from the package's `word/document.xml`.
pub struct FsDocumentSource;

#[async_trait]
impl DocumentSource for FsDocumentSource {
    async fn load_candidate_text(&self, path: &Path) -> Result<String, DocumentError> {
        ensure_exists(path, DocumentKind::Resume).await?;

        let extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default();

        let text = match extension.as_str() {
            ".pdf" => extract_pdf_text(path.to_path_buf()).await?,
            ".docx" => extract_docx_text(path.to_path_buf()).await?,
            ".txt" | ".md" => read_text(path, DocumentKind::Resume).await?,
            _ => {
                return Err(DocumentError::UnsupportedFormat {
                    extension: if extension.is_empty() {
                        "(none)".to_string()
                    } else {
                        extension
                    },
                })
            }
        };

        non_empty(text, DocumentKind::Resume)
    }

    async fn load_requirement_text(&self, path: &Path) -> Result<String, DocumentError> {
        ensure_exists(path, DocumentKind::JobDescription).await?;
        let text = read_text(path, DocumentKind::JobDescription).await?;
        non_empty(text, DocumentKind::JobDescription)
    }
}

async fn ensure_exists(path: &Path, kind: DocumentKind) -> Result<(), DocumentError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(()),
        _ => Err(DocumentError::NotFound {
            kind,
            path: path.to_path_buf(),
        }),
    }
}

async fn read_text(path: &Path, kind: DocumentKind) -> Result<String, DocumentError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DocumentError::Read {
            kind,
            path: path.to_path_buf(),
            source,
        })
}

/// PDF parsing is CPU-bound, so it runs on the blocking pool.
async fn extract_pdf_text(path: PathBuf) -> Result<String, DocumentError> {
    tokio::task::spawn_blocking(move || pdf_extract::extract_text(&path))
        .await
        .map_err(|e| DocumentError::Pdf(format!("extraction task failed: {e}")))?
        .map_err(|e| DocumentError::Pdf(e.to_string()))
}

async fn extract_docx_text(path: PathBuf) -> Result<String, DocumentError> {
    tokio::task::spawn_blocking(move || read_docx(&path))
        .await
        .map_err(|e| DocumentError::Docx(format!("extraction task failed: {e}")))?
}

fn read_docx(path: &Path) -> Result<String, DocumentError> {
    let file = std::fs::File::open(path).map_err(|e| DocumentError::Docx(e.to_string()))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| DocumentError::Docx(e.to_string()))?;

    let mut xml = String::new();
    archive
        .by_name(DOCX_DOCUMENT_PART)
        .map_err(|e| DocumentError::Docx(format!("{DOCX_DOCUMENT_PART}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| DocumentError::Docx(e.to_string()))?;

    document_xml_text(&xml).map_err(|e| DocumentError::Docx(e.to_string()))
}

/// Concatenates the text runs of a `document.xml`, one line per paragraph.
fn document_xml_text(xml: &str) -> Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_run_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_run_text = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_run_text => text.push_str(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}

fn non_empty(text: String, kind: DocumentKind) -> Result<String, DocumentError> {
    if text.trim().is_empty() {
        Err(DocumentError::Empty { kind })
    } else {
        Ok(text)
    }
}
