//! Document discovery and text extraction.
//!
//! Ingestion input is a directory tree. Files whose extension is in the
//! allowed set (`.txt`, `.pdf`, `.docx`) are candidate documents; everything
//! else is skipped silently. Extraction failures on individual files are the
//! caller's to recover (the session logs and continues), so this module only
//! reports them.

use crate::error::{Result, RetrieverError};
use std::path::{Path, PathBuf};

/// Closed set of document formats the extractor recognizes.
///
/// Matching on this enum is exhaustive, so adding a format is a
/// compile-time-checked extension point rather than a string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Text,
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Map a path to its format by extension, or `None` for files that are
    /// not candidate documents.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("txt") => Some(Self::Text),
            Some("pdf") => Some(Self::Pdf),
            Some("docx") => Some(Self::Docx),
            _ => None,
        }
    }
}

/// Extract raw text from a stored file of a known format.
///
/// Plain text is decoded directly. PDF and DOCX decoding belongs to an
/// external extraction capability; until one is wired in, those formats
/// report [`RetrieverError::UnsupportedFormat`], which ingestion recovers
/// from by skipping the file.
pub async fn extract_text(path: &Path, format: DocumentFormat) -> Result<String> {
    match format {
        DocumentFormat::Text => Ok(tokio::fs::read_to_string(path).await?),
        DocumentFormat::Pdf => Err(RetrieverError::UnsupportedFormat {
            path: path.to_path_buf(),
            message: "PDF decoding requires an external extractor".to_string(),
        }),
        DocumentFormat::Docx => Err(RetrieverError::UnsupportedFormat {
            path: path.to_path_buf(),
            message: "DOCX decoding requires an external extractor".to_string(),
        }),
    }
}

/// Walk a directory tree and collect candidate document paths.
///
/// Paths are returned sorted so ingestion order (and therefore chunk
/// positions) is deterministic across runs. Unsupported extensions are
/// skipped without comment; unreadable directory entries are logged and
/// skipped.
pub fn scan_documents(root: &Path) -> Vec<(PathBuf, DocumentFormat)> {
    let mut documents = Vec::new();

    for entry in ignore::WalkBuilder::new(root).build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry under {}: {e}", root.display());
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(format) = DocumentFormat::from_path(path) {
            documents.push((path.to_path_buf(), format));
        }
    }

    documents.sort_by(|a, b| a.0.cmp(&b.0));
    documents
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("notes.txt")),
            Some(DocumentFormat::Text)
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("paper.PDF")),
            Some(DocumentFormat::Pdf)
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("report.docx")),
            Some(DocumentFormat::Docx)
        );
        assert_eq!(DocumentFormat::from_path(Path::new("image.png")), None);
        assert_eq!(DocumentFormat::from_path(Path::new("README")), None);
    }

    #[tokio::test]
    async fn test_extract_plain_text() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("doc.txt");
        tokio::fs::write(&path, "The sky is blue.").await?;

        let text = extract_text(&path, DocumentFormat::Text).await?;
        assert_eq!(text, "The sky is blue.");
        Ok(())
    }

    #[tokio::test]
    async fn test_extract_pdf_reports_unsupported() {
        let err = extract_text(Path::new("paper.pdf"), DocumentFormat::Pdf)
            .await
            .unwrap_err();
        assert!(matches!(err, RetrieverError::UnsupportedFormat { .. }));
    }

    #[tokio::test]
    async fn test_scan_documents_filters_and_sorts() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        tokio::fs::write(dir.path().join("b.txt"), "b").await?;
        tokio::fs::write(dir.path().join("a.txt"), "a").await?;
        tokio::fs::write(dir.path().join("skip.png"), [0u8; 4]).await?;
        tokio::fs::create_dir(dir.path().join("nested")).await?;
        tokio::fs::write(dir.path().join("nested/c.txt"), "c").await?;

        let documents = scan_documents(dir.path());
        let names: Vec<String> = documents
            .iter()
            .map(|(p, _)| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
        Ok(())
    }
}
