//! Document loading and text extraction.

use aipa_core::{AppError, AppResult};
use std::fs;
use std::path::Path;

/// Document format, detected from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    PlainText,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("pdf") => Self::Pdf,
            _ => Self::PlainText,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::PlainText => "text",
        }
    }
}

/// A loaded document ready for chunking.
#[derive(Debug, Clone)]
pub struct Document {
    /// File name shown to the user
    pub name: String,
    pub format: DocumentFormat,
    pub text: String,
}

impl Document {
    /// Load a PDF or text file.
    ///
    /// PDF pages are extracted in order and concatenated. Text that turns out
    /// to be blank is not an error here; indexing it reports the empty corpus.
    pub fn load(path: &Path) -> AppResult<Self> {
        let format = DocumentFormat::from_path(path);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let text = match format {
            DocumentFormat::Pdf => {
                let bytes = fs::read(path).map_err(|e| {
                    AppError::Retrieval(format!("Failed to read {:?}: {}", path, e))
                })?;
                extract_pdf_text(&bytes)?
            }
            DocumentFormat::PlainText => fs::read_to_string(path)
                .map_err(|e| AppError::Retrieval(format!("Failed to read {:?}: {}", path, e)))?,
        };

        tracing::debug!(
            "Loaded {} document {:?}: {} bytes of text",
            format.as_str(),
            name,
            text.len()
        );

        Ok(Self { name, format, text })
    }

    pub fn from_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            format: DocumentFormat::PlainText,
            text: text.into(),
        }
    }
}

/// Extract the text of every page of an in-memory PDF.
pub fn extract_pdf_text(bytes: &[u8]) -> AppResult<String> {
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| AppError::Retrieval(format!("Failed to extract PDF text: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("notes/Report.PDF")),
            DocumentFormat::Pdf
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("notes.md")),
            DocumentFormat::PlainText
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("README")),
            DocumentFormat::PlainText
        );
    }

    #[test]
    fn test_load_text_file() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "Cats are small.\nDogs are loyal.").unwrap();

        let document = Document::load(file.path()).unwrap();
        assert_eq!(document.format, DocumentFormat::PlainText);
        assert_eq!(document.text, "Cats are small.\nDogs are loyal.");
        assert!(document.name.ends_with(".txt"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Document::load(Path::new("/definitely/not/here.txt"));
        assert!(matches!(result, Err(AppError::Retrieval(_))));
    }
}
