//! Text extraction from uploaded document payloads.
//!
//! The server accepts PDF and plain-text uploads. PDF bodies are parsed with the
//! `pdf-extract` crate; text bodies are decoded as UTF-8. Anything else is rejected
//! before the pipeline runs so that no completion calls are spent on payloads we
//! cannot read.

use thiserror::Error;

/// Errors raised while extracting text from an uploaded document.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Uploaded document type is not supported.
    #[error("Unsupported document type: {0}")]
    UnsupportedType(String),
    /// PDF body could not be parsed into text.
    #[error("Failed to extract text from PDF: {0}")]
    Pdf(String),
    /// Plain-text body was not valid UTF-8.
    #[error("Text document is not valid UTF-8: {0}")]
    InvalidEncoding(#[from] std::string::FromUtf8Error),
}

/// Document formats the server can extract text from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentKind {
    /// PDF document (`application/pdf`).
    Pdf,
    /// Plain UTF-8 text (`text/plain`).
    Text,
}

impl DocumentKind {
    /// Resolve the document kind from the uploaded content type and file name.
    ///
    /// The content type wins when it names a supported format; generic types such as
    /// `application/octet-stream` defer to the file extension.
    pub fn detect(
        content_type: Option<&str>,
        file_name: Option<&str>,
    ) -> Result<Self, ExtractionError> {
        if let Some(mime) = content_type {
            match canonicalize_mime(mime).as_str() {
                "application/pdf" => return Ok(Self::Pdf),
                "text/plain" | "text/markdown" => return Ok(Self::Text),
                "application/octet-stream" | "" => {}
                other => return Err(ExtractionError::UnsupportedType(other.to_string())),
            }
        }

        let extension = file_name
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, extension)| extension.to_ascii_lowercase());
        match extension.as_deref() {
            Some("pdf") => Ok(Self::Pdf),
            Some("txt" | "text" | "md") => Ok(Self::Text),
            _ => Err(ExtractionError::UnsupportedType(
                file_name.unwrap_or("<unnamed upload>").to_string(),
            )),
        }
    }
}

/// Extract the full text body from an uploaded document.
pub fn extract_text(kind: DocumentKind, bytes: &[u8]) -> Result<String, ExtractionError> {
    match kind {
        DocumentKind::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|error| ExtractionError::Pdf(error.to_string())),
        DocumentKind::Text => Ok(String::from_utf8(bytes.to_vec())?),
    }
}

fn canonicalize_mime(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_prefers_content_type() {
        let kind = DocumentKind::detect(Some("application/pdf"), Some("notes.txt"))
            .expect("supported kind");
        assert_eq!(kind, DocumentKind::Pdf);
    }

    #[test]
    fn detect_strips_mime_parameters() {
        let kind = DocumentKind::detect(Some("text/plain; charset=utf-8"), None)
            .expect("supported kind");
        assert_eq!(kind, DocumentKind::Text);
    }

    #[test]
    fn detect_falls_back_to_extension_for_generic_types() {
        let kind = DocumentKind::detect(Some("application/octet-stream"), Some("report.PDF"))
            .expect("supported kind");
        assert_eq!(kind, DocumentKind::Pdf);

        let kind = DocumentKind::detect(None, Some("README.md")).expect("supported kind");
        assert_eq!(kind, DocumentKind::Text);
    }

    #[test]
    fn detect_rejects_unsupported_types() {
        let error = DocumentKind::detect(Some("application/msword"), Some("legacy.doc"))
            .expect_err("unsupported");
        assert!(matches!(error, ExtractionError::UnsupportedType(name)
            if name == "application/msword"));

        let error = DocumentKind::detect(None, Some("archive.zip")).expect_err("unsupported");
        assert!(matches!(error, ExtractionError::UnsupportedType(_)));
    }

    #[test]
    fn extract_text_decodes_utf8() {
        let text =
            extract_text(DocumentKind::Text, "Hello, Docsum!".as_bytes()).expect("valid text");
        assert_eq!(text, "Hello, Docsum!");
    }

    #[test]
    fn extract_text_rejects_invalid_utf8() {
        let error = extract_text(DocumentKind::Text, &[0xff, 0xfe, 0x00]).expect_err("bad bytes");
        assert!(matches!(error, ExtractionError::InvalidEncoding(_)));
    }
}
