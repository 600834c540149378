//! Error types for the pdfthumb rendering engine.
//!
//! `PdfError` covers structural and decoding failures inside the engine.
//! `OpenError` and `RenderError` are the public taxonomy returned by the
//! high-level API.

use thiserror::Error;

/// Primary error type for PDF parsing and interpretation.
#[derive(Error, Debug)]
pub enum PdfError {
    #[error("invalid token at position {pos}: {msg}")]
    TokenError { pos: usize, msg: String },

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("type error: expected {expected}, got {got}")]
    TypeError {
        expected: &'static str,
        got: &'static str,
    },

    #[error("key not found: {0}")]
    KeyError(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF object not found: {0}")]
    ObjectNotFound(u32),

    #[error("circular reference detected for obj {0}")]
    CircularReference(u32),

    #[error("no valid xref table found")]
    NoValidXRef,

    #[error("PDF syntax error: {0}")]
    SyntaxError(String),

    #[error("malformed object at offset {pos}: {msg}")]
    MalformedObject { pos: usize, msg: String },

    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("decode error: {0}")]
    DecodeError(String),

    #[error("unsupported filter: {0}")]
    UnsupportedFilter(String),

    #[error("encryption error: {0}")]
    EncryptionError(String),

    #[error("operand stack underflow: `{operator}` needs {expected} operands, found {found}")]
    OperandUnderflow {
        operator: String,
        expected: usize,
        found: usize,
    },

    #[error("operand type mismatch for `{operator}`: expected {expected}")]
    OperandType {
        operator: String,
        expected: &'static str,
    },

    #[error("page index {index} is out of range, document has {page_count} pages")]
    InvalidPageIndex { index: i64, page_count: usize },
}

/// Convenience Result type alias for PdfError.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Failure to open a document at all.
#[derive(Error, Debug)]
pub enum OpenError {
    #[error("file not found: {0}")]
    NotFound(String),

    #[error("not a PDF document: {0}")]
    NotAPdf(String),

    #[error("document is encrypted and cannot be opened: {0}")]
    Encrypted(String),

    #[error("io error: {0}")]
    Io(#[source] std::io::Error),
}

impl From<PdfError> for OpenError {
    fn from(err: PdfError) -> Self {
        match err {
            PdfError::EncryptionError(msg) => Self::Encrypted(msg),
            PdfError::Io(io) => Self::Io(io),
            other => Self::NotAPdf(other.to_string()),
        }
    }
}

impl From<std::io::Error> for OpenError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(err.to_string())
        } else {
            Self::Io(err)
        }
    }
}

/// Failure to render one page.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("page index {index} is out of range, document has {page_count} pages")]
    InvalidPageIndex { index: i64, page_count: usize },

    #[error("page {page} could not be interpreted: {source}")]
    Interpreter {
        page: usize,
        #[source]
        source: PdfError,
    },

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("malformed document: {0}")]
    MalformedDocument(String),
}

impl RenderError {
    pub(crate) fn interpreter(page: usize, source: PdfError) -> Self {
        match source {
            PdfError::MalformedDocument(msg) => Self::MalformedDocument(msg),
            PdfError::InvalidPageIndex { index, page_count } => {
                Self::InvalidPageIndex { index, page_count }
            }
            source => Self::Interpreter { page, source },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encryption_failure_maps_to_encrypted() {
        let err: OpenError = PdfError::EncryptionError("Incorrect password".into()).into();
        assert!(matches!(err, OpenError::Encrypted(_)));
    }

    #[test]
    fn missing_file_maps_to_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: OpenError = io.into();
        assert!(matches!(err, OpenError::NotFound(_)));
    }

    #[test]
    fn xref_failure_maps_to_not_a_pdf() {
        let err: OpenError = PdfError::NoValidXRef.into();
        assert!(matches!(err, OpenError::NotAPdf(_)));
    }

    #[test]
    fn malformed_document_keeps_its_kind() {
        let err = RenderError::interpreter(0, PdfError::MalformedDocument("cycle".into()));
        assert!(matches!(err, RenderError::MalformedDocument(_)));
    }
}
