use thiserror::Error;

#[derive(Error, Debug)]
pub enum HighlightError {
    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Page {page} not found (document has {page_count} pages)")]
    PageNotFound { page: u32, page_count: u32 },

    #[error("Invalid highlight record: {0}")]
    InvalidRecord(String),

    #[error("Duplicate highlight id: {0}")]
    DuplicateId(String),

    #[error("Unknown highlight color: {0}")]
    InvalidColor(String),

    #[error("An export is already in progress")]
    ExportInFlight,

    #[error("No document loaded")]
    NoDocument,

    #[error("Document changed while the export was running")]
    StaleDocument,

    #[error("Export failed: {0}")]
    ExportError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for HighlightError {
    fn from(err: serde_json::Error) -> Self {
        HighlightError::SerializationError(err.to_string())
    }
}
