// src/utils/error.rs
use thiserror::Error;

/// Configuration defects in a record type's declared schema.
/// Surfaced on first resolution of the type and cached from then on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Extractor '{extractor}' for field '{field}' not found in record type '{record}'")]
    MissingExtractor {
        record: &'static str,
        field: &'static str,
        extractor: String,
    },

    #[error("Extractor '{extractor}' is registered more than once in record type '{record}'")]
    DuplicateExtractor {
        record: &'static str,
        extractor: &'static str,
    },

    #[error("Extractor '{extractor}' yields {found} but field '{field}' of '{record}' expects {expected}")]
    TypeMismatch {
        record: &'static str,
        field: &'static str,
        extractor: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Cached schema for '{0}' has an unexpected type")]
    CacheConflict(&'static str),
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid title: {0}")]
    InvalidTitle(String),

    #[error("Unexpected cell shape: {0}")]
    UnexpectedShape(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("No data found: {0}")]
    NoData(String),

    #[error("Value for field '{0}' did not fit its slot")]
    SlotMismatch(&'static str),
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error: {0}")]
    Http(reqwest::StatusCode),

    #[error("Login failed: {0}")]
    Login(String),

    #[error("You must login before accessing the API")]
    NotLoggedIn,

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Riro interaction failed: {0}")]
    Client(#[from] ClientError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
