use thiserror::Error;

#[derive(Error, Debug)]
pub enum DigestError {
    /// Business-logic storage errors (missing schema, bad row shape, etc.)
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Config error: {0}")]
    Config(String),

    /// The delivery channel could not be reached or rejected a chunk.
    #[error("Delivery error: {0}")]
    Delivery(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Raw database errors from rusqlite
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Date parse errors from chrono
    #[error("Date parse error: {0}")]
    DateParse(#[from] chrono::ParseError),
}

pub type DigestResult<T> = Result<T, DigestError>;

/// Failure modes of the optional narrative service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Narrative service not configured")]
    NotConfigured,

    /// Network trouble, 5xx, malformed reply. Worth trying again later.
    #[error("Narrative service error: {0}")]
    Transient(String),

    /// Rate limit or exhausted quota. Trips the circuit breaker.
    #[error("Narrative service quota exceeded: {0}")]
    QuotaExceeded(String),
}
