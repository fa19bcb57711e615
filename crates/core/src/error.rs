use thiserror::Error;

#[derive(Error, Debug)]
pub enum ThresherError {
    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("Comparator '{0}' cannot be evaluated against a document count")]
    NonNumericCountComparator(String),

    #[error("Search request failed: {0}")]
    Search(String),

    #[error("Malformed search response: {0}")]
    Response(String),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ThresherError>;
