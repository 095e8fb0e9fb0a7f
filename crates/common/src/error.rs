use thiserror::Error;

// Custom Result type alias for convenient use across the project
pub type Result<T> = std::result::Result<T, CodegenError>;

#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Unable to find {0} message")]
    AnchorMessageNotFound(String),

    #[error("Unable to find {0}")]
    AnchorOneofNotFound(String),

    #[error("Unable to determine Go import path for {0}")]
    MissingGoPackage(String),

    #[error("File to generate not found in request: {0}")]
    UnknownFile(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] prost::DecodeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
