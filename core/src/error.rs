use thiserror::Error;

#[derive(Error, Debug)]
pub enum PromoError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing columns. Trip missing: {trip:?}; Patron missing: {patron:?}")]
    MissingColumns { trip: Vec<String>, patron: Vec<String> },

    #[error("Source '{source_name}' has no data rows")]
    EmptySource { source_name: String },

    #[error("Unknown promotion '{name}'")]
    UnknownPromotion { name: String },

    #[error("Invalid campaign request: {reason}")]
    InvalidRequest { reason: String },

    #[error("No dataset loaded")]
    DatasetNotLoaded,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type PromoResult<T> = Result<T, PromoError>;
