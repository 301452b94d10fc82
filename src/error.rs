use thiserror::Error;

pub type Result<T> = std::result::Result<T, AirQualityError>;

#[derive(Error, Debug)]
pub enum AirQualityError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV output error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid date '{raw}' in record {index}")]
    DateParse { raw: String, index: usize },

    #[error("Malformed station catalog: {0}")]
    MalformedCatalog(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
