use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PasError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid state: {0}")]
    State(String),
    #[error("motor error: {0}")]
    Motor(String),
    #[error("io error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, PasError>;

/// Map a `CurrentSink` failure from the trait boundary to a typed error.
pub fn map_sink_error(e: &(dyn std::error::Error + 'static)) -> PasError {
    PasError::Motor(e.to_string())
}
