use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("motor command rejected: {0}")]
    Rejected(String),
}

pub type Result<T> = std::result::Result<T, HwError>;
