use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Frame errors
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("Malformed advertising element at offset {offset}: declared length {length}")]
    MalformedElement { offset: usize, length: i8 },

    #[error("Invalid MAC address: {0}")]
    InvalidMacAddress(String),

    #[error("Invalid hex data: {0}")]
    InvalidHex(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
