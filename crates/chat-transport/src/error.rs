//! Transport errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Send failed: {0}")]
    SendFailed(String),
}
