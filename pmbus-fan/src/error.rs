//! PMBus layer error types

use ds3900_transport::TransportError;
use thiserror::Error;

/// Errors from PMBus and fan operations
#[derive(Error, Debug)]
pub enum PmbusError {
    /// Transport layer error
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Fan index outside 1..=4
    #[error("Invalid fan: {0} (expected 1-4)")]
    InvalidFan(u8),

    /// Value outside the range the register accepts
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

