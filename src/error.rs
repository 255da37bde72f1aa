//! Error types for PolyBet
//!
//! The valuation engine itself never fails; these cover configuration and
//! malformed provider payloads.

/// Library error type
#[derive(Debug, thiserror::Error)]
pub enum PolybetError {
    #[error("Invalid setting {field} = {value}: {reason}")]
    InvalidSetting {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Malformed payload: {0}")]
    Payload(String),
}

pub type Result<T> = std::result::Result<T, PolybetError>;
