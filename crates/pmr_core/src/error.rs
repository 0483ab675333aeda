use thiserror::Error;

use crate::invoice::InvoiceStatus;

/// Errors raised by the pricing, geo and taxi simulation primitives.
///
/// Every variant is local and synchronous: nothing here performs I/O, so
/// callers decide how to surface the failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PmrError {
    #[error("coordinate out of range: latitude={latitude}, longitude={longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("taxi session has already arrived")]
    SessionTerminated,
    #[error("taxi session has not been started")]
    SessionNotStarted,
    #[error("invoice is {0}, only pending invoices can change status")]
    InvoiceNotPending(InvoiceStatus),
}

impl PmrError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

pub type Result<T> = std::result::Result<T, PmrError>;
