use thiserror::Error;

/// Infrastructure-level failure of an external client call.
///
/// A `ClientError` never encodes a business outcome (name taken, create
/// rejected); those travel through the call's normal return value. The
/// workflow controller maps every variant here to the same recoverable
/// transient failure.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("service error (HTTP {status}): {message}")]
    Service { status: u16, message: String },
    #[error("malformed response: {0}")]
    BadResponse(String),
    #[error("storage failure: {0}")]
    Storage(String),
}
