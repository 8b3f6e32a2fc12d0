//! Errors from talking to a payment gateway.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaymentError {
    /// Transport failure or an undecodable body.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with a non-2xx status.
    #[error("gateway returned {status}: {body}")]
    Api { status: u16, body: String },

    /// A 2xx answer that is missing something we need.
    #[error("unexpected response from gateway: {0}")]
    UnexpectedResponse(String),
}
