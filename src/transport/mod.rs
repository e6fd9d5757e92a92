//! Transport — the host-supplied channel to the backend service.
//!
//! DESIGN
//! ======
//! Both panel components talk to the backend through one [`Transport`]
//! capability injected at construction. The trait is object-safe so the
//! panel can hold it as `Arc<dyn Transport>`; tests swap in mocks that
//! control completion order.
//!
//! ERROR HANDLING
//! ==============
//! Every failure is a [`TransportError`]. The transport never retries on
//! its own: the feed's next tick is the retry, and credential submission
//! reports the failure back to the gate.

pub mod http;
pub mod types;

pub use http::HttpTransport;
pub use types::{CredentialsPayload, MessagesResponse, WireMessage};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by transport calls.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request could not be sent or no response arrived.
    #[error("request failed: {0}")]
    Request(String),

    /// The backend answered with a non-success HTTP status.
    #[error("backend returned status {status}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

// =============================================================================
// TRANSPORT
// =============================================================================

/// Read/write access to the backend, `GET /messages` and `POST /credentials`.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the current message list in the backend's stored order
    /// (oldest first). The feed reverses it for display.
    async fn fetch_messages(&self) -> Result<MessagesResponse, TransportError>;

    /// Submit an already-serialized credentials document.
    async fn submit_credentials(&self, body: String) -> Result<(), TransportError>;
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers;
