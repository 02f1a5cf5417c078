use thiserror::Error;

/// Failures of the WebSocket transport. All of them lead back to the
/// disconnected state and a delayed reconnect.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Invalid WebSocket URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to connect: {0}")]
    Connect(String),

    #[error("Failed to receive frame: {0}")]
    Receive(String),

    #[error("Failed to send message: {0}")]
    Send(String),

    #[error("Failed to encode outbound message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Connection closed by peer")]
    Closed,
}

pub type TransportResult<T> = Result<T, TransportError>;
