//! Error types for the chat server
//!
//! Defines transport-level errors, message send errors, and the username
//! validation taxonomy. Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Application-level errors
///
/// Fatal errors that end a connection's handler. Validation failures are
/// not represented here; those travel back to the client as protocol
/// messages and the session continues.
#[derive(Debug, Error)]
pub enum AppError {
    /// WebSocket protocol error (fatal)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send error (fatal - internal channel broken)
    #[error("Channel send error")]
    ChannelSend,
}

/// Message send errors
///
/// Occurs when attempting to send messages through closed channels.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,
}

/// Username validation failures
///
/// Display strings are the user-facing texts delivered in `join_error`
/// payloads, so variants format as complete sentences.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// Blank after trimming
    #[error("Username is required")]
    Empty,

    /// Fewer than 2 characters
    #[error("Username must be at least 2 characters long")]
    TooShort,

    /// More than 20 characters
    #[error("Username must be 20 characters or less")]
    TooLong,

    /// Contains characters outside letters, digits, spaces, hyphens, underscores
    #[error("Username can only contain letters, numbers, spaces, hyphens, and underscores")]
    InvalidChars,

    /// The case-insensitive form is already claimed by another connection
    #[error("This username is already taken. Please choose another one.")]
    Taken,
}
