//! Client struct definition
//!
//! Represents a connected client with their state and communication channel.
//! One entry exists per live connection; dropping it aborts any pending
//! timers for that connection.

use tokio::sync::mpsc;

use crate::error::SendError;
use crate::limiter::RateLimiter;
use crate::message::ServerMessage;
use crate::timer::Timer;
use crate::types::ClientId;

/// Connected client information
///
/// Holds all per-connection state: the unique ID, display name, message
/// sender channel, typing status, rate-limit window, and pending timer
/// handles. Room membership is tracked by the server's room mapping.
#[derive(Debug)]
pub struct Client {
    /// Unique identifier for this connection
    pub id: ClientId,
    /// Display name (None until joined)
    pub username: Option<String>,
    /// Server → Client message channel
    pub sender: mpsc::Sender<ServerMessage>,
    /// Currently typing flag
    pub is_typing: bool,
    /// Bumped on every typing transition; stale auto-clear timers carry an
    /// old value and are ignored
    pub typing_epoch: u64,
    /// Chat message budget for this connection
    pub limiter: RateLimiter,
    /// Pending typing auto-clear timer, if any
    pub typing_timer: Option<Timer>,
    /// Pending delayed presence emission, if any
    pub presence_timer: Option<Timer>,
}

impl Client {
    /// Create a new client with the given ID and sender channel
    pub fn new(id: ClientId, sender: mpsc::Sender<ServerMessage>) -> Self {
        Self {
            id,
            username: None,
            sender,
            is_typing: false,
            typing_epoch: 0,
            limiter: RateLimiter::new(),
            typing_timer: None,
            presence_timer: None,
        }
    }

    /// Send a message to this client
    ///
    /// Returns an error if the channel is closed (client disconnected).
    pub async fn send(&self, msg: ServerMessage) -> Result<(), SendError> {
        self.sender
            .send(msg)
            .await
            .map_err(|_| SendError::ChannelClosed)
    }

    /// Get the display name for this client
    ///
    /// Returns the username if set, otherwise "Unknown".
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or("Unknown")
    }

    /// Check if this client has joined with a username
    pub fn has_username(&self) -> bool {
        self.username.is_some()
    }

    /// Set the client's display name
    pub fn set_username(&mut self, username: String) {
        self.username = Some(username);
    }

    /// Mark this client as typing; returns the new epoch for the
    /// auto-clear timer to carry
    pub fn start_typing(&mut self) -> u64 {
        self.is_typing = true;
        self.typing_epoch += 1;
        self.typing_epoch
    }

    /// Clear the typing state and cancel any pending auto-clear timer
    pub fn stop_typing(&mut self) {
        self.is_typing = false;
        self.typing_epoch += 1;
        self.typing_timer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_creation() {
        let (tx, _rx) = mpsc::channel(32);
        let client = Client::new(ClientId::new(), tx);

        assert!(client.username.is_none());
        assert!(!client.is_typing);
        assert!(client.typing_timer.is_none());
        assert!(client.presence_timer.is_none());
        assert_eq!(client.display_name(), "Unknown");
    }

    #[tokio::test]
    async fn test_client_username() {
        let (tx, _rx) = mpsc::channel(32);
        let mut client = Client::new(ClientId::new(), tx);

        assert!(!client.has_username());

        client.set_username("Alice".to_string());

        assert!(client.has_username());
        assert_eq!(client.display_name(), "Alice");
    }

    #[tokio::test]
    async fn test_typing_transitions_bump_epoch() {
        let (tx, _rx) = mpsc::channel(32);
        let mut client = Client::new(ClientId::new(), tx);

        let first = client.start_typing();
        assert!(client.is_typing);

        let second = client.start_typing();
        assert!(second > first);

        client.stop_typing();
        assert!(!client.is_typing);
        assert!(client.typing_epoch > second);
        assert!(client.typing_timer.is_none());
    }
}
