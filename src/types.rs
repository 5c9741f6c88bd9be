//! Basic type definitions for the chat server
//!
//! Provides newtype wrappers for type safety:
//! - `ClientId`: UUID-based unique connection identifier
//! - `RoomId`: opaque generated room identifier
//! - `MessageId`: client-opaque token stamped on relayed messages

use uuid::Uuid;

/// Unique connection identifier (newtype pattern)
///
/// Wraps a UUID v4 for type-safe connection identification.
/// Implements Hash and Eq for use as HashMap keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub Uuid);

impl ClientId {
    /// Create a new random connection ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque room identifier
///
/// Never reused for a new pair; callers regenerate on collision.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomId(pub String);

impl RoomId {
    /// Generate a new random room ID (`room_` + 12 alphanumerics)
    pub fn generate() -> Self {
        Self(format!("room_{}", random_token(12)))
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Token stamped on each relayed chat message
///
/// Shaped as `<unix-millis>_<9 alphanumerics>`. The server never stores
/// these; reactions and edits echo whatever id the client hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageId(pub String);

impl MessageId {
    /// Generate a fresh message ID for the current instant
    pub fn generate() -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        Self(format!("{}_{}", millis, random_token(9)))
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Random lowercase alphanumeric token of the given length
fn random_token(len: usize) -> String {
    use rand::Rng;
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(len)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_id_unique() {
        let id1 = ClientId::new();
        let id2 = ClientId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_room_id_shape() {
        let id = RoomId::generate();
        assert!(id.0.starts_with("room_"));
        assert_eq!(id.0.len(), "room_".len() + 12);
    }

    #[test]
    fn test_room_id_unique() {
        let id1 = RoomId::generate();
        let id2 = RoomId::generate();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_message_id_shape() {
        let id = MessageId::generate();
        let (millis, token) = id.0.split_once('_').expect("millis_token shape");
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(token.len(), 9);
        assert!(token.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }
}
