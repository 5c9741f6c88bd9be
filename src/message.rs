//! Message protocol definitions
//!
//! JSON-based bidirectional message protocol using Serde's tagged enum
//! for type-safe serialization/deserialization. Event names are snake_case
//! in the `type` tag; payload fields keep the camelCase names the web
//! client already speaks (`partnerUsername`, `messageId`, ...).

use serde::{Deserialize, Serialize};

use crate::error::NameError;

/// Quoted-message context relayed verbatim alongside a reply
///
/// The server never checks that the quoted id was ever sent; it only
/// forwards what the sender attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyTo {
    pub message_id: String,
    pub text: String,
    pub username: String,
}

/// Client → Server message
///
/// All messages from client to server. Uses tagged enum with snake_case naming.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Claim a display name and start matchmaking
    Join { username: String },
    /// Send a chat message, optionally quoting an earlier one
    #[serde(rename_all = "camelCase")]
    ChatMessage {
        message: String,
        reply_to: Option<ReplyTo>,
    },
    /// Indicate typing started
    TypingStart,
    /// Indicate typing stopped
    TypingStop,
    /// React to a message with an emoji
    #[serde(rename_all = "camelCase")]
    AddReaction { message_id: String, emoji: String },
    /// Replace the text of an earlier message
    #[serde(rename_all = "camelCase")]
    EditMessage { message_id: String, new_text: String },
    /// Leave the current room or queue slot and search again
    FindNewMatch,
}

/// Server → Client message
///
/// All messages from server to client. Uses tagged enum with snake_case naming.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// No partner available yet; queued
    Waiting,
    /// Matched with a partner
    #[serde(rename_all = "camelCase")]
    Matched {
        partner_username: String,
        room_id: String,
    },
    /// Partner presence changed
    PartnerStatus { online: bool },
    /// Chat message relayed to both room members
    #[serde(rename_all = "camelCase")]
    NewMessage {
        username: String,
        message: String,
        timestamp: String,
        message_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        reply_to: Option<ReplyTo>,
    },
    /// Partner's typing indicator changed
    PartnerTyping { typing: bool },
    /// Partner left the room
    PartnerLeft,
    /// Emoji reaction relayed to both room members
    #[serde(rename_all = "camelCase")]
    MessageReaction {
        message_id: String,
        emoji: String,
        username: String,
    },
    /// Message edit relayed to both room members
    #[serde(rename_all = "camelCase")]
    MessageEdited {
        message_id: String,
        new_text: String,
        username: String,
        timestamp: String,
    },
    /// Join rejected (invalid or taken username)
    JoinError { error: String },
    /// Message dropped: over the rate budget
    RateLimited { error: String },
    /// Message rejected: empty or too long
    MessageError { error: String },
}

/// Convert a NameError to the join_error sent to the offending client
impl From<NameError> for ServerMessage {
    fn from(err: NameError) -> Self {
        ServerMessage::JoinError {
            error: err.to_string(),
        }
    }
}
