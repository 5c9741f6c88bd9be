//! ChatServer Actor implementation
//!
//! The central actor that manages all state: the connection registry, the
//! username directory, the waiting queue, and active rooms. Uses the Actor
//! pattern with mpsc channels for message passing; because this task is the
//! only owner of that state, claim/match/leave sequences are atomic and the
//! matchmaking logic is testable without a live transport.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::client::Client;
use crate::message::{ReplyTo, ServerMessage};
use crate::names::UsernameDirectory;
use crate::queue::WaitingQueue;
use crate::room::{Room, RoomMember};
use crate::timer::Timer;
use crate::types::{ClientId, MessageId, RoomId};

/// Maximum chat/edit message length in characters
pub const MAX_MESSAGE_LEN: usize = 500;

/// The fixed set of emoji a reaction may carry
pub const ALLOWED_REACTIONS: [&str; 6] = ["👍", "❤️", "😂", "😮", "😢", "😡"];

/// Delay between the match event and the partner_status emission, so the
/// transport finishes registering both sides first
const PRESENCE_DELAY: Duration = Duration::from_millis(100);

/// Server-side typing auto-clear deadline. The client clears its own
/// indicator after one idle second; this covers clients that vanish without
/// sending typing_stop.
const TYPING_TTL: Duration = Duration::from_secs(5);

/// Command channel capacity
const CHANNEL_BUFFER_SIZE: usize = 256;

/// Commands processed by the ChatServer actor
///
/// Most arrive from connection handlers; the timer variants are scheduled
/// by the actor itself and fed back through the same channel so state is
/// only ever touched from one task.
#[derive(Debug)]
pub enum ServerCommand {
    /// New connection opened
    Connect {
        client_id: ClientId,
        sender: mpsc::Sender<ServerMessage>,
    },
    /// Connection closed
    Disconnect {
        client_id: ClientId,
    },
    /// Claim a display name and start matchmaking
    Join {
        client_id: ClientId,
        username: String,
    },
    /// Relay a chat message to the sender's room
    ChatMessage {
        client_id: ClientId,
        message: String,
        reply_to: Option<ReplyTo>,
    },
    /// Client started typing
    TypingStart {
        client_id: ClientId,
    },
    /// Client stopped typing
    TypingStop {
        client_id: ClientId,
    },
    /// React to a message with an emoji
    AddReaction {
        client_id: ClientId,
        message_id: String,
        emoji: String,
    },
    /// Replace the text of an earlier message
    EditMessage {
        client_id: ClientId,
        message_id: String,
        new_text: String,
    },
    /// Leave the current room or queue slot and search again
    FindNewMatch {
        client_id: ClientId,
    },
    /// Internal: delayed presence emission after a match
    PresenceReady {
        client_id: ClientId,
    },
    /// Internal: typing auto-clear deadline reached
    TypingExpired {
        client_id: ClientId,
        epoch: u64,
    },
}

/// The main ChatServer actor
///
/// Owns every piece of shared mutable state and processes commands from
/// connection handlers and timers. HashMaps give O(1) lookups on clients,
/// rooms, and the client-room mapping.
pub struct ChatServer {
    /// All connected clients: ClientId -> Client
    clients: HashMap<ClientId, Client>,
    /// All active rooms: RoomId -> Room
    rooms: HashMap<RoomId, Room>,
    /// Client to room mapping for fast lookup: ClientId -> RoomId
    client_rooms: HashMap<ClientId, RoomId>,
    /// Display names currently claimed
    names: UsernameDirectory,
    /// Connections awaiting a partner, oldest first
    queue: WaitingQueue,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
    /// Weak self-handle for scheduling timer commands; weak so the actor
    /// still shuts down when every external sender is gone
    cmd_tx: mpsc::WeakSender<ServerCommand>,
}

impl ChatServer {
    /// Create a new ChatServer plus the sender used to command it
    pub fn new() -> (Self, mpsc::Sender<ServerCommand>) {
        let (cmd_tx, receiver) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let server = Self {
            clients: HashMap::new(),
            rooms: HashMap::new(),
            client_rooms: HashMap::new(),
            names: UsernameDirectory::new(),
            queue: WaitingQueue::new(),
            receiver,
            cmd_tx: cmd_tx.downgrade(),
        };
        (server, cmd_tx)
    }

    /// Run the ChatServer event loop
    ///
    /// Continuously receives and processes commands until all senders are
    /// dropped and no timer is pending.
    pub async fn run(mut self) {
        info!("ChatServer started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd).await;
        }

        info!("ChatServer shutting down");
    }

    /// Process a single command
    async fn handle_command(&mut self, cmd: ServerCommand) {
        match cmd {
            ServerCommand::Connect { client_id, sender } => {
                self.handle_connect(client_id, sender);
            }
            ServerCommand::Disconnect { client_id } => {
                self.handle_disconnect(client_id).await;
            }
            ServerCommand::Join { client_id, username } => {
                self.handle_join(client_id, username).await;
            }
            ServerCommand::ChatMessage {
                client_id,
                message,
                reply_to,
            } => {
                self.handle_chat(client_id, message, reply_to).await;
            }
            ServerCommand::TypingStart { client_id } => {
                self.handle_typing_start(client_id).await;
            }
            ServerCommand::TypingStop { client_id } => {
                self.handle_typing_stop(client_id).await;
            }
            ServerCommand::AddReaction {
                client_id,
                message_id,
                emoji,
            } => {
                self.handle_add_reaction(client_id, message_id, emoji).await;
            }
            ServerCommand::EditMessage {
                client_id,
                message_id,
                new_text,
            } => {
                self.handle_edit_message(client_id, message_id, new_text).await;
            }
            ServerCommand::FindNewMatch { client_id } => {
                self.handle_find_new_match(client_id).await;
            }
            ServerCommand::PresenceReady { client_id } => {
                self.handle_presence_ready(client_id).await;
            }
            ServerCommand::TypingExpired { client_id, epoch } => {
                self.handle_typing_expired(client_id, epoch).await;
            }
        }
    }

    /// Handle new connection
    fn handle_connect(&mut self, client_id: ClientId, sender: mpsc::Sender<ServerMessage>) {
        info!("Client {} connected", client_id);
        let client = Client::new(client_id, sender);
        self.clients.insert(client_id, client);
        debug!(
            "Total clients: {}, rooms: {}, waiting: {}",
            self.clients.len(),
            self.rooms.len(),
            self.queue.len()
        );
    }

    /// Handle connection teardown
    ///
    /// Runs the full cleanup in every state; each step is a no-op when it
    /// does not apply, so a repeated disconnect is harmless.
    async fn handle_disconnect(&mut self, client_id: ClientId) {
        info!("Client {} disconnected", client_id);

        // Presence goes dark before the partner learns the room is gone
        if let Some(room_id) = self.client_rooms.get(&client_id).cloned() {
            self.send_to_partner(
                client_id,
                &room_id,
                ServerMessage::PartnerStatus { online: false },
            )
            .await;
        }

        self.queue.remove(client_id);
        self.leave_room(client_id).await;

        // Dropping the record aborts pending timers for this connection
        if let Some(client) = self.clients.remove(&client_id) {
            if let Some(username) = client.username {
                self.names.release(&username.to_lowercase());
            }
        }

        debug!(
            "Total clients: {}, rooms: {}, waiting: {}, names held: {}",
            self.clients.len(),
            self.rooms.len(),
            self.queue.len(),
            self.names.len()
        );
    }

    /// Handle a join: claim the display name, then matchmake
    async fn handle_join(&mut self, client_id: ClientId, username: String) {
        let Some(client) = self.clients.get_mut(&client_id) else {
            return;
        };

        // Already joined: benign race or a misbehaving client, drop it
        if client.has_username() {
            debug!("Client {} sent join while already joined", client_id);
            return;
        }

        match self.names.claim(&username) {
            Ok(_) => {
                let display_name = username.trim().to_string();
                client.set_username(display_name.clone());
                info!("Client {} joined as '{}'", client_id, display_name);
                self.find_match(client_id, display_name).await;
            }
            Err(err) => {
                warn!("Client {} join rejected: {}", client_id, err);
                let _ = client.send(err.into()).await;
            }
        }
    }

    /// Pair the connection with the longest-waiting one, or queue it
    async fn find_match(&mut self, client_id: ClientId, username: String) {
        let Some(waiting) = self.queue.pop_oldest() else {
            self.queue.push(client_id, username);
            if let Some(client) = self.clients.get(&client_id) {
                let _ = client.send(ServerMessage::Waiting).await;
            }
            info!(
                "Client {} added to waiting queue ({} waiting)",
                client_id,
                self.queue.len()
            );
            return;
        };

        // Ids are random; regenerate on the off chance of a collision so a
        // live room id is never reused
        let room_id = loop {
            let id = RoomId::generate();
            if !self.rooms.contains_key(&id) {
                break id;
            }
        };

        let room = Room::new(
            room_id.clone(),
            RoomMember {
                client_id: waiting.client_id,
                username: waiting.username.clone(),
            },
            RoomMember {
                client_id,
                username: username.clone(),
            },
        );
        self.rooms.insert(room_id.clone(), room);
        self.client_rooms.insert(waiting.client_id, room_id.clone());
        self.client_rooms.insert(client_id, room_id.clone());

        info!(
            "Matched '{}' with '{}' in {}",
            username, waiting.username, room_id
        );

        if let Some(client) = self.clients.get(&client_id) {
            let _ = client
                .send(ServerMessage::Matched {
                    partner_username: waiting.username.clone(),
                    room_id: room_id.to_string(),
                })
                .await;
        }
        if let Some(partner) = self.clients.get(&waiting.client_id) {
            let _ = partner
                .send(ServerMessage::Matched {
                    partner_username: username,
                    room_id: room_id.to_string(),
                })
                .await;
        }

        // Presence is decoupled from the match event; each member carries
        // its own cancellable timer
        self.schedule_presence(client_id);
        self.schedule_presence(waiting.client_id);
    }

    /// Arm the delayed partner_status emission for one room member
    fn schedule_presence(&mut self, client_id: ClientId) {
        let Some(tx) = self.cmd_tx.upgrade() else {
            return;
        };
        if let Some(client) = self.clients.get_mut(&client_id) {
            client.presence_timer = Some(Timer::schedule(
                tx,
                PRESENCE_DELAY,
                ServerCommand::PresenceReady { client_id },
            ));
        }
    }

    /// Deliver the delayed presence signal, unless the match already ended
    async fn handle_presence_ready(&mut self, client_id: ClientId) {
        if !self.client_rooms.contains_key(&client_id) {
            return;
        }
        if let Some(client) = self.clients.get_mut(&client_id) {
            client.presence_timer = None;
            let _ = client.send(ServerMessage::PartnerStatus { online: true }).await;
        }
    }

    /// Handle a chat message: rate limit, validate, stamp, relay
    async fn handle_chat(
        &mut self,
        client_id: ClientId,
        message: String,
        reply_to: Option<ReplyTo>,
    ) {
        // Stray messages from roomless connections are a benign race
        let Some(room_id) = self.client_rooms.get(&client_id).cloned() else {
            debug!("Client {} sent chat_message outside a room", client_id);
            return;
        };
        let Some(client) = self.clients.get_mut(&client_id) else {
            return;
        };

        // Budget is consumed before shape validation
        if !client.limiter.check_and_consume(Instant::now()) {
            warn!("Client {} over the message rate limit", client_id);
            let _ = client
                .send(ServerMessage::RateLimited {
                    error: "You are sending messages too quickly. Please slow down.".to_string(),
                })
                .await;
            return;
        }

        if message.trim().is_empty() {
            let _ = client
                .send(ServerMessage::MessageError {
                    error: "Message cannot be empty".to_string(),
                })
                .await;
            return;
        }
        if message.chars().count() > MAX_MESSAGE_LEN {
            let _ = client
                .send(ServerMessage::MessageError {
                    error: "Message too long (max 500 characters)".to_string(),
                })
                .await;
            return;
        }

        let username = client.display_name().to_string();
        let was_typing = client.is_typing;
        if was_typing {
            client.stop_typing();
        }

        let outgoing = ServerMessage::NewMessage {
            username,
            message: message.trim().to_string(),
            timestamp: Utc::now().to_rfc3339(),
            message_id: MessageId::generate().to_string(),
            reply_to,
        };

        // The indicator clears before the message lands
        if was_typing {
            self.send_to_partner(
                client_id,
                &room_id,
                ServerMessage::PartnerTyping { typing: false },
            )
            .await;
        }

        debug!("Relaying message in {}", room_id);
        self.broadcast_to_room(&room_id, outgoing).await;
    }

    /// Handle typing indicator start
    async fn handle_typing_start(&mut self, client_id: ClientId) {
        let Some(room_id) = self.client_rooms.get(&client_id).cloned() else {
            return;
        };
        let Some(client) = self.clients.get_mut(&client_id) else {
            return;
        };

        let first_edge = !client.is_typing;
        let epoch = client.start_typing();

        // Every keystroke pushes the auto-clear deadline out again
        if let Some(tx) = self.cmd_tx.upgrade() {
            client.typing_timer = Some(Timer::schedule(
                tx,
                TYPING_TTL,
                ServerCommand::TypingExpired { client_id, epoch },
            ));
        }

        // The partner only hears about the transition
        if first_edge {
            self.send_to_partner(
                client_id,
                &room_id,
                ServerMessage::PartnerTyping { typing: true },
            )
            .await;
        }
    }

    /// Handle typing indicator stop
    async fn handle_typing_stop(&mut self, client_id: ClientId) {
        let Some(room_id) = self.client_rooms.get(&client_id).cloned() else {
            return;
        };
        let Some(client) = self.clients.get_mut(&client_id) else {
            return;
        };

        // Not typing? Skip
        if !client.is_typing {
            return;
        }
        client.stop_typing();

        self.send_to_partner(
            client_id,
            &room_id,
            ServerMessage::PartnerTyping { typing: false },
        )
        .await;
    }

    /// Auto-clear a typing indicator whose deadline passed
    async fn handle_typing_expired(&mut self, client_id: ClientId, epoch: u64) {
        let Some(client) = self.clients.get_mut(&client_id) else {
            return;
        };
        // Any transition since scheduling makes this deadline stale
        if client.typing_epoch != epoch || !client.is_typing {
            return;
        }
        client.stop_typing();

        let Some(room_id) = self.client_rooms.get(&client_id).cloned() else {
            return;
        };
        debug!("Typing auto-cleared for client {}", client_id);
        self.send_to_partner(
            client_id,
            &room_id,
            ServerMessage::PartnerTyping { typing: false },
        )
        .await;
    }

    /// Handle an emoji reaction
    async fn handle_add_reaction(
        &mut self,
        client_id: ClientId,
        message_id: String,
        emoji: String,
    ) {
        let Some(room_id) = self.client_rooms.get(&client_id).cloned() else {
            debug!("Client {} sent add_reaction outside a room", client_id);
            return;
        };

        if !ALLOWED_REACTIONS.contains(&emoji.as_str()) {
            warn!("Client {} sent a disallowed reaction emoji", client_id);
            return;
        }
        if message_id.is_empty() {
            warn!("Client {} sent add_reaction without a message id", client_id);
            return;
        }

        let Some(client) = self.clients.get(&client_id) else {
            return;
        };
        let username = client.display_name().to_string();

        debug!("Reaction from '{}' on {} in {}", username, message_id, room_id);
        self.broadcast_to_room(
            &room_id,
            ServerMessage::MessageReaction {
                message_id,
                emoji,
                username,
            },
        )
        .await;
    }

    /// Handle a message edit
    async fn handle_edit_message(
        &mut self,
        client_id: ClientId,
        message_id: String,
        new_text: String,
    ) {
        let Some(room_id) = self.client_rooms.get(&client_id).cloned() else {
            debug!("Client {} sent edit_message outside a room", client_id);
            return;
        };
        let Some(client) = self.clients.get(&client_id) else {
            return;
        };

        if new_text.trim().is_empty() {
            let _ = client
                .send(ServerMessage::MessageError {
                    error: "Message cannot be empty".to_string(),
                })
                .await;
            return;
        }
        if new_text.chars().count() > MAX_MESSAGE_LEN {
            let _ = client
                .send(ServerMessage::MessageError {
                    error: "Message too long (max 500 characters)".to_string(),
                })
                .await;
            return;
        }
        if message_id.is_empty() {
            warn!("Client {} sent edit_message without a message id", client_id);
            return;
        }

        let username = client.display_name().to_string();
        debug!("Edit from '{}' on {} in {}", username, message_id, room_id);
        self.broadcast_to_room(
            &room_id,
            ServerMessage::MessageEdited {
                message_id,
                new_text: new_text.trim().to_string(),
                username,
                timestamp: Utc::now().to_rfc3339(),
            },
        )
        .await;
    }

    /// Handle a search restart: tear down, then matchmake again
    async fn handle_find_new_match(&mut self, client_id: ClientId) {
        // Unjoined connections have nothing to rematch
        let Some(username) = self
            .clients
            .get(&client_id)
            .and_then(|c| c.username.clone())
        else {
            return;
        };

        info!("'{}' is looking for a new match", username);

        // Clear any stale queue slot so the connection never queues twice
        self.queue.remove(client_id);
        self.leave_room(client_id).await;
        self.find_match(client_id, username).await;
    }

    /// Tear down the caller's room, if any
    ///
    /// Notifies the partner, clears both room mappings, and destroys the
    /// room record. The partner idles in place; re-queueing is its choice.
    /// No-op when the caller has no room.
    async fn leave_room(&mut self, client_id: ClientId) {
        let Some(room_id) = self.client_rooms.remove(&client_id) else {
            return;
        };
        let Some(room) = self.rooms.remove(&room_id) else {
            return;
        };

        info!("Client {} left {}", client_id, room_id);

        // Typing and presence are room-scoped state; reset the leaver's
        if let Some(client) = self.clients.get_mut(&client_id) {
            client.stop_typing();
            client.presence_timer = None;
        }

        if let Some(partner) = room.partner_of(client_id) {
            self.client_rooms.remove(&partner.client_id);
            if let Some(partner_client) = self.clients.get_mut(&partner.client_id) {
                partner_client.stop_typing();
                partner_client.presence_timer = None;
                let _ = partner_client.send(ServerMessage::PartnerLeft).await;
            }
        }
    }

    /// Send to both members of a room (sender echo included)
    async fn broadcast_to_room(&self, room_id: &RoomId, msg: ServerMessage) {
        let Some(room) = self.rooms.get(room_id) else {
            return;
        };
        for member in &room.members {
            if let Some(client) = self.clients.get(&member.client_id) {
                let _ = client.send(msg.clone()).await;
            }
        }
    }

    /// Send to the partner of `client_id` only
    async fn send_to_partner(&self, client_id: ClientId, room_id: &RoomId, msg: ServerMessage) {
        let Some(room) = self.rooms.get(room_id) else {
            return;
        };
        let Some(partner) = room.partner_of(client_id) else {
            return;
        };
        if let Some(client) = self.clients.get(&partner.client_id) {
            let _ = client.send(msg).await;
        }
    }
}
