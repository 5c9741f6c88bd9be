//! Anonymous 1:1 WebSocket Chat Server Library
//!
//! A matchmaking chat server built with tokio-tungstenite using the
//! Actor pattern for state management. Clients join with a display name,
//! wait in a FIFO queue, and are paired into two-person rooms.
//!
//! # Features
//! - WebSocket connection handling
//! - Username validation and reservation
//! - FIFO matchmaking queue
//! - Real-time chat messaging with replies
//! - Typing indicators with server-side expiry
//! - Emoji reactions and message edits
//! - Per-client message rate limiting
//! - Re-matching and disconnection handling
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `ChatServer` is the central actor managing all state
//! - Each connection has a `handler` task communicating with the server
//! - No locks needed - all state access goes through message passing
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use pairchat::{ChatServer, handle_connection};
//!
//! #[tokio::main]
//! async fn main() {
//!     let listener = TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     let (server, cmd_tx) = ChatServer::new();
//!
//!     tokio::spawn(server.run());
//!
//!     while let Ok((stream, _)) = listener.accept().await {
//!         let cmd_tx = cmd_tx.clone();
//!         tokio::spawn(handle_connection(stream, cmd_tx));
//!     }
//! }
//! ```

pub mod client;
pub mod error;
pub mod handler;
pub mod limiter;
pub mod message;
pub mod names;
pub mod queue;
pub mod room;
pub mod server;
pub mod timer;
pub mod types;

// Re-export main types for convenience
pub use client::Client;
pub use error::{AppError, NameError, SendError};
pub use handler::handle_connection;
pub use limiter::RateLimiter;
pub use message::{ClientMessage, ReplyTo, ServerMessage};
pub use names::UsernameDirectory;
pub use queue::WaitingQueue;
pub use room::Room;
pub use server::{ChatServer, ServerCommand};
pub use timer::Timer;
pub use types::{ClientId, MessageId, RoomId};
