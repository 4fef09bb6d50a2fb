//! Wire protocol
//!
//! The tagged command and event enums exchanged with clients. Transports
//! (WebSocket, long-poll, in-process test drivers) carry these as JSON.

mod commands;
mod events;

pub use commands::ClientCommand;
pub use events::ServerEvent;
