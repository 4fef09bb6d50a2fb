//! Domain entities - aggregate roots and their owned records

mod channel;
mod conversation;
mod message;

pub use channel::{Channel, ChannelVisibility};
pub use conversation::{Conversation, ConversationKind};
pub use message::{Message, MessageKind, MessageState, Reaction, ReadReceipt};
