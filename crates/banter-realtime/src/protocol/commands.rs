//! Client commands
//!
//! One variant per session entry point. Connect and disconnect are
//! session-lifecycle calls, not commands. The enum is closed so the
//! session's dispatch match is checked at compile time.

use banter_core::entities::MessageKind;
use banter_core::{RoomId, Snowflake};
use serde::{Deserialize, Serialize};

/// Commands a connected client may issue
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientCommand {
    SendMessage {
        room: RoomId,
        kind: MessageKind,
        content: String,
    },
    EditMessage {
        message_id: Snowflake,
        content: String,
    },
    DeleteMessage {
        message_id: Snowflake,
    },
    AddReaction {
        message_id: Snowflake,
        emoji: String,
    },
    RemoveReaction {
        message_id: Snowflake,
        emoji: String,
    },
    MarkRead {
        message_id: Snowflake,
    },
    StartTyping {
        room: RoomId,
    },
    JoinChannel {
        channel_id: Snowflake,
    },
    LeaveChannel {
        channel_id: Snowflake,
    },
    /// Conversation rooms add a group participant; channel rooms invite
    AddParticipant {
        room: RoomId,
        user_id: Snowflake,
    },
    /// Conversation rooms remove a group participant; channel rooms kick
    RemoveParticipant {
        room: RoomId,
        user_id: Snowflake,
    },
    AddModerator {
        channel_id: Snowflake,
        user_id: Snowflake,
    },
    RemoveModerator {
        channel_id: Snowflake,
        user_id: Snowflake,
    },
}

impl ClientCommand {
    /// The wire name of this command
    pub fn op(&self) -> &'static str {
        match self {
            Self::SendMessage { .. } => "SEND_MESSAGE",
            Self::EditMessage { .. } => "EDIT_MESSAGE",
            Self::DeleteMessage { .. } => "DELETE_MESSAGE",
            Self::AddReaction { .. } => "ADD_REACTION",
            Self::RemoveReaction { .. } => "REMOVE_REACTION",
            Self::MarkRead { .. } => "MARK_READ",
            Self::StartTyping { .. } => "START_TYPING",
            Self::JoinChannel { .. } => "JOIN_CHANNEL",
            Self::LeaveChannel { .. } => "LEAVE_CHANNEL",
            Self::AddParticipant { .. } => "ADD_PARTICIPANT",
            Self::RemoveParticipant { .. } => "REMOVE_PARTICIPANT",
            Self::AddModerator { .. } => "ADD_MODERATOR",
            Self::RemoveModerator { .. } => "REMOVE_MODERATOR",
        }
    }
}
