//! Domain events - events emitted when domain state changes
//!
//! These events are used for:
//! - Real-time fan-out to subscribed connections
//! - Triggering side effects (e.g., cache invalidation)
//!
//! Aggregate mutations return exactly one event on success. The enum is
//! closed on purpose: a new event kind forces every dispatch site to be
//! updated at compile time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{RoomId, Snowflake};

/// All possible domain events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainEvent {
    // =========================================================================
    // Message Events
    // =========================================================================
    MessageSent(MessageSentEvent),
    MessageEdited(MessageEditedEvent),
    MessageDeleted(MessageDeletedEvent),
    ReactionAdded(ReactionAddedEvent),
    ReactionRemoved(ReactionRemovedEvent),
    MessageRead(MessageReadEvent),

    // =========================================================================
    // Conversation Events
    // =========================================================================
    ConversationCreated(ConversationCreatedEvent),
    ParticipantAdded(ParticipantAddedEvent),
    ParticipantRemoved(ParticipantRemovedEvent),
    ConversationArchived(ConversationArchivedEvent),
    ConversationUnarchived(ConversationUnarchivedEvent),

    // =========================================================================
    // Channel Events
    // =========================================================================
    ChannelCreated(ChannelCreatedEvent),
    MemberJoined(MemberJoinedEvent),
    MemberLeft(MemberLeftEvent),
    ModeratorAdded(ModeratorAddedEvent),
    ModeratorRemoved(ModeratorRemovedEvent),
    ChannelArchived(ChannelArchivedEvent),

    // =========================================================================
    // Presence Events
    // =========================================================================
    PresenceChanged(PresenceChangedEvent),
    TypingStarted(TypingStartedEvent),
}

impl DomainEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::MessageSent(_) => "MESSAGE_SENT",
            Self::MessageEdited(_) => "MESSAGE_EDITED",
            Self::MessageDeleted(_) => "MESSAGE_DELETED",
            Self::ReactionAdded(_) => "REACTION_ADDED",
            Self::ReactionRemoved(_) => "REACTION_REMOVED",
            Self::MessageRead(_) => "MESSAGE_READ",
            Self::ConversationCreated(_) => "CONVERSATION_CREATED",
            Self::ParticipantAdded(_) => "PARTICIPANT_ADDED",
            Self::ParticipantRemoved(_) => "PARTICIPANT_REMOVED",
            Self::ConversationArchived(_) => "CONVERSATION_ARCHIVED",
            Self::ConversationUnarchived(_) => "CONVERSATION_UNARCHIVED",
            Self::ChannelCreated(_) => "CHANNEL_CREATED",
            Self::MemberJoined(_) => "MEMBER_JOINED",
            Self::MemberLeft(_) => "MEMBER_LEFT",
            Self::ModeratorAdded(_) => "MODERATOR_ADDED",
            Self::ModeratorRemoved(_) => "MODERATOR_REMOVED",
            Self::ChannelArchived(_) => "CHANNEL_ARCHIVED",
            Self::PresenceChanged(_) => "PRESENCE_CHANGED",
            Self::TypingStarted(_) => "TYPING_STARTED",
        }
    }

    /// Get the timestamp of the event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::MessageSent(e) => e.timestamp,
            Self::MessageEdited(e) => e.timestamp,
            Self::MessageDeleted(e) => e.timestamp,
            Self::ReactionAdded(e) => e.timestamp,
            Self::ReactionRemoved(e) => e.timestamp,
            Self::MessageRead(e) => e.timestamp,
            Self::ConversationCreated(e) => e.timestamp,
            Self::ParticipantAdded(e) => e.timestamp,
            Self::ParticipantRemoved(e) => e.timestamp,
            Self::ConversationArchived(e) => e.timestamp,
            Self::ConversationUnarchived(e) => e.timestamp,
            Self::ChannelCreated(e) => e.timestamp,
            Self::MemberJoined(e) => e.timestamp,
            Self::MemberLeft(e) => e.timestamp,
            Self::ModeratorAdded(e) => e.timestamp,
            Self::ModeratorRemoved(e) => e.timestamp,
            Self::ChannelArchived(e) => e.timestamp,
            Self::PresenceChanged(e) => e.timestamp,
            Self::TypingStarted(e) => e.timestamp,
        }
    }

    /// Get the room this event routes to
    ///
    /// Presence changes have no single room; the presence service fans them
    /// out to every room the user belongs to.
    pub fn room(&self) -> Option<RoomId> {
        match self {
            Self::MessageSent(e) => Some(e.room),
            Self::MessageEdited(e) => Some(e.room),
            Self::MessageDeleted(e) => Some(e.room),
            Self::ReactionAdded(e) => Some(e.room),
            Self::ReactionRemoved(e) => Some(e.room),
            Self::MessageRead(e) => Some(e.room),
            Self::ConversationCreated(e) => Some(RoomId::Conversation(e.conversation_id)),
            Self::ParticipantAdded(e) => Some(RoomId::Conversation(e.conversation_id)),
            Self::ParticipantRemoved(e) => Some(RoomId::Conversation(e.conversation_id)),
            Self::ConversationArchived(e) => Some(RoomId::Conversation(e.conversation_id)),
            Self::ConversationUnarchived(e) => Some(RoomId::Conversation(e.conversation_id)),
            Self::ChannelCreated(e) => Some(RoomId::Channel(e.channel_id)),
            Self::MemberJoined(e) => Some(RoomId::Channel(e.channel_id)),
            Self::MemberLeft(e) => Some(RoomId::Channel(e.channel_id)),
            Self::ModeratorAdded(e) => Some(RoomId::Channel(e.channel_id)),
            Self::ModeratorRemoved(e) => Some(RoomId::Channel(e.channel_id)),
            Self::ChannelArchived(e) => Some(RoomId::Channel(e.channel_id)),
            Self::PresenceChanged(_) => None,
            Self::TypingStarted(e) => Some(e.room),
        }
    }
}

// ============================================================================
// Event Structs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageSentEvent {
    pub message_id: Snowflake,
    pub room: RoomId,
    pub sender_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEditedEvent {
    pub message_id: Snowflake,
    pub room: RoomId,
    pub editor_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDeletedEvent {
    pub message_id: Snowflake,
    pub room: RoomId,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionAddedEvent {
    pub message_id: Snowflake,
    pub room: RoomId,
    pub user_id: Snowflake,
    pub emoji: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionRemovedEvent {
    pub message_id: Snowflake,
    pub room: RoomId,
    pub user_id: Snowflake,
    pub emoji: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageReadEvent {
    pub message_id: Snowflake,
    pub room: RoomId,
    pub user_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationCreatedEvent {
    pub conversation_id: Snowflake,
    pub participant_ids: Vec<Snowflake>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantAddedEvent {
    pub conversation_id: Snowflake,
    pub user_id: Snowflake,
    pub added_by: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantRemovedEvent {
    pub conversation_id: Snowflake,
    pub user_id: Snowflake,
    pub removed_by: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationArchivedEvent {
    pub conversation_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationUnarchivedEvent {
    pub conversation_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelCreatedEvent {
    pub channel_id: Snowflake,
    pub owner_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberJoinedEvent {
    pub channel_id: Snowflake,
    pub user_id: Snowflake,
    /// Set when the member was invited rather than self-joined
    pub added_by: Option<Snowflake>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberLeftEvent {
    pub channel_id: Snowflake,
    pub user_id: Snowflake,
    /// Set when the member was removed rather than left voluntarily
    pub removed_by: Option<Snowflake>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeratorAddedEvent {
    pub channel_id: Snowflake,
    pub user_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeratorRemovedEvent {
    pub channel_id: Snowflake,
    pub user_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelArchivedEvent {
    pub channel_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceChangedEvent {
    pub user_id: Snowflake,
    pub online: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingStartedEvent {
    pub room: RoomId,
    pub user_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// Event Creation Helpers
// ============================================================================

impl MessageSentEvent {
    pub fn new(message_id: Snowflake, room: RoomId, sender_id: Snowflake) -> Self {
        Self {
            message_id,
            room,
            sender_id,
            timestamp: Utc::now(),
        }
    }
}

impl MessageEditedEvent {
    pub fn new(message_id: Snowflake, room: RoomId, editor_id: Snowflake) -> Self {
        Self {
            message_id,
            room,
            editor_id,
            timestamp: Utc::now(),
        }
    }
}

impl MessageDeletedEvent {
    pub fn new(message_id: Snowflake, room: RoomId) -> Self {
        Self {
            message_id,
            room,
            timestamp: Utc::now(),
        }
    }
}

impl ReactionAddedEvent {
    pub fn new(message_id: Snowflake, room: RoomId, user_id: Snowflake, emoji: String) -> Self {
        Self {
            message_id,
            room,
            user_id,
            emoji,
            timestamp: Utc::now(),
        }
    }
}

impl ReactionRemovedEvent {
    pub fn new(message_id: Snowflake, room: RoomId, user_id: Snowflake, emoji: String) -> Self {
        Self {
            message_id,
            room,
            user_id,
            emoji,
            timestamp: Utc::now(),
        }
    }
}

impl MessageReadEvent {
    pub fn new(message_id: Snowflake, room: RoomId, user_id: Snowflake) -> Self {
        Self {
            message_id,
            room,
            user_id,
            timestamp: Utc::now(),
        }
    }
}

impl ConversationCreatedEvent {
    pub fn new(conversation_id: Snowflake, participant_ids: Vec<Snowflake>) -> Self {
        Self {
            conversation_id,
            participant_ids,
            timestamp: Utc::now(),
        }
    }
}

impl ParticipantAddedEvent {
    pub fn new(conversation_id: Snowflake, user_id: Snowflake, added_by: Snowflake) -> Self {
        Self {
            conversation_id,
            user_id,
            added_by,
            timestamp: Utc::now(),
        }
    }
}

impl ParticipantRemovedEvent {
    pub fn new(conversation_id: Snowflake, user_id: Snowflake, removed_by: Snowflake) -> Self {
        Self {
            conversation_id,
            user_id,
            removed_by,
            timestamp: Utc::now(),
        }
    }
}

impl ConversationArchivedEvent {
    pub fn new(conversation_id: Snowflake) -> Self {
        Self {
            conversation_id,
            timestamp: Utc::now(),
        }
    }
}

impl ConversationUnarchivedEvent {
    pub fn new(conversation_id: Snowflake) -> Self {
        Self {
            conversation_id,
            timestamp: Utc::now(),
        }
    }
}

impl ChannelCreatedEvent {
    pub fn new(channel_id: Snowflake, owner_id: Snowflake) -> Self {
        Self {
            channel_id,
            owner_id,
            timestamp: Utc::now(),
        }
    }
}

impl MemberJoinedEvent {
    pub fn new(channel_id: Snowflake, user_id: Snowflake, added_by: Option<Snowflake>) -> Self {
        Self {
            channel_id,
            user_id,
            added_by,
            timestamp: Utc::now(),
        }
    }
}

impl MemberLeftEvent {
    pub fn new(channel_id: Snowflake, user_id: Snowflake, removed_by: Option<Snowflake>) -> Self {
        Self {
            channel_id,
            user_id,
            removed_by,
            timestamp: Utc::now(),
        }
    }
}

impl ModeratorAddedEvent {
    pub fn new(channel_id: Snowflake, user_id: Snowflake) -> Self {
        Self {
            channel_id,
            user_id,
            timestamp: Utc::now(),
        }
    }
}

impl ModeratorRemovedEvent {
    pub fn new(channel_id: Snowflake, user_id: Snowflake) -> Self {
        Self {
            channel_id,
            user_id,
            timestamp: Utc::now(),
        }
    }
}

impl ChannelArchivedEvent {
    pub fn new(channel_id: Snowflake) -> Self {
        Self {
            channel_id,
            timestamp: Utc::now(),
        }
    }
}

impl PresenceChangedEvent {
    pub fn new(user_id: Snowflake, online: bool) -> Self {
        Self {
            user_id,
            online,
            timestamp: Utc::now(),
        }
    }
}

impl TypingStartedEvent {
    pub fn new(room: RoomId, user_id: Snowflake) -> Self {
        Self {
            room,
            user_id,
            timestamp: Utc::now(),
        }
    }
}
