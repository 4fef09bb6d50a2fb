//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Message not found: {0}")]
    MessageNotFound(Snowflake),

    #[error("Conversation not found: {0}")]
    ConversationNotFound(Snowflake),

    #[error("Channel not found: {0}")]
    ChannelNotFound(Snowflake),

    #[error("Reaction not found")]
    ReactionNotFound,

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Sender is not a participant of this room")]
    SenderNotParticipant,

    #[error("Not the message owner")]
    NotOwner,

    #[error("Actor is not a participant of this conversation")]
    ActorNotParticipant,

    #[error("Actor is not authorized for this channel operation")]
    ActorNotAuthorized,

    #[error("Private channels are join-by-invitation only")]
    PrivateChannel,

    // =========================================================================
    // Invariant Violations
    // =========================================================================
    #[error("Message content must not be empty")]
    EmptyContent,

    #[error("Message has already been deleted")]
    AlreadyDeleted,

    #[error("Direct conversations need exactly two participants")]
    DirectNeedsExactlyTwo,

    #[error("Participants can only change on group conversations")]
    NotGroup,

    #[error("Already a participant of this conversation")]
    AlreadyParticipant,

    #[error("Cannot remove the last participant of a group")]
    LastParticipant,

    #[error("Target is not a participant of this conversation")]
    TargetNotParticipant,

    #[error("Channel name must be 1-100 characters")]
    InvalidName,

    #[error("Already a member of this channel")]
    AlreadyMember,

    #[error("The owner cannot leave their channel")]
    OwnerCannotLeave,

    #[error("Not a member of this channel")]
    NotMember,

    #[error("Already a moderator of this channel")]
    AlreadyModerator,

    #[error("Not a moderator of this channel")]
    NotModerator,

    // =========================================================================
    // Conflict (storage concurrent-write)
    // =========================================================================
    #[error("Concurrent write conflict: {0}")]
    Conflict(String),

    // =========================================================================
    // Transport / Infrastructure Failures (wrapped)
    // =========================================================================
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl DomainError {
    /// Get an error code string for wire responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::MessageNotFound(_) => "UNKNOWN_MESSAGE",
            Self::ConversationNotFound(_) => "UNKNOWN_CONVERSATION",
            Self::ChannelNotFound(_) => "UNKNOWN_CHANNEL",
            Self::ReactionNotFound => "REACTION_NOT_FOUND",

            // Authorization
            Self::SenderNotParticipant => "SENDER_NOT_PARTICIPANT",
            Self::NotOwner => "NOT_OWNER",
            Self::ActorNotParticipant => "ACTOR_NOT_PARTICIPANT",
            Self::ActorNotAuthorized => "ACTOR_NOT_AUTHORIZED",
            Self::PrivateChannel => "PRIVATE_CHANNEL",

            // Invariants
            Self::EmptyContent => "EMPTY_CONTENT",
            Self::AlreadyDeleted => "ALREADY_DELETED",
            Self::DirectNeedsExactlyTwo => "DIRECT_NEEDS_EXACTLY_TWO",
            Self::NotGroup => "NOT_GROUP",
            Self::AlreadyParticipant => "ALREADY_PARTICIPANT",
            Self::LastParticipant => "LAST_PARTICIPANT",
            Self::TargetNotParticipant => "TARGET_NOT_PARTICIPANT",
            Self::InvalidName => "INVALID_NAME",
            Self::AlreadyMember => "ALREADY_MEMBER",
            Self::OwnerCannotLeave => "OWNER_CANNOT_LEAVE",
            Self::NotMember => "NOT_MEMBER",
            Self::AlreadyModerator => "ALREADY_MODERATOR",
            Self::NotModerator => "NOT_MODERATOR",

            // Conflict
            Self::Conflict(_) => "CONFLICT",

            // Transport
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Transport(_) => "TRANSPORT_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::MessageNotFound(_)
                | Self::ConversationNotFound(_)
                | Self::ChannelNotFound(_)
                | Self::ReactionNotFound
        )
    }

    /// Check if this is an authorization error (never retried)
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::SenderNotParticipant
                | Self::NotOwner
                | Self::ActorNotParticipant
                | Self::ActorNotAuthorized
                | Self::PrivateChannel
        )
    }

    /// Check if this is an aggregate invariant violation (never retried)
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::EmptyContent
                | Self::AlreadyDeleted
                | Self::DirectNeedsExactlyTwo
                | Self::NotGroup
                | Self::AlreadyParticipant
                | Self::LastParticipant
                | Self::TargetNotParticipant
                | Self::InvalidName
                | Self::AlreadyMember
                | Self::OwnerCannotLeave
                | Self::NotMember
                | Self::AlreadyModerator
                | Self::NotModerator
        )
    }

    /// Check if this is a storage concurrent-write conflict (retryable once)
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Check if this is a storage/cache/backplane I/O failure
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Cache(_) | Self::Transport(_))
    }
}
