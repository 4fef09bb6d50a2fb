//! Message aggregate - lifecycle, reactions, and read receipts
//!
//! Every successful mutation returns the single domain event it raised;
//! a failed mutation returns an error and leaves the message untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::events::{
    DomainEvent, MessageDeletedEvent, MessageEditedEvent, MessageReadEvent, ReactionAddedEvent,
    ReactionRemovedEvent,
};
use crate::value_objects::{RoomId, Snowflake};

/// What kind of content a message carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
    File,
    System,
}

/// Message lifecycle state
///
/// Valid transitions: Sent -> Edited, Sent -> Deleted, Edited -> Edited,
/// Edited -> Deleted. Deleted is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageState {
    Sent,
    Edited,
    Deleted,
}

impl MessageState {
    /// Check whether a transition to `next` is allowed
    pub fn can_transition_to(self, next: MessageState) -> bool {
        match self {
            Self::Sent | Self::Edited => matches!(next, Self::Edited | Self::Deleted),
            Self::Deleted => false,
        }
    }
}

/// A single emoji reaction, unique per (user, emoji)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub user_id: Snowflake,
    pub emoji: String,
    pub reacted_at: DateTime<Utc>,
}

/// Records when a user first read a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadReceipt {
    pub user_id: Snowflake,
    pub read_at: DateTime<Utc>,
}

/// Message aggregate root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Snowflake,
    pub room: RoomId,
    pub sender_id: Snowflake,
    pub kind: MessageKind,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    pub state: MessageState,
    /// Insertion-ordered, unique per (user_id, emoji)
    pub reactions: Vec<Reaction>,
    /// One receipt per user, first write wins
    pub read_receipts: Vec<ReadReceipt>,
}

impl Message {
    /// Create a new message in the Sent state
    ///
    /// Room membership of the sender is checked by the caller, which holds
    /// the room aggregate; the message itself only validates content.
    pub fn new(
        id: Snowflake,
        room: RoomId,
        sender_id: Snowflake,
        kind: MessageKind,
        content: String,
    ) -> Result<Self, DomainError> {
        if content.trim().is_empty() {
            return Err(DomainError::EmptyContent);
        }
        Ok(Self {
            id,
            room,
            sender_id,
            kind,
            content,
            created_at: Utc::now(),
            edited_at: None,
            state: MessageState::Sent,
            reactions: Vec::new(),
            read_receipts: Vec::new(),
        })
    }

    /// Check if the message has been soft-deleted
    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.state == MessageState::Deleted
    }

    /// Check if the message has been edited
    #[inline]
    pub fn is_edited(&self) -> bool {
        self.edited_at.is_some()
    }

    /// Replace the content, recording the edit time
    pub fn edit(
        &mut self,
        editor_id: Snowflake,
        content: String,
    ) -> Result<DomainEvent, DomainError> {
        if self.is_deleted() {
            return Err(DomainError::AlreadyDeleted);
        }
        if editor_id != self.sender_id {
            return Err(DomainError::NotOwner);
        }
        if content.trim().is_empty() {
            return Err(DomainError::EmptyContent);
        }

        self.content = content;
        self.edited_at = Some(Utc::now());
        self.state = MessageState::Edited;

        Ok(DomainEvent::MessageEdited(MessageEditedEvent::new(
            self.id, self.room, editor_id,
        )))
    }

    /// Soft-delete: content is cleared, identity and metadata persist
    pub fn delete(&mut self, requester_id: Snowflake) -> Result<DomainEvent, DomainError> {
        if self.is_deleted() {
            return Err(DomainError::AlreadyDeleted);
        }
        if requester_id != self.sender_id {
            return Err(DomainError::NotOwner);
        }

        self.content.clear();
        self.state = MessageState::Deleted;

        Ok(DomainEvent::MessageDeleted(MessageDeletedEvent::new(
            self.id, self.room,
        )))
    }

    /// Add a reaction; a duplicate (user, emoji) is a no-op success
    pub fn add_reaction(
        &mut self,
        user_id: Snowflake,
        emoji: String,
    ) -> Result<Option<DomainEvent>, DomainError> {
        if self.is_deleted() {
            return Err(DomainError::AlreadyDeleted);
        }
        if self.has_reaction(user_id, &emoji) {
            return Ok(None);
        }

        self.reactions.push(Reaction {
            user_id,
            emoji: emoji.clone(),
            reacted_at: Utc::now(),
        });

        Ok(Some(DomainEvent::ReactionAdded(ReactionAddedEvent::new(
            self.id, self.room, user_id, emoji,
        ))))
    }

    /// Remove a reaction by its (user, emoji) key
    pub fn remove_reaction(
        &mut self,
        user_id: Snowflake,
        emoji: &str,
    ) -> Result<DomainEvent, DomainError> {
        if self.is_deleted() {
            return Err(DomainError::AlreadyDeleted);
        }
        let index = self
            .reactions
            .iter()
            .position(|r| r.user_id == user_id && r.emoji == emoji)
            .ok_or(DomainError::ReactionNotFound)?;

        self.reactions.remove(index);

        Ok(DomainEvent::ReactionRemoved(ReactionRemovedEvent::new(
            self.id,
            self.room,
            user_id,
            emoji.to_string(),
        )))
    }

    /// Record that a user read the message; the first read time is kept
    /// and later calls are no-op successes
    pub fn mark_read(&mut self, user_id: Snowflake) -> Result<Option<DomainEvent>, DomainError> {
        if self.is_deleted() {
            return Err(DomainError::AlreadyDeleted);
        }
        if self.read_by(user_id).is_some() {
            return Ok(None);
        }

        self.read_receipts.push(ReadReceipt {
            user_id,
            read_at: Utc::now(),
        });

        Ok(Some(DomainEvent::MessageRead(MessageReadEvent::new(
            self.id, self.room, user_id,
        ))))
    }

    /// Check if a (user, emoji) reaction exists
    pub fn has_reaction(&self, user_id: Snowflake, emoji: &str) -> bool {
        self.reactions
            .iter()
            .any(|r| r.user_id == user_id && r.emoji == emoji)
    }

    /// When the user first read this message, if they have
    pub fn read_by(&self, user_id: Snowflake) -> Option<DateTime<Utc>> {
        self.read_receipts
            .iter()
            .find(|r| r.user_id == user_id)
            .map(|r| r.read_at)
    }

    #[inline]
    pub fn reaction_count(&self) -> usize {
        self.reactions.len()
    }
}
