//! Conversation aggregate - direct/group membership and archival rules
//!
//! Direct conversations hold exactly two participants for their entire
//! lifetime; only Group conversations accept membership changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::events::{
    ConversationArchivedEvent, ConversationCreatedEvent, ConversationUnarchivedEvent, DomainEvent,
    ParticipantAddedEvent, ParticipantRemovedEvent,
};
use crate::value_objects::{RoomId, Snowflake};

/// Direct (1:1) or Group conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationKind {
    Direct,
    Group,
}

/// Conversation aggregate root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Snowflake,
    pub kind: ConversationKind,
    /// Unique, insertion-ordered
    pub participants: Vec<Snowflake>,
    pub created_at: DateTime<Utc>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub archived: bool,
}

impl Conversation {
    /// Create a conversation; the creator is always included and duplicate
    /// ids collapse. Direct requires exactly two distinct participants.
    pub fn create(
        id: Snowflake,
        kind: ConversationKind,
        participant_ids: Vec<Snowflake>,
        creator_id: Snowflake,
    ) -> Result<(Self, DomainEvent), DomainError> {
        let mut participants = vec![creator_id];
        for pid in participant_ids {
            if !participants.contains(&pid) {
                participants.push(pid);
            }
        }

        if kind == ConversationKind::Direct && participants.len() != 2 {
            return Err(DomainError::DirectNeedsExactlyTwo);
        }

        let conversation = Self {
            id,
            kind,
            participants: participants.clone(),
            created_at: Utc::now(),
            last_message_at: None,
            archived: false,
        };
        let event = DomainEvent::ConversationCreated(ConversationCreatedEvent::new(
            id,
            participants,
        ));
        Ok((conversation, event))
    }

    /// The fan-out routing key for this conversation
    #[inline]
    pub fn room(&self) -> RoomId {
        RoomId::Conversation(self.id)
    }

    #[inline]
    pub fn is_direct(&self) -> bool {
        self.kind == ConversationKind::Direct
    }

    #[inline]
    pub fn is_participant(&self, user_id: Snowflake) -> bool {
        self.participants.contains(&user_id)
    }

    #[inline]
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Add a participant; only valid on Group conversations
    pub fn add_participant(
        &mut self,
        new_id: Snowflake,
        actor_id: Snowflake,
    ) -> Result<DomainEvent, DomainError> {
        if !self.is_participant(actor_id) {
            return Err(DomainError::ActorNotParticipant);
        }
        if self.kind != ConversationKind::Group {
            return Err(DomainError::NotGroup);
        }
        if self.is_participant(new_id) {
            return Err(DomainError::AlreadyParticipant);
        }

        self.participants.push(new_id);

        Ok(DomainEvent::ParticipantAdded(ParticipantAddedEvent::new(
            self.id, new_id, actor_id,
        )))
    }

    /// Remove a participant; the group must keep at least one member
    pub fn remove_participant(
        &mut self,
        target_id: Snowflake,
        actor_id: Snowflake,
    ) -> Result<DomainEvent, DomainError> {
        if !self.is_participant(actor_id) {
            return Err(DomainError::ActorNotParticipant);
        }
        if self.kind != ConversationKind::Group {
            return Err(DomainError::NotGroup);
        }
        if !self.is_participant(target_id) {
            return Err(DomainError::TargetNotParticipant);
        }
        if self.participants.len() <= 1 {
            return Err(DomainError::LastParticipant);
        }

        self.participants.retain(|p| *p != target_id);

        Ok(DomainEvent::ParticipantRemoved(
            ParticipantRemovedEvent::new(self.id, target_id, actor_id),
        ))
    }

    /// Archive; idempotent for participants
    pub fn archive(&mut self, actor_id: Snowflake) -> Result<DomainEvent, DomainError> {
        if !self.is_participant(actor_id) {
            return Err(DomainError::ActorNotParticipant);
        }
        self.archived = true;
        Ok(DomainEvent::ConversationArchived(
            ConversationArchivedEvent::new(self.id),
        ))
    }

    /// Unarchive; idempotent for participants
    pub fn unarchive(&mut self, actor_id: Snowflake) -> Result<DomainEvent, DomainError> {
        if !self.is_participant(actor_id) {
            return Err(DomainError::ActorNotParticipant);
        }
        self.archived = false;
        Ok(DomainEvent::ConversationUnarchived(
            ConversationUnarchivedEvent::new(self.id),
        ))
    }

    /// Record that a message landed in this conversation
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.last_message_at = Some(at);
    }
}
