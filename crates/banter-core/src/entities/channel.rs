//! Channel aggregate - public/private membership, ownership, moderation
//!
//! The owner is an implicit member and implicitly privileged; the moderator
//! set is always a subset of the member set, so removing a member also
//! revokes any moderator status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::events::{
    ChannelArchivedEvent, ChannelCreatedEvent, DomainEvent, MemberJoinedEvent, MemberLeftEvent,
    ModeratorAddedEvent, ModeratorRemovedEvent,
};
use crate::value_objects::{RoomId, Snowflake};

/// Maximum channel name length in characters, after trimming
pub const MAX_NAME_LENGTH: usize = 100;

/// Who may join a channel unassisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelVisibility {
    /// Joinable by any authenticated identity
    Public,
    /// Joinable only by invitation from an existing member
    Private,
}

/// Channel aggregate root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: Snowflake,
    pub name: String,
    pub description: Option<String>,
    pub visibility: ChannelVisibility,
    pub owner_id: Snowflake,
    /// Unique, insertion-ordered; the owner is implicit and never listed here
    pub members: Vec<Snowflake>,
    /// Subset of members; the owner is implicitly privileged and never listed
    pub moderators: Vec<Snowflake>,
    pub created_at: DateTime<Utc>,
    pub archived: bool,
}

impl Channel {
    /// Create a channel with the given owner
    pub fn create(
        id: Snowflake,
        name: &str,
        visibility: ChannelVisibility,
        owner_id: Snowflake,
    ) -> Result<(Self, DomainEvent), DomainError> {
        let name = name.trim();
        if name.is_empty() || name.chars().count() > MAX_NAME_LENGTH {
            return Err(DomainError::InvalidName);
        }

        let channel = Self {
            id,
            name: name.to_string(),
            description: None,
            visibility,
            owner_id,
            members: Vec::new(),
            moderators: Vec::new(),
            created_at: Utc::now(),
            archived: false,
        };
        let event = DomainEvent::ChannelCreated(ChannelCreatedEvent::new(id, owner_id));
        Ok((channel, event))
    }

    /// The fan-out routing key for this channel
    #[inline]
    pub fn room(&self) -> RoomId {
        RoomId::Channel(self.id)
    }

    #[inline]
    pub fn is_owner(&self, user_id: Snowflake) -> bool {
        self.owner_id == user_id
    }

    /// Membership check; the owner always counts as a member
    #[inline]
    pub fn is_member(&self, user_id: Snowflake) -> bool {
        self.is_owner(user_id) || self.members.contains(&user_id)
    }

    #[inline]
    pub fn is_moderator(&self, user_id: Snowflake) -> bool {
        self.moderators.contains(&user_id)
    }

    /// Owner or moderator
    #[inline]
    pub fn can_moderate(&self, user_id: Snowflake) -> bool {
        self.is_owner(user_id) || self.is_moderator(user_id)
    }

    /// Members including the implicit owner
    pub fn member_ids(&self) -> Vec<Snowflake> {
        let mut ids = Vec::with_capacity(self.members.len() + 1);
        ids.push(self.owner_id);
        ids.extend_from_slice(&self.members);
        ids
    }

    /// Self-service join; Public channels only
    pub fn join(&mut self, user_id: Snowflake) -> Result<DomainEvent, DomainError> {
        if self.is_member(user_id) {
            return Err(DomainError::AlreadyMember);
        }
        if self.visibility == ChannelVisibility::Private {
            return Err(DomainError::PrivateChannel);
        }

        self.members.push(user_id);

        Ok(DomainEvent::MemberJoined(MemberJoinedEvent::new(
            self.id, user_id, None,
        )))
    }

    /// Leave voluntarily; revokes moderator status, the owner cannot leave
    pub fn leave(&mut self, user_id: Snowflake) -> Result<DomainEvent, DomainError> {
        if self.is_owner(user_id) {
            return Err(DomainError::OwnerCannotLeave);
        }
        if !self.members.contains(&user_id) {
            return Err(DomainError::NotMember);
        }

        self.members.retain(|m| *m != user_id);
        self.moderators.retain(|m| *m != user_id);

        Ok(DomainEvent::MemberLeft(MemberLeftEvent::new(
            self.id, user_id, None,
        )))
    }

    /// Invitation path, valid for both visibilities; any member may invite
    pub fn add_member(
        &mut self,
        new_id: Snowflake,
        actor_id: Snowflake,
    ) -> Result<DomainEvent, DomainError> {
        if !self.is_member(actor_id) {
            return Err(DomainError::ActorNotAuthorized);
        }
        if self.is_member(new_id) {
            return Err(DomainError::AlreadyMember);
        }

        self.members.push(new_id);

        Ok(DomainEvent::MemberJoined(MemberJoinedEvent::new(
            self.id,
            new_id,
            Some(actor_id),
        )))
    }

    /// Kick a member; owner/moderator only, the owner cannot be kicked
    pub fn remove_member(
        &mut self,
        target_id: Snowflake,
        actor_id: Snowflake,
    ) -> Result<DomainEvent, DomainError> {
        if !self.can_moderate(actor_id) || self.is_owner(target_id) {
            return Err(DomainError::ActorNotAuthorized);
        }
        if !self.members.contains(&target_id) {
            return Err(DomainError::NotMember);
        }

        self.members.retain(|m| *m != target_id);
        self.moderators.retain(|m| *m != target_id);

        Ok(DomainEvent::MemberLeft(MemberLeftEvent::new(
            self.id,
            target_id,
            Some(actor_id),
        )))
    }

    /// Grant moderator status; owner/moderator only, target must be a member
    pub fn add_moderator(
        &mut self,
        user_id: Snowflake,
        actor_id: Snowflake,
    ) -> Result<DomainEvent, DomainError> {
        if !self.can_moderate(actor_id) {
            return Err(DomainError::ActorNotAuthorized);
        }
        if !self.members.contains(&user_id) {
            return Err(DomainError::NotMember);
        }
        if self.is_moderator(user_id) {
            return Err(DomainError::AlreadyModerator);
        }

        self.moderators.push(user_id);

        Ok(DomainEvent::ModeratorAdded(ModeratorAddedEvent::new(
            self.id, user_id,
        )))
    }

    /// Revoke moderator status; owner/moderator only
    pub fn remove_moderator(
        &mut self,
        user_id: Snowflake,
        actor_id: Snowflake,
    ) -> Result<DomainEvent, DomainError> {
        if !self.can_moderate(actor_id) {
            return Err(DomainError::ActorNotAuthorized);
        }
        if !self.is_moderator(user_id) {
            return Err(DomainError::NotModerator);
        }

        self.moderators.retain(|m| *m != user_id);

        Ok(DomainEvent::ModeratorRemoved(ModeratorRemovedEvent::new(
            self.id, user_id,
        )))
    }

    /// Archive; owner/moderator only, idempotent
    pub fn archive(&mut self, actor_id: Snowflake) -> Result<DomainEvent, DomainError> {
        if !self.can_moderate(actor_id) {
            return Err(DomainError::ActorNotAuthorized);
        }
        self.archived = true;
        Ok(DomainEvent::ChannelArchived(ChannelArchivedEvent::new(
            self.id,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: Snowflake = Snowflake::new(1);
    const ALICE: Snowflake = Snowflake::new(2);
    const BOB: Snowflake = Snowflake::new(3);

    fn public_channel() -> Channel {
        Channel::create(Snowflake::new(10), "general", ChannelVisibility::Public, OWNER)
            .unwrap()
            .0
    }

    fn private_channel() -> Channel {
        Channel::create(Snowflake::new(10), "staff", ChannelVisibility::Private, OWNER)
            .unwrap()
            .0
    }

    #[test]
    fn test_create_validates_name() {
        assert!(matches!(
            Channel::create(Snowflake::new(1), "  ", ChannelVisibility::Public, OWNER),
            Err(DomainError::InvalidName)
        ));
        assert!(matches!(
            Channel::create(
                Snowflake::new(1),
                &"x".repeat(101),
                ChannelVisibility::Public,
                OWNER
            ),
            Err(DomainError::InvalidName)
        ));

        let (channel, event) = Channel::create(
            Snowflake::new(1),
            "  general  ",
            ChannelVisibility::Public,
            OWNER,
        )
        .unwrap();
        assert_eq!(channel.name, "general");
        assert_eq!(event.event_type(), "CHANNEL_CREATED");
    }

    #[test]
    fn test_name_limit_counts_characters_not_bytes() {
        // 40 characters, 120 UTF-8 bytes
        let name = "한".repeat(40);
        let (channel, _) =
            Channel::create(Snowflake::new(1), &name, ChannelVisibility::Public, OWNER).unwrap();
        assert_eq!(channel.name.chars().count(), 40);

        assert!(matches!(
            Channel::create(
                Snowflake::new(1),
                &"한".repeat(MAX_NAME_LENGTH + 1),
                ChannelVisibility::Public,
                OWNER
            ),
            Err(DomainError::InvalidName)
        ));
    }

    #[test]
    fn test_owner_is_implicit_member() {
        let channel = public_channel();
        assert!(channel.is_member(OWNER));
        assert!(channel.members.is_empty());
        assert!(channel.can_moderate(OWNER));
        assert!(!channel.is_moderator(OWNER));
        assert_eq!(channel.member_ids(), vec![OWNER]);
    }

    #[test]
    fn test_public_join() {
        let mut channel = public_channel();
        let event = channel.join(ALICE).unwrap();
        assert!(channel.is_member(ALICE));
        assert_eq!(event.event_type(), "MEMBER_JOINED");

        assert!(matches!(channel.join(ALICE), Err(DomainError::AlreadyMember)));
        assert!(matches!(channel.join(OWNER), Err(DomainError::AlreadyMember)));
    }

    #[test]
    fn test_private_join_rejected_invite_works() {
        let mut channel = private_channel();
        assert!(matches!(channel.join(ALICE), Err(DomainError::PrivateChannel)));

        channel.add_member(ALICE, OWNER).unwrap();
        assert!(channel.is_member(ALICE));

        // Any member may invite further
        channel.add_member(BOB, ALICE).unwrap();
        assert!(channel.is_member(BOB));
    }

    #[test]
    fn test_invite_requires_membership() {
        let mut channel = private_channel();
        assert!(matches!(
            channel.add_member(BOB, ALICE),
            Err(DomainError::ActorNotAuthorized)
        ));
    }

    #[test]
    fn test_leave_revokes_moderator() {
        let mut channel = public_channel();
        channel.join(ALICE).unwrap();
        channel.add_moderator(ALICE, OWNER).unwrap();
        assert!(channel.is_moderator(ALICE));

        let event = channel.leave(ALICE).unwrap();
        assert!(!channel.is_member(ALICE));
        assert!(!channel.is_moderator(ALICE));
        assert_eq!(event.event_type(), "MEMBER_LEFT");
    }

    #[test]
    fn test_owner_cannot_leave() {
        let mut channel = public_channel();
        assert!(matches!(channel.leave(OWNER), Err(DomainError::OwnerCannotLeave)));
        assert!(matches!(channel.leave(ALICE), Err(DomainError::NotMember)));
    }

    #[test]
    fn test_remove_member_requires_moderation() {
        let mut channel = public_channel();
        channel.join(ALICE).unwrap();
        channel.join(BOB).unwrap();

        // Plain member cannot kick
        assert!(matches!(
            channel.remove_member(BOB, ALICE),
            Err(DomainError::ActorNotAuthorized)
        ));

        channel.add_moderator(ALICE, OWNER).unwrap();
        channel.remove_member(BOB, ALICE).unwrap();
        assert!(!channel.is_member(BOB));

        // The owner cannot be kicked, even by a moderator
        assert!(matches!(
            channel.remove_member(OWNER, ALICE),
            Err(DomainError::ActorNotAuthorized)
        ));
    }

    #[test]
    fn test_kick_revokes_moderator() {
        let mut channel = public_channel();
        channel.join(ALICE).unwrap();
        channel.add_moderator(ALICE, OWNER).unwrap();

        channel.remove_member(ALICE, OWNER).unwrap();
        assert!(!channel.is_moderator(ALICE));
        assert!(channel.moderators.is_empty());
    }

    #[test]
    fn test_moderator_management() {
        let mut channel = public_channel();
        channel.join(ALICE).unwrap();
        channel.join(BOB).unwrap();

        // Member who is not a moderator cannot grant
        assert!(matches!(
            channel.add_moderator(BOB, ALICE),
            Err(DomainError::ActorNotAuthorized)
        ));

        // Target must be a member
        assert!(matches!(
            channel.add_moderator(Snowflake::new(99), OWNER),
            Err(DomainError::NotMember)
        ));

        channel.add_moderator(ALICE, OWNER).unwrap();
        assert!(matches!(
            channel.add_moderator(ALICE, OWNER),
            Err(DomainError::AlreadyModerator)
        ));

        // A moderator may grant and revoke
        channel.add_moderator(BOB, ALICE).unwrap();
        channel.remove_moderator(BOB, ALICE).unwrap();
        assert!(!channel.is_moderator(BOB));

        assert!(matches!(
            channel.remove_moderator(BOB, ALICE),
            Err(DomainError::NotModerator)
        ));
    }

    #[test]
    fn test_archive_owner_or_moderator_only() {
        let mut channel = public_channel();
        channel.join(ALICE).unwrap();

        assert!(matches!(
            channel.archive(ALICE),
            Err(DomainError::ActorNotAuthorized)
        ));

        channel.archive(OWNER).unwrap();
        assert!(channel.archived);

        // Idempotent
        channel.archive(OWNER).unwrap();
        assert!(channel.archived);
    }
}
