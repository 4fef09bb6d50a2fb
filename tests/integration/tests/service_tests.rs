//! Service-layer integration tests
//!
//! Drives the application services against the in-memory stack and
//! checks the aggregate invariants end to end.

use std::time::Duration;

use banter_cache::PermissionCache;
use banter_core::entities::{MessageKind, MessageState};
use banter_core::{DomainError, PermissionSnapshot, Permissions, RoomId};
use banter_service::{
    ChannelService, ConversationService, MessageService, PermissionService, QueryService,
    ServiceError,
};
use integration_tests::{
    seed_direct, seed_group, seed_private_channel, seed_public_channel, TestEnv, ALICE, BOB,
    CAROL, OUTSIDER,
};

fn assert_domain(err: &ServiceError, expected: &DomainError) {
    match err {
        ServiceError::Domain(e) => assert_eq!(e.code(), expected.code(), "got {e:?}"),
        other => panic!("expected domain error {expected:?}, got {other:?}"),
    }
}

// ============================================================================
// Conversations
// ============================================================================

#[tokio::test]
async fn test_direct_conversation_stays_two_sided() {
    let env = TestEnv::start();
    let conversations = ConversationService::new(&env.ctx);
    let direct = seed_direct(&env.ctx).await;

    assert_eq!(direct.participant_count(), 2);

    let err = conversations
        .add_participant(direct.id, CAROL, ALICE)
        .await
        .unwrap_err();
    assert_domain(&err, &DomainError::NotGroup);

    let err = conversations
        .remove_participant(direct.id, BOB, ALICE)
        .await
        .unwrap_err();
    assert_domain(&err, &DomainError::NotGroup);

    conversations.archive(direct.id, BOB).await.unwrap();
    conversations.unarchive(direct.id, ALICE).await.unwrap();

    let stored = env
        .ctx
        .conversation_repo()
        .get_by_id(direct.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.participant_count(), 2);
    assert!(!stored.archived);
}

#[tokio::test]
async fn test_group_never_empties() {
    let env = TestEnv::start();
    let conversations = ConversationService::new(&env.ctx);
    let group = seed_group(&env.ctx).await;

    conversations
        .remove_participant(group.id, CAROL, ALICE)
        .await
        .unwrap();
    conversations
        .remove_participant(group.id, BOB, ALICE)
        .await
        .unwrap();

    let err = conversations
        .remove_participant(group.id, ALICE, ALICE)
        .await
        .unwrap_err();
    assert_domain(&err, &DomainError::LastParticipant);

    let stored = env
        .ctx
        .conversation_repo()
        .get_by_id(group.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.participant_count(), 1);
}

#[tokio::test]
async fn test_non_participant_cannot_send() {
    let env = TestEnv::start();
    let group = seed_group(&env.ctx).await;

    let err = MessageService::new(&env.ctx)
        .send(
            group.room(),
            OUTSIDER,
            MessageKind::Text,
            "hi".to_string(),
        )
        .await
        .unwrap_err();
    assert_domain(&err, &DomainError::SenderNotParticipant);
}

// ============================================================================
// Messages
// ============================================================================

#[tokio::test]
async fn test_duplicate_reaction_is_idempotent() {
    let env = TestEnv::start();
    let group = seed_group(&env.ctx).await;
    let messages = MessageService::new(&env.ctx);

    let message = messages
        .send(group.room(), ALICE, MessageKind::Text, "hi".to_string())
        .await
        .unwrap();

    messages
        .add_reaction(message.id, BOB, "👍".to_string())
        .await
        .unwrap();
    messages
        .add_reaction(message.id, BOB, "👍".to_string())
        .await
        .unwrap();

    let stored = env
        .ctx
        .message_repo()
        .get_by_id(message.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.reactions.len(), 1);
}

#[tokio::test]
async fn test_mark_read_keeps_first_timestamp() {
    let env = TestEnv::start();
    let group = seed_group(&env.ctx).await;
    let messages = MessageService::new(&env.ctx);

    let message = messages
        .send(group.room(), ALICE, MessageKind::Text, "hi".to_string())
        .await
        .unwrap();

    messages.mark_read(message.id, CAROL).await.unwrap();
    let first = messages.read_receipts(message.id).await.unwrap();
    assert_eq!(first.len(), 1);
    let first_read_at = first[0].read_at;

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    messages.mark_read(message.id, CAROL).await.unwrap();

    let second = messages.read_receipts(message.id).await.unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].read_at, first_read_at);
}

#[tokio::test]
async fn test_deleted_message_rejects_mutations() {
    let env = TestEnv::start();
    let group = seed_group(&env.ctx).await;
    let messages = MessageService::new(&env.ctx);

    let message = messages
        .send(group.room(), ALICE, MessageKind::Text, "hi".to_string())
        .await
        .unwrap();
    messages.delete(message.id, ALICE).await.unwrap();

    let err = messages
        .edit(message.id, ALICE, "edited".to_string())
        .await
        .unwrap_err();
    assert_domain(&err, &DomainError::AlreadyDeleted);

    let err = messages
        .add_reaction(message.id, BOB, "👍".to_string())
        .await
        .unwrap_err();
    assert_domain(&err, &DomainError::AlreadyDeleted);

    let err = messages.mark_read(message.id, CAROL).await.unwrap_err();
    assert_domain(&err, &DomainError::AlreadyDeleted);
}

#[tokio::test]
async fn test_group_message_lifecycle_keeps_metadata() {
    let env = TestEnv::start();
    let group = seed_group(&env.ctx).await;
    let messages = MessageService::new(&env.ctx);

    let message = messages
        .send(group.room(), ALICE, MessageKind::Text, "hi".to_string())
        .await
        .unwrap();
    messages
        .add_reaction(message.id, BOB, "👍".to_string())
        .await
        .unwrap();
    messages.mark_read(message.id, CAROL).await.unwrap();
    messages.delete(message.id, ALICE).await.unwrap();

    let stored = env
        .ctx
        .message_repo()
        .get_by_id(message.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.state, MessageState::Deleted);
    assert!(stored.content.is_empty());
    assert_eq!(stored.reactions.len(), 1);
    assert_eq!(stored.reactions[0].user_id, BOB);
    assert_eq!(stored.read_receipts.len(), 1);
    assert_eq!(stored.read_receipts[0].user_id, CAROL);

    let err = messages
        .edit(message.id, ALICE, "again".to_string())
        .await
        .unwrap_err();
    assert_domain(&err, &DomainError::AlreadyDeleted);
}

#[tokio::test]
async fn test_message_paging_newest_first() {
    let env = TestEnv::start();
    let group = seed_group(&env.ctx).await;
    let messages = MessageService::new(&env.ctx);
    let queries = QueryService::new(&env.ctx);

    let mut ids = Vec::new();
    for i in 0..5 {
        let message = messages
            .send(group.room(), ALICE, MessageKind::Text, format!("m{i}"))
            .await
            .unwrap();
        ids.push(message.id);
    }

    let page = queries
        .messages(group.room(), None, Some(3))
        .await
        .unwrap();
    assert_eq!(page.len(), 3);
    assert_eq!(page[0].id, ids[4]);
    assert_eq!(page[2].id, ids[2]);

    let rest = queries
        .messages(group.room(), Some(page[2].id), Some(10))
        .await
        .unwrap();
    assert_eq!(rest.len(), 2);
    assert_eq!(rest[0].id, ids[1]);

    // Zero and oversized limits are rejected
    assert!(queries.messages(group.room(), None, Some(0)).await.is_err());
    assert!(queries
        .messages(group.room(), None, Some(1000))
        .await
        .is_err());
}

// ============================================================================
// Channels
// ============================================================================

#[tokio::test]
async fn test_private_channel_invite_and_moderation() {
    let env = TestEnv::start();
    let channels = ChannelService::new(&env.ctx);
    let channel = seed_private_channel(&env.ctx).await;

    // Self-service join is rejected on a private channel
    let err = channels.join(channel.id, BOB).await.unwrap_err();
    assert_domain(&err, &DomainError::PrivateChannel);

    // Owner invites Bob
    channels.add_member(channel.id, BOB, ALICE).await.unwrap();

    // Bob invites Carol, but cannot grant moderator as a plain member
    channels.add_member(channel.id, CAROL, BOB).await.unwrap();
    let err = channels
        .add_moderator(channel.id, CAROL, BOB)
        .await
        .unwrap_err();
    assert_domain(&err, &DomainError::ActorNotAuthorized);

    // The owner can
    channels
        .add_moderator(channel.id, CAROL, ALICE)
        .await
        .unwrap();

    let stored = env
        .ctx
        .channel_repo()
        .get_by_id(channel.id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.is_moderator(CAROL));
}

#[tokio::test]
async fn test_kick_revokes_moderator_status() {
    let env = TestEnv::start();
    let channels = ChannelService::new(&env.ctx);
    let channel = seed_public_channel(&env.ctx).await;

    channels.join(channel.id, BOB).await.unwrap();
    channels.add_moderator(channel.id, BOB, ALICE).await.unwrap();
    channels.remove_member(channel.id, BOB, ALICE).await.unwrap();

    let stored = env
        .ctx
        .channel_repo()
        .get_by_id(channel.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!stored.is_member(BOB));
    assert!(!stored.is_moderator(BOB));
}

#[tokio::test]
async fn test_channel_listings() {
    let env = TestEnv::start();
    let channels = ChannelService::new(&env.ctx);
    let queries = QueryService::new(&env.ctx);

    let public = seed_public_channel(&env.ctx).await;
    let private = seed_private_channel(&env.ctx).await;
    channels.join(public.id, BOB).await.unwrap();

    let listed = queries.public_channels().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, public.id);

    let bobs = queries.channels_for_user(BOB).await.unwrap();
    assert_eq!(bobs.len(), 1);

    let alices = queries.channels_for_user(ALICE).await.unwrap();
    assert_eq!(alices.len(), 2);
    assert!(alices.iter().any(|c| c.id == private.id));
}

#[tokio::test]
async fn test_conversation_list_orders_by_activity() {
    let env = TestEnv::start();
    let messages = MessageService::new(&env.ctx);
    let queries = QueryService::new(&env.ctx);

    let first = seed_group(&env.ctx).await;
    let second = seed_direct(&env.ctx).await;

    // A message in the older conversation moves it to the front
    messages
        .send(first.room(), ALICE, MessageKind::Text, "hi".to_string())
        .await
        .unwrap();

    let listed = queries.conversations_for_user(ALICE).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, first.id);
    assert_eq!(listed[1].id, second.id);

    // The room key doubles as the routing key
    assert_eq!(listed[0].room(), RoomId::Conversation(first.id));
}

// ============================================================================
// Permissions
// ============================================================================

#[tokio::test]
async fn test_membership_change_invalidates_permissions() {
    let env = TestEnv::start();
    let channels = ChannelService::new(&env.ctx);
    let permissions = PermissionService::new(&env.ctx);
    let channel = seed_public_channel(&env.ctx).await;

    channels.join(channel.id, BOB).await.unwrap();
    let in_channel = permissions
        .permissions_for(channel.room(), BOB)
        .await
        .unwrap();
    assert!(in_channel.has(Permissions::SEND_MESSAGES));

    // Kick invalidates the cached snapshot; the next read recomputes
    channels.remove_member(channel.id, BOB, ALICE).await.unwrap();
    let in_channel = permissions
        .permissions_for(channel.room(), BOB)
        .await
        .unwrap();
    assert!(in_channel.is_empty());
}

#[tokio::test]
async fn test_permissions_are_scoped_per_room() {
    let env = TestEnv::start();
    let permissions = PermissionService::new(&env.ctx);
    let group = seed_group(&env.ctx).await;
    let channel = seed_public_channel(&env.ctx).await;

    // Bob's group membership is computed and cached first
    let in_group = permissions.permissions_for(group.room(), BOB).await.unwrap();
    assert!(in_group.has(Permissions::SEND_MESSAGES));

    // It grants nothing in a channel Bob never joined
    let in_channel = permissions
        .permissions_for(channel.room(), BOB)
        .await
        .unwrap();
    assert!(in_channel.is_empty());

    // Owner rights stay confined to the owned channel
    let owner_in_channel = permissions
        .permissions_for(channel.room(), ALICE)
        .await
        .unwrap();
    assert!(owner_in_channel.has(Permissions::MANAGE_ROOM));
    let owner_in_group = permissions
        .permissions_for(group.room(), ALICE)
        .await
        .unwrap();
    assert!(!owner_in_group.has(Permissions::MANAGE_ROOM));
}

#[tokio::test]
async fn test_send_gate_reads_the_permission_cache() {
    let env = TestEnv::start();
    let group = seed_group(&env.ctx).await;
    let messages = MessageService::new(&env.ctx);

    // A cached grant is honored until it is invalidated or expires
    let planted = PermissionSnapshot::for_room(OUTSIDER, group.room(), Permissions::MEMBER);
    env.ctx
        .permission_cache()
        .set(OUTSIDER, planted, Duration::from_secs(60))
        .await
        .unwrap();
    messages
        .send(group.room(), OUTSIDER, MessageKind::Text, "let in".to_string())
        .await
        .unwrap();

    // Invalidation forces a recompute against the aggregate
    env.ctx.permission_cache().invalidate(OUTSIDER).await.unwrap();
    let err = messages
        .send(group.room(), OUTSIDER, MessageKind::Text, "hi".to_string())
        .await
        .unwrap_err();
    assert_domain(&err, &DomainError::SenderNotParticipant);
}
