//! Realtime integration tests
//!
//! Connects sessions through the registry, dispatcher, and local
//! backplane and checks fan-out, presence transitions, and error
//! frames as a client would observe them.

use std::time::Duration;

use banter_cache::{
    Backplane, EventEnvelope, LocalBackplane, MemoryPermissionCache, MemoryTypingStore,
    PermissionCache, TypingStore,
};
use banter_core::entities::MessageKind;
use banter_core::events::{DomainEvent, MessageSentEvent};
use banter_core::{PermissionSnapshot, Permissions, RoomId, Snowflake};
use banter_realtime::{ClientCommand, ServerEvent};
use banter_service::PresenceService;
use integration_tests::{
    assert_no_event_of, assert_silent, recv_event_of, recv_frame, seed_group,
    seed_public_channel, TestEnv, ALICE, BOB, CAROL,
};

// ============================================================================
// Fan-out
// ============================================================================

#[tokio::test]
async fn test_room_fanout_reaches_all_participants_in_order() {
    let env = TestEnv::start();
    let group = seed_group(&env.ctx).await;

    let (alice, mut alice_rx) = env.connect(ALICE).await.unwrap();
    let (_bob, mut bob_rx) = env.connect(BOB).await.unwrap();

    alice
        .handle(ClientCommand::SendMessage {
            room: group.room(),
            kind: MessageKind::Text,
            content: "first".to_string(),
        })
        .await;
    alice
        .handle(ClientCommand::SendMessage {
            room: group.room(),
            kind: MessageKind::Text,
            content: "second".to_string(),
        })
        .await;

    // Both the sender and the other participant receive both events,
    // in publish order, with strictly increasing sequence numbers
    let a1 = recv_event_of(&mut alice_rx, "MESSAGE_SENT").await;
    let a2 = recv_event_of(&mut alice_rx, "MESSAGE_SENT").await;
    assert!(a2 > a1);

    let b1 = recv_event_of(&mut bob_rx, "MESSAGE_SENT").await;
    let b2 = recv_event_of(&mut bob_rx, "MESSAGE_SENT").await;
    assert!(b2 > b1);
}

#[tokio::test]
async fn test_typing_fanout() {
    let env = TestEnv::start();
    let group = seed_group(&env.ctx).await;

    let (alice, _alice_rx) = env.connect(ALICE).await.unwrap();
    let (_bob, mut bob_rx) = env.connect(BOB).await.unwrap();

    alice
        .handle(ClientCommand::StartTyping { room: group.room() })
        .await;

    recv_event_of(&mut bob_rx, "TYPING_STARTED").await;

    let typing = PresenceService::new(&env.ctx)
        .typing_users(group.room())
        .await
        .unwrap();
    assert_eq!(typing, vec![ALICE]);
}

#[tokio::test]
async fn test_removed_participant_stops_receiving() {
    let env = TestEnv::start();
    let group = seed_group(&env.ctx).await;

    let (alice, mut alice_rx) = env.connect(ALICE).await.unwrap();
    let (_bob, mut bob_rx) = env.connect(BOB).await.unwrap();

    alice
        .handle(ClientCommand::RemoveParticipant {
            room: group.room(),
            user_id: BOB,
        })
        .await;
    recv_event_of(&mut alice_rx, "PARTICIPANT_REMOVED").await;

    // Bob's live session dropped the room; later traffic never reaches him
    alice
        .handle(ClientCommand::SendMessage {
            room: group.room(),
            kind: MessageKind::Text,
            content: "after removal".to_string(),
        })
        .await;
    recv_event_of(&mut alice_rx, "MESSAGE_SENT").await;
    assert_no_event_of(&mut bob_rx, "MESSAGE_SENT").await;
}

#[tokio::test]
async fn test_join_channel_subscribes_live_session() {
    let env = TestEnv::start();
    let channel = seed_public_channel(&env.ctx).await;

    let (alice, mut alice_rx) = env.connect(ALICE).await.unwrap();
    let (bob, mut bob_rx) = env.connect(BOB).await.unwrap();

    bob.handle(ClientCommand::JoinChannel {
        channel_id: channel.id,
    })
    .await;
    // The owner was subscribed when the join was published
    recv_event_of(&mut alice_rx, "MEMBER_JOINED").await;

    alice
        .handle(ClientCommand::SendMessage {
            room: channel.room(),
            kind: MessageKind::Text,
            content: "welcome".to_string(),
        })
        .await;
    recv_event_of(&mut bob_rx, "MESSAGE_SENT").await;
}

// ============================================================================
// Error frames
// ============================================================================

#[tokio::test]
async fn test_error_frames_carry_domain_codes() {
    let env = TestEnv::start();
    let group = seed_group(&env.ctx).await;

    let (alice, mut alice_rx) = env.connect(ALICE).await.unwrap();
    let (bob, mut bob_rx) = env.connect(BOB).await.unwrap();

    alice
        .handle(ClientCommand::SendMessage {
            room: group.room(),
            kind: MessageKind::Text,
            content: "mine".to_string(),
        })
        .await;

    // Find the message id from Alice's own fan-out frame
    let message_id = loop {
        match recv_frame(&mut alice_rx).await {
            ServerEvent::Event {
                event: DomainEvent::MessageSent(e),
                ..
            } => break e.message_id,
            _ => continue,
        }
    };
    recv_event_of(&mut bob_rx, "MESSAGE_SENT").await;

    // Bob cannot edit Alice's message
    bob.handle(ClientCommand::EditMessage {
        message_id,
        content: "hijack".to_string(),
    })
    .await;

    let code = loop {
        match recv_frame(&mut bob_rx).await {
            ServerEvent::Error { code, .. } => break code,
            ServerEvent::Event { .. } | ServerEvent::Ready { .. } => continue,
        }
    };
    assert_eq!(code, "NOT_OWNER");
}

// ============================================================================
// Presence
// ============================================================================

#[tokio::test]
async fn test_presence_transitions_exactly_once_across_n_connections() {
    let env = TestEnv::start();
    let _group = seed_group(&env.ctx).await;

    let (_alice, mut alice_rx) = env.connect(ALICE).await.unwrap();
    // Alice observes her own online transition first
    recv_event_of(&mut alice_rx, "PRESENCE_CHANGED").await;

    // Three simultaneous sessions for Bob
    let (bob1, _rx1) = env.connect(BOB).await.unwrap();
    let (bob2, _rx2) = env.connect(BOB).await.unwrap();
    let (bob3, _rx3) = env.connect(BOB).await.unwrap();

    // Exactly one online event for the 0 -> 1 crossing
    recv_event_of(&mut alice_rx, "PRESENCE_CHANGED").await;
    assert!(env.ctx.presence_store().is_online(BOB).await.unwrap());

    bob1.disconnect().await;
    bob2.disconnect().await;
    assert!(env.ctx.presence_store().is_online(BOB).await.unwrap());
    assert_silent(&mut alice_rx).await;

    bob3.disconnect().await;
    recv_event_of(&mut alice_rx, "PRESENCE_CHANGED").await;
    assert!(!env.ctx.presence_store().is_online(BOB).await.unwrap());
    assert_silent(&mut alice_rx).await;
}

#[tokio::test]
async fn test_presence_event_reaches_shared_rooms_only() {
    let env = TestEnv::start();
    seed_group(&env.ctx).await; // Alice, Bob, Carol

    let (_carol, mut carol_rx) = env.connect(CAROL).await.unwrap();
    // Carol's own online transition
    recv_event_of(&mut carol_rx, "PRESENCE_CHANGED").await;

    let (bob, _bob_rx) = env.connect(BOB).await.unwrap();
    // Bob coming online reaches Carol through their shared room
    recv_event_of(&mut carol_rx, "PRESENCE_CHANGED").await;

    bob.disconnect().await;
    recv_event_of(&mut carol_rx, "PRESENCE_CHANGED").await;
    assert_silent(&mut carol_rx).await;
}

// ============================================================================
// Caches and backplane
// ============================================================================

#[tokio::test]
async fn test_permission_cache_ttl_and_invalidate() {
    let cache = MemoryPermissionCache::new();
    let room = RoomId::Channel(Snowflake::new(5));
    let snapshot = PermissionSnapshot::for_room(ALICE, room, Permissions::MEMBER);

    // Expiry by TTL
    cache
        .set(ALICE, snapshot.clone(), Duration::from_millis(20))
        .await
        .unwrap();
    assert!(cache.get(ALICE).await.unwrap().is_some());
    tokio::time::sleep(Duration::from_millis(40)).await;
    assert!(cache.get(ALICE).await.unwrap().is_none());

    // Explicit invalidation is immediate, well before the TTL
    cache
        .set(ALICE, snapshot, Duration::from_secs(900))
        .await
        .unwrap();
    cache.invalidate(ALICE).await.unwrap();
    assert!(cache.get(ALICE).await.unwrap().is_none());
}

#[tokio::test]
async fn test_typing_entries_expire() {
    let store = MemoryTypingStore::new();
    let room = RoomId::Conversation(Snowflake::new(1));

    store
        .start(room, ALICE, Duration::from_millis(20))
        .await
        .unwrap();
    assert_eq!(store.typing_users(room).await.unwrap(), vec![ALICE]);

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert!(store.typing_users(room).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_local_backplane_degrades_silently() {
    let backplane = LocalBackplane::new();
    let room = RoomId::Channel(Snowflake::new(1));

    // Publishing without a subscription is a successful no-op
    let envelope = EventEnvelope::new(
        room,
        DomainEvent::MessageSent(MessageSentEvent::new(
            Snowflake::new(1),
            room,
            Snowflake::new(2),
        )),
        backplane.instance_id(),
    );
    backplane.publish(envelope.clone()).await.unwrap();

    let mut events = backplane.events();
    assert!(events.try_recv().is_err());

    // After subscribing the same publish is delivered
    backplane.subscribe(room).await.unwrap();
    backplane.publish(envelope).await.unwrap();
    let received = events.recv().await.unwrap();
    assert_eq!(received.room, room);
}
