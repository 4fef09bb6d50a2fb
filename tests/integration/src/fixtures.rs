//! Test fixtures
//!
//! Well-known user ids and seed helpers shared by the integration tests.

use banter_core::entities::{Channel, ChannelVisibility, Conversation};
use banter_core::Snowflake;
use banter_service::{ChannelService, ConversationService, ServiceContext};

pub const ALICE: Snowflake = Snowflake::new(101);
pub const BOB: Snowflake = Snowflake::new(102);
pub const CAROL: Snowflake = Snowflake::new(103);
pub const OUTSIDER: Snowflake = Snowflake::new(999);

/// Group conversation with Alice (creator), Bob, and Carol
pub async fn seed_group(ctx: &ServiceContext) -> Conversation {
    ConversationService::new(ctx)
        .create_group(ALICE, vec![BOB, CAROL])
        .await
        .expect("seed group conversation")
}

/// Direct conversation between Alice and Bob
pub async fn seed_direct(ctx: &ServiceContext) -> Conversation {
    ConversationService::new(ctx)
        .create_direct(ALICE, BOB)
        .await
        .expect("seed direct conversation")
}

/// Public channel owned by Alice
pub async fn seed_public_channel(ctx: &ServiceContext) -> Channel {
    ChannelService::new(ctx)
        .create("general", ChannelVisibility::Public, ALICE)
        .await
        .expect("seed public channel")
}

/// Private channel owned by Alice
pub async fn seed_private_channel(ctx: &ServiceContext) -> Channel {
    ChannelService::new(ctx)
        .create("staff", ChannelVisibility::Private, ALICE)
        .await
        .expect("seed private channel")
}
