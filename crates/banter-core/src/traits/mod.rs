//! Repository contracts consumed by the application layer

mod repositories;

pub use repositories::{
    ChannelRepository, ConversationRepository, MessageQuery, MessageRepository, RepoResult,
};
