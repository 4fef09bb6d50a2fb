//! Business logic services
//!
//! Each service borrows the shared `ServiceContext` and orchestrates one
//! aggregate: validate, mutate, persist, then fan the event out.

pub mod channel;
pub mod context;
pub mod conversation;
pub mod error;
pub mod message;
pub mod permission;
pub mod presence;
pub mod query;

pub use channel::ChannelService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use conversation::ConversationService;
pub use error::{ServiceError, ServiceResult};
pub use message::MessageService;
pub use permission::PermissionService;
pub use presence::PresenceService;
pub use query::{QueryService, MAX_MESSAGE_PAGE};
