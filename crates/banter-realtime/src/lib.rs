//! # banter-realtime
//!
//! Realtime layer: the per-process connection registry, the client wire
//! protocol, the backplane-to-registry event dispatcher, and the session
//! that ties a connection to the application services.

pub mod dispatcher;
pub mod protocol;
pub mod registry;
pub mod session;

pub use dispatcher::EventDispatcher;
pub use protocol::{ClientCommand, ServerEvent};
pub use registry::{ConnectionRegistry, RegisteredConnection};
pub use session::RealtimeSession;
