//! Connection registry

mod connection;
mod manager;

pub use connection::RegisteredConnection;
pub use manager::ConnectionRegistry;
