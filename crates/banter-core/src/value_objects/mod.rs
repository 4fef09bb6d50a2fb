//! Value objects - immutable types that represent domain concepts

mod permissions;
mod room;
mod snowflake;

pub use permissions::{PermissionSnapshot, Permissions};
pub use room::{RoomId, RoomIdParseError};
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
