//! Room identifier - routing key for fan-out, typing state, and subscriptions
//!
//! A room is either a conversation (direct/group) or a channel. The string
//! form (`conv:{id}` / `chan:{id}`) doubles as the pub/sub channel name.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::value_objects::Snowflake;

/// Prefix for conversation rooms
pub const CONVERSATION_PREFIX: &str = "conv:";
/// Prefix for channel rooms
pub const CHANNEL_PREFIX: &str = "chan:";

/// Identifies the room an event or subscription belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoomId {
    Conversation(Snowflake),
    Channel(Snowflake),
}

impl RoomId {
    /// Create a conversation room id
    #[must_use]
    pub fn conversation(id: Snowflake) -> Self {
        Self::Conversation(id)
    }

    /// Create a channel room id
    #[must_use]
    pub fn channel(id: Snowflake) -> Self {
        Self::Channel(id)
    }

    /// Get the underlying aggregate id
    #[inline]
    pub fn id(&self) -> Snowflake {
        match self {
            Self::Conversation(id) | Self::Channel(id) => *id,
        }
    }

    #[inline]
    pub fn is_conversation(&self) -> bool {
        matches!(self, Self::Conversation(_))
    }

    #[inline]
    pub fn is_channel(&self) -> bool {
        matches!(self, Self::Channel(_))
    }

    /// Parse from the `conv:{id}` / `chan:{id}` string form
    pub fn parse(s: &str) -> Result<Self, RoomIdParseError> {
        if let Some(id) = s.strip_prefix(CONVERSATION_PREFIX) {
            return Snowflake::parse(id)
                .map(Self::Conversation)
                .map_err(|_| RoomIdParseError::InvalidId);
        }
        if let Some(id) = s.strip_prefix(CHANNEL_PREFIX) {
            return Snowflake::parse(id)
                .map(Self::Channel)
                .map_err(|_| RoomIdParseError::InvalidId);
        }
        Err(RoomIdParseError::UnknownPrefix)
    }
}

/// Error when parsing a RoomId from string
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RoomIdParseError {
    #[error("room id must start with 'conv:' or 'chan:'")]
    UnknownPrefix,
    #[error("room id has an invalid snowflake part")]
    InvalidId,
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conversation(id) => write!(f, "{CONVERSATION_PREFIX}{id}"),
            Self::Channel(id) => write!(f, "{CHANNEL_PREFIX}{id}"),
        }
    }
}

impl std::str::FromStr for RoomId {
    type Err = RoomIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoomId::parse(s)
    }
}

// Serialize in the string form so events and wire frames stay readable
impl Serialize for RoomId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RoomId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RoomId::parse(&s).map_err(serde::de::Error::custom)
    }
}
