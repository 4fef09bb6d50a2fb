//! Permissions bitflags for room-level access control
//!
//! Computed permission sets are cached per user as a `PermissionSnapshot`
//! holding one entry per room.

use bitflags::bitflags;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

use crate::value_objects::{RoomId, Snowflake};

bitflags! {
    /// Room permission flags
    ///
    /// Serialized as a decimal string in JSON for JavaScript safety.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permissions: u64 {
        /// Read messages in rooms the user belongs to
        const READ_MESSAGES     = 1 << 0;
        /// Send messages
        const SEND_MESSAGES     = 1 << 1;
        /// Delete other users' messages
        const MANAGE_MESSAGES   = 1 << 2;
        /// Invite and remove members
        const MANAGE_MEMBERS    = 1 << 3;
        /// Grant and revoke moderator status
        const MANAGE_MODERATORS = 1 << 4;
        /// Edit and archive the room itself
        const MANAGE_ROOM       = 1 << 5;
        /// Bypass all permission checks
        const ADMINISTRATOR     = 1 << 6;

        /// Default permissions for a plain member
        const MEMBER = Self::READ_MESSAGES.bits() | Self::SEND_MESSAGES.bits();

        /// Permissions granted to moderators and owners
        const MODERATOR = Self::MEMBER.bits()
            | Self::MANAGE_MESSAGES.bits()
            | Self::MANAGE_MEMBERS.bits()
            | Self::MANAGE_MODERATORS.bits()
            | Self::MANAGE_ROOM.bits();
    }
}

impl Permissions {
    /// Check if the permission set contains a required permission
    ///
    /// Administrators bypass all permission checks.
    #[inline]
    pub fn has(&self, permission: Permissions) -> bool {
        if self.contains(Permissions::ADMINISTRATOR) {
            return true;
        }
        self.contains(permission)
    }

    /// Check if the permission set has any of the given permissions
    #[inline]
    pub fn has_any(&self, permissions: Permissions) -> bool {
        if self.contains(Permissions::ADMINISTRATOR) {
            return true;
        }
        self.intersects(permissions)
    }

    /// Parse from string representation (decimal number)
    pub fn parse(s: &str) -> Result<Self, std::num::ParseIntError> {
        s.parse::<u64>().map(Permissions::from_bits_truncate)
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Permissions::empty()
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

// Serialize as string for JSON (JavaScript BigInt safety)
impl Serialize for Permissions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.bits().to_string())
    }
}

// Deserialize from string or number
impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct PermissionsVisitor;

        impl Visitor<'_> for PermissionsVisitor {
            type Value = Permissions;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer representing permission bits")
            }

            fn visit_i64<E>(self, value: i64) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                Ok(Permissions::from_bits_truncate(value as u64))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                Ok(Permissions::from_bits_truncate(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                value
                    .parse::<u64>()
                    .map(Permissions::from_bits_truncate)
                    .map_err(|_| de::Error::custom("invalid permissions string"))
            }
        }

        deserializer.deserialize_any(PermissionsVisitor)
    }
}

impl From<u64> for Permissions {
    fn from(bits: u64) -> Self {
        Permissions::from_bits_truncate(bits)
    }
}

impl From<Permissions> for u64 {
    fn from(perms: Permissions) -> Self {
        perms.bits()
    }
}

/// Cached permission computations for one user, keyed by room
///
/// Permissions are room-dependent, so the snapshot carries one entry per
/// room it has been computed for. An absent room is a cache miss, not an
/// empty permission set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSnapshot {
    pub user_id: Snowflake,
    rooms: HashMap<RoomId, Permissions>,
    pub computed_at: DateTime<Utc>,
}

impl PermissionSnapshot {
    /// Create an empty snapshot computed now
    pub fn new(user_id: Snowflake) -> Self {
        Self {
            user_id,
            rooms: HashMap::new(),
            computed_at: Utc::now(),
        }
    }

    /// Snapshot holding a single room's permissions
    pub fn for_room(user_id: Snowflake, room: RoomId, permissions: Permissions) -> Self {
        let mut snapshot = Self::new(user_id);
        snapshot.grant(room, permissions);
        snapshot
    }

    /// Record the computed permissions for a room
    pub fn grant(&mut self, room: RoomId, permissions: Permissions) {
        self.rooms.insert(room, permissions);
    }

    /// The computed permissions for a room, if present
    pub fn room(&self, room: RoomId) -> Option<Permissions> {
        self.rooms.get(&room).copied()
    }

    /// Check a permission for a room; an uncomputed room allows nothing
    #[inline]
    pub fn allows(&self, room: RoomId, permission: Permissions) -> bool {
        self.room(room).is_some_and(|p| p.has(permission))
    }
}
