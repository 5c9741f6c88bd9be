//! Room struct definition
//!
//! Represents a matched two-party chat session. Unlike a lobby, a room is
//! born with both members already present and is destroyed whole the moment
//! either member leaves or disconnects; its id is never reused.

use std::time::Instant;

use crate::types::{ClientId, RoomId};

/// One side of a room, with the display name snapshotted at match time
#[derive(Debug, Clone)]
pub struct RoomMember {
    pub client_id: ClientId,
    pub username: String,
}

/// An active two-party chat session
///
/// Always holds exactly two distinct members while it exists.
#[derive(Debug)]
pub struct Room {
    /// Unique room identifier
    pub id: RoomId,
    /// Ordered pair of members (queue head first, new joiner second)
    pub members: [RoomMember; 2],
    /// Room creation time
    pub created_at: Instant,
}

impl Room {
    /// Create a room from a matched pair
    pub fn new(id: RoomId, first: RoomMember, second: RoomMember) -> Self {
        Self {
            id,
            members: [first, second],
            created_at: Instant::now(),
        }
    }

    /// Get the other member of the room, if `client_id` is a member
    pub fn partner_of(&self, client_id: ClientId) -> Option<&RoomMember> {
        let [a, b] = &self.members;
        if a.client_id == client_id {
            Some(b)
        } else if b.client_id == client_id {
            Some(a)
        } else {
            None
        }
    }

    /// Check if a connection is a member of this room
    pub fn contains(&self, client_id: ClientId) -> bool {
        self.members.iter().any(|m| m.client_id == client_id)
    }

    /// The member record for `client_id`, if present
    pub fn member(&self, client_id: ClientId) -> Option<&RoomMember> {
        self.members.iter().find(|m| m.client_id == client_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(name: &str) -> RoomMember {
        RoomMember {
            client_id: ClientId::new(),
            username: name.to_string(),
        }
    }

    #[test]
    fn test_room_creation() {
        let first = member("Ann");
        let second = member("Bob");
        let room = Room::new(RoomId::generate(), first.clone(), second.clone());

        assert!(room.contains(first.client_id));
        assert!(room.contains(second.client_id));
        assert_ne!(room.members[0].client_id, room.members[1].client_id);
    }

    #[test]
    fn test_partner_lookup_both_directions() {
        let first = member("Ann");
        let second = member("Bob");
        let room = Room::new(RoomId::generate(), first.clone(), second.clone());

        let partner_of_first = room.partner_of(first.client_id).unwrap();
        assert_eq!(partner_of_first.client_id, second.client_id);
        assert_eq!(partner_of_first.username, "Bob");

        let partner_of_second = room.partner_of(second.client_id).unwrap();
        assert_eq!(partner_of_second.client_id, first.client_id);
        assert_eq!(partner_of_second.username, "Ann");
    }

    #[test]
    fn test_non_member_has_no_partner() {
        let room = Room::new(RoomId::generate(), member("Ann"), member("Bob"));
        let outsider = ClientId::new();

        assert!(room.partner_of(outsider).is_none());
        assert!(!room.contains(outsider));
        assert!(room.member(outsider).is_none());
    }

    #[test]
    fn test_member_snapshot() {
        let first = member("Ann");
        let second = member("Bob");
        let room = Room::new(RoomId::generate(), first.clone(), second);

        assert_eq!(room.member(first.client_id).unwrap().username, "Ann");
    }
}
