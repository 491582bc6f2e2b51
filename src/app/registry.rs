use crate::game::room::Room;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// Owns the lifetime of every room in the process.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: DashMap<String, Arc<Room>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&self, room_id: &str) -> Arc<Room> {
        match self.rooms.entry(room_id.to_string()) {
            Entry::Occupied(entry) => Arc::clone(entry.get()),
            Entry::Vacant(entry) => {
                let room = Arc::new(Room::new(room_id));
                entry.insert(Arc::clone(&room));
                tracing::info!(room_id, "room created");
                room
            }
        }
    }

    pub fn get(&self, room_id: &str) -> Option<Arc<Room>> {
        self.rooms.get(room_id).map(|entry| Arc::clone(entry.value()))
    }

    /// Deletes whatever room is registered under `room_id`. The server itself
    /// always goes through `retire`, which checks the instance.
    #[cfg(test)]
    pub fn remove(&self, room_id: &str) -> Option<Arc<Room>> {
        let removed = self.rooms.remove(room_id).map(|(_, room)| room);
        if removed.is_some() {
            tracing::info!(room_id, "room removed");
        }
        removed
    }

    /// Removes `room` only if it is still the instance registered under its
    /// id, so a late removal never drops a newer room with the same id.
    pub fn retire(&self, room: &Arc<Room>) -> bool {
        let removed = self
            .rooms
            .remove_if(room.room_id(), |_, current| Arc::ptr_eq(current, room))
            .is_some();
        if removed {
            tracing::info!(room_id = room.room_id(), "room removed");
        }
        removed
    }

    pub fn rooms(&self) -> Vec<Arc<Room>> {
        self.rooms
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
