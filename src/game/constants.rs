use super::types::Direction;

pub const GRID_SIZE: i32 = 20;
pub const INITIAL_SNAKE_LENGTH: usize = 3;
pub const TICK_MS: u64 = 100;
pub const ROOM_CAPACITY: usize = 2;

/// Spawn cell and heading for each join slot, indexed by how many
/// participants were already in the room.
pub const START_SLOTS: [(i32, i32, Direction); ROOM_CAPACITY] = [
  (5, 5, Direction::Right),
  (GRID_SIZE - 5, GRID_SIZE - 5, Direction::Left),
];
