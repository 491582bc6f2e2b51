use super::constants::GRID_SIZE;
use super::types::{Direction, Position};
use rand::Rng;

pub fn random_position<R: Rng + ?Sized>(rng: &mut R) -> Position {
  Position::new(rng.gen_range(0..GRID_SIZE), rng.gen_range(0..GRID_SIZE))
}

pub fn wrap(value: i32) -> i32 {
  value.rem_euclid(GRID_SIZE)
}

/// One cell in `direction`, re-entering from the opposite edge.
pub fn step(position: Position, direction: Direction) -> Position {
  let (dx, dy) = direction.delta();
  Position::new(wrap(position.x + dx), wrap(position.y + dy))
}
