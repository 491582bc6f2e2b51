use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A grid cell. Serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct Position {
  pub x: i32,
  pub y: i32,
}

impl Position {
  pub const fn new(x: i32, y: i32) -> Self {
    Self { x, y }
  }
}

impl From<[i32; 2]> for Position {
  fn from([x, y]: [i32; 2]) -> Self {
    Self { x, y }
  }
}

impl From<Position> for [i32; 2] {
  fn from(position: Position) -> Self {
    [position.x, position.y]
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
  Up,
  Down,
  Left,
  Right,
}

impl Direction {
  /// Unit cell offset, with y growing downwards.
  pub fn delta(self) -> (i32, i32) {
    match self {
      Direction::Up => (0, -1),
      Direction::Down => (0, 1),
      Direction::Left => (-1, 0),
      Direction::Right => (1, 0),
    }
  }
}

#[derive(Debug, Clone)]
pub struct Player {
  pub id: String,
  pub snake: Vec<Position>,
  pub direction: Direction,
  pub score: u32,
}

impl Player {
  pub fn head(&self) -> Option<Position> {
    self.snake.first().copied()
  }

  pub fn snapshot(&self) -> PlayerSnapshot {
    PlayerSnapshot {
      snake: self.snake.clone(),
      direction: self.direction,
      score: self.score,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
  pub snake: Vec<Position>,
  pub direction: Direction,
  pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStateSnapshot {
  pub players: BTreeMap<String, PlayerSnapshot>,
  pub food: Position,
  #[serde(rename = "roomId")]
  pub room_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOver {
  #[serde(rename = "loserId")]
  pub loser_id: String,
  #[serde(rename = "winnerId")]
  pub winner_id: Option<String>,
}
