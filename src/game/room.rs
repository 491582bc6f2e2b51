use super::constants::{INITIAL_SNAKE_LENGTH, START_SLOTS};
use super::emit::{Emitter, RoomKey, Target};
use super::math::{random_position, step};
use super::snake::create_snake;
use super::types::{Direction, GameOver, GameStateSnapshot, Player, Position};
use crate::error::GameError;
use crate::protocol::ServerEvent;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;


static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// One isolated game. Every mutation goes through `state`, so join,
/// direction changes, ticks and departures never interleave.
#[derive(Debug)]
pub struct Room {
  room_id: String,
  instance: u64,
  state: Mutex<RoomState>,
}

#[derive(Debug)]
struct RoomState {
  players: Vec<Player>,
  food: Position,
  rng: StdRng,
  closed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
  Continued,
  Ended {
    result: GameOver,
    participants: Vec<String>,
  },
  /// The room had already ended before this tick reached it.
  Closed,
}

impl Room {
  pub fn new(room_id: impl Into<String>) -> Self {
    Self::with_rng(room_id, StdRng::from_entropy())
  }

  pub fn with_rng(room_id: impl Into<String>, mut rng: StdRng) -> Self {
    let food = random_position(&mut rng);
    Self {
      room_id: room_id.into(),
      instance: NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed),
      state: Mutex::new(RoomState {
        players: Vec::new(),
        food,
        rng,
        closed: false,
      }),
    }
  }

  pub fn room_id(&self) -> &str {
    &self.room_id
  }

  pub fn instance(&self) -> u64 {
    self.instance
  }

  pub fn key(&self) -> RoomKey<'_> {
    RoomKey {
      id: &self.room_id,
      instance: self.instance,
    }
  }

  pub async fn player_count(&self) -> usize {
    self.state.lock().await.players.len()
  }

  #[cfg(test)]
  pub async fn snapshot(&self) -> GameStateSnapshot {
    self.state.lock().await.snapshot(&self.room_id)
  }

  pub async fn join(
    &self,
    participant_id: &str,
    emitter: &dyn Emitter,
  ) -> Result<GameStateSnapshot, GameError> {
    let mut state = self.state.lock().await;
    if state.closed {
      return Err(GameError::StaleReference);
    }

    if state.player(participant_id).is_some() {
      emitter.admit(self.key(), participant_id);
      let snapshot = state.snapshot(&self.room_id);
      emitter.emit(
        Target::Connection(participant_id),
        &ServerEvent::GameState(snapshot.clone()),
      );
      return Ok(snapshot);
    }

    let Some(&(start_x, start_y, direction)) = START_SLOTS.get(state.players.len()) else {
      return Err(GameError::RoomFull);
    };

    state.players.push(Player {
      id: participant_id.to_string(),
      snake: create_snake(start_x, start_y, direction, INITIAL_SNAKE_LENGTH),
      direction,
      score: 0,
    });
    emitter.admit(self.key(), participant_id);
    tracing::debug!(
      room_id = %self.room_id,
      participant_id,
      players = state.players.len(),
      "participant joined"
    );

    let snapshot = state.snapshot(&self.room_id);
    emitter.emit(
      Target::Connection(participant_id),
      &ServerEvent::GameState(snapshot.clone()),
    );
    emitter.emit(
      Target::RoomExcept {
        room: self.key(),
        except: participant_id,
      },
      &ServerEvent::PlayerJoined(participant_id.to_string()),
    );
    if state.players.len() == START_SLOTS.len() {
      emitter.emit(Target::Room(self.key()), &ServerEvent::StartGame);
    }
    Ok(snapshot)
  }

  pub async fn set_direction(
    &self,
    participant_id: &str,
    direction: Direction,
  ) -> Result<(), GameError> {
    let mut state = self.state.lock().await;
    if state.closed {
      return Err(GameError::StaleReference);
    }
    let player = state
      .players
      .iter_mut()
      .find(|player| player.id == participant_id)
      .ok_or(GameError::StaleReference)?;
    player.direction = direction;
    Ok(())
  }

  /// Removes a participant and returns how many remain. A room left empty
  /// is closed; the caller is expected to retire it from the registry.
  pub async fn remove_player(
    &self,
    participant_id: &str,
    emitter: &dyn Emitter,
  ) -> Result<usize, GameError> {
    let mut state = self.state.lock().await;
    if state.closed {
      return Err(GameError::StaleReference);
    }
    let index = state
      .players
      .iter()
      .position(|player| player.id == participant_id)
      .ok_or(GameError::StaleReference)?;
    state.players.remove(index);

    let remaining = state.players.len();
    if remaining == 0 {
      state.closed = true;
    } else {
      emitter.emit(
        Target::RoomExcept {
          room: self.key(),
          except: participant_id,
        },
        &ServerEvent::PlayerLeft(participant_id.to_string()),
      );
    }
    Ok(remaining)
  }

  pub async fn tick(&self, emitter: &dyn Emitter) -> TickOutcome {
    let mut state = self.state.lock().await;
    if state.closed {
      return TickOutcome::Closed;
    }

    match state.advance() {
      Some(result) => {
        state.closed = true;
        tracing::info!(
          room_id = %self.room_id,
          loser_id = %result.loser_id,
          winner_id = ?result.winner_id,
          "game over"
        );
        emitter.emit(Target::Room(self.key()), &ServerEvent::GameOver(result.clone()));
        TickOutcome::Ended {
          result,
          participants: state.players.iter().map(|player| player.id.clone()).collect(),
        }
      }
      None => {
        let snapshot = state.snapshot(&self.room_id);
        emitter.emit(Target::Room(self.key()), &ServerEvent::GameState(snapshot));
        TickOutcome::Continued
      }
    }
  }
}

impl RoomState {
  fn player(&self, participant_id: &str) -> Option<&Player> {
    self.players.iter().find(|player| player.id == participant_id)
  }

  fn snapshot(&self, room_id: &str) -> GameStateSnapshot {
    GameStateSnapshot {
      players: self
        .players
        .iter()
        .map(|player| (player.id.clone(), player.snapshot()))
        .collect(),
      food: self.food,
      room_id: room_id.to_string(),
    }
  }

  /// Moves every participant one cell in join order. Returns the result of
  /// the first collision; the remaining participants are not moved.
  fn advance(&mut self) -> Option<GameOver> {
    let mut food_eaten = false;

    for index in 0..self.players.len() {
      let player = &mut self.players[index];
      let Some(head) = player.head() else { continue };
      let next = step(head, player.direction);
      player.snake.insert(0, next);
      if next == self.food {
        player.score += 1;
        food_eaten = true;
      } else {
        player.snake.pop();
      }

      if self.head_collides(index, next) {
        let loser = &self.players[index];
        let winner_id = self
          .players
          .iter()
          .find(|other| other.id != loser.id)
          .map(|other| other.id.clone());
        return Some(GameOver {
          loser_id: loser.id.clone(),
          winner_id,
        });
      }
    }

    if food_eaten {
      self.food = random_position(&mut self.rng);
    }
    None
  }

  /// Checks `head` of the participant at `mover` against every body cell in
  /// the room, skipping only the mover's own head.
  fn head_collides(&self, mover: usize, head: Position) -> bool {
    self.players.iter().enumerate().any(|(owner, player)| {
      player
        .snake
        .iter()
        .enumerate()
        .any(|(segment, cell)| *cell == head && !(owner == mover && segment == 0))
    })
  }
}
