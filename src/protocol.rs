use crate::error::GameError;
use crate::game::types::{Direction, GameOver, GameStateSnapshot};
use serde::{Deserialize, Serialize};

/// Events a client may send. Frames look like
/// `{"event": "joinGame", "data": "room-1"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
  JoinGame(String),
  UpdateDirection(DirectionUpdate),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionUpdate {
  #[serde(rename = "roomId")]
  pub room_id: String,
  pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
  Connected(String),
  GameState(GameStateSnapshot),
  PlayerJoined(String),
  PlayerLeft(String),
  StartGame,
  RoomFull,
  GameOver(GameOver),
}

impl ServerEvent {
  pub fn name(&self) -> &'static str {
    match self {
      ServerEvent::Connected(_) => "connected",
      ServerEvent::GameState(_) => "gameState",
      ServerEvent::PlayerJoined(_) => "playerJoined",
      ServerEvent::PlayerLeft(_) => "playerLeft",
      ServerEvent::StartGame => "startGame",
      ServerEvent::RoomFull => "roomFull",
      ServerEvent::GameOver(_) => "gameOver",
    }
  }
}

pub fn decode_client_event(text: &str) -> Result<ClientEvent, GameError> {
  serde_json::from_str(text).map_err(|error| GameError::InvalidPayload(error.to_string()))
}

pub fn encode_server_event(event: &ServerEvent) -> Result<String, GameError> {
  encode(event)
}

fn encode<T: Serialize>(value: &T) -> Result<String, GameError> {
  serde_json::to_string(value).map_err(|error| GameError::Encode(error.to_string()))
}
