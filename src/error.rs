use thiserror::Error;

/// Failures the game core reports. None of them is fatal to the process or
/// to any other room.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("room is full")]
    RoomFull,
    #[error("room or participant no longer exists")]
    StaleReference,
    #[error("failed to deliver {event} to connection {connection_id}")]
    BroadcastFailure {
        connection_id: String,
        event: &'static str,
    },
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("failed to encode outbound event: {0}")]
    Encode(String),
}
