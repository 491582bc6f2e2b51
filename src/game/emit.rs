use crate::protocol::ServerEvent;

/// One room instance. Room ids are reused once a room is retired; the
/// instance number never is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomKey<'a> {
    pub id: &'a str,
    pub instance: u64,
}

/// Who an outbound event is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    Room(RoomKey<'a>),
    /// Everyone in the room except one connection.
    RoomExcept { room: RoomKey<'a>, except: &'a str },
    Connection(&'a str),
}

/// Outbound side of a room. Implementations must not block and must not
/// fail the caller.
pub trait Emitter: Send + Sync {
    /// Adds a connection to the broadcast group of `room`. Called with the
    /// room locked, so no broadcast from that room can race the admission.
    fn admit(&self, room: RoomKey<'_>, connection_id: &str);

    fn emit(&self, target: Target<'_>, event: &ServerEvent);
}
