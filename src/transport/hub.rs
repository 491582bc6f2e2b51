use crate::error::GameError;
use crate::game::emit::{Emitter, RoomKey, Target};
use crate::protocol::{encode_server_event, ServerEvent};
use dashmap::DashMap;
use std::collections::HashSet;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

/// The room instance a connection receives broadcasts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub room_id: String,
    pub instance: u64,
}

#[derive(Debug)]
struct ConnectionEntry {
    sender: UnboundedSender<String>,
    subscription: Option<Subscription>,
}

/// Live connections and the room group each one is subscribed to. Groups are
/// keyed by room instance, so a retired room and its same-named successor
/// never share members.
///
/// The two maps are never locked at the same time; group membership is
/// copied out before any connection is touched.
#[derive(Debug, Default)]
pub struct Hub {
    connections: DashMap<String, ConnectionEntry>,
    groups: DashMap<u64, HashSet<String>>,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, sender: UnboundedSender<String>) -> String {
        let connection_id = Uuid::new_v4().to_string();
        self.connections.insert(
            connection_id.clone(),
            ConnectionEntry {
                sender,
                subscription: None,
            },
        );
        connection_id
    }

    /// Drops the connection and returns the room it was subscribed to.
    pub fn unregister(&self, connection_id: &str) -> Option<Subscription> {
        let subscription = self.unsubscribe(connection_id);
        self.connections.remove(connection_id);
        subscription
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn room_of(&self, connection_id: &str) -> Option<String> {
        self.connections
            .get(connection_id)
            .and_then(|entry| entry.subscription.as_ref().map(|sub| sub.room_id.clone()))
    }

    pub fn subscribe(&self, connection_id: &str, room: RoomKey<'_>) {
        let previous = {
            let Some(mut entry) = self.connections.get_mut(connection_id) else { return };
            entry.subscription.replace(Subscription {
                room_id: room.id.to_string(),
                instance: room.instance,
            })
        };
        if let Some(previous) = previous.filter(|previous| previous.instance != room.instance) {
            self.leave_group(previous.instance, connection_id);
        }
        self.groups
            .entry(room.instance)
            .or_default()
            .insert(connection_id.to_string());
    }

    /// Clears the connection's room subscription and returns it.
    pub fn unsubscribe(&self, connection_id: &str) -> Option<Subscription> {
        let subscription = self
            .connections
            .get_mut(connection_id)
            .and_then(|mut entry| entry.subscription.take())?;
        self.leave_group(subscription.instance, connection_id);
        Some(subscription)
    }

    /// Unsubscribes `members` from a room instance that no longer exists.
    /// Members that already moved on, including to a new room with the same
    /// id, keep their current subscription.
    pub fn release(&self, room: RoomKey<'_>, members: &[String]) {
        for member in members {
            let subscribed_here = {
                let Some(mut entry) = self.connections.get_mut(member) else { continue };
                let matches = entry
                    .subscription
                    .as_ref()
                    .is_some_and(|sub| sub.instance == room.instance);
                if matches {
                    entry.subscription = None;
                }
                matches
            };
            if subscribed_here {
                self.leave_group(room.instance, member);
            }
        }
    }

    pub fn send(&self, connection_id: &str, event: &ServerEvent) -> Result<(), GameError> {
        let payload = encode_server_event(event)?;
        self.deliver(connection_id, event, payload)
    }

    fn deliver(
        &self,
        connection_id: &str,
        event: &ServerEvent,
        payload: String,
    ) -> Result<(), GameError> {
        let failure = || GameError::BroadcastFailure {
            connection_id: connection_id.to_string(),
            event: event.name(),
        };
        let entry = self.connections.get(connection_id).ok_or_else(failure)?;
        entry.sender.send(payload).map_err(|_| failure())
    }

    fn leave_group(&self, instance: u64, connection_id: &str) {
        if let Some(mut members) = self.groups.get_mut(&instance) {
            members.remove(connection_id);
        }
        self.groups.remove_if(&instance, |_, members| members.is_empty());
    }

    fn members(&self, instance: u64) -> Vec<String> {
        self.groups
            .get(&instance)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl Emitter for Hub {
    fn admit(&self, room: RoomKey<'_>, connection_id: &str) {
        self.subscribe(connection_id, room);
    }

    fn emit(&self, target: Target<'_>, event: &ServerEvent) {
        let payload = match encode_server_event(event) {
            Ok(payload) => payload,
            Err(error) => {
                tracing::warn!(%error, event = event.name(), "failed to encode event");
                return;
            }
        };

        let recipients = match target {
            Target::Connection(connection_id) => vec![connection_id.to_string()],
            Target::Room(room) => self.members(room.instance),
            Target::RoomExcept { room, except } => {
                let mut members = self.members(room.instance);
                members.retain(|member| member != except);
                members
            }
        };

        for recipient in recipients {
            if let Err(error) = self.deliver(&recipient, event, payload.clone()) {
                tracing::warn!(%error, "broadcast failure");
            }
        }
    }
}
