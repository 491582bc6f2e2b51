use super::registry::RoomRegistry;
use super::room_name::parse_room_id;
use crate::error::GameError;
use crate::game::types::{Direction, GameStateSnapshot};
use crate::protocol::{decode_client_event, ClientEvent, ServerEvent};
use crate::transport::hub::Hub;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// A join can race a room being retired; one retry lands in a fresh room.
const JOIN_ATTEMPTS: usize = 2;

/// Connects transport sessions to rooms. The participant id of a connection
/// is its connection id.
#[derive(Debug, Clone)]
pub struct SessionGateway {
    registry: Arc<RoomRegistry>,
    hub: Arc<Hub>,
}

impl SessionGateway {
    pub fn new(registry: Arc<RoomRegistry>, hub: Arc<Hub>) -> Self {
        Self { registry, hub }
    }

    pub fn connect(&self, sender: UnboundedSender<String>) -> String {
        let connection_id = self.hub.register(sender);
        tracing::info!(%connection_id, "connection opened");
        if let Err(error) = self
            .hub
            .send(&connection_id, &ServerEvent::Connected(connection_id.clone()))
        {
            tracing::warn!(%error, "failed to greet connection");
        }
        connection_id
    }

    pub async fn handle_text_message(&self, connection_id: &str, text: &str) {
        match decode_client_event(text) {
            Ok(event) => self.dispatch(connection_id, event).await,
            Err(error) => tracing::debug!(connection_id, %error, "dropping client message"),
        }
    }

    pub async fn dispatch(&self, connection_id: &str, event: ClientEvent) {
        let result = match event {
            ClientEvent::JoinGame(room_id) => {
                self.join_game(connection_id, &room_id).await.map(|_| ())
            }
            ClientEvent::UpdateDirection(update) => {
                self.update_direction(connection_id, &update.room_id, update.direction)
                    .await
            }
        };
        if let Err(error) = result {
            tracing::debug!(connection_id, %error, "client event not applied");
        }
    }

    pub async fn join_game(
        &self,
        connection_id: &str,
        room_id: &str,
    ) -> Result<GameStateSnapshot, GameError> {
        let room_id = parse_room_id(room_id)
            .ok_or_else(|| GameError::InvalidPayload(format!("bad room id {room_id:?}")))?;

        if self
            .hub
            .room_of(connection_id)
            .is_some_and(|current| current != room_id)
        {
            self.leave_room(connection_id).await;
        }

        for _ in 0..JOIN_ATTEMPTS {
            let room = self.registry.get_or_create(&room_id);
            match room.join(connection_id, self.hub.as_ref()).await {
                Ok(snapshot) => return Ok(snapshot),
                Err(GameError::RoomFull) => {
                    if let Err(error) = self.hub.send(connection_id, &ServerEvent::RoomFull) {
                        tracing::warn!(%error, "failed to report full room");
                    }
                    return Err(GameError::RoomFull);
                }
                Err(GameError::StaleReference) => {
                    self.registry.retire(&room);
                }
                Err(error) => return Err(error),
            }
        }
        Err(GameError::StaleReference)
    }

    pub async fn update_direction(
        &self,
        connection_id: &str,
        room_id: &str,
        direction: Direction,
    ) -> Result<(), GameError> {
        let room = self
            .registry
            .get(room_id.trim())
            .ok_or(GameError::StaleReference)?;
        room.set_direction(connection_id, direction).await
    }

    /// Removes the connection from the room instance it is subscribed to, if
    /// that room is still live. Returns the room id it left.
    pub async fn leave_room(&self, connection_id: &str) -> Option<String> {
        let subscription = self.hub.unsubscribe(connection_id)?;
        let room_id = subscription.room_id;
        let Some(room) = self
            .registry
            .get(&room_id)
            .filter(|room| room.instance() == subscription.instance)
        else {
            return Some(room_id);
        };
        match room.remove_player(connection_id, self.hub.as_ref()).await {
            Ok(0) => {
                self.registry.retire(&room);
            }
            Ok(remaining) => {
                tracing::debug!(%room_id, connection_id, remaining, "participant left");
            }
            Err(error) => {
                tracing::debug!(%room_id, connection_id, %error, "leave ignored");
            }
        }
        Some(room_id)
    }

    pub async fn disconnect(&self, connection_id: &str) {
        self.leave_room(connection_id).await;
        self.hub.unregister(connection_id);
        tracing::info!(connection_id, "connection closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::room::TickOutcome;
    use crate::game::types::Position;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    struct Client {
        id: String,
        rx: UnboundedReceiver<String>,
    }

    impl Client {
        fn events(&mut self) -> Vec<ServerEvent> {
            let mut out = Vec::new();
            while let Ok(payload) = self.rx.try_recv() {
                out.push(serde_json::from_str(&payload).expect("server event"));
            }
            out
        }
    }

    fn setup() -> (SessionGateway, Arc<RoomRegistry>, Arc<Hub>) {
        let registry = Arc::new(RoomRegistry::new());
        let hub = Arc::new(Hub::new());
        let gateway = SessionGateway::new(Arc::clone(&registry), Arc::clone(&hub));
        (gateway, registry, hub)
    }

    fn connect(gateway: &SessionGateway) -> Client {
        let (tx, rx) = unbounded_channel();
        let id = gateway.connect(tx);
        let mut client = Client { id, rx };
        assert_eq!(client.events(), vec![ServerEvent::Connected(client.id.clone())]);
        client
    }

    #[tokio::test]
    async fn two_joins_start_the_game_and_third_is_full() {
        let (gateway, registry, _hub) = setup();
        let mut alpha = connect(&gateway);
        let mut beta = connect(&gateway);
        let mut gamma = connect(&gateway);

        gateway.join_game(&alpha.id, "duel").await.expect("alpha joins");
        gateway.join_game(&beta.id, "duel").await.expect("beta joins");
        let result = gateway.join_game(&gamma.id, "duel").await;

        assert_eq!(result, Err(GameError::RoomFull));
        assert_eq!(gamma.events(), vec![ServerEvent::RoomFull]);

        let alpha_events = alpha.events();
        assert!(matches!(alpha_events[0], ServerEvent::GameState(_)));
        assert!(alpha_events.contains(&ServerEvent::PlayerJoined(beta.id.clone())));
        assert!(alpha_events.contains(&ServerEvent::StartGame));

        let beta_events = beta.events();
        assert!(matches!(beta_events[0], ServerEvent::GameState(_)));
        assert!(beta_events.contains(&ServerEvent::StartGame));
        assert!(!beta_events.contains(&ServerEvent::PlayerJoined(beta.id.clone())));

        let room = registry.get("duel").expect("room");
        assert_eq!(room.player_count().await, 2);
        let snapshot = room.snapshot().await;
        assert_eq!(snapshot.players[&alpha.id].snake[0], Position::new(5, 5));
        assert_eq!(snapshot.players[&beta.id].snake[0], Position::new(15, 15));
    }

    #[tokio::test]
    async fn rejected_joiner_gets_no_room_traffic() {
        let (gateway, registry, hub) = setup();
        let alpha = connect(&gateway);
        let beta = connect(&gateway);
        let mut gamma = connect(&gateway);
        gateway.join_game(&alpha.id, "duel").await.expect("join");
        gateway.join_game(&beta.id, "duel").await.expect("join");
        let _ = gateway.join_game(&gamma.id, "duel").await;
        gamma.events();

        let room = registry.get("duel").expect("room");
        room.tick(hub.as_ref()).await;

        assert!(gamma.events().is_empty());
        assert_eq!(hub.room_of(&gamma.id), None);
    }

    #[tokio::test]
    async fn direction_update_reaches_the_room() {
        let (gateway, registry, _hub) = setup();
        let alpha = connect(&gateway);
        gateway.join_game(&alpha.id, "duel").await.expect("join");

        gateway
            .handle_text_message(
                &alpha.id,
                r#"{"event":"updateDirection","data":{"roomId":"duel","direction":"DOWN"}}"#,
            )
            .await;

        let snapshot = registry.get("duel").expect("room").snapshot().await;
        assert_eq!(snapshot.players[&alpha.id].direction, Direction::Down);
    }

    #[tokio::test]
    async fn stale_direction_updates_are_ignored() {
        let (gateway, _registry, _hub) = setup();
        let alpha = connect(&gateway);

        let result = gateway.update_direction(&alpha.id, "nowhere", Direction::Up).await;
        assert_eq!(result, Err(GameError::StaleReference));

        gateway
            .handle_text_message(
                &alpha.id,
                r#"{"event":"updateDirection","data":{"roomId":"nowhere","direction":"UP"}}"#,
            )
            .await;
    }

    #[tokio::test]
    async fn malformed_messages_are_dropped() {
        let (gateway, registry, _hub) = setup();
        let mut alpha = connect(&gateway);

        gateway.handle_text_message(&alpha.id, "{").await;
        gateway
            .handle_text_message(&alpha.id, r#"{"event":"joinGame","data":"   "}"#)
            .await;

        assert_eq!(registry.len(), 0);
        assert!(alpha.events().is_empty());
    }

    #[tokio::test]
    async fn disconnect_of_one_keeps_room_and_notifies_other() {
        let (gateway, registry, _hub) = setup();
        let mut alpha = connect(&gateway);
        let beta = connect(&gateway);
        gateway.join_game(&alpha.id, "duel").await.expect("join");
        gateway.join_game(&beta.id, "duel").await.expect("join");
        alpha.events();

        gateway.disconnect(&beta.id).await;

        assert_eq!(alpha.events(), vec![ServerEvent::PlayerLeft(beta.id.clone())]);
        let room = registry.get("duel").expect("room survives");
        assert_eq!(room.player_count().await, 1);
    }

    #[tokio::test]
    async fn disconnect_of_last_participant_removes_room() {
        let (gateway, registry, hub) = setup();
        let alpha = connect(&gateway);
        gateway.join_game(&alpha.id, "duel").await.expect("join");

        gateway.disconnect(&alpha.id).await;

        assert!(registry.get("duel").is_none());
        assert_eq!(hub.connection_count(), 0);
    }

    #[tokio::test]
    async fn disconnect_without_join_is_noop() {
        let (gateway, registry, hub) = setup();
        let alpha = connect(&gateway);
        registry.get_or_create("other");

        gateway.disconnect(&alpha.id).await;
        gateway.disconnect(&alpha.id).await;

        assert_eq!(registry.len(), 1);
        assert_eq!(hub.connection_count(), 0);
    }

    #[tokio::test]
    async fn switching_rooms_leaves_the_previous_one() {
        let (gateway, registry, _hub) = setup();
        let mut alpha = connect(&gateway);
        let beta = connect(&gateway);
        gateway.join_game(&alpha.id, "red").await.expect("join");
        gateway.join_game(&beta.id, "red").await.expect("join");
        alpha.events();

        gateway.join_game(&beta.id, "blue").await.expect("switch");

        assert_eq!(alpha.events(), vec![ServerEvent::PlayerLeft(beta.id.clone())]);
        assert_eq!(registry.get("red").expect("red").player_count().await, 1);
        assert_eq!(registry.get("blue").expect("blue").player_count().await, 1);
    }

    #[tokio::test]
    async fn joining_a_finished_room_id_creates_a_fresh_room() {
        let (gateway, registry, hub) = setup();
        let alpha = connect(&gateway);
        gateway.join_game(&alpha.id, "duel").await.expect("join");
        let old = registry.get("duel").expect("room");
        old.set_direction(&alpha.id, Direction::Left).await.expect("reverse");
        assert!(matches!(old.tick(hub.as_ref()).await, TickOutcome::Ended { .. }));

        let snapshot = gateway.join_game(&alpha.id, "duel").await.expect("rejoin");

        assert_eq!(snapshot.players.len(), 1);
        let fresh = registry.get("duel").expect("fresh room");
        assert!(!Arc::ptr_eq(&old, &fresh));
    }
}
