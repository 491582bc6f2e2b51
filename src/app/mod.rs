pub mod gateway;
pub mod registry;
pub mod room_name;
pub mod scheduler;

use crate::transport::hub::Hub;
use crate::transport::ws_session::handle_socket;
use axum::{
    extract::{State, WebSocketUpgrade},
    http::Method,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use gateway::SessionGateway;
use registry::RoomRegistry;
use scheduler::TickScheduler;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Debug, Clone)]
pub struct AppState {
    pub registry: Arc<RoomRegistry>,
    pub hub: Arc<Hub>,
    pub gateway: Arc<SessionGateway>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    ok: bool,
    rooms: usize,
    players: usize,
    connections: usize,
}

impl AppState {
    pub fn new() -> Self {
        let registry = Arc::new(RoomRegistry::new());
        let hub = Arc::new(Hub::new());
        let gateway = Arc::new(SessionGateway::new(Arc::clone(&registry), Arc::clone(&hub)));
        Self {
            registry,
            hub,
            gateway,
        }
    }

    pub fn scheduler(&self) -> TickScheduler {
        TickScheduler::new(Arc::clone(&self.registry), Arc::clone(&self.hub))
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/socket", get(ws_handler))
        .layer(cors)
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let mut players = 0;
    for room in state.registry.rooms() {
        players += room.player_count().await;
    }
    Json(HealthResponse {
        ok: true,
        rooms: state.registry.len(),
        players,
        connections: state.hub.connection_count(),
    })
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let gateway = Arc::clone(&state.gateway);
    ws.on_upgrade(move |socket| handle_socket(socket, gateway))
}
