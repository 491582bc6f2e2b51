use crate::app::gateway::SessionGateway;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

pub async fn handle_socket(socket: WebSocket, gateway: Arc<SessionGateway>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let connection_id = gateway.connect(tx);

    let send_task = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if sender.send(Message::Text(payload)).await.is_err() {
                break;
            }
        }
    });

    while let Some(result) = receiver.next().await {
        let Ok(message) = result else { break };
        match message {
            Message::Text(text) => {
                gateway.handle_text_message(&connection_id, &text).await;
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    gateway.disconnect(&connection_id).await;
    send_task.abort();
}
