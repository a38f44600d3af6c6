//! WebSocket Handler
//!
//! Handles WebSocket upgrade requests and runs one callback session per
//! connection. Messages from a connection are processed one at a time, so
//! dispatch within a session is always serialized.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::hub::SessionHub;
use super::messages::{dispatch_messages, ClientMessage, ServerMessage};
use crate::app::App;
use crate::callback::{PropRef, Session};
use crate::server::AppState;

/// WebSocket upgrade handler
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let session_id = match state.sessions.register().await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected WebSocket session");
            let error_msg = ServerMessage::Error {
                message: e.to_string(),
            };
            if let Ok(text) = serde_json::to_string(&error_msg) {
                let _ = sender.send(Message::Text(text)).await;
            }
            return;
        }
    };

    // Channel for sending messages to this connection
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let id_for_send = session_id.clone();
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(text) => {
                    if sender.send(Message::Text(text)).await.is_err() {
                        tracing::debug!(
                            session_id = %id_for_send,
                            "WebSocket send failed, closing connection"
                        );
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize message");
                }
            }
        }
    });

    let app = Arc::clone(&state.app);
    let hub = Arc::clone(&state.sessions);
    let id_for_recv = session_id.clone();
    let mut recv_task = tokio::spawn(async move {
        run_session(&app, &hub, &id_for_recv, &mut receiver, &tx).await;
    });

    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    state.sessions.unregister(&session_id).await;
}

async fn run_session<S>(
    app: &App,
    hub: &SessionHub,
    session_id: &str,
    receiver: &mut S,
    tx: &mpsc::UnboundedSender<ServerMessage>,
) where
    S: futures_util::Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let mut session = app.session();
    let startup = session.start();
    for failure in &startup.failures {
        tracing::warn!(
            session_id = %session_id,
            output = %failure.output,
            error = %failure.error,
            "Callback failed at session start"
        );
    }

    let connected = ServerMessage::Connected {
        session_id: session_id.to_string(),
        updates: startup.updates,
    };
    if tx.send(connected).is_err() {
        return;
    }

    while let Some(result) = receiver.next().await {
        let message = match result {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!(session_id = %session_id, error = %e, "WebSocket receive error");
                break;
            }
        };

        let replies = match message {
            Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => {
                    let is_change = matches!(client_msg, ClientMessage::SetProp { .. });
                    let replies = respond(&mut session, client_msg);
                    if is_change {
                        if let Err(e) = hub.record_dispatch(session_id).await {
                            tracing::debug!(
                                session_id = %session_id,
                                error = %e,
                                "Dispatch not counted"
                            );
                        }
                    }
                    replies
                }
                Err(e) => {
                    tracing::debug!(
                        session_id = %session_id,
                        error = %e,
                        text = %text,
                        "Invalid client message"
                    );
                    // Report but keep the connection open
                    vec![ServerMessage::Error {
                        message: format!("Invalid message format: {}", e),
                    }]
                }
            },
            Message::Binary(_) => vec![ServerMessage::Error {
                message: "Binary messages not supported".to_string(),
            }],
            // Axum answers pings itself
            Message::Ping(_) | Message::Pong(_) => Vec::new(),
            Message::Close(_) => {
                tracing::debug!(session_id = %session_id, "Client requested close");
                break;
            }
        };

        for reply in replies {
            if tx.send(reply).is_err() {
                return;
            }
        }
    }
}

/// Apply one client message to a session and build the replies
pub fn respond(session: &mut Session<'_>, message: ClientMessage) -> Vec<ServerMessage> {
    match message {
        ClientMessage::SetProp {
            id,
            property,
            value,
        } => dispatch_messages(session.apply_input_change(PropRef::new(id, property), value)),
        ClientMessage::Ping => vec![ServerMessage::Pong],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps;
    use serde_json::json;

    fn text(message: &ClientMessage) -> Result<Message, axum::Error> {
        Ok(Message::Text(serde_json::to_string(message).unwrap()))
    }

    async fn drive(hub: &SessionHub, session_id: &str, messages: Vec<ClientMessage>) -> Vec<ServerMessage> {
        let app = apps::powers().unwrap();
        let mut incoming = futures_util::stream::iter(messages.iter().map(text).collect::<Vec<_>>());
        let (tx, mut rx) = mpsc::unbounded_channel();

        run_session(&app, hub, session_id, &mut incoming, &tx).await;
        drop(tx);

        let mut out = Vec::new();
        while let Some(msg) = rx.recv().await {
            out.push(msg);
        }
        out
    }

    #[tokio::test]
    async fn test_session_counts_dispatches() {
        let hub = SessionHub::default();
        let id = hub.register().await.unwrap();

        let replies = drive(
            &hub,
            &id,
            vec![
                ClientMessage::set_prop(&PropRef::new("num", "value"), json!(2)),
                ClientMessage::Ping,
                ClientMessage::set_prop(&PropRef::new("num", "value"), json!(3)),
            ],
        )
        .await;

        assert!(matches!(&replies[0], ServerMessage::Connected { updates, .. } if updates.len() == 5));
        assert!(matches!(&replies[2], ServerMessage::Pong));
        assert_eq!(replies.len(), 4);
        assert_eq!(hub.stats(&id).await.unwrap().dispatches, 2);
    }

    #[tokio::test]
    async fn test_unknown_hub_session_keeps_serving() {
        let hub = SessionHub::default();

        let replies = drive(
            &hub,
            "not-registered",
            vec![ClientMessage::set_prop(&PropRef::new("num", "value"), json!(2))],
        )
        .await;

        assert_eq!(replies.len(), 2);
        assert!(matches!(&replies[1], ServerMessage::Updates { updates } if updates.len() == 5));
        assert_eq!(hub.session_count().await, 0);
    }

    #[test]
    fn test_set_prop_produces_updates() {
        let app = apps::powers().unwrap();
        let mut session = app.session();
        session.start();

        let replies = respond(
            &mut session,
            ClientMessage::set_prop(&PropRef::new("num", "value"), json!(2)),
        );
        assert_eq!(replies.len(), 1);
        match &replies[0] {
            ServerMessage::Updates { updates } => {
                assert_eq!(updates.len(), 5);
                assert_eq!(updates[2].target, PropRef::new("twos", "children"));
                assert_eq!(updates[2].value, json!(4));
            }
            other => panic!("Expected Updates, got {:?}", other),
        }
    }

    #[test]
    fn test_failed_callback_reported() {
        let app = apps::powers().unwrap();
        let mut session = app.session();

        let replies = respond(
            &mut session,
            ClientMessage::set_prop(&PropRef::new("num", "value"), json!("abc")),
        );
        assert_eq!(replies.len(), 1);
        assert!(matches!(
            &replies[0],
            ServerMessage::CallbackError { output, .. } if output.starts_with("..square.children")
        ));
    }

    #[test]
    fn test_unbound_property_is_silent() {
        let app = apps::powers().unwrap();
        let mut session = app.session();

        let replies = respond(
            &mut session,
            ClientMessage::set_prop(&PropRef::new("num", "type"), json!("text")),
        );
        assert!(replies.is_empty());
        assert!(matches!(
            respond(&mut session, ClientMessage::Ping).as_slice(),
            [ServerMessage::Pong]
        ));
    }
}
