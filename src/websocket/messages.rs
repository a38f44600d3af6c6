//! WebSocket Message Types
//!
//! Defines all message types exchanged between a browser session and the
//! server over `/ws`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::callback::{Dispatch, PropRef, PropUpdate};

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// A property changed in the browser (typically a user input)
    SetProp {
        id: String,
        property: String,
        value: Value,
    },
    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Session established; carries every output populated at startup
    Connected {
        session_id: String,
        updates: Vec<PropUpdate>,
    },
    /// Outputs written in response to a change
    Updates { updates: Vec<PropUpdate> },
    /// A callback failed; its outputs keep their previous values
    CallbackError {
        /// Output spec of the failing binding
        output: String,
        message: String,
    },
    /// Pong response to ping
    Pong,
    /// Protocol error
    Error { message: String },
}

impl ClientMessage {
    pub fn set_prop(target: &PropRef, value: Value) -> Self {
        ClientMessage::SetProp {
            id: target.id.clone(),
            property: target.property.clone(),
            value,
        }
    }
}

/// Messages reporting one dispatch: the updates, then one per failure
pub fn dispatch_messages(dispatch: Dispatch) -> Vec<ServerMessage> {
    let mut messages = Vec::with_capacity(1 + dispatch.failures.len());
    if !dispatch.updates.is_empty() {
        messages.push(ServerMessage::Updates {
            updates: dispatch.updates,
        });
    }
    messages.extend(
        dispatch
            .failures
            .into_iter()
            .map(|failure| ServerMessage::CallbackError {
                output: failure.output,
                message: failure.error.to_string(),
            }),
    );
    messages
}
