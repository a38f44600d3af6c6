//! WebSocket Sessions
//!
//! Live callback sessions for browser clients.
//!
//! ## Architecture
//!
//! - **SessionHub**: tracks open sessions and enforces the session limit
//! - **Handler**: upgrades `/ws` and runs one [`Session`](crate::callback::Session) per connection
//! - **Messages**: defines client and server message formats
//!
//! ## Protocol
//!
//! On connect the server sends `connected` with every output populated by
//! the startup pass. The client then reports changes with `set_prop`; the
//! server answers with `updates` and one `callback_error` per failing
//! binding.
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:8050/ws');
//! ws.onopen = () => {
//!   ws.send(JSON.stringify({type: 'set_prop', id: 'num', property: 'value', value: 3}));
//! };
//! ws.onmessage = (event) => console.log(JSON.parse(event.data));
//! ```

mod handler;
mod hub;
mod messages;

pub use handler::{respond, websocket_handler};
pub use hub::{HubConfig, HubError, SessionHub, SessionId, SessionStats};
pub use messages::{dispatch_messages, ClientMessage, ServerMessage};
