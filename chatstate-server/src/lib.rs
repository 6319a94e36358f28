//! HTTP request adapter for chatstate
//!
//! Maps the `/chats/{assistant_id}` routes onto session manager calls and
//! shapes the responses chat clients expect. No session logic lives here.

pub mod handlers;
pub mod server;
pub mod state;
