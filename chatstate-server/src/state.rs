use std::sync::Arc;

use chatstate_assistant::SessionManager;

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<SessionManager>,
    /// Instructions applied when a create request does not supply its own
    pub default_instructions: String,
}
