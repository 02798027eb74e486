mod actions;
mod event_handler;
mod state;

pub use actions::wire_actions;
pub use event_handler::{handle_workflow_event, refresh};
pub use state::AppState;
