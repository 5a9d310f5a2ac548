mod event_handler;
mod gate;
mod pipeline;
mod state;

pub use event_handler::{clear, handle_backend_event, submit};
pub use state::{AppState, BackendEvent, IDLE_STATUS};
