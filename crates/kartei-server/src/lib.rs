pub mod event_bridge;
pub mod handlers;
pub mod orchestrator;
pub mod server;

pub use orchestrator::{BatchBusy, BatchOrchestrator};
pub use server::{build_router, start, AppState, ServerConfig, ServerHandle};
