// Modules for server components
pub mod ai_routes;
pub mod play_routes;
pub mod response;
pub mod state;
pub mod web_ui;

// Re-export public APIs
pub use state::AppState;
pub use web_ui::{create_router, WebUiConfig, WebUiServer};
