pub mod app;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod handler;
pub mod logging;
pub mod render;
pub mod state;
pub mod tui;
pub mod ui;

// Re-export main types for convenience
pub use client::{ChatBackend, ChatClient};
pub use config::{Config, Overrides, Settings};
pub use controller::{Controller, Effect, Event};
pub use error::{ChatError, ChatResult};
pub use render::{render_message, MessageView};
pub use state::{InputState, Lifecycle, Message, Sender, Transcript};
