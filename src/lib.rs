pub mod analysis;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod server;
pub mod store;
pub mod text;
pub mod tui;
