// Presentation layer - HTTP surface for view consumers
pub mod app_state;
pub mod handlers;
