// Washer telemetry pipeline: poll, normalize, estimate, animate
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
