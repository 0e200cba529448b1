// Domain layer - Pure machine-status types and logic
pub mod drum;
pub mod machine;
pub mod progress;
pub mod reading;
