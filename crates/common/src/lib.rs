pub mod types;
pub mod utils;
pub mod env;

/// Plain-text body answered by the liveness route.
pub const LIVENESS_TEXT: &str = "Server running";
