use std::env;

// Runtime/server configuration (not gameplay tuning).

pub const DEFAULT_PORT: u16 = 8765;

pub fn host() -> String {
    env::var("ARENA_HOST").unwrap_or_else(|_| "0.0.0.0".to_string())
}

/// Listen port; a missing or malformed value falls back to 8765.
pub fn port() -> u16 {
    env::var("ARENA_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}
