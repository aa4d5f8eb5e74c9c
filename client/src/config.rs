/// Port used when none is configured or the configured one is malformed.
pub const DEFAULT_PORT: u16 = 8765;

/// Everything needed to enter a room: where the relay lives and who the
/// local player is.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub host: String,
    pub port: u16,
    pub room: String,
    pub name: String,
    /// Character roster id, or a raw glyph for unlisted characters.
    pub ch: String,
}

impl SessionConfig {
    pub fn new(host: &str, port: &str, room: &str, name: &str, ch: &str) -> Self {
        Self {
            host: host.to_string(),
            port: parse_port(port),
            room: room.to_string(),
            name: name.to_string(),
            ch: ch.to_string(),
        }
    }

    /// Reads `ARENA_HOST`/`ARENA_PORT` with the same defaults the server
    /// binds to; room, name, and glyph come from the caller (the menus).
    pub fn from_env(room: &str, name: &str, ch: &str) -> Self {
        let host = std::env::var("ARENA_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("ARENA_PORT").unwrap_or_default();
        Self::new(&host, &port, room, name, ch)
    }
}

/// Lenient port parse; anything unusable falls back to the default.
pub fn parse_port(raw: &str) -> u16 {
    raw.trim().parse().unwrap_or(DEFAULT_PORT)
}
