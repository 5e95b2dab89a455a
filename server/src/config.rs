//! Server configuration, loaded from `ServerConfig.json` in the working
//! directory when present. Every field has a sensible default so the
//! server also runs with no file at all.

use serde::{Deserialize, Serialize};
use tokio::fs;

use protocol::frames::{MAX_FRAME_BYTES, OUTBOUND_QUEUE_SIZE};

pub const CONFIG_FILE: &str = "ServerConfig.json";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the listener binds to.
    pub bind_addr: String,
    /// Largest accepted inbound frame, in bytes.
    pub max_frame_bytes: usize,
    /// Capacity of one connection's outbound queue.
    pub outbound_queue: usize,
    /// Deadline for a single websocket write, in milliseconds.
    pub write_deadline_ms: u64,
    /// Completed or abandoned games older than this get swept.
    pub game_ttl_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> ServerConfig {
        ServerConfig {
            bind_addr: "127.0.0.1:8080".to_owned(),
            max_frame_bytes: MAX_FRAME_BYTES,
            outbound_queue: OUTBOUND_QUEUE_SIZE,
            write_deadline_ms: 10_000,
            game_ttl_secs: 24 * 60 * 60,
        }
    }
}

/// Reads the config file, falling back to defaults when it is missing.
/// A present but unparsable file is an error; silently ignoring it would
/// hide typos.
pub async fn load_config() -> Result<ServerConfig, String> {
    match fs::read_to_string(CONFIG_FILE).await {
        Ok(raw) => serde_json::from_str(&raw)
            .map_err(|e| format!("Failed to parse {}: {}", CONFIG_FILE, e)),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            Ok(ServerConfig::default())
        }
        Err(error) => Err(format!("Failed to read {}: {}", CONFIG_FILE, error)),
    }
}
