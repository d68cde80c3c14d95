/// Node configuration: everything operational, nothing consensus-relevant.
///
/// Consensus parameters (reward, dust floor, difficulty bounds) are fixed
/// constants in the crate root; making them configurable would fork the
/// network. What lives here can safely differ between nodes.
///
/// Configuration priority (highest to lowest):
/// 1. Environment variables
/// 2. Hardcoded defaults
use std::sync::OnceLock;

/// Global configuration instance
static CONFIG: OnceLock<NodeConfig> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// TCP port to listen on
    pub port: u16,

    /// Peer addresses to connect to at startup
    pub initial_peers: Vec<String>,

    /// Maximum number of inbound peer connections
    pub max_peers: usize,

    /// Delay between mining attempts in milliseconds
    pub mine_interval_ms: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            port: 3151,
            initial_peers: vec![],
            max_peers: 100,
            mine_interval_ms: 50,
        }
    }
}

impl NodeConfig {
    pub fn load() -> Self {
        let initial_peers_str = env_var("INITIAL_PEERS").unwrap_or_default();
        let initial_peers = if initial_peers_str.is_empty() {
            vec![]
        } else {
            initial_peers_str
                .split(',')
                .map(|s| s.trim().to_string())
                .collect()
        };

        Self {
            port: parse_env("NODE_PORT").unwrap_or(3151),
            initial_peers,
            max_peers: parse_env("MAX_PEERS").unwrap_or(100),
            mine_interval_ms: parse_env("MINE_INTERVAL_MS").unwrap_or(50),
        }
    }

    /// Get or initialize the global configuration
    pub fn global() -> &'static NodeConfig {
        CONFIG.get_or_init(NodeConfig::load)
    }
}

/// Helper function to get environment variable
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Helper function to parse environment variable
fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_var(key)?.parse().ok()
}
