//! Engine configuration loaded from environment.
//!
//! | Env | Default | Description |
//! |-----|---------|-------------|
//! | ORACLE_API_KEY | unset | API key for the generation bridge. |
//! | ORACLE_MODEL | anthropic/claude-3.5-sonnet | Model id for the generation bridge. |
//! | ORACLE_MEMORY_PATH | ./data/soul_memory | Sled path for the soul-memory store. |
//! | ORACLE_MEMORY_TOP_K | 5 | Memories fetched as retrieval context per turn. |
//! | ORACLE_SHADOW_ENABLED | true | When false, the shadow probe is skipped. |

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

fn default_top_k() -> usize {
    5
}

fn default_memory_path() -> String {
    "./data/soul_memory".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// ORACLE_MEMORY_TOP_K: memories fetched as context for each turn.
    #[serde(default = "default_top_k")]
    pub memory_top_k: usize,
    /// ORACLE_MEMORY_PATH: sled path for the default soul-memory store.
    #[serde(default = "default_memory_path")]
    pub memory_path: String,
    /// ORACLE_SHADOW_ENABLED: consult the shadow worker before elemental fallback.
    #[serde(default = "default_true")]
    pub shadow_enabled: bool,
    /// ORACLE_API_KEY: key for the generation bridge. Unset disables the bridge.
    #[serde(default)]
    pub api_key: Option<String>,
    /// ORACLE_MODEL: model id used by the generation bridge.
    #[serde(default)]
    pub model: Option<String>,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            memory_top_k: default_top_k(),
            memory_path: default_memory_path(),
            shadow_enabled: true,
            api_key: None,
            model: None,
        }
    }
}

impl OracleConfig {
    /// Load from environment. Unset or invalid values fall back to defaults.
    pub fn from_env() -> Self {
        Self {
            memory_top_k: env_usize("ORACLE_MEMORY_TOP_K", default_top_k()),
            memory_path: env_string("ORACLE_MEMORY_PATH").unwrap_or_else(default_memory_path),
            shadow_enabled: env_bool("ORACLE_SHADOW_ENABLED", true),
            api_key: env_string("ORACLE_API_KEY"),
            model: env_string("ORACLE_MODEL"),
        }
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(v) => v.trim().eq_ignore_ascii_case("true") || (v.trim().is_empty() && default),
        Err(_) => default,
    }
}

fn env_usize(name: &str, default: usize) -> usize {
    match std::env::var(name) {
        Ok(v) => v.trim().parse().unwrap_or(default),
        Err(_) => default,
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
