use crate::protocol::SyncMode;
use std::{env, path::PathBuf};
use tracing::warn;

/// Process configuration, read from the environment. Not part of the
/// protocol contract.
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen port.
    pub port: u16,
    /// Optional static-asset root served as the router fallback.
    pub static_dir: Option<PathBuf>,
    /// Which synchronization variant this hub speaks.
    pub sync_mode: SyncMode,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5000);

        let static_dir = env::var("STATIC_DIR").ok().map(PathBuf::from);

        let sync_mode = env::var("SYNC_MODE")
            .ok()
            .map(|m| {
                m.parse().unwrap_or_else(|err| {
                    warn!("{err}, falling back to {}", SyncMode::default());
                    SyncMode::default()
                })
            })
            .unwrap_or_default();

        Config {
            port,
            static_dir,
            sync_mode,
        }
    }
}
