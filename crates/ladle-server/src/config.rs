//! Environment-driven server configuration.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use ladle_core::{LadleError, Result};

const DEFAULT_ADDR: &str = "0.0.0.0:8100";
const DEFAULT_RECIPE_DB: &str = "database.json";
const DEFAULT_ACCOUNT_DB: &str = "accounts.json";
const DEFAULT_MAX_SESSIONS: usize = 1024;

/// Server settings with environment overrides (`LADLE_ADDR`,
/// `LADLE_RECIPE_DB`, `LADLE_ACCOUNT_DB`, `LADLE_MAX_SESSIONS`).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub recipe_db: PathBuf,
    pub account_db: PathBuf,
    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.parse().expect("default address is valid"),
            recipe_db: PathBuf::from(DEFAULT_RECIPE_DB),
            account_db: PathBuf::from(DEFAULT_ACCOUNT_DB),
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

impl ServerConfig {
    pub fn try_from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(addr) = env::var("LADLE_ADDR") {
            config.addr = addr
                .parse()
                .map_err(|_| LadleError::config(format!("invalid LADLE_ADDR '{addr}'")))?;
        }
        if let Ok(path) = env::var("LADLE_RECIPE_DB") {
            config.recipe_db = PathBuf::from(path);
        }
        if let Ok(path) = env::var("LADLE_ACCOUNT_DB") {
            config.account_db = PathBuf::from(path);
        }
        if let Ok(raw) = env::var("LADLE_MAX_SESSIONS") {
            config.max_sessions = raw
                .parse()
                .map_err(|_| LadleError::config(format!("invalid LADLE_MAX_SESSIONS '{raw}'")))?;
        }
        Ok(config)
    }
}
