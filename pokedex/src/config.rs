use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::API_BASE;
use crate::resolver::DEFAULT_CONCURRENCY;

pub const DEFAULT_LIMIT: usize = 100;
pub const TICK_MS: u64 = 100;

/// Runtime settings for a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub api_base: String,
    pub limit: usize,
    pub concurrency: usize,
    pub prefetch: bool,
    pub sorted: bool,
    pub music: Option<PathBuf>,
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: API_BASE.to_string(),
            limit: DEFAULT_LIMIT,
            concurrency: DEFAULT_CONCURRENCY,
            prefetch: false,
            sorted: false,
            music: None,
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl Config {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(TICK_MS)
    }
}
