use crate::system::{System, current_system};
use std::env;

pub const STORE_DIR: &str = "/var/lib/sliver/store";
pub const LOG_DIR: &str = "/var/log/sliver";
pub const STATE_DIR: &str = "/var/lib/sliver/var";
pub const SCRATCH_DIR: &str = "/tmp";

/// Process-wide settings. All fields are plain data so embedders and tests
/// can construct a `Config` directly instead of going through the
/// environment.
#[derive(Clone, Debug)]
pub struct Config {
    pub store_dir: String,
    pub log_dir: String,
    pub state_dir: String,
    /// Root under which per-build working directories are created.
    pub scratch_dir: String,
    pub system: System,
}

impl Config {
    pub fn new() -> Self {
        let store_dir = env::var("SLIVER_STORE_DIR").unwrap_or(STORE_DIR.to_string());
        let log_dir = env::var("SLIVER_LOG_DIR").unwrap_or(LOG_DIR.to_string());
        let state_dir = env::var("SLIVER_STATE_DIR").unwrap_or(STATE_DIR.to_string());
        let scratch_dir = env::var("SLIVER_SCRATCH_DIR").unwrap_or(SCRATCH_DIR.to_string());
        let system = env::var("SLIVER_SYSTEM")
            .map(System::from)
            .unwrap_or_else(|_| current_system());
        Self {
            store_dir,
            log_dir,
            state_dir,
            scratch_dir,
            system,
        }
    }

    pub fn db_dir(&self) -> String {
        format!("{}/db", self.state_dir)
    }

    pub fn db_path(&self) -> String {
        format!("{}/sliver.db", self.db_dir())
    }

    pub fn run_log_path(&self) -> String {
        format!("{}/run.log", self.log_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
