//! Environment-based configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

/// Runtime configuration, read from `DOCLAB_*` environment variables
/// (with `.env` support via dotenvy in `main`).
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the PDF conversion service.
    pub conversion_url: String,
    /// Base URL of the prelabeling orchestrator.
    pub orchestrator_url: String,
    /// JSON file holding the persisted job references.
    pub state_file: PathBuf,
    /// Delay between status polls.
    pub poll_interval: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let poll_interval_ms = match env::var("DOCLAB_POLL_INTERVAL_MS") {
            Ok(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("Invalid DOCLAB_POLL_INTERVAL_MS: {raw:?}"))?,
            Err(_) => 1500,
        };

        Ok(Self {
            conversion_url: env::var("DOCLAB_CONVERSION_URL")
                .unwrap_or_else(|_| "http://localhost:5004".to_string()),
            orchestrator_url: env::var("DOCLAB_ORCHESTRATOR_URL")
                .unwrap_or_else(|_| "http://localhost:5001".to_string()),
            state_file: env::var("DOCLAB_STATE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("doclab-state.json")),
            poll_interval: Duration::from_millis(poll_interval_ms),
        })
    }
}
