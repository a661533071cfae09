//! Public SDK surface for BiasGuard.
//!
//! This crate re-exports the engine building blocks and provides small
//! helpers to keep consumer setup consistent.

use anyhow::Context;
use biasguard_config::BiasGuardConfig;
use biasguard_core::ReviewSession;
use biasguard_protocol::ConversationStep;
use std::path::Path;

/// Re-export for convenience.
pub use biasguard_config as config;
pub use biasguard_core as core;
/// Re-export for convenience.
pub use biasguard_protocol as protocol;

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// This is a no-op if the feature is not enabled. Hosts are still expected
/// to call this early in startup to ensure log output is wired up.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::try_init();
    }
}

/// Build a review session from the ingestion layer's JSON step array.
pub fn session_from_json(steps_json: &str, config: BiasGuardConfig) -> anyhow::Result<ReviewSession> {
    let steps: Vec<ConversationStep> =
        serde_json::from_str(steps_json).context("failed to decode conversation steps")?;
    let session = ReviewSession::new(steps, config).context("failed to start review session")?;
    Ok(session)
}

/// Like [`session_from_json`], with config discovered from the layered files
/// around `cwd`.
pub fn session_with_layered_config(
    steps_json: &str,
    cwd: impl AsRef<Path>,
) -> anyhow::Result<ReviewSession> {
    let layered = BiasGuardConfig::load_layered(cwd).context("failed to load config")?;
    log::debug!("loaded config layers (count={})", layered.layers.len());
    session_from_json(steps_json, layered.config)
}
