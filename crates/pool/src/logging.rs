// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operational logging setup.
//!
//! Opt-in: the library never installs a subscriber on its own. `init`
//! builds an env-filtered fmt subscriber from the pool's `log_level` and,
//! when `log_file` is set, tees JSON lines into it through a non-blocking
//! appender.

use crate::error::PoolError;
use ap_core::PoolConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Keeps the file appender's background writer alive; hold it for the
/// process lifetime when `log_file` is configured.
pub type LogGuard = tracing_appender::non_blocking::WorkerGuard;

/// Install the global subscriber per the pool config.
///
/// Fails if a global subscriber is already installed or the `log_level`
/// directive does not parse.
pub fn init(config: &PoolConfig) -> Result<Option<LogGuard>, PoolError> {
    let filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| PoolError::Logging(format!("bad log_level directive: {e}")))?;
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer());

    match &config.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
                .try_init()
                .map_err(|e| PoolError::Logging(e.to_string()))?;
            Ok(Some(guard))
        }
        None => {
            registry.try_init().map_err(|e| PoolError::Logging(e.to_string()))?;
            Ok(None)
        }
    }
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
