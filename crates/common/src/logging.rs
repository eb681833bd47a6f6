// tracetool - Execution Trace Tables
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Logging configuration for tracetool components
//!
//! Provides centralized logging setup with:
//! - Compact console output that cooperates with the test harness
//! - Environment variable support (RUST_LOG)
//! - A once-only initializer that tests can call freely

use eyre::Result;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Build an environment filter from RUST_LOG, falling back to `default_level`
fn default_filter(default_level: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| eyre::eyre!("Failed to create environment filter: {e}"))
}

/// Initialize console logging for a tracetool consumer
///
/// Embedders call this once at startup; RUST_LOG overrides `level`.
/// Fails if a global subscriber is already installed.
///
/// # Arguments
/// * `level` - The default log level to use
pub fn init_simple_logging(level: Level) -> Result<()> {
    let env_filter = default_filter(level.as_str())?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_test_writer()
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| eyre::eyre!("Failed to initialize simple logging: {e}"))?;

    Ok(())
}

// Global test logging initialization - ensures logging is only set up once across all tests
static TEST_LOGGING_INIT: Once = Once::new();

/// Safe logging initialization for tests - can be called multiple times without crashing
///
/// Console-only output at INFO by default (or `default_level`), still
/// respecting RUST_LOG when it is set.
///
/// # Usage
/// ```rust,ignore
/// use tracetool_common::logging;
///
/// #[test]
/// fn my_test() {
///     logging::ensure_test_logging(None);
///     tracing::info!("This will work safely in any test!");
/// }
/// ```
pub fn ensure_test_logging(default_level: Option<Level>) {
    TEST_LOGGING_INIT.call_once(|| {
        let default_level = default_level.unwrap_or(Level::INFO);
        // An error here means another subscriber is already installed.
        let _ = init_simple_logging(default_level);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{debug, info, warn};

    #[test]
    fn test_logging_functions_work() {
        ensure_test_logging(None);

        info!("Test info message");
        warn!("Test warning message");
        debug!("Test debug message");
    }

    #[test]
    fn test_default_filter_is_valid() {
        let filter = default_filter("debug").unwrap();
        assert!(!filter.to_string().is_empty());
    }

    #[test]
    fn test_repeated_initialization_is_harmless() {
        ensure_test_logging(None);

        // A subscriber already exists, so a second global install must fail cleanly.
        assert!(init_simple_logging(Level::DEBUG).is_err());

        info!("Logging still works after repeated initialization attempts");
    }
}
