// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

use crate::cli::LogLevel;
use tracing_subscriber::EnvFilter;

/// Installs the console subscriber. The level comes from the command line
/// only; `RUST_LOG` is not consulted.
///
/// Does nothing if a global subscriber is already set.
pub fn init(level: LogLevel) {
    let level: tracing::Level = level.into();
    let result = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level.as_str()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    if result.is_err() {
        tracing::debug!("Global subscriber already installed");
    }
}
