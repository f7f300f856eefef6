// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

// Allow eprintln in the CLI - the usage line is direct user output, not logging
#![allow(clippy::disallowed_macros)]

pub mod cli;
pub mod exit;
#[cfg(feature = "gstreamer")]
pub mod gst;
pub mod logging;

pub use cli::{Cli, LogLevel, USAGE};
pub use exit::RelayExit;

use clap::error::ErrorKind;
use relaykit_core::Framework;
use relaykit_engine::{Endpoints, Relay, RelayConfig, RelayError};
use std::ffi::OsString;

/// Parses `args`, then builds the framework and relays once.
///
/// The framework is only created after the arguments were accepted, so a
/// usage error never touches the media framework.
pub fn main_with<I, T, F, M>(args: I, make_framework: M) -> RelayExit
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    F: Framework,
    M: FnOnce() -> anyhow::Result<F>,
{
    let cli = match Cli::try_parse_args(args) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return RelayExit::Success;
        },
        Err(e) if Cli::is_argument_count_error(&e) => {
            eprintln!("{USAGE}");
            return RelayExit::Usage;
        },
        Err(e) => {
            let _ = e.print();
            return RelayExit::Usage;
        },
    };

    logging::init(cli.log_level);

    let framework = match make_framework() {
        Ok(framework) => framework,
        Err(e) => {
            tracing::error!("Failed to initialise media framework: {e:#}");
            return RelayExit::BackendUnavailable;
        },
    };

    run(framework, &cli.endpoints())
}

/// Relays once with the default configuration and maps the outcome to an exit status.
pub fn run<F: Framework>(framework: F, endpoints: &Endpoints) -> RelayExit {
    let relay = Relay::new(framework, RelayConfig::default());
    match relay.run(endpoints) {
        Ok(report) if report.is_success() => RelayExit::Success,
        Ok(_) => RelayExit::RuntimeError,
        Err(e @ RelayError::Setup(_)) => {
            tracing::error!("{e}");
            RelayExit::SetupFailed
        },
        Err(e @ RelayError::StateChange(_)) => {
            tracing::error!("{e}");
            RelayExit::StateChangeFailed
        },
    }
}
