// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};
use relaykit_engine::Endpoints;
use std::ffi::OsString;

/// Printed to stderr when the positional arguments are missing or extra.
pub const USAGE: &str = "usage: relaykit <SOURCE> <DESTINATION>";

#[derive(Parser, Debug)]
#[command(author, version, about = "Relay a live RTMP stream to another RTMP endpoint", long_about = None)]
pub struct Cli {
    /// Address the incoming stream is read from
    #[arg(value_name = "SOURCE")]
    pub source: String,
    /// Address the re-multiplexed stream is sent to
    #[arg(value_name = "DESTINATION")]
    pub destination: String,
    /// Log level for the console
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

impl Cli {
    /// Parses a full argument list, program name first.
    ///
    /// # Errors
    ///
    /// Returns the clap error for missing or extra arguments, and for the
    /// help and version requests.
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(args)
    }

    /// Whether `err` is about the number of positional arguments, which is
    /// answered with [`USAGE`] alone. Other errors carry clap's own message.
    pub fn is_argument_count_error(err: &clap::Error) -> bool {
        matches!(err.kind(), ErrorKind::MissingRequiredArgument | ErrorKind::UnknownArgument)
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::new(self.source.as_str(), self.destination.as_str())
    }
}

/// Log level for filtering messages.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_positionals_are_required() {
        assert!(Cli::try_parse_args(["relaykit"]).is_err());
        assert!(Cli::try_parse_args(["relaykit", "rtmp://in/live"]).is_err());
        assert!(Cli::try_parse_args(["relaykit", "a", "b", "c"]).is_err());

        let cli = match Cli::try_parse_args(["relaykit", "rtmp://in/live", "rtmp://out/app"]) {
            Ok(cli) => cli,
            Err(e) => panic!("two addresses should parse: {e}"),
        };
        assert_eq!(cli.endpoints(), Endpoints::new("rtmp://in/live", "rtmp://out/app"));
        assert_eq!(cli.log_level, LogLevel::Info);
    }

    #[test]
    fn test_log_level_flag() {
        let cli = match Cli::try_parse_args(["relaykit", "--log-level", "debug", "in", "out"]) {
            Ok(cli) => cli,
            Err(e) => panic!("flag should parse: {e}"),
        };
        assert_eq!(tracing::Level::from(cli.log_level), tracing::Level::DEBUG);
        assert!(Cli::try_parse_args(["relaykit", "--log-level", "loud", "in", "out"]).is_err());
    }

    #[test]
    fn test_only_argument_count_errors_get_the_bare_usage_line() {
        let counts: [&[&str]; 3] =
            [&["relaykit"], &["relaykit", "in"], &["relaykit", "in", "out", "extra"]];
        for args in counts {
            let Err(e) = Cli::try_parse_args(args.iter().copied()) else {
                panic!("{args:?} should not parse");
            };
            assert!(Cli::is_argument_count_error(&e), "{args:?} gave {:?}", e.kind());
        }

        let Err(e) = Cli::try_parse_args(["relaykit", "--log-level", "loud", "in", "out"]) else {
            panic!("unknown log level should not parse");
        };
        assert_eq!(e.kind(), ErrorKind::InvalidValue);
        assert!(!Cli::is_argument_count_error(&e));
        assert!(e.to_string().contains("loud"));
    }
}
