// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::process::ExitCode;

/// How a `relaykit` invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayExit {
    /// End-of-stream reached, or help/version printed.
    Success,
    /// The static topology could not be built.
    SetupFailed,
    /// The pipeline refused to start playing.
    StateChangeFailed,
    /// A stage posted an error while playing.
    RuntimeError,
    /// The media framework could not be initialised.
    BackendUnavailable,
    /// Missing or extra arguments.
    Usage,
}

impl RelayExit {
    pub const fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::SetupFailed
            | Self::StateChangeFailed
            | Self::RuntimeError
            | Self::BackendUnavailable => 1,
            Self::Usage => 2,
        }
    }

    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<RelayExit> for ExitCode {
    fn from(exit: RelayExit) -> Self {
        Self::from(exit.code())
    }
}
