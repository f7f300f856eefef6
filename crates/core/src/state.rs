// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Pipeline lifecycle states.
//!
//! ## State Machine
//!
//! A pipeline moves through these states one step at a time. Requesting a
//! distant target is legal: the framework performs every intermediate
//! transition itself and reports each one separately.
//!
//! ```text
//!     NULL ⇄ READY ⇄ PAUSED ⇄ PLAYING
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a pipeline or one of its stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    /// Initial state. No resources allocated.
    Null,
    /// Resources allocated, devices/connections opened; no data flowing.
    Ready,
    /// Data has been prerolled; the clock is stopped.
    Paused,
    /// Data flows and the clock runs.
    Playing,
}

impl State {
    /// Upper-case name as reported by the framework (`NULL`, `READY`, ...).
    pub const fn name(self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Ready => "READY",
            Self::Paused => "PAUSED",
            Self::Playing => "PLAYING",
        }
    }

    const fn rank(self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Ready => 1,
            Self::Paused => 2,
            Self::Playing => 3,
        }
    }

    const fn from_rank(rank: u8) -> Self {
        match rank {
            0 => Self::Null,
            1 => Self::Ready,
            2 => Self::Paused,
            _ => Self::Playing,
        }
    }

    /// The single-step transitions needed to go from `self` to `target`,
    /// in the order the framework performs them.
    ///
    /// `Playing.steps_to(Null)` yields `[(Playing, Paused), (Paused, Ready), (Ready, Null)]`.
    pub fn steps_to(self, target: Self) -> Vec<(Self, Self)> {
        let mut steps = Vec::new();
        let mut current = self.rank();
        let goal = target.rank();
        while current != goal {
            let next = if goal > current { current + 1 } else { current - 1 };
            steps.push((Self::from_rank(current), Self::from_rank(next)));
            current = next;
        }
        steps
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Non-failure outcomes of a state change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChangeSuccess {
    /// The transition completed synchronously.
    Success,
    /// The transition continues in the background; progress arrives as notifications.
    Async,
    /// Live source: the pipeline cannot preroll in PAUSED.
    NoPreroll,
}
