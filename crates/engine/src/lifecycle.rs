// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Lifecycle driver: starts the pipeline and consumes its notifications.
//!
//! The driver requests `PLAYING` directly and lets the framework walk the
//! intermediate states. It then blocks on the bus, the only suspension point
//! of the control thread, until the first error or end-of-stream. Pipeline
//! state changes are logged; those of child stages are discarded.

use crate::config::RelayConfig;
use crate::constants::NO_DIAGNOSTIC;
use relaykit_core::{
    Bus, Message, MessageFilter, MessageView, Pipeline, State, StateChangeError,
    StateChangeSuccess, StreamKind,
};
use std::time::Duration;

/// Runtime fault reported by a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    /// Name of the object that posted the error.
    pub element: String,
    pub message: String,
    pub debug: Option<String>,
}

impl ErrorReport {
    /// The diagnostic detail, or `"none"` when the framework supplied none.
    pub fn diagnostic(&self) -> &str {
        self.debug.as_deref().unwrap_or(NO_DIAGNOSTIC)
    }
}

/// Why the notification loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    EndOfStream,
    Error(ErrorReport),
}

impl Termination {
    pub const fn is_eos(&self) -> bool {
        matches!(self, Self::EndOfStream)
    }
}

/// One pipeline-level transition observed on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub old: State,
    pub new: State,
    pub pending: Option<State>,
}

/// What a finished run observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub termination: Termination,
    /// Pipeline-level transitions, in arrival order.
    pub transitions: Vec<Transition>,
    /// Notifications taken from the bus, including ignored ones.
    pub consumed: usize,
    /// Notifications of a kind the loop does not handle.
    pub unexpected: usize,
    /// Stream kinds the pad linker managed to link.
    pub linked: Vec<StreamKind>,
}

impl RunReport {
    pub const fn is_success(&self) -> bool {
        self.termination.is_eos()
    }
}

enum Step {
    Continue,
    Unexpected,
    Stop(Termination),
}

/// Drives one pipeline from `NULL` to a terminal notification.
pub struct LifecycleDriver<'a, P: Pipeline> {
    pipeline: &'a P,
    filter: MessageFilter,
    timeout: Option<Duration>,
}

impl<'a, P: Pipeline> LifecycleDriver<'a, P> {
    pub fn new(pipeline: &'a P, config: &RelayConfig) -> Self {
        Self { pipeline, filter: config.bus_filter.clone(), timeout: config.bus_timeout() }
    }

    /// Requests the `PLAYING` state.
    ///
    /// # Errors
    ///
    /// Returns the framework's [`StateChangeError`] when the request fails
    /// immediately. The run must not continue in that case.
    pub fn start(&self) -> Result<StateChangeSuccess, StateChangeError> {
        match self.pipeline.set_state(State::Playing) {
            Ok(success) => {
                tracing::debug!(pipeline = %self.pipeline.name(), ?success, "Requested PLAYING");
                Ok(success)
            },
            Err(e) => {
                tracing::error!(
                    pipeline = %self.pipeline.name(),
                    error = %e,
                    "Unable to set the pipeline to the playing state."
                );
                Err(e)
            },
        }
    }

    /// Waits on `bus` until the first error or end-of-stream.
    ///
    /// Empty waits under a bounded timeout are repeated. Under an unbounded
    /// wait an empty result means the channel shut down, which ends the run
    /// as an error.
    pub fn run<B: Bus>(&self, bus: &B) -> RunReport {
        let mut transitions = Vec::new();
        let mut consumed = 0;
        let mut unexpected = 0;

        let termination = loop {
            let Some(msg) = bus.timed_pop_filtered(self.timeout, &self.filter) else {
                if self.timeout.is_some() {
                    tracing::trace!("No notification within timeout, waiting again");
                    continue;
                }
                tracing::error!(pipeline = %self.pipeline.name(), "Notification channel closed");
                break Termination::Error(ErrorReport {
                    element: self.pipeline.name(),
                    message: "notification channel closed".to_string(),
                    debug: None,
                });
            };
            consumed += 1;

            match self.handle(msg, &mut transitions) {
                Step::Continue => {},
                Step::Unexpected => unexpected += 1,
                Step::Stop(termination) => break termination,
            }
        };

        RunReport { termination, transitions, consumed, unexpected, linked: Vec::new() }
    }

    fn handle(&self, msg: Message, transitions: &mut Vec<Transition>) -> Step {
        match msg.view {
            MessageView::Error { ref message, ref debug } => {
                let report = ErrorReport {
                    element: msg.source_name().to_string(),
                    message: message.clone(),
                    debug: debug.clone(),
                };
                tracing::error!(
                    element = %report.element,
                    "Error received from element {}: {}",
                    report.element,
                    report.message
                );
                tracing::error!("Debugging information: {}", report.diagnostic());
                Step::Stop(Termination::Error(report))
            },
            MessageView::Eos => {
                tracing::info!("End-Of-Stream reached.");
                Step::Stop(Termination::EndOfStream)
            },
            MessageView::StateChanged { old, new, pending } => {
                if msg.is_from(self.pipeline.object_id()) {
                    tracing::info!(
                        %old,
                        %new,
                        pending = ?pending,
                        "Pipeline state changed from {old} to {new}"
                    );
                    transitions.push(Transition { old, new, pending });
                } else {
                    tracing::trace!(element = %msg.source_name(), %old, %new, "Ignoring child state change");
                }
                Step::Continue
            },
            MessageView::Warning { .. } | MessageView::Other(_) => {
                tracing::error!(element = %msg.source_name(), view = ?msg.view, "Unexpected message received.");
                Step::Unexpected
            },
        }
    }
}
