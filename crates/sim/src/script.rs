// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Scripted behaviour of a simulated run.
//!
//! A [`SimScript`] decides what the simulated demuxer discovers, how much data
//! flows, and how the run ends. The defaults model a healthy live stream with
//! one video and one audio track that ends cleanly.

use relaykit_core::{MessageView, State};
use std::time::Duration;

/// How the simulated source ends the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEnding {
    /// The pipeline posts end-of-stream.
    Eos,
    /// The named stage posts an error notification.
    Error { element: String, message: String, debug: Option<String> },
}

/// Behaviour of the simulated framework once a pipeline reaches `PLAYING`.
#[derive(Debug, Clone)]
pub struct SimScript {
    /// Pad names the demuxer announces, in order.
    pub streams: Vec<String>,
    /// Buffers pushed through each announced pad before the ending.
    pub buffers_per_stream: usize,
    /// Size in bytes of every simulated buffer.
    pub payload_size: usize,
    /// Notifications posted by the pipeline after the data, before the ending.
    pub extra_messages: Vec<MessageView>,
    pub ending: SimEnding,
    /// Pause between the last buffer and the ending notification.
    pub ending_delay: Duration,
    /// A state change request towards this target fails immediately.
    pub fail_state_change_to: Option<State>,
    /// Request pad templates the muxer offers; each can be requested once.
    pub mux_templates: Vec<String>,
}

impl Default for SimScript {
    fn default() -> Self {
        Self {
            streams: vec!["video".to_string(), "audio".to_string()],
            buffers_per_stream: 8,
            payload_size: 188,
            extra_messages: Vec::new(),
            ending: SimEnding::Eos,
            ending_delay: Duration::ZERO,
            fail_state_change_to: None,
            mux_templates: vec!["video".to_string(), "audio".to_string()],
        }
    }
}

impl SimScript {
    #[must_use]
    pub fn with_streams<I, S>(mut self, streams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.streams = streams.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn with_buffers(mut self, buffers_per_stream: usize) -> Self {
        self.buffers_per_stream = buffers_per_stream;
        self
    }

    #[must_use]
    pub fn with_extra_message(mut self, view: MessageView) -> Self {
        self.extra_messages.push(view);
        self
    }

    #[must_use]
    pub fn ending_with_error(
        mut self,
        element: impl Into<String>,
        message: impl Into<String>,
        debug: Option<&str>,
    ) -> Self {
        self.ending = SimEnding::Error {
            element: element.into(),
            message: message.into(),
            debug: debug.map(str::to_string),
        };
        self
    }

    #[must_use]
    pub const fn with_ending_delay(mut self, delay: Duration) -> Self {
        self.ending_delay = delay;
        self
    }

    #[must_use]
    pub const fn failing_state_change_to(mut self, target: State) -> Self {
        self.fail_state_change_to = Some(target);
        self
    }

    #[must_use]
    pub fn with_mux_templates<I, S>(mut self, templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mux_templates = templates.into_iter().map(Into::into).collect();
        self
    }
}
