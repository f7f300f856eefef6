// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Simulated notification channel.

use crossbeam_channel::{Receiver, RecvTimeoutError};
use relaykit_core::{Bus, Message, MessageFilter};
use std::time::{Duration, Instant};

/// Read side of a simulated pipeline's notification channel.
#[derive(Debug, Clone)]
pub struct SimBus {
    rx: Receiver<Message>,
}

impl SimBus {
    pub(crate) const fn new(rx: Receiver<Message>) -> Self {
        Self { rx }
    }
}

impl Bus for SimBus {
    fn timed_pop_filtered(
        &self,
        timeout: Option<Duration>,
        filter: &MessageFilter,
    ) -> Option<Message> {
        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            let msg = match deadline {
                None => self.rx.recv().ok()?,
                Some(deadline) => match self.rx.recv_deadline(deadline) {
                    Ok(msg) => msg,
                    Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return None,
                },
            };
            if filter.accepts(&msg.view) {
                return Some(msg);
            }
            tracing::trace!(source = msg.source_name(), view = ?msg.view, "Dropping filtered notification");
        }
    }
}
