// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Routes demuxer outputs discovered at run time to their buffer stages.
//!
//! The demuxer announces each elementary stream once it has inspected real
//! data. The framework calls [`PadLinker::handle_new_pad`] for every
//! announcement on one of its own streaming threads, concurrently with the
//! control thread's wait on the bus. The linker therefore only reads its
//! immutable [`LinkTable`] and records results in the atomic [`StreamLinks`].
//!
//! A stream that cannot be linked is logged and left unconsumed; it never
//! fails the run.

use relaykit_core::{LinkError, Pad, StreamKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Destination input pad per stream kind, fixed once the topology is built.
#[derive(Debug, Clone)]
pub struct LinkTable<P> {
    pub video: P,
    pub audio: P,
}

impl<P: Pad> LinkTable<P> {
    pub const fn new(video: P, audio: P) -> Self {
        Self { video, audio }
    }

    pub const fn destination(&self, kind: StreamKind) -> &P {
        match kind {
            StreamKind::Video => &self.video,
            StreamKind::Audio => &self.audio,
        }
    }
}

/// Which stream kinds have been linked so far.
///
/// Written by the linker on framework threads, read by the control thread.
#[derive(Debug, Default)]
pub struct StreamLinks {
    video: AtomicBool,
    audio: AtomicBool,
}

impl StreamLinks {
    const fn flag(&self, kind: StreamKind) -> &AtomicBool {
        match kind {
            StreamKind::Video => &self.video,
            StreamKind::Audio => &self.audio,
        }
    }

    /// Records a successful link. Returns false if the kind was already linked.
    pub fn mark_linked(&self, kind: StreamKind) -> bool {
        !self.flag(kind).swap(true, Ordering::AcqRel)
    }

    pub fn is_linked(&self, kind: StreamKind) -> bool {
        self.flag(kind).load(Ordering::Acquire)
    }

    /// Linked kinds in `StreamKind::ALL` order.
    pub fn linked(&self) -> Vec<StreamKind> {
        StreamKind::ALL.into_iter().filter(|kind| self.is_linked(*kind)).collect()
    }
}

/// Result of handling one announced pad.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    Linked(StreamKind),
    Failed(StreamKind, LinkError),
    /// Name matched neither stream kind; the pad stays unlinked.
    Unrecognized,
}

/// Pad-added handler context: the link table plus the shared link record.
pub struct PadLinker<P> {
    table: LinkTable<P>,
    links: Arc<StreamLinks>,
}

impl<P: Pad> PadLinker<P> {
    pub const fn new(table: LinkTable<P>, links: Arc<StreamLinks>) -> Self {
        Self { table, links }
    }

    pub fn links(&self) -> &Arc<StreamLinks> {
        &self.links
    }

    /// Classifies `new_pad` by name and links it to the matching buffer input.
    pub fn handle_new_pad(&self, new_pad: &P) -> LinkOutcome {
        let pad_name = new_pad.name();
        tracing::info!(pad = %pad_name, "New pad {pad_name} created");

        let Some(kind) = StreamKind::classify(&pad_name) else {
            tracing::warn!(pad = %pad_name, "Ignoring pad of unrecognized stream kind");
            return LinkOutcome::Unrecognized;
        };

        let destination = self.table.destination(kind);
        match new_pad.link(destination) {
            Ok(()) => {
                if !self.links.mark_linked(kind) {
                    tracing::warn!(%kind, pad = %pad_name, "Stream kind linked more than once");
                }
                tracing::info!(%kind, pad = %pad_name, "Pad {pad_name} dynamically linked.");
                LinkOutcome::Linked(kind)
            },
            Err(e) => {
                tracing::warn!(
                    %kind,
                    pad = %pad_name,
                    destination = %destination.display_name(),
                    error = %e,
                    "Failed to link dynamic pad, stream left unconsumed"
                );
                LinkOutcome::Failed(kind, e)
            },
        }
    }
}
