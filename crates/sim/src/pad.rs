// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Simulated pads.

use crate::element::{ElementInner, SimElement};
use crate::lock;
use relaykit_core::{LinkError, Pad, PadDirection, PadPresence};
use std::fmt;
use std::sync::{Arc, Mutex, Weak};

/// A pad on a simulated stage. Clones share the same pad.
#[derive(Clone)]
pub struct SimPad {
    pub(crate) inner: Arc<PadInner>,
}

pub(crate) struct PadInner {
    name: String,
    direction: PadDirection,
    presence: PadPresence,
    parent: Weak<ElementInner>,
    parent_name: String,
    peer: Mutex<Option<Weak<PadInner>>>,
}

impl SimPad {
    pub(crate) fn new(
        name: &str,
        direction: PadDirection,
        presence: PadPresence,
        parent: Weak<ElementInner>,
        parent_name: &str,
    ) -> Self {
        Self {
            inner: Arc::new(PadInner {
                name: name.to_string(),
                direction,
                presence,
                parent,
                parent_name: parent_name.to_string(),
                peer: Mutex::new(None),
            }),
        }
    }

    pub fn presence(&self) -> PadPresence {
        self.inner.presence
    }

    /// The pad this one is linked to, if any.
    pub fn peer(&self) -> Option<Self> {
        lock(&self.inner.peer).as_ref().and_then(Weak::upgrade).map(|inner| Self { inner })
    }

    pub fn parent(&self) -> Option<SimElement> {
        self.inner.parent.upgrade().map(|inner| SimElement { inner })
    }

    pub(crate) fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn points_to(&self, other: &Self) -> bool {
        lock(&self.inner.peer).as_ref().is_some_and(|w| w.ptr_eq(&Arc::downgrade(&other.inner)))
    }
}

impl fmt::Debug for SimPad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimPad")
            .field("pad", &self.display_name())
            .field("direction", &self.inner.direction)
            .field("presence", &self.inner.presence)
            .field("linked", &self.is_linked())
            .finish()
    }
}

impl Pad for SimPad {
    fn name(&self) -> String {
        self.inner.name.clone()
    }

    fn direction(&self) -> PadDirection {
        self.inner.direction
    }

    fn parent_name(&self) -> Option<String> {
        self.inner.parent.upgrade().map(|_| self.inner.parent_name.clone())
    }

    fn is_linked(&self) -> bool {
        self.peer().is_some()
    }

    fn link(&self, sink: &Self) -> Result<(), LinkError> {
        if self.inner.direction != PadDirection::Src || sink.inner.direction != PadDirection::Sink
        {
            return Err(LinkError::WrongDirection {
                src: self.display_name(),
                sink: sink.display_name(),
            });
        }

        let src_bin = self.parent().and_then(|e| e.pipeline_id());
        let sink_bin = sink.parent().and_then(|e| e.pipeline_id());
        if src_bin.is_none() || src_bin != sink_bin {
            return Err(LinkError::WrongHierarchy {
                src: self.display_name(),
                sink: sink.display_name(),
            });
        }

        // Links always go src -> sink, so this lock order is global.
        let mut src_peer = lock(&self.inner.peer);
        if src_peer.as_ref().and_then(Weak::upgrade).is_some() {
            return Err(LinkError::AlreadyLinked { pad: self.display_name() });
        }
        let mut sink_peer = lock(&sink.inner.peer);
        if sink_peer.as_ref().and_then(Weak::upgrade).is_some() {
            return Err(LinkError::AlreadyLinked { pad: sink.display_name() });
        }

        *src_peer = Some(Arc::downgrade(&sink.inner));
        *sink_peer = Some(Arc::downgrade(&self.inner));
        drop(sink_peer);
        drop(src_peer);

        tracing::debug!(src = %self.display_name(), sink = %sink.display_name(), "Linked pads");
        Ok(())
    }

    fn unlink(&self, sink: &Self) -> bool {
        if !self.points_to(sink) || !sink.points_to(self) {
            return false;
        }
        *lock(&self.inner.peer) = None;
        *lock(&sink.inner.peer) = None;
        tracing::debug!(src = %self.display_name(), sink = %sink.display_name(), "Unlinked pads");
        true
    }
}
