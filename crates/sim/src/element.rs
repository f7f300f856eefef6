// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Simulated stages.
//!
//! Each stage plays one [`ElementRole`], which fixes its always-present pads,
//! the properties it accepts and how it forwards buffers.

use crate::lock;
use crate::pad::SimPad;
use relaykit_core::{
    Element, FrameworkError, LinkError, ObjectId, Pad, PadDirection, PadPresence, PropertyValue,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, Weak};

/// What a simulated stage does with data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementRole {
    /// Reads from a network location. One `src` pad.
    Source,
    /// Splits a container. One `sink` pad, output pads appear at run time.
    Demuxer,
    /// Buffers one stream. `sink` and `src` pads.
    Queue,
    /// Joins streams into a container. One `src` pad, inputs by request.
    Muxer,
    /// Writes to a network location. One `sink` pad.
    Sink,
}

impl ElementRole {
    const fn always_pads(self) -> &'static [(&'static str, PadDirection)] {
        match self {
            Self::Source => &[("src", PadDirection::Src)],
            Self::Demuxer | Self::Sink => &[("sink", PadDirection::Sink)],
            Self::Queue => &[("sink", PadDirection::Sink), ("src", PadDirection::Src)],
            Self::Muxer => &[("src", PadDirection::Src)],
        }
    }

    fn check_property(self, key: &str, value: &PropertyValue) -> Result<(), String> {
        let expected = match (self, key) {
            (Self::Source | Self::Sink, "location") => "string",
            (Self::Muxer, "streamable") => "boolean",
            (Self::Queue, "max-size-buffers") => "unsigned integer",
            _ => return Err(format!("no property named '{key}'")),
        };
        match (expected, value) {
            ("string", PropertyValue::Str(_)) | ("boolean", PropertyValue::Bool(_)) => Ok(()),
            ("unsigned integer", PropertyValue::Str(s)) if s.parse::<u32>().is_ok() => Ok(()),
            _ => Err(format!("expected a {expected} value for '{key}', got '{value}'")),
        }
    }
}

/// Buffers and bytes that reached a sink stage for one stream kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Received {
    pub buffers: usize,
    pub bytes: usize,
}

type PadAddedHandler = Arc<dyn Fn(&SimElement, &SimPad) + Send + Sync>;

/// A simulated stage. Clones share the same stage.
#[derive(Clone)]
pub struct SimElement {
    pub(crate) inner: Arc<ElementInner>,
}

pub(crate) struct ElementInner {
    id: ObjectId,
    name: String,
    factory: String,
    role: ElementRole,
    mux_templates: Vec<String>,
    properties: Mutex<HashMap<String, PropertyValue>>,
    pads: Mutex<Vec<SimPad>>,
    handlers: Mutex<Vec<PadAddedHandler>>,
    pipeline: Mutex<Option<ObjectId>>,
    received: Mutex<HashMap<String, Received>>,
}

impl SimElement {
    pub(crate) fn new(
        id: ObjectId,
        name: &str,
        factory: &str,
        role: ElementRole,
        mux_templates: Vec<String>,
    ) -> Self {
        let inner = Arc::new_cyclic(|parent: &Weak<ElementInner>| {
            let pads = role
                .always_pads()
                .iter()
                .map(|(pad, dir)| SimPad::new(pad, *dir, PadPresence::Always, parent.clone(), name))
                .collect();
            ElementInner {
                id,
                name: name.to_string(),
                factory: factory.to_string(),
                role,
                mux_templates,
                properties: Mutex::new(HashMap::new()),
                pads: Mutex::new(pads),
                handlers: Mutex::new(Vec::new()),
                pipeline: Mutex::new(None),
                received: Mutex::new(HashMap::new()),
            }
        });
        Self { inner }
    }

    pub fn id(&self) -> ObjectId {
        self.inner.id
    }

    pub fn role(&self) -> ElementRole {
        self.inner.role
    }

    pub fn property(&self, key: &str) -> Option<PropertyValue> {
        lock(&self.inner.properties).get(key).cloned()
    }

    pub fn pads(&self) -> Vec<SimPad> {
        lock(&self.inner.pads).clone()
    }

    /// What reached this stage for `kind` (only sinks record anything).
    pub fn received(&self, kind: &str) -> Received {
        lock(&self.inner.received).get(kind).copied().unwrap_or_default()
    }

    pub(crate) fn pipeline_id(&self) -> Option<ObjectId> {
        *lock(&self.inner.pipeline)
    }

    pub(crate) fn set_pipeline(&self, pipeline: ObjectId) -> Result<(), String> {
        let mut parent = lock(&self.inner.pipeline);
        if let Some(existing) = *parent {
            return Err(format!("already owned by object {}", existing.0));
        }
        *parent = Some(pipeline);
        Ok(())
    }

    /// Creates a pad that only exists once data has been inspected. Handlers
    /// are not told about it until [`SimElement::emit_pad_added`].
    pub fn add_sometimes_pad(&self, name: &str) -> SimPad {
        let pad = SimPad::new(
            name,
            PadDirection::Src,
            PadPresence::Sometimes,
            Arc::downgrade(&self.inner),
            &self.inner.name,
        );
        lock(&self.inner.pads).push(pad.clone());
        pad
    }

    /// Runs every pad-added handler on the calling thread.
    pub fn emit_pad_added(&self, pad: &SimPad) {
        let handlers = lock(&self.inner.handlers).clone();
        tracing::debug!(
            element = %self.inner.name,
            pad = %pad.name(),
            handlers = handlers.len(),
            "Emitting pad-added"
        );
        for handler in handlers {
            handler(self, pad);
        }
    }

    pub(crate) fn record(&self, kind: &str, bytes: usize) {
        let mut received = lock(&self.inner.received);
        let entry = received.entry(kind.to_string()).or_default();
        entry.buffers += 1;
        entry.bytes += bytes;
    }
}

impl fmt::Debug for SimElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimElement")
            .field("name", &self.inner.name)
            .field("factory", &self.inner.factory)
            .field("role", &self.inner.role)
            .finish_non_exhaustive()
    }
}

impl Element for SimElement {
    type Pad = SimPad;

    fn name(&self) -> String {
        self.inner.name.clone()
    }

    fn factory_name(&self) -> String {
        self.inner.factory.clone()
    }

    fn set_property(&self, key: &str, value: &PropertyValue) -> Result<(), FrameworkError> {
        self.inner.role.check_property(key, value).map_err(|reason| FrameworkError::Property {
            element: self.inner.name.clone(),
            key: key.to_string(),
            reason,
        })?;
        lock(&self.inner.properties).insert(key.to_string(), value.clone());
        Ok(())
    }

    fn static_pad(&self, name: &str) -> Option<SimPad> {
        lock(&self.inner.pads)
            .iter()
            .find(|p| p.name() == name && p.presence() != PadPresence::Request)
            .cloned()
    }

    fn request_pad(&self, template: &str) -> Option<SimPad> {
        if self.inner.role != ElementRole::Muxer
            || !self.inner.mux_templates.iter().any(|t| t == template)
        {
            tracing::debug!(element = %self.inner.name, template, "Unsupported request template");
            return None;
        }

        let mut pads = lock(&self.inner.pads);
        if pads.iter().any(|p| p.name() == template) {
            tracing::debug!(element = %self.inner.name, template, "Request template saturated");
            return None;
        }
        let pad = SimPad::new(
            template,
            PadDirection::Sink,
            PadPresence::Request,
            Arc::downgrade(&self.inner),
            &self.inner.name,
        );
        pads.push(pad.clone());
        drop(pads);
        Some(pad)
    }

    fn release_request_pad(&self, pad: &SimPad) {
        if let Some(peer) = pad.peer() {
            peer.unlink(pad);
        }
        lock(&self.inner.pads).retain(|p| !(p.same_as(pad) && p.presence() == PadPresence::Request));
    }

    fn link(&self, dest: &Self) -> Result<(), LinkError> {
        let src = self.static_pad("src").ok_or_else(|| LinkError::MissingPad {
            element: self.inner.name.clone(),
            pad: "src".to_string(),
        })?;
        let sink = dest.static_pad("sink").ok_or_else(|| LinkError::MissingPad {
            element: dest.inner.name.clone(),
            pad: "sink".to_string(),
        })?;
        src.link(&sink)
    }

    fn connect_pad_added<H>(&self, handler: H)
    where
        H: Fn(&Self, &SimPad) + Send + Sync + 'static,
    {
        lock(&self.inner.handlers).push(Arc::new(handler));
    }
}
