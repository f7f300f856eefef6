// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! relaykit Sim - An in-process media framework for exercising relay pipelines.
//!
//! Implements the `relaykit-core` framework traits without moving real media.
//! Stages are created from a small factory table (`rtmpsrc`, `flvdemux`,
//! `queue`, `flvmux`, `rtmpsink`), pads link with the same at-most-once rules
//! a real framework enforces, and a [`SimScript`] decides what the demuxer
//! discovers and how the stream ends.
//!
//! ```ignore
//! use relaykit_sim::{SimFramework, SimScript};
//!
//! let framework = SimFramework::new(SimScript::default().with_streams(["video"]));
//! ```

pub mod bus;
pub mod element;
pub mod pad;
pub mod pipeline;
pub mod script;

pub use bus::SimBus;
pub use element::{ElementRole, Received, SimElement};
pub use pad::SimPad;
pub use pipeline::SimPipeline;
pub use script::{SimEnding, SimScript};

use relaykit_core::{Framework, FrameworkError, ObjectId};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Factories available in a fresh simulator.
pub const DEFAULT_FACTORIES: [(&str, ElementRole); 5] = [
    ("rtmpsrc", ElementRole::Source),
    ("flvdemux", ElementRole::Demuxer),
    ("queue", ElementRole::Queue),
    ("flvmux", ElementRole::Muxer),
    ("rtmpsink", ElementRole::Sink),
];

/// Locks a mutex, recovering the data if a panicking thread poisoned it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Simulated media framework. Clones share factories and counters.
#[derive(Clone)]
pub struct SimFramework {
    inner: Arc<FrameworkInner>,
}

struct FrameworkInner {
    script: SimScript,
    factories: Mutex<Vec<(String, ElementRole)>>,
    next_id: AtomicU64,
    elements_created: AtomicUsize,
    pipelines: Mutex<Vec<SimPipeline>>,
}

impl Default for SimFramework {
    fn default() -> Self {
        Self::new(SimScript::default())
    }
}

impl SimFramework {
    pub fn new(script: SimScript) -> Self {
        let factories =
            DEFAULT_FACTORIES.iter().map(|(name, role)| ((*name).to_string(), *role)).collect();
        Self {
            inner: Arc::new(FrameworkInner {
                script,
                factories: Mutex::new(factories),
                next_id: AtomicU64::new(1),
                elements_created: AtomicUsize::new(0),
                pipelines: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Makes a factory unavailable, as if its plugin were not installed.
    #[must_use]
    pub fn without_factory(self, factory: &str) -> Self {
        lock(&self.inner.factories).retain(|(name, _)| name != factory);
        self
    }

    /// Registers an extra factory name for a role.
    #[must_use]
    pub fn with_factory(self, factory: &str, role: ElementRole) -> Self {
        lock(&self.inner.factories).push((factory.to_string(), role));
        self
    }

    pub fn script(&self) -> &SimScript {
        &self.inner.script
    }

    /// Number of stages successfully created so far.
    pub fn elements_created(&self) -> usize {
        self.inner.elements_created.load(Ordering::SeqCst)
    }

    /// Every pipeline created through this framework, oldest first.
    pub fn pipelines(&self) -> Vec<SimPipeline> {
        lock(&self.inner.pipelines).clone()
    }

    pub fn last_pipeline(&self) -> Option<SimPipeline> {
        lock(&self.inner.pipelines).last().cloned()
    }

    fn next_id(&self) -> ObjectId {
        ObjectId(self.inner.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

impl Framework for SimFramework {
    type Pad = SimPad;
    type Element = SimElement;
    type Bus = SimBus;
    type Pipeline = SimPipeline;

    fn new_pipeline(&self, name: &str) -> Result<SimPipeline, FrameworkError> {
        if name.is_empty() {
            return Err(FrameworkError::PipelineCreation {
                name: name.to_string(),
                reason: "empty name".to_string(),
            });
        }
        let pipeline = SimPipeline::new(self.next_id(), name, self.inner.script.clone());
        lock(&self.inner.pipelines).push(pipeline.clone());
        Ok(pipeline)
    }

    fn make_element(&self, factory: &str, name: &str) -> Result<SimElement, FrameworkError> {
        let role = lock(&self.inner.factories)
            .iter()
            .find(|(f, _)| f == factory)
            .map(|(_, role)| *role)
            .ok_or_else(|| FrameworkError::ElementCreation {
                factory: factory.to_string(),
                reason: "no such element factory".to_string(),
            })?;

        let element = SimElement::new(
            self.next_id(),
            name,
            factory,
            role,
            self.inner.script.mux_templates.clone(),
        );
        self.inner.elements_created.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(factory, name, ?role, "Created simulated element");
        Ok(element)
    }
}
