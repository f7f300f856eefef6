// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Simulated pipeline and its streaming thread.
//!
//! State changes are performed synchronously, one step at a time, posting a
//! state-changed notification for every child and then for the pipeline. On
//! reaching `PLAYING` a streaming thread starts: it makes the demuxer announce
//! the scripted pads (running pad-added handlers on that thread), pushes
//! buffers along whatever got linked, and finally posts the scripted ending.

use crate::bus::SimBus;
use crate::element::{ElementRole, Received, SimElement};
use crate::lock;
use crate::pad::SimPad;
use crate::script::{SimEnding, SimScript};
use bytes::Bytes;
use crossbeam_channel::{Receiver, Sender};
use relaykit_core::{
    Element, FrameworkError, Message, MessageSource, MessageView, ObjectId, Pipeline, State,
    StateChangeError, StateChangeSuccess,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Upper bound on stages a buffer may cross; guards against link cycles.
const MAX_HOPS: usize = 16;

const DELAY_SLICE: Duration = Duration::from_millis(5);

/// A simulated pipeline. Clones share the same pipeline.
#[derive(Clone)]
pub struct SimPipeline {
    inner: Arc<PipelineInner>,
}

struct PipelineInner {
    id: ObjectId,
    name: String,
    script: SimScript,
    elements: Mutex<Vec<SimElement>>,
    state: Mutex<State>,
    tx: Sender<Message>,
    rx: Receiver<Message>,
    worker: Mutex<Option<Worker>>,
}

struct Worker {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl SimPipeline {
    pub(crate) fn new(id: ObjectId, name: &str, script: SimScript) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            inner: Arc::new(PipelineInner {
                id,
                name: name.to_string(),
                script,
                elements: Mutex::new(Vec::new()),
                state: Mutex::new(State::Null),
                tx,
                rx,
                worker: Mutex::new(None),
            }),
        }
    }

    pub fn element(&self, name: &str) -> Option<SimElement> {
        lock(&self.inner.elements).iter().find(|e| e.name() == name).cloned()
    }

    pub fn elements(&self) -> Vec<SimElement> {
        lock(&self.inner.elements).clone()
    }

    /// Everything the sink stages received for `stream`.
    pub fn delivered(&self, stream: &str) -> Received {
        lock(&self.inner.elements).iter().filter(|e| e.role() == ElementRole::Sink).fold(
            Received::default(),
            |acc, sink| {
                let r = sink.received(stream);
                Received { buffers: acc.buffers + r.buffers, bytes: acc.bytes + r.bytes }
            },
        )
    }

    pub fn is_streaming(&self) -> bool {
        lock(&self.inner.worker).is_some()
    }

    fn source(&self) -> MessageSource {
        MessageSource { id: self.inner.id, name: self.inner.name.clone() }
    }

    fn post(&self, source: MessageSource, view: MessageView) {
        let _ = self.inner.tx.send(Message::new(Some(source), view));
    }

    fn start_streaming(&self) {
        let mut worker = lock(&self.inner.worker);
        if worker.is_some() {
            return;
        }

        let stop = Arc::new(AtomicBool::new(false));
        let thread = StreamingThread {
            elements: lock(&self.inner.elements).clone(),
            script: self.inner.script.clone(),
            tx: self.inner.tx.clone(),
            pipeline: self.source(),
            stop: Arc::clone(&stop),
        };
        match std::thread::Builder::new()
            .name(format!("{}:streaming", self.inner.name))
            .spawn(move || thread.run())
        {
            Ok(handle) => *worker = Some(Worker { stop, handle }),
            Err(e) => {
                tracing::error!(pipeline = %self.inner.name, error = %e, "Failed to spawn streaming thread");
                self.post(
                    self.source(),
                    MessageView::Error {
                        message: "Could not start streaming thread".to_string(),
                        debug: Some(e.to_string()),
                    },
                );
            },
        }
    }

    fn stop_streaming(&self) {
        let Some(worker) = lock(&self.inner.worker).take() else {
            return;
        };
        worker.stop.store(true, Ordering::SeqCst);
        if worker.handle.join().is_err() {
            tracing::error!(pipeline = %self.inner.name, "Streaming thread panicked");
        }
    }
}

impl Drop for PipelineInner {
    fn drop(&mut self) {
        if let Some(worker) = lock(&self.worker).take() {
            worker.stop.store(true, Ordering::SeqCst);
            let _ = worker.handle.join();
        }
    }
}

impl Pipeline for SimPipeline {
    type Element = SimElement;
    type Bus = SimBus;

    fn name(&self) -> String {
        self.inner.name.clone()
    }

    fn object_id(&self) -> ObjectId {
        self.inner.id
    }

    fn add(&self, element: &SimElement) -> Result<(), FrameworkError> {
        let mut elements = lock(&self.inner.elements);
        let err = |reason: String| FrameworkError::AddToPipeline {
            pipeline: self.inner.name.clone(),
            element: element.name(),
            reason,
        };
        if elements.iter().any(|e| e.name() == element.name()) {
            return Err(err("name already in use".to_string()));
        }
        element.set_pipeline(self.inner.id).map_err(err)?;
        elements.push(element.clone());
        drop(elements);
        Ok(())
    }

    fn set_state(&self, target: State) -> Result<StateChangeSuccess, StateChangeError> {
        if self.inner.script.fail_state_change_to == Some(target) {
            tracing::warn!(pipeline = %self.inner.name, %target, "Refusing scripted state change");
            return Err(StateChangeError { element: self.inner.name.clone(), target });
        }

        let mut state = lock(&self.inner.state);
        for (old, new) in state.steps_to(target) {
            if old == State::Playing {
                self.stop_streaming();
            }
            // Children change before their container, downstream first.
            for element in lock(&self.inner.elements).iter().rev() {
                self.post(
                    MessageSource { id: element.id(), name: element.name() },
                    MessageView::StateChanged { old, new, pending: None },
                );
            }
            let pending = (new != target).then_some(target);
            self.post(self.source(), MessageView::StateChanged { old, new, pending });
            tracing::debug!(pipeline = %self.inner.name, %old, %new, "Simulated state step");
            *state = new;
        }
        drop(state);

        if target == State::Playing {
            self.start_streaming();
            return Ok(StateChangeSuccess::Async);
        }
        Ok(StateChangeSuccess::Success)
    }

    fn current_state(&self) -> State {
        *lock(&self.inner.state)
    }

    fn bus(&self) -> Option<SimBus> {
        Some(SimBus::new(self.inner.rx.clone()))
    }
}

/// Everything the streaming thread needs, detached from the pipeline handle.
struct StreamingThread {
    elements: Vec<SimElement>,
    script: SimScript,
    tx: Sender<Message>,
    pipeline: MessageSource,
    stop: Arc<AtomicBool>,
}

impl StreamingThread {
    fn stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    fn post(&self, source: MessageSource, view: MessageView) {
        let _ = self.tx.send(Message::new(Some(source), view));
    }

    fn run(self) {
        let demuxer = self.elements.iter().find(|e| e.role() == ElementRole::Demuxer);

        let mut announced: Vec<(String, SimPad)> = Vec::new();
        if let Some(demuxer) = demuxer {
            for stream in &self.script.streams {
                if self.stopped() {
                    return;
                }
                let pad = demuxer.add_sometimes_pad(stream);
                demuxer.emit_pad_added(&pad);
                announced.push((stream.clone(), pad));
            }
        } else {
            tracing::warn!(pipeline = %self.pipeline.name, "No demuxer in pipeline, nothing to announce");
        }

        let payload = Bytes::from(vec![0u8; self.script.payload_size]);
        for _ in 0..self.script.buffers_per_stream {
            for (stream, pad) in &announced {
                if self.stopped() {
                    return;
                }
                if !push(pad, stream, payload.clone()) {
                    tracing::trace!(%stream, "Buffer dropped on unlinked path");
                }
            }
        }

        for view in &self.script.extra_messages {
            self.post(self.pipeline.clone(), view.clone());
        }

        let deadline = Instant::now() + self.script.ending_delay;
        while Instant::now() < deadline {
            if self.stopped() {
                return;
            }
            std::thread::sleep(DELAY_SLICE.min(deadline.saturating_duration_since(Instant::now())));
        }
        if self.stopped() {
            return;
        }

        match &self.script.ending {
            SimEnding::Eos => self.post(self.pipeline.clone(), MessageView::Eos),
            SimEnding::Error { element, message, debug } => {
                let source = self
                    .elements
                    .iter()
                    .find(|e| &e.name() == element)
                    .map_or_else(
                        || MessageSource { id: ObjectId(u64::MAX), name: element.clone() },
                        |e| MessageSource { id: e.id(), name: e.name() },
                    );
                self.post(
                    source,
                    MessageView::Error { message: message.clone(), debug: debug.clone() },
                );
            },
        }
    }
}

/// Follows links from a demuxer output down to a sink. Returns false when the
/// buffer hit an unlinked pad.
fn push(pad: &SimPad, stream: &str, buffer: Bytes) -> bool {
    let mut current = pad.clone();
    for _ in 0..MAX_HOPS {
        let Some(element) = current.peer().and_then(|peer| peer.parent()) else {
            return false;
        };
        match element.role() {
            ElementRole::Sink => {
                element.record(stream, buffer.len());
                return true;
            },
            ElementRole::Queue | ElementRole::Muxer => match element.static_pad("src") {
                Some(src) => current = src,
                None => return false,
            },
            ElementRole::Source | ElementRole::Demuxer => return false,
        }
    }
    false
}
