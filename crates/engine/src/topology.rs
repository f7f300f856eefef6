// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Static topology builder.
//!
//! Creates the six stages, configures the addresses, adds everything to the
//! pipeline and links every connection that is known before data flows:
//!
//! ```text
//! source -> demuxer ~~> video_queue -> muxer[video] -> sink
//!                   ~~> audio_queue -> muxer[audio]
//! ```
//!
//! The `~~>` connections are made later by the [`PadLinker`] once the demuxer
//! announces its streams. Every call is checked; the first failure aborts the
//! build, tears down what exists and is reported as a [`SetupError`].

use crate::config::{Endpoints, RelayConfig};
use crate::constants::STREAMABLE_PROPERTY;
use crate::error::SetupError;
use crate::pad_linker::{LinkTable, PadLinker, StreamLinks};
use crate::registry::{StageRole, StageSet};
use relaykit_core::{Element, Framework, Pad, Pipeline, PropertyValue, State, StreamKind};
use std::sync::Arc;

/// A fully linked relay pipeline, ready to be played.
pub struct Topology<F: Framework> {
    stages: StageSet<F>,
    /// Muxer inputs obtained by request, released on teardown.
    requested: Vec<F::Pad>,
    links: Arc<StreamLinks>,
    torn_down: bool,
}

impl<F: Framework> Topology<F> {
    /// Assembles the static topology.
    ///
    /// # Errors
    ///
    /// Returns the first [`SetupError`] encountered. Anything created up to
    /// that point has already been torn down.
    pub fn build(
        framework: &F,
        config: &RelayConfig,
        endpoints: &Endpoints,
    ) -> Result<Self, SetupError> {
        endpoints.validate()?;

        let pipeline =
            framework.new_pipeline(&config.pipeline_name).map_err(SetupError::Pipeline)?;
        tracing::debug!(pipeline = %config.pipeline_name, "Created pipeline");

        let stages = StageSet::<F> {
            source: make_stage(framework, config, StageRole::Source)?,
            demuxer: make_stage(framework, config, StageRole::Demuxer)?,
            video_queue: make_stage(framework, config, StageRole::VideoQueue)?,
            audio_queue: make_stage(framework, config, StageRole::AudioQueue)?,
            muxer: make_stage(framework, config, StageRole::Muxer)?,
            sink: make_stage(framework, config, StageRole::Sink)?,
            pipeline,
        };

        let mut topology = Self {
            stages,
            requested: Vec::with_capacity(StreamKind::ALL.len()),
            links: Arc::new(StreamLinks::default()),
            torn_down: false,
        };
        if let Err(e) = topology.assemble(config, endpoints) {
            tracing::error!(error = %e, "Static topology incomplete");
            topology.teardown();
            return Err(e);
        }
        tracing::info!(pipeline = %config.pipeline_name, "Static topology assembled");
        Ok(topology)
    }

    fn assemble(&mut self, config: &RelayConfig, endpoints: &Endpoints) -> Result<(), SetupError> {
        // Addresses go in before any link is attempted.
        self.set_property(StageRole::Source, &config.location_property, endpoints.source.as_str())?;
        self.set_property(StageRole::Sink, &config.location_property, endpoints.destination.as_str())?;
        self.set_property(StageRole::Muxer, STREAMABLE_PROPERTY, config.streamable)?;

        for (role, element) in self.stages.iter() {
            self.stages
                .pipeline
                .add(element)
                .map_err(|source| SetupError::AddToPipeline { stage: role, source })?;
        }

        link_elements::<F>(&self.stages.source, &self.stages.demuxer)?;

        for kind in StreamKind::ALL {
            let queue_src =
                static_pad::<F>(self.stages.queue(kind), StageRole::queue_for(kind), "src")?;
            let mux_pad = self.stages.muxer.request_pad(kind.as_str()).ok_or_else(|| {
                SetupError::PadRequest { stage: StageRole::Muxer, template: kind.as_str().to_string() }
            })?;
            self.requested.push(mux_pad.clone());
            link_pads::<F>(&queue_src, &mux_pad)?;
            tracing::debug!(%kind, mux_pad = %mux_pad.name(), "Linked queue to requested muxer pad");
        }

        link_elements::<F>(&self.stages.muxer, &self.stages.sink)?;

        let table = LinkTable::new(
            static_pad::<F>(&self.stages.video_queue, StageRole::VideoQueue, "sink")?,
            static_pad::<F>(&self.stages.audio_queue, StageRole::AudioQueue, "sink")?,
        );
        let linker = Arc::new(PadLinker::new(table, Arc::clone(&self.links)));
        self.stages.demuxer.connect_pad_added(move |_demuxer, pad| {
            linker.handle_new_pad(pad);
        });

        Ok(())
    }

    fn set_property(
        &self,
        role: StageRole,
        key: &str,
        value: impl Into<PropertyValue>,
    ) -> Result<(), SetupError> {
        let value = value.into();
        self.stages.get(role).set_property(key, &value).map_err(|source| SetupError::Property {
            stage: role,
            key: key.to_string(),
            source,
        })?;
        tracing::debug!(stage = %role, key, %value, "Configured stage");
        Ok(())
    }

    pub const fn stages(&self) -> &StageSet<F> {
        &self.stages
    }

    pub const fn pipeline(&self) -> &F::Pipeline {
        &self.stages.pipeline
    }

    /// Kinds linked so far by the pad linker.
    pub const fn links(&self) -> &Arc<StreamLinks> {
        &self.links
    }

    pub fn requested_pads(&self) -> &[F::Pad] {
        &self.requested
    }

    /// Stops the pipeline and gives back the requested muxer pads. Runs once;
    /// later calls do nothing.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        if let Err(e) = self.stages.pipeline.set_state(State::Null) {
            tracing::error!(error = %e, "Failed to stop pipeline during teardown");
        }
        for pad in self.requested.drain(..) {
            self.stages.muxer.release_request_pad(&pad);
        }
        tracing::debug!(pipeline = %self.stages.pipeline.name(), "Pipeline torn down");
    }
}

impl<F: Framework> Drop for Topology<F> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn make_stage<F: Framework>(
    framework: &F,
    config: &RelayConfig,
    role: StageRole,
) -> Result<F::Element, SetupError> {
    let factory = role.factory(&config.factories);
    let element = framework.make_element(factory, role.name()).map_err(|source| {
        SetupError::ElementCreation { stage: role, factory: factory.to_string(), source }
    })?;
    tracing::debug!(stage = %role, factory, "Created stage");
    Ok(element)
}

fn static_pad<F: Framework>(
    element: &F::Element,
    role: StageRole,
    name: &str,
) -> Result<F::Pad, SetupError> {
    element
        .static_pad(name)
        .ok_or_else(|| SetupError::MissingPad { stage: role, pad: name.to_string() })
}

fn link_pads<F: Framework>(src: &F::Pad, sink: &F::Pad) -> Result<(), SetupError> {
    src.link(sink).map_err(|source| SetupError::Link {
        from: src.display_name(),
        to: sink.display_name(),
        source,
    })
}

fn link_elements<F: Framework>(src: &F::Element, dest: &F::Element) -> Result<(), SetupError> {
    src.link(dest).map_err(|source| SetupError::Link {
        from: format!("{}:src", src.name()),
        to: format!("{}:sink", dest.name()),
        source,
    })?;
    tracing::debug!(from = %src.name(), to = %dest.name(), "Linked stages");
    Ok(())
}
