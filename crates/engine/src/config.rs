// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Configuration for a relay run.

use crate::constants::{
    DEFAULT_BUS_FILTER, DEFAULT_DEMUXER_FACTORY, DEFAULT_LOCATION_PROPERTY,
    DEFAULT_MUXER_FACTORY, DEFAULT_PIPELINE_NAME, DEFAULT_QUEUE_FACTORY, DEFAULT_SINK_FACTORY,
    DEFAULT_SOURCE_FACTORY,
};
use crate::error::SetupError;
use crate::registry::StageRole;
use relaykit_core::{MessageFilter, MessageKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Factory names used to create each stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageFactories {
    pub source: String,
    pub demuxer: String,
    /// Used for both the video and the audio buffer.
    pub queue: String,
    pub muxer: String,
    pub sink: String,
}

impl Default for StageFactories {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE_FACTORY.to_string(),
            demuxer: DEFAULT_DEMUXER_FACTORY.to_string(),
            queue: DEFAULT_QUEUE_FACTORY.to_string(),
            muxer: DEFAULT_MUXER_FACTORY.to_string(),
            sink: DEFAULT_SINK_FACTORY.to_string(),
        }
    }
}

/// Configuration for assembling and driving one relay pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Name of the pipeline container (default: "pipeline")
    pub pipeline_name: String,
    pub factories: StageFactories,
    /// Property receiving the source/destination address (default: "location")
    pub location_property: String,
    /// Set the muxer's `streamable` flag for live output (default: true)
    pub streamable: bool,
    /// Notification kinds the run loop waits for (default: state-changed, error, eos)
    pub bus_filter: MessageFilter,
    /// Upper bound for a single wait in milliseconds. `None` waits without bound.
    /// An empty wait never ends the run; the loop just waits again.
    pub bus_timeout_ms: Option<u64>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            pipeline_name: DEFAULT_PIPELINE_NAME.to_string(),
            factories: StageFactories::default(),
            location_property: DEFAULT_LOCATION_PROPERTY.to_string(),
            streamable: true,
            bus_filter: MessageFilter::new(DEFAULT_BUS_FILTER),
            bus_timeout_ms: None, // Unbounded
        }
    }
}

impl RelayConfig {
    pub fn bus_timeout(&self) -> Option<Duration> {
        self.bus_timeout_ms.map(Duration::from_millis)
    }

    /// The run loop only ends on an error or end-of-stream notification, so
    /// the bus filter must let both through.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::BusFilter`] naming the first terminal kind the
    /// filter drops.
    pub fn validate(&self) -> Result<(), SetupError> {
        let kinds = self.bus_filter.kinds();
        for required in [MessageKind::Error, MessageKind::Eos] {
            if !kinds.contains(&required) {
                return Err(SetupError::BusFilter { missing: required });
            }
        }
        Ok(())
    }
}

/// Addresses supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// Where the incoming stream is read from.
    pub source: String,
    /// Where the re-multiplexed stream is sent.
    pub destination: String,
}

impl Endpoints {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self { source: source.into(), destination: destination.into() }
    }

    /// Both addresses must be non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::EmptyAddress`] naming the stage left without one.
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.source.trim().is_empty() {
            return Err(SetupError::EmptyAddress { stage: StageRole::Source });
        }
        if self.destination.trim().is_empty() {
            return Err(SetupError::EmptyAddress { stage: StageRole::Sink });
        }
        Ok(())
    }
}
