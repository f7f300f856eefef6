// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! engine: Assembles, plays and supervises a relay pipeline.
//! The media itself is moved by the external framework; this crate only builds
//! the topology, links streams as they are discovered and reacts to the bus.

use relaykit_core::{Framework, Pipeline};

// --- Public Modules ---

pub mod config;
pub mod constants;
pub mod error;
pub mod lifecycle;
pub mod pad_linker;
pub mod registry;
pub mod topology;

// Re-exports
pub use config::{Endpoints, RelayConfig, StageFactories};
pub use error::{RelayError, SetupError};
pub use lifecycle::{ErrorReport, LifecycleDriver, RunReport, Termination, Transition};
pub use pad_linker::{LinkOutcome, LinkTable, PadLinker, StreamLinks};
pub use registry::{StageRole, StageSet};
pub use topology::Topology;

// --- Relay ---

/// Unified entry point: one call assembles the pipeline, plays it until the
/// first terminal notification and tears it down again.
pub struct Relay<F: Framework> {
    framework: F,
    config: RelayConfig,
}

impl<F: Framework> Relay<F> {
    pub const fn new(framework: F, config: RelayConfig) -> Self {
        Self { framework, config }
    }

    /// A relay using the default stage factories and bus filter.
    pub fn with_defaults(framework: F) -> Self {
        Self::new(framework, RelayConfig::default())
    }

    pub const fn framework(&self) -> &F {
        &self.framework
    }

    /// Runs one relay session from `endpoints.source` to `endpoints.destination`.
    ///
    /// Returns the report of the notification loop, whether it ended on
    /// end-of-stream or on a runtime error notification. The pipeline is back
    /// in `NULL` with its requested pads released on every return path.
    ///
    /// # Errors
    ///
    /// - [`RelayError::Setup`] if the configuration is unusable or the static
    ///   topology could not be built; the notification loop is never entered.
    /// - [`RelayError::StateChange`] if the request for `PLAYING` failed.
    pub fn run(&self, endpoints: &Endpoints) -> Result<RunReport, RelayError> {
        tracing::info!(
            source = %endpoints.source,
            destination = %endpoints.destination,
            "Starting relay"
        );

        self.config.validate()?;
        let mut topology = Topology::build(&self.framework, &self.config, endpoints)?;

        let Some(bus) = topology.pipeline().bus() else {
            topology.teardown();
            return Err(SetupError::NoBus.into());
        };

        let driver = LifecycleDriver::new(topology.pipeline(), &self.config);
        if let Err(e) = driver.start() {
            topology.teardown();
            return Err(e.into());
        }

        let mut report = driver.run(&bus);
        report.linked = topology.links().linked();
        tracing::info!(
            pipeline = %topology.pipeline().name(),
            linked = ?report.linked,
            consumed = report.consumed,
            success = report.is_success(),
            "Relay finished"
        );
        topology.teardown();
        Ok(report)
    }
}

#[cfg(test)]
mod tests;
