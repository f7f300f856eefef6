// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Errors reported while assembling and starting a relay.
//!
//! Every variant names the stage (or pair of pads) that failed so the message
//! alone tells the operator what to fix. Dynamic link failures are not errors
//! at this level: the pad linker logs them and the run continues.

use crate::registry::StageRole;
use relaykit_core::{FrameworkError, LinkError, MessageKind, StateChangeError};
use thiserror::Error;

/// Fatal failure while building the static topology.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("bus filter must accept '{missing}' notifications")]
    BusFilter { missing: MessageKind },

    #[error("no address given for the {stage} stage")]
    EmptyAddress { stage: StageRole },

    #[error("failed to create pipeline: {0}")]
    Pipeline(#[source] FrameworkError),

    #[error("failed to create {stage} stage from factory '{factory}': {source}")]
    ElementCreation {
        stage: StageRole,
        factory: String,
        #[source]
        source: FrameworkError,
    },

    #[error("failed to set property '{key}' on {stage} stage: {source}")]
    Property {
        stage: StageRole,
        key: String,
        #[source]
        source: FrameworkError,
    },

    #[error("failed to add {stage} stage to the pipeline: {source}")]
    AddToPipeline {
        stage: StageRole,
        #[source]
        source: FrameworkError,
    },

    #[error("{stage} stage has no '{pad}' pad")]
    MissingPad { stage: StageRole, pad: String },

    #[error("{stage} stage refused a '{template}' request pad")]
    PadRequest { stage: StageRole, template: String },

    #[error("failed to link {from} to {to}: {source}")]
    Link {
        from: String,
        to: String,
        #[source]
        source: LinkError,
    },

    #[error("pipeline has no notification channel")]
    NoBus,
}

/// Failure that ends a run before the notification loop produces a report.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("setup failed: {0}")]
    Setup(#[from] SetupError),

    #[error("unable to set the pipeline to the playing state: {0}")]
    StateChange(#[from] StateChangeError),
}

impl RelayError {
    pub const fn is_setup(&self) -> bool {
        matches!(self, Self::Setup(_))
    }
}
