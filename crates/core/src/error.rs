// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Structured error types for framework operations.
//!
//! Every call into the media framework reports success or failure on its own.
//! These enums carry enough context (stage, pad, property) for the caller to
//! say exactly what failed without re-deriving it.

use crate::state::State;
use thiserror::Error;

/// Failure of a framework call that creates or configures objects.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameworkError {
    /// The framework could not create the top-level pipeline container.
    #[error("failed to create pipeline '{name}': {reason}")]
    PipelineCreation { name: String, reason: String },

    /// No element factory with this name is available, or it refused to build.
    ///
    /// Examples:
    /// - Plugin providing `rtmpsink` is not installed
    /// - Factory exists but its dependencies failed to load
    #[error("failed to create element from factory '{factory}': {reason}")]
    ElementCreation { factory: String, reason: String },

    /// Setting a property failed (unknown key or a value of the wrong type).
    #[error("failed to set property '{key}' on '{element}': {reason}")]
    Property { element: String, key: String, reason: String },

    /// Adding a stage to the pipeline failed (name clash, already parented).
    #[error("failed to add '{element}' to pipeline '{pipeline}': {reason}")]
    AddToPipeline { pipeline: String, element: String, reason: String },
}

/// Failure to connect an output pad to an input pad.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// One of the pads already has a peer. Existing links are never replaced.
    #[error("pad '{pad}' is already linked")]
    AlreadyLinked { pad: String },

    /// The source is not an output pad or the sink is not an input pad.
    #[error("cannot link '{src}' to '{sink}': wrong pad directions")]
    WrongDirection { src: String, sink: String },

    /// The pads do not share a common parent bin.
    #[error("cannot link '{src}' to '{sink}': pads are in different hierarchies")]
    WrongHierarchy { src: String, sink: String },

    /// Caps negotiation between the two pads failed.
    #[error("cannot link '{src}' to '{sink}': no common format")]
    NoFormat { src: String, sink: String },

    /// A pad expected on one of the elements does not exist.
    #[error("element '{element}' has no pad '{pad}'")]
    MissingPad { element: String, pad: String },

    /// The framework refused the link for another reason.
    #[error("link refused: {0}")]
    Refused(String),
}

/// A state change request that failed immediately.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("failed to change state of '{element}' to {}", .target.name())]
pub struct StateChangeError {
    pub element: String,
    pub target: State,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FrameworkError::ElementCreation {
            factory: "rtmpsink".to_string(),
            reason: "no such element factory".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to create element from factory 'rtmpsink': no such element factory"
        );

        let err = LinkError::AlreadyLinked { pad: "video_queue:sink".to_string() };
        assert_eq!(err.to_string(), "pad 'video_queue:sink' is already linked");
    }

    #[test]
    fn test_state_change_error_uses_state_name() {
        let err = StateChangeError { element: "pipeline".to_string(), target: State::Playing };
        assert_eq!(err.to_string(), "failed to change state of 'pipeline' to PLAYING");
    }
}
