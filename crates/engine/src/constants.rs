// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Canonical defaults for relay assembly and the notification loop.
//!
//! `RelayConfig::default()` is built from these values. The executable never
//! overrides them from the environment; they only change through an explicit
//! `RelayConfig`.

use relaykit_core::MessageKind;

// === Pipeline ===

/// Name given to the pipeline container.
pub const DEFAULT_PIPELINE_NAME: &str = "pipeline";

// === Element Factories ===

/// Reads the incoming live stream.
pub const DEFAULT_SOURCE_FACTORY: &str = "rtmpsrc";

/// Splits the incoming container into elementary streams. Its output pads
/// only appear once it has inspected real data.
pub const DEFAULT_DEMUXER_FACTORY: &str = "flvdemux";

/// Buffers one elementary stream; one instance per stream kind.
pub const DEFAULT_QUEUE_FACTORY: &str = "queue";

/// Joins the elementary streams into the outgoing container. Inputs are
/// obtained by explicit request, one per stream kind.
pub const DEFAULT_MUXER_FACTORY: &str = "flvmux";

/// Writes the outgoing container to the destination.
pub const DEFAULT_SINK_FACTORY: &str = "rtmpsink";

// === Properties ===

/// Property holding the source and destination addresses.
pub const DEFAULT_LOCATION_PROPERTY: &str = "location";

/// Muxer property that drops seek-dependent headers for live output.
pub const STREAMABLE_PROPERTY: &str = "streamable";

// === Notification Loop ===

/// Kinds the run loop waits for. Anything else arriving through the filter is
/// reported as unexpected.
pub const DEFAULT_BUS_FILTER: [MessageKind; 3] =
    [MessageKind::StateChanged, MessageKind::Error, MessageKind::Eos];

/// Placeholder printed when an error carries no diagnostic detail.
pub const NO_DIAGNOSTIC: &str = "none";
