// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! The fixed set of stages making up a relay.

use crate::config::StageFactories;
use relaykit_core::{Framework, StreamKind};
use std::fmt;

/// Role of a stage within the relay topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageRole {
    Source,
    Demuxer,
    VideoQueue,
    AudioQueue,
    Muxer,
    Sink,
}

impl StageRole {
    /// Creation order. Upstream stages come first.
    pub const ALL: [Self; 6] = [
        Self::Source,
        Self::Demuxer,
        Self::VideoQueue,
        Self::AudioQueue,
        Self::Muxer,
        Self::Sink,
    ];

    /// Name given to the stage inside the pipeline.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Demuxer => "demuxer",
            Self::VideoQueue => "video_queue",
            Self::AudioQueue => "audio_queue",
            Self::Muxer => "muxer",
            Self::Sink => "sink",
        }
    }

    pub fn factory(self, factories: &StageFactories) -> &str {
        match self {
            Self::Source => &factories.source,
            Self::Demuxer => &factories.demuxer,
            Self::VideoQueue | Self::AudioQueue => &factories.queue,
            Self::Muxer => &factories.muxer,
            Self::Sink => &factories.sink,
        }
    }

    pub const fn queue_for(kind: StreamKind) -> Self {
        match kind {
            StreamKind::Video => Self::VideoQueue,
            StreamKind::Audio => Self::AudioQueue,
        }
    }
}

impl fmt::Display for StageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Handles to every stage of one relay, owned alongside their pipeline.
pub struct StageSet<F: Framework> {
    pub pipeline: F::Pipeline,
    pub source: F::Element,
    pub demuxer: F::Element,
    pub video_queue: F::Element,
    pub audio_queue: F::Element,
    pub muxer: F::Element,
    pub sink: F::Element,
}

impl<F: Framework> StageSet<F> {
    pub fn get(&self, role: StageRole) -> &F::Element {
        match role {
            StageRole::Source => &self.source,
            StageRole::Demuxer => &self.demuxer,
            StageRole::VideoQueue => &self.video_queue,
            StageRole::AudioQueue => &self.audio_queue,
            StageRole::Muxer => &self.muxer,
            StageRole::Sink => &self.sink,
        }
    }

    pub fn queue(&self, kind: StreamKind) -> &F::Element {
        self.get(StageRole::queue_for(kind))
    }

    /// Stages paired with their roles, in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (StageRole, &F::Element)> {
        StageRole::ALL.into_iter().map(move |role| (role, self.get(role)))
    }
}
