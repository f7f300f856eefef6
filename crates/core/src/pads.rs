// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Pad vocabulary shared by the topology builder and the dynamic linker.
//!
//! ## Key concepts:
//! - [`PadDirection`]: Whether a pad produces (`Src`) or consumes (`Sink`) data
//! - [`PadPresence`]: How a pad comes into existence on its element
//! - [`StreamKind`]: The elementary stream kind a dynamic pad carries
//! - [`PropertyValue`]: Values accepted by element property setters

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a pad relative to its element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PadDirection {
    /// Output pad. Data leaves the element through it.
    Src,
    /// Input pad. Data enters the element through it.
    Sink,
}

/// How a pad comes to exist on an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PadPresence {
    /// Present from element creation; linkable immediately.
    Always,
    /// Appears later, once the element has inspected real data, and is
    /// announced through the pad-added notification.
    Sometimes,
    /// Created on demand through an explicit request (variable-input muxers).
    Request,
}

/// Kind of elementary stream carried by a demuxer output pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    Video,
    Audio,
}

impl StreamKind {
    pub const ALL: [Self; 2] = [Self::Video, Self::Audio];

    /// Name used both for demuxer output pads and muxer request templates.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }

    /// Classifies a pad by its advertised name.
    ///
    /// Accepts the bare kind (`video`) and numbered variants (`video_0`,
    /// `audio_0_0041`). Anything else is unrecognized.
    pub fn classify(pad_name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| {
            let prefix = kind.as_str();
            pad_name == prefix
                || pad_name.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('_'))
        })
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value assigned to an element property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Str(String),
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}
