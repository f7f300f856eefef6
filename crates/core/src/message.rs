// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Notifications posted by the framework on a pipeline's event channel.
//!
//! - [`Message`]: An immutable notification with its originating object
//! - [`MessageView`]: Kind-specific payload
//! - [`MessageKind`]: Filterable notification kinds
//! - [`MessageFilter`]: The set of kinds a wait call lets through

use crate::state::State;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identity of a framework object (pipeline or stage).
///
/// Only meaningful for equality: a state-changed notification belongs to the
/// pipeline itself exactly when its source id equals the pipeline's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub u64);

/// The object a notification originated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSource {
    pub id: ObjectId,
    pub name: String,
}

/// Kinds a [`MessageFilter`] can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    StateChanged,
    Error,
    Eos,
    Warning,
}

impl MessageKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StateChanged => "state-changed",
            Self::Error => "error",
            Self::Eos => "eos",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific payload of a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageView {
    /// A pipeline or stage completed one single-step transition.
    StateChanged { old: State, new: State, pending: Option<State> },
    /// Unrecoverable fault reported by a stage.
    Error { message: String, debug: Option<String> },
    /// All sinks have received end-of-stream.
    Eos,
    /// Recoverable problem reported by a stage.
    Warning { message: String, debug: Option<String> },
    /// Any notification kind not modelled above, carrying its framework name.
    Other(String),
}

impl MessageView {
    /// The filterable kind of this payload, or `None` for [`MessageView::Other`].
    pub const fn kind(&self) -> Option<MessageKind> {
        match self {
            Self::StateChanged { .. } => Some(MessageKind::StateChanged),
            Self::Error { .. } => Some(MessageKind::Error),
            Self::Eos => Some(MessageKind::Eos),
            Self::Warning { .. } => Some(MessageKind::Warning),
            Self::Other(_) => None,
        }
    }
}

/// A notification taken from the event channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub source: Option<MessageSource>,
    pub view: MessageView,
}

impl Message {
    pub const fn new(source: Option<MessageSource>, view: MessageView) -> Self {
        Self { source, view }
    }

    /// Returns true when the notification originated from the object with `id`.
    pub fn is_from(&self, id: ObjectId) -> bool {
        self.source.as_ref().is_some_and(|s| s.id == id)
    }

    /// Name of the originating object, or `"unknown"`.
    pub fn source_name(&self) -> &str {
        self.source.as_ref().map_or("unknown", |s| s.name.as_str())
    }
}

/// Set of notification kinds a wait call lets through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageFilter {
    kinds: Vec<MessageKind>,
}

impl MessageFilter {
    /// A filter admitting exactly the listed kinds (duplicates are ignored).
    pub fn new(kinds: impl IntoIterator<Item = MessageKind>) -> Self {
        let mut unique = Vec::new();
        for kind in kinds {
            if !unique.contains(&kind) {
                unique.push(kind);
            }
        }
        Self { kinds: unique }
    }

    /// The terminal-handling filter: state-changed, error and end-of-stream.
    pub fn lifecycle() -> Self {
        Self::new([MessageKind::StateChanged, MessageKind::Error, MessageKind::Eos])
    }

    pub fn kinds(&self) -> &[MessageKind] {
        &self.kinds
    }

    /// True when a notification with this payload passes the filter.
    /// [`MessageView::Other`] never passes.
    pub fn accepts(&self, view: &MessageView) -> bool {
        view.kind().is_some_and(|k| self.kinds.contains(&k))
    }
}

impl Default for MessageFilter {
    fn default() -> Self {
        Self::lifecycle()
    }
}
