// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! relaykit Core - Abstractions over the external media framework.
//!
//! The relay orchestrates stages supplied by a media framework (GStreamer in
//! production, an in-process simulator in tests). This crate defines what the
//! orchestration needs from such a framework:
//!
//! ## Core Modules
//!
//! - [`framework`]: Framework, Element, Pad, Pipeline and Bus traits
//! - [`pads`]: Pad directions, stream kinds and property values
//! - [`state`]: Lifecycle states and state-change outcomes
//! - [`message`]: Notifications, notification kinds and filters
//! - [`error`]: Error types and handling

pub mod error;
pub mod framework;
pub mod message;
pub mod pads;
pub mod state;

// Error handling
pub use error::{FrameworkError, LinkError, StateChangeError};

// Framework abstractions
pub use framework::{Bus, Element, Framework, Pad, Pipeline};

// Notifications
pub use message::{Message, MessageFilter, MessageKind, MessageSource, MessageView, ObjectId};

// Pads and stream kinds
pub use pads::{PadDirection, PadPresence, PropertyValue, StreamKind};

// State tracking
pub use state::{State, StateChangeSuccess};
