// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Traits over the external media framework.
//!
//! The relay never moves media itself. It creates stages, links their pads,
//! requests state changes and reads notifications, all through these traits:
//! - [`Framework`]: Factory for pipelines and stages
//! - [`Element`]: A processing stage with pads and properties
//! - [`Pad`]: A directional connection point on a stage
//! - [`Pipeline`]: The container owning every stage, with its lifecycle state
//! - [`Bus`]: The pipeline's notification channel
//!
//! Handles are cheap to clone and shared across threads: the framework calls
//! pad-added handlers from its own streaming threads while the control thread
//! is blocked on the bus.

use crate::error::{FrameworkError, LinkError, StateChangeError};
use crate::message::{Message, MessageFilter, ObjectId};
use crate::pads::{PadDirection, PropertyValue};
use crate::state::{State, StateChangeSuccess};
use std::time::Duration;

/// Entry point into a media framework implementation.
pub trait Framework: Send + Sync {
    type Pad: Pad;
    type Element: Element<Pad = Self::Pad>;
    type Bus: Bus;
    type Pipeline: Pipeline<Element = Self::Element, Bus = Self::Bus>;

    /// Creates an empty pipeline in the `NULL` state.
    ///
    /// # Errors
    ///
    /// Returns [`FrameworkError::PipelineCreation`] if the container cannot be built.
    fn new_pipeline(&self, name: &str) -> Result<Self::Pipeline, FrameworkError>;

    /// Creates a stage from a named factory.
    ///
    /// # Errors
    ///
    /// Returns [`FrameworkError::ElementCreation`] if the factory is unknown or
    /// refuses to build.
    fn make_element(&self, factory: &str, name: &str) -> Result<Self::Element, FrameworkError>;
}

/// A directional connection point belonging to exactly one stage.
pub trait Pad: Clone + Send + Sync + 'static {
    fn name(&self) -> String;

    fn direction(&self) -> PadDirection;

    /// Name of the owning stage, if the pad is still parented.
    fn parent_name(&self) -> Option<String>;

    fn is_linked(&self) -> bool;

    /// Links this output pad to `sink`.
    ///
    /// # Errors
    ///
    /// Fails with [`LinkError::AlreadyLinked`] if either pad already has a
    /// peer (the existing link is left untouched), or
    /// [`LinkError::WrongDirection`] if `self` is not an output or `sink` is
    /// not an input.
    fn link(&self, sink: &Self) -> Result<(), LinkError>;

    /// Removes the link between this output pad and `sink`. Returns false if
    /// they were not linked to each other.
    fn unlink(&self, sink: &Self) -> bool;

    /// `element:pad`, used in log lines and error messages.
    fn display_name(&self) -> String {
        format!("{}:{}", self.parent_name().unwrap_or_else(|| "?".to_string()), self.name())
    }
}

/// A named processing stage.
pub trait Element: Clone + Send + Sync + 'static {
    type Pad: Pad;

    fn name(&self) -> String;

    fn factory_name(&self) -> String;

    /// # Errors
    ///
    /// Returns [`FrameworkError::Property`] if the key is unknown or the value
    /// has the wrong type.
    fn set_property(&self, key: &str, value: &PropertyValue) -> Result<(), FrameworkError>;

    /// A pad that exists for the whole life of the stage.
    fn static_pad(&self, name: &str) -> Option<Self::Pad>;

    /// Requests a new pad from a template on a stage with a variable pad
    /// count. `None` means the template is unsupported or the stage is
    /// saturated.
    fn request_pad(&self, template: &str) -> Option<Self::Pad>;

    /// Gives back a pad obtained through [`Element::request_pad`].
    fn release_request_pad(&self, pad: &Self::Pad);

    /// Links this stage's always-present output to `dest`'s always-present input.
    ///
    /// # Errors
    ///
    /// Returns a [`LinkError`] if either pad is missing or the pad link fails.
    fn link(&self, dest: &Self) -> Result<(), LinkError>;

    /// Registers a handler for pads that appear at run time. The handler may
    /// run on any framework thread, concurrently with the control thread.
    fn connect_pad_added<H>(&self, handler: H)
    where
        H: Fn(&Self, &Self::Pad) + Send + Sync + 'static;
}

/// The container owning every stage of a run.
pub trait Pipeline: Send + Sync {
    type Element: Element;
    type Bus: Bus;

    fn name(&self) -> String;

    /// Identity compared against notification sources.
    fn object_id(&self) -> ObjectId;

    /// # Errors
    ///
    /// Returns [`FrameworkError::AddToPipeline`] if the stage cannot be adopted.
    fn add(&self, element: &Self::Element) -> Result<(), FrameworkError>;

    /// Requests a transition to `target`. Intermediate transitions are
    /// performed by the framework and reported one notification each.
    ///
    /// # Errors
    ///
    /// Returns [`StateChangeError`] when the request fails immediately.
    fn set_state(&self, target: State) -> Result<StateChangeSuccess, StateChangeError>;

    fn current_state(&self) -> State;

    fn bus(&self) -> Option<Self::Bus>;
}

/// Filterable notification channel of a pipeline.
pub trait Bus: Send {
    /// Waits for the next notification whose kind passes `filter`, dropping
    /// the others. `timeout` of `None` waits without bound.
    ///
    /// Returns `None` when the timeout elapsed or the channel was shut down.
    fn timed_pop_filtered(&self, timeout: Option<Duration>, filter: &MessageFilter)
        -> Option<Message>;
}
