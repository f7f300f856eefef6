// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! GStreamer backend.
//!
//! Thin newtypes over `gstreamer` handles implementing the `relaykit-core`
//! traits. GStreamer calls pad-added handlers from its streaming threads,
//! which is exactly the contract the pad linker is written for.

use anyhow::Context;
use gstreamer as gst;
use gstreamer::glib;
use gstreamer::prelude::*;
use relaykit_core::{
    Bus, Element, Framework, FrameworkError, LinkError, Message, MessageFilter, MessageKind,
    MessageSource, MessageView, ObjectId, Pad, PadDirection, Pipeline, PropertyValue, State,
    StateChangeError, StateChangeSuccess,
};
use std::time::Duration;

/// GStreamer, initialised.
#[derive(Debug, Clone, Copy)]
pub struct GstFramework {
    _initialised: (),
}

impl GstFramework {
    /// Initialises GStreamer. Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Returns an error if the GStreamer library cannot be initialised.
    pub fn init() -> anyhow::Result<Self> {
        gst::init().context("failed to initialise GStreamer")?;
        tracing::info!(version = %gst::version_string(), "GStreamer initialised");
        Ok(Self { _initialised: () })
    }
}

impl Framework for GstFramework {
    type Pad = GstPad;
    type Element = GstElement;
    type Bus = GstBus;
    type Pipeline = GstPipeline;

    fn new_pipeline(&self, name: &str) -> Result<GstPipeline, FrameworkError> {
        Ok(GstPipeline(gst::Pipeline::with_name(name)))
    }

    fn make_element(&self, factory: &str, name: &str) -> Result<GstElement, FrameworkError> {
        gst::ElementFactory::make(factory).name(name).build().map(GstElement).map_err(|e| {
            FrameworkError::ElementCreation { factory: factory.to_string(), reason: e.to_string() }
        })
    }
}

fn object_id(object: &gst::Object) -> ObjectId {
    ObjectId(object.as_ptr() as usize as u64)
}

const fn to_gst_state(state: State) -> gst::State {
    match state {
        State::Null => gst::State::Null,
        State::Ready => gst::State::Ready,
        State::Paused => gst::State::Paused,
        State::Playing => gst::State::Playing,
    }
}

fn from_gst_state(state: gst::State) -> Option<State> {
    match state {
        gst::State::Null => Some(State::Null),
        gst::State::Ready => Some(State::Ready),
        gst::State::Paused => Some(State::Paused),
        gst::State::Playing => Some(State::Playing),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct GstPad(gst::Pad);

impl Pad for GstPad {
    fn name(&self) -> String {
        self.0.name().to_string()
    }

    fn direction(&self) -> PadDirection {
        if self.0.direction() == gst::PadDirection::Src {
            PadDirection::Src
        } else {
            PadDirection::Sink
        }
    }

    fn parent_name(&self) -> Option<String> {
        self.0.parent_element().map(|e| e.name().to_string())
    }

    fn is_linked(&self) -> bool {
        self.0.is_linked()
    }

    fn link(&self, sink: &Self) -> Result<(), LinkError> {
        let Err(e) = self.0.link(&sink.0) else {
            return Ok(());
        };
        let (src, sink_name) = (self.display_name(), sink.display_name());
        Err(match e {
            gst::PadLinkError::WasLinked => LinkError::AlreadyLinked {
                pad: if self.is_linked() { src } else { sink_name },
            },
            gst::PadLinkError::WrongDirection => LinkError::WrongDirection { src, sink: sink_name },
            gst::PadLinkError::WrongHierarchy => LinkError::WrongHierarchy { src, sink: sink_name },
            gst::PadLinkError::Noformat => LinkError::NoFormat { src, sink: sink_name },
            other => LinkError::Refused(format!("{src} -> {sink_name}: {other:?}")),
        })
    }

    fn unlink(&self, sink: &Self) -> bool {
        self.0.unlink(&sink.0).is_ok()
    }
}

#[derive(Debug, Clone)]
pub struct GstElement(gst::Element);

impl Element for GstElement {
    type Pad = GstPad;

    fn name(&self) -> String {
        self.0.name().to_string()
    }

    fn factory_name(&self) -> String {
        self.0.factory().map(|f| f.name().to_string()).unwrap_or_default()
    }

    fn set_property(&self, key: &str, value: &PropertyValue) -> Result<(), FrameworkError> {
        let fail = |reason: String| FrameworkError::Property {
            element: self.name(),
            key: key.to_string(),
            reason,
        };
        let spec = self.0.find_property(key).ok_or_else(|| fail("no such property".to_string()))?;
        if !spec.flags().contains(glib::ParamFlags::WRITABLE) {
            return Err(fail("property is not writable".to_string()));
        }

        let value = match value {
            PropertyValue::Bool(b) => b.to_value(),
            PropertyValue::Str(s) => s.to_value(),
        };
        // set_property_from_value panics on a type mismatch.
        if !value.type_().is_a(spec.value_type()) {
            return Err(fail(format!(
                "expected {}, got {}",
                spec.value_type().name(),
                value.type_().name()
            )));
        }
        self.0.set_property_from_value(key, &value);
        Ok(())
    }

    fn static_pad(&self, name: &str) -> Option<GstPad> {
        self.0.static_pad(name).map(GstPad)
    }

    fn request_pad(&self, template: &str) -> Option<GstPad> {
        self.0.request_pad_simple(template).map(GstPad)
    }

    fn release_request_pad(&self, pad: &GstPad) {
        self.0.release_request_pad(&pad.0);
    }

    fn link(&self, dest: &Self) -> Result<(), LinkError> {
        let src = self
            .static_pad("src")
            .ok_or_else(|| LinkError::MissingPad { element: self.name(), pad: "src".to_string() })?;
        let sink = dest
            .static_pad("sink")
            .ok_or_else(|| LinkError::MissingPad { element: dest.name(), pad: "sink".to_string() })?;
        src.link(&sink)
    }

    fn connect_pad_added<H>(&self, handler: H)
    where
        H: Fn(&Self, &GstPad) + Send + Sync + 'static,
    {
        self.0.connect_pad_added(move |element, pad| {
            handler(&Self(element.clone()), &GstPad(pad.clone()));
        });
    }
}

#[derive(Debug, Clone)]
pub struct GstPipeline(gst::Pipeline);

impl Pipeline for GstPipeline {
    type Element = GstElement;
    type Bus = GstBus;

    fn name(&self) -> String {
        self.0.name().to_string()
    }

    fn object_id(&self) -> ObjectId {
        object_id(self.0.upcast_ref::<gst::Object>())
    }

    fn add(&self, element: &GstElement) -> Result<(), FrameworkError> {
        self.0.add(&element.0).map_err(|e| FrameworkError::AddToPipeline {
            pipeline: self.name(),
            element: element.name(),
            reason: e.to_string(),
        })
    }

    fn set_state(&self, target: State) -> Result<StateChangeSuccess, StateChangeError> {
        match self.0.set_state(to_gst_state(target)) {
            Ok(gst::StateChangeSuccess::Async) => Ok(StateChangeSuccess::Async),
            Ok(gst::StateChangeSuccess::NoPreroll) => Ok(StateChangeSuccess::NoPreroll),
            Ok(_) => Ok(StateChangeSuccess::Success),
            Err(_) => Err(StateChangeError { element: self.name(), target }),
        }
    }

    fn current_state(&self) -> State {
        from_gst_state(self.0.current_state()).unwrap_or(State::Null)
    }

    fn bus(&self) -> Option<GstBus> {
        self.0.bus().map(GstBus)
    }
}

#[derive(Debug)]
pub struct GstBus(gst::Bus);

const fn message_type(kind: MessageKind) -> gst::MessageType {
    match kind {
        MessageKind::StateChanged => gst::MessageType::StateChanged,
        MessageKind::Error => gst::MessageType::Error,
        MessageKind::Eos => gst::MessageType::Eos,
        MessageKind::Warning => gst::MessageType::Warning,
    }
}

impl Bus for GstBus {
    fn timed_pop_filtered(
        &self,
        timeout: Option<Duration>,
        filter: &MessageFilter,
    ) -> Option<Message> {
        let types: Vec<gst::MessageType> = filter.kinds().iter().copied().map(message_type).collect();
        let timeout = timeout.map(|d| {
            gst::ClockTime::from_nseconds(u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
        });
        let msg = self.0.timed_pop_filtered(timeout, &types)?;
        Some(convert(&msg))
    }
}

fn convert(msg: &gst::Message) -> Message {
    let source =
        msg.src().map(|src| MessageSource { id: object_id(src), name: src.name().to_string() });

    let view = match msg.view() {
        gst::MessageView::Error(err) => MessageView::Error {
            message: err.error().to_string(),
            debug: err.debug().map(|d| d.to_string()),
        },
        gst::MessageView::Warning(warn) => MessageView::Warning {
            message: warn.error().to_string(),
            debug: warn.debug().map(|d| d.to_string()),
        },
        gst::MessageView::Eos(_) => MessageView::Eos,
        gst::MessageView::StateChanged(changed) => {
            match (from_gst_state(changed.old()), from_gst_state(changed.current())) {
                (Some(old), Some(new)) => MessageView::StateChanged {
                    old,
                    new,
                    pending: from_gst_state(changed.pending()),
                },
                _ => MessageView::Other(format!("{:?}", msg.type_())),
            }
        },
        _ => MessageView::Other(format!("{:?}", msg.type_())),
    };

    Message::new(source, view)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(framework: &GstFramework, factory: &str, name: &str) -> GstElement {
        match framework.make_element(factory, name) {
            Ok(element) => element,
            Err(e) => panic!("{factory} should be available: {e}"),
        }
    }

    #[test]
    fn test_element_link_reports_pad_level_failures() {
        let framework = match GstFramework::init() {
            Ok(framework) => framework,
            Err(e) => panic!("GStreamer should initialise: {e:#}"),
        };
        let pipeline = match framework.new_pipeline("links") {
            Ok(pipeline) => pipeline,
            Err(e) => panic!("pipeline: {e}"),
        };
        let src = element(&framework, "fakesrc", "src");
        let other_src = element(&framework, "fakesrc", "other_src");
        let sink = element(&framework, "fakesink", "sink");
        for e in [&src, &other_src, &sink] {
            if let Err(err) = pipeline.add(e) {
                panic!("add: {err}");
            }
        }

        assert_eq!(
            src.link(&other_src),
            Err(LinkError::MissingPad { element: "other_src".to_string(), pad: "sink".to_string() })
        );
        assert!(src.link(&sink).is_ok());
        assert_eq!(src.link(&sink), Err(LinkError::AlreadyLinked { pad: "src:src".to_string() }));
    }
}
