// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

use super::{build, endpoints, init_tracing, last_pipeline, DESTINATION, SOURCE};
use crate::{RelayConfig, SetupError, StageRole, Topology};
use relaykit_core::{
    Element, LinkError, Pad, PadPresence, Pipeline, PropertyValue, State, StreamKind,
};
use relaykit_sim::{ElementRole, SimFramework, SimPad, SimScript};

fn peer_name(pad: &SimPad) -> Option<String> {
    pad.peer().map(|peer| peer.display_name())
}

fn pad(element: &relaykit_sim::SimElement, name: &str) -> SimPad {
    let Some(pad) = element.static_pad(name) else {
        panic!("{} has no {name} pad", element.name());
    };
    pad
}

#[test]
fn test_every_static_link_exists_after_build() {
    init_tracing();
    let framework = SimFramework::default();
    let topology = build(&framework);
    let stages = topology.stages();

    assert_eq!(peer_name(&pad(&stages.source, "src")).as_deref(), Some("demuxer:sink"));
    assert_eq!(peer_name(&pad(&stages.video_queue, "src")).as_deref(), Some("muxer:video"));
    assert_eq!(peer_name(&pad(&stages.audio_queue, "src")).as_deref(), Some("muxer:audio"));
    assert_eq!(peer_name(&pad(&stages.muxer, "src")).as_deref(), Some("sink:sink"));

    // Buffer inputs wait for the demuxer to announce its streams.
    assert!(!pad(&stages.video_queue, "sink").is_linked());
    assert!(!pad(&stages.audio_queue, "sink").is_linked());

    let requested: Vec<String> = topology.requested_pads().iter().map(Pad::name).collect();
    assert_eq!(requested, ["video", "audio"]);
    assert_eq!(last_pipeline(&framework).elements().len(), StageRole::ALL.len());
    assert_eq!(topology.pipeline().current_state(), State::Null);
}

#[test]
fn test_addresses_and_streamable_flag_are_configured() {
    let framework = SimFramework::default();
    let topology = build(&framework);
    let stages = topology.stages();

    assert_eq!(stages.source.property("location"), Some(PropertyValue::from(SOURCE)));
    assert_eq!(stages.sink.property("location"), Some(PropertyValue::from(DESTINATION)));
    assert_eq!(stages.muxer.property("streamable"), Some(PropertyValue::Bool(true)));
}

#[test]
fn test_stage_names_follow_roles() {
    let framework = SimFramework::default();
    let topology = build(&framework);

    for (role, element) in topology.stages().iter() {
        assert_eq!(element.name(), role.name());
    }
    assert_eq!(topology.stages().queue(StreamKind::Audio).name(), "audio_queue");
    assert_eq!(topology.stages().video_queue.factory_name(), "queue");
}

#[test]
fn test_unavailable_sink_factory_names_the_stage() {
    init_tracing();
    let framework = SimFramework::default().without_factory("rtmpsink");

    let Err(err) = Topology::build(&framework, &RelayConfig::default(), &endpoints()) else {
        panic!("build must fail without a sink factory");
    };
    let SetupError::ElementCreation { stage, ref factory, .. } = err else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(stage, StageRole::Sink);
    assert_eq!(factory, "rtmpsink");
    assert!(err.to_string().contains("sink stage"));
    // Everything upstream of the sink was created before the failure.
    assert_eq!(framework.elements_created(), 5);
}

#[test]
fn test_unknown_address_property_fails_before_linking() {
    let framework = SimFramework::default();
    let config = RelayConfig { location_property: "uri".to_string(), ..RelayConfig::default() };

    let Err(SetupError::Property { stage, key, .. }) =
        Topology::build(&framework, &config, &endpoints())
    else {
        panic!("unknown property must fail the build");
    };
    assert_eq!(stage, StageRole::Source);
    assert_eq!(key, "uri");

    let pipeline = last_pipeline(&framework);
    assert!(pipeline.elements().is_empty(), "nothing is added before configuration succeeds");
}

#[test]
fn test_refused_request_pad_tears_down_partial_topology() {
    init_tracing();
    let framework = SimFramework::new(SimScript::default().with_mux_templates(["video"]));

    let Err(SetupError::PadRequest { stage, template }) =
        Topology::build(&framework, &RelayConfig::default(), &endpoints())
    else {
        panic!("audio request must be refused");
    };
    assert_eq!(stage, StageRole::Muxer);
    assert_eq!(template, "audio");

    let pipeline = last_pipeline(&framework);
    assert_eq!(pipeline.current_state(), State::Null);
    let Some(muxer) = pipeline.element("muxer") else {
        panic!("muxer was added before the failure");
    };
    let Some(video_queue) = pipeline.element("video_queue") else {
        panic!("video queue was added before the failure");
    };
    // The video pad obtained before the failure was given back.
    assert!(!pad(&video_queue, "src").is_linked());
    assert!(muxer.request_pad("video").is_some());
}

#[test]
fn test_relinking_a_static_connection_is_refused() {
    let framework = SimFramework::default();
    let topology = build(&framework);
    let stages = topology.stages();

    let Err(err) = stages.source.link(&stages.demuxer) else {
        panic!("second link must fail");
    };
    assert_eq!(err, LinkError::AlreadyLinked { pad: "source:src".to_string() });
    assert_eq!(peer_name(&pad(&stages.source, "src")).as_deref(), Some("demuxer:sink"));
}

#[test]
fn test_teardown_releases_request_pads_once() {
    let framework = SimFramework::default();
    let mut topology = build(&framework);
    let muxer = topology.stages().muxer.clone();
    let video_queue = topology.stages().video_queue.clone();

    topology.teardown();
    assert!(topology.requested_pads().is_empty());
    assert!(!pad(&video_queue, "src").is_linked());
    assert!(muxer.request_pad("video").is_some(), "released template is available again");

    topology.teardown();
    assert_eq!(topology.pipeline().current_state(), State::Null);
}

#[test]
fn test_failed_static_link_tears_down_the_build() {
    init_tracing();
    // A sink stage without an input pad.
    let framework = SimFramework::default()
        .without_factory("rtmpsink")
        .with_factory("rtmpsink", ElementRole::Source);

    let Err(err) = Topology::build(&framework, &RelayConfig::default(), &endpoints()) else {
        panic!("linking into a sink without input must fail");
    };
    let SetupError::Link { ref from, ref to, ref source } = err else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(from, "muxer:src");
    assert_eq!(to, "sink:sink");
    assert_eq!(
        source,
        &LinkError::MissingPad { element: "sink".to_string(), pad: "sink".to_string() }
    );

    let pipeline = last_pipeline(&framework);
    assert_eq!(pipeline.current_state(), State::Null);
    let Some(muxer) = pipeline.element("muxer") else {
        panic!("muxer was added before the failure");
    };
    assert!(muxer.pads().iter().all(|p| p.presence() != PadPresence::Request));
    let Some(video_queue) = pipeline.element("video_queue") else {
        panic!("video queue was added before the failure");
    };
    assert!(!pad(&video_queue, "src").is_linked());
}

#[test]
fn test_queue_without_output_reports_missing_pad() {
    let framework =
        SimFramework::default().without_factory("queue").with_factory("queue", ElementRole::Sink);

    let Err(SetupError::MissingPad { stage, pad }) =
        Topology::build(&framework, &RelayConfig::default(), &endpoints())
    else {
        panic!("a queue without src pad must fail the build");
    };
    assert_eq!(stage, StageRole::VideoQueue);
    assert_eq!(pad, "src");
    assert_eq!(last_pipeline(&framework).current_state(), State::Null);
}
