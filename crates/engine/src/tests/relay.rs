// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

use super::{endpoints, init_tracing, last_pipeline};
use crate::{Endpoints, Relay, RelayConfig, RelayError, SetupError, StageRole, Termination};
use relaykit_core::{MessageFilter, MessageKind, Pipeline, State, StreamKind};
use relaykit_sim::{ElementRole, SimFramework, SimScript};

#[test]
fn test_relay_links_both_streams_and_ends_on_eos() {
    init_tracing();
    let relay = Relay::with_defaults(SimFramework::default());

    let report = match relay.run(&endpoints()) {
        Ok(report) => report,
        Err(e) => panic!("relay should succeed: {e}"),
    };

    assert!(report.is_success());
    assert_eq!(report.linked, [StreamKind::Video, StreamKind::Audio]);
    assert_eq!(report.transitions.len(), 3);

    let pipeline = last_pipeline(relay.framework());
    assert_eq!(pipeline.current_state(), State::Null, "pipeline is torn down after the run");
    assert!(!pipeline.is_streaming());
}

#[test]
fn test_video_only_source_still_relays_video() {
    init_tracing();
    let framework = SimFramework::new(SimScript::default().with_streams(["video"]).with_buffers(4));
    let relay = Relay::with_defaults(framework);

    let report = match relay.run(&endpoints()) {
        Ok(report) => report,
        Err(e) => panic!("missing audio must not be fatal: {e}"),
    };

    assert_eq!(report.termination, Termination::EndOfStream);
    assert_eq!(report.linked, [StreamKind::Video]);
    assert!(report.transitions.iter().any(|t| t.new == State::Playing));

    let pipeline = last_pipeline(relay.framework());
    assert_eq!(pipeline.delivered("video").buffers, 4);
    assert_eq!(pipeline.delivered("audio").buffers, 0);
}

#[test]
fn test_unrecognized_stream_does_not_disturb_the_run() {
    let framework =
        SimFramework::new(SimScript::default().with_streams(["video", "subtitle", "audio"]));
    let relay = Relay::with_defaults(framework);

    let Ok(report) = relay.run(&endpoints()) else {
        panic!("relay should succeed");
    };
    assert!(report.is_success());
    assert_eq!(report.linked, [StreamKind::Video, StreamKind::Audio]);
    assert_eq!(last_pipeline(relay.framework()).delivered("subtitle").buffers, 0);
}

#[test]
fn test_setup_failure_never_starts_the_pipeline() {
    let relay = Relay::with_defaults(SimFramework::default().without_factory("flvmux"));

    let Err(RelayError::Setup(SetupError::ElementCreation { stage, .. })) =
        relay.run(&endpoints())
    else {
        panic!("missing muxer factory must fail setup");
    };
    assert_eq!(stage, StageRole::Muxer);

    let pipeline = last_pipeline(relay.framework());
    assert_eq!(pipeline.current_state(), State::Null);
    assert!(!pipeline.is_streaming());
}

#[test]
fn test_empty_address_is_a_setup_error() {
    let relay = Relay::with_defaults(SimFramework::default());

    let Err(err) = relay.run(&Endpoints::new("rtmp://in/live", "")) else {
        panic!("empty destination must be rejected");
    };
    assert!(err.is_setup());
    assert_eq!(relay.framework().elements_created(), 0);
}

#[test]
fn test_refused_state_change_tears_down() {
    let framework =
        SimFramework::new(SimScript::default().failing_state_change_to(State::Playing));
    let relay = Relay::with_defaults(framework);

    let Err(RelayError::StateChange(err)) = relay.run(&endpoints()) else {
        panic!("refused PLAYING must be reported");
    };
    assert_eq!(err.target, State::Playing);

    let pipeline = last_pipeline(relay.framework());
    assert_eq!(pipeline.current_state(), State::Null);
    let Some(muxer) = pipeline.element("muxer") else {
        panic!("muxer missing");
    };
    assert!(muxer.pads().iter().all(|p| p.presence() != relaykit_core::PadPresence::Request));
}

#[test]
fn test_runtime_error_is_reported_not_returned() {
    let framework = SimFramework::new(
        SimScript::default().ending_with_error("sink", "Could not connect to destination", None),
    );
    let relay = Relay::with_defaults(framework);

    let report = match relay.run(&endpoints()) {
        Ok(report) => report,
        Err(e) => panic!("runtime errors end the loop, not the setup: {e}"),
    };
    let Termination::Error(error) = &report.termination else {
        panic!("expected error termination");
    };
    assert_eq!(error.element, "sink");
    assert_eq!(error.diagnostic(), "none");
    assert!(!report.is_success());
}

#[test]
fn test_state_changed_only_filter_is_refused_before_building() {
    let config = RelayConfig {
        bus_filter: MessageFilter::new([MessageKind::StateChanged]),
        ..RelayConfig::default()
    };
    let relay = Relay::new(SimFramework::default(), config);

    let Err(RelayError::Setup(SetupError::BusFilter { missing })) = relay.run(&endpoints()) else {
        panic!("a filter that drops terminal notifications must be refused");
    };
    assert_eq!(missing, MessageKind::Error);
    assert!(relay.framework().pipelines().is_empty());
    assert_eq!(relay.framework().elements_created(), 0);
}

#[test]
fn test_static_link_failure_never_starts_the_pipeline() {
    init_tracing();
    let framework = SimFramework::default()
        .without_factory("rtmpsink")
        .with_factory("rtmpsink", ElementRole::Source);
    let relay = Relay::with_defaults(framework);

    let Err(RelayError::Setup(SetupError::Link { from, to, .. })) = relay.run(&endpoints()) else {
        panic!("a sink without input must fail setup");
    };
    assert_eq!((from.as_str(), to.as_str()), ("muxer:src", "sink:sink"));

    let pipeline = last_pipeline(relay.framework());
    assert_eq!(pipeline.current_state(), State::Null);
    assert!(!pipeline.is_streaming());
    assert_eq!(pipeline.delivered("video").buffers, 0);
}
