// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! End-to-end runs of the `relaykit` entry point against the simulator.

use relaykit_cli::{main_with, RelayExit};
use relaykit_core::{Pipeline, State};
use relaykit_sim::{SimFramework, SimScript};
use std::cell::Cell;
use std::time::Duration;

const ARGS: [&str; 3] =
    ["relaykit", "rtmp://ingest.example/live/in", "rtmp://egress.example/app/out"];

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

#[test]
fn test_healthy_stream_relays_both_kinds_and_exits_zero() {
    init_tracing();
    let framework = SimFramework::default();

    let exit = main_with(ARGS, || Ok(framework.clone()));

    assert_eq!(exit, RelayExit::Success);
    assert_eq!(exit.code(), 0);
    let Some(pipeline) = framework.last_pipeline() else {
        panic!("no pipeline created");
    };
    let expected = framework.script().buffers_per_stream;
    assert_eq!(pipeline.delivered("video").buffers, expected);
    assert_eq!(pipeline.delivered("audio").buffers, expected);
    assert_eq!(pipeline.current_state(), State::Null);
}

#[test]
fn test_missing_arguments_print_usage_and_create_nothing() {
    for args in [&ARGS[..1], &ARGS[..2]] {
        let framework = SimFramework::default();
        let backend_started = Cell::new(false);

        let exit = main_with(args.iter().copied(), || {
            backend_started.set(true);
            Ok(framework.clone())
        });

        assert_eq!(exit, RelayExit::Usage);
        assert_eq!(exit.code(), 2);
        assert!(!backend_started.get());
        assert_eq!(framework.elements_created(), 0);
    }
}

#[test]
fn test_extra_argument_is_a_usage_error() {
    let args = [ARGS[0], ARGS[1], ARGS[2], "rtmp://third.example/live"];
    let exit = main_with(args, || Ok(SimFramework::default()));
    assert_eq!(exit, RelayExit::Usage);
}

#[test]
fn test_unavailable_sink_fails_setup_before_playing() {
    init_tracing();
    let framework = SimFramework::default().without_factory("rtmpsink");

    let exit = main_with(ARGS, || Ok(framework.clone()));

    assert_eq!(exit, RelayExit::SetupFailed);
    assert_eq!(exit.code(), 1);
    assert_eq!(framework.elements_created(), 5);
    let Some(pipeline) = framework.last_pipeline() else {
        panic!("pipeline should exist before stage creation");
    };
    assert_eq!(pipeline.current_state(), State::Null);
    assert!(!pipeline.is_streaming());
}

#[test]
fn test_runtime_error_exits_nonzero() {
    init_tracing();
    let framework = SimFramework::new(
        SimScript::default()
            .with_ending_delay(Duration::from_millis(20))
            .ending_with_error("source", "Could not open resource for reading.", None),
    );

    let exit = main_with(ARGS, || Ok(framework.clone()));

    assert_eq!(exit, RelayExit::RuntimeError);
    assert_eq!(exit.code(), 1);
}

#[test]
fn test_refused_playing_exits_nonzero() {
    let framework =
        SimFramework::new(SimScript::default().failing_state_change_to(State::Playing));

    let exit = main_with(ARGS, || Ok(framework.clone()));

    assert_eq!(exit, RelayExit::StateChangeFailed);
    assert_eq!(exit.code(), 1);
}

#[test]
fn test_backend_failure_exits_nonzero() {
    let exit = main_with(ARGS, || -> anyhow::Result<SimFramework> {
        Err(anyhow::anyhow!("no media framework"))
    });
    assert_eq!(exit, RelayExit::BackendUnavailable);
    assert!(!exit.is_success());
}

#[test]
fn test_invalid_log_level_is_a_usage_error_without_backend() {
    let backend_started = Cell::new(false);
    let args = [ARGS[0], "--log-level", "loud", ARGS[1], ARGS[2]];

    let exit = main_with(args, || {
        backend_started.set(true);
        Ok(SimFramework::default())
    });

    assert_eq!(exit, RelayExit::Usage);
    assert!(!backend_started.get());
}
