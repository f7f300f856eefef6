// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Unit tests for the engine crate, driven by the simulated framework.

mod relay;
mod topology;

use crate::{Endpoints, RelayConfig, Topology};
use relaykit_sim::{SimFramework, SimPipeline};

const SOURCE: &str = "rtmp://ingest.example/live/in";
const DESTINATION: &str = "rtmp://egress.example/app/out";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn endpoints() -> Endpoints {
    Endpoints::new(SOURCE, DESTINATION)
}

fn build(framework: &SimFramework) -> Topology<SimFramework> {
    match Topology::build(framework, &RelayConfig::default(), &endpoints()) {
        Ok(topology) => topology,
        Err(e) => panic!("topology should build: {e}"),
    }
}

fn last_pipeline(framework: &SimFramework) -> SimPipeline {
    let Some(pipeline) = framework.last_pipeline() else {
        panic!("no pipeline was created");
    };
    pipeline
}
