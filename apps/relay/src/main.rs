// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::process::ExitCode;

#[cfg(feature = "gstreamer")]
fn main() -> ExitCode {
    relaykit_cli::main_with(std::env::args_os(), relaykit_cli::gst::GstFramework::init).into()
}

#[cfg(not(feature = "gstreamer"))]
fn main() -> ExitCode {
    relaykit_cli::main_with(std::env::args_os(), || {
        tracing::warn!(
            "Built without the gstreamer feature; relaying through the in-process simulator"
        );
        Ok(relaykit_sim::SimFramework::default())
    })
    .into()
}
