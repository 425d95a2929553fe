// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Console logging for the CLI.
//!
//! The filter is read from `FIELDSEL_LOG`, which follows the same conventions as `RUST_LOG`
//! (for example `FIELDSEL_LOG=field_selection=trace`). Logs go to stderr so they never mix
//! with the JSON printed on stdout.

use tracing_subscriber::{EnvFilter, filter::LevelFilter, prelude::*};

const FIELDSEL_LOG: &str = "FIELDSEL_LOG";

pub(crate) fn init() {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(std::io::stderr);
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var(FIELDSEL_LOG)
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
