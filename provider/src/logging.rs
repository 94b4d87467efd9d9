// SPDX-FileCopyrightText: Copyright (c) 2025 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Log setup for the provider process.
//!
//! Stdout belongs to the plugin host, so logs go to stderr.

use crate::config::ValidationError;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry;

/// Install a compact fmt subscriber filtered at `level`. `RUST_LOG`
/// directives refine the filter.
///
/// Returns `false` if a global subscriber was already installed.
///
/// # Errors
///
/// Returns an error if `level` is not a tracing level.
pub fn init(level: &str) -> Result<bool, ValidationError> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(parse_level(level)?.into())
        .from_env_lossy();
    Ok(registry()
        .with(fmt::Layer::default().compact().with_writer(std::io::stderr))
        .with(env_filter)
        .try_init()
        .is_ok())
}

fn parse_level(level: &str) -> Result<LevelFilter, ValidationError> {
    level
        .parse()
        .map_err(|_| ValidationError::new(format!("unknown log level: {level}")))
}
