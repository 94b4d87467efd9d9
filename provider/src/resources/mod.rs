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

//! Resource handlers.
//!
//! Every resource maps its configuration onto Redfish calls through
//! [`ManagedResource`]. Mutating operations hold the endpoint lock of
//! the server for their whole duration, reads do not lock.

pub mod bios;
pub mod boot_order;
pub mod boot_source_override;
pub mod certificate;
pub mod firmware_update;
pub mod idrac_attributes;
pub mod power;
pub mod scp;
pub mod storage_controller;
pub mod user_account;
pub mod virtual_media;

use crate::config::Validate;
use crate::config::ValidationError;
use crate::context::Server;
use crate::schema::ApplyTime;
use crate::schema::SettingsApplyTime;
use crate::Error;
use dell_redfish_core::Bmc;
use serde::Deserialize;
use serde::Serialize;
use std::future::Future;

/// Create/read/update/delete cycle of one resource type.
pub trait ManagedResource<B: Bmc> {
    /// Desired state supplied by the user.
    type Config: Validate + Send + Sync;
    /// State recorded after an operation.
    type State: Send + Sync;

    /// Resource type name, e.g. `power`.
    const NAME: &'static str;

    /// Implementations validate `config` first.
    fn create(
        server: &Server<B>,
        config: &Self::Config,
    ) -> impl Future<Output = Result<Self::State, Error<B>>> + Send;

    /// Refresh `state` from the server. `None` means the resource no
    /// longer exists and must be dropped from the state.
    fn read(
        server: &Server<B>,
        state: &Self::State,
    ) -> impl Future<Output = Result<Option<Self::State>, Error<B>>> + Send;

    fn update(
        server: &Server<B>,
        state: &Self::State,
        config: &Self::Config,
    ) -> impl Future<Output = Result<Self::State, Error<B>>> + Send;

    fn delete(
        server: &Server<B>,
        state: &Self::State,
    ) -> impl Future<Output = Result<(), Error<B>>> + Send;
}

/// Create the resource or update it when a state already exists.
///
/// # Errors
///
/// Returns [`Error::Validation`] before any remote call if the
/// configuration is rejected.
pub async fn apply<B: Bmc, R: ManagedResource<B>>(
    server: &Server<B>,
    state: Option<&R::State>,
    config: &R::Config,
) -> Result<R::State, Error<B>> {
    match state {
        Some(state) => R::update(server, state, config).await,
        None => R::create(server, config).await,
    }
}

/// Window in which settings applied at a maintenance window take effect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MaintenanceWindow {
    /// ISO 8601 start time, e.g. `2026-11-05T23:00:00-06:00`.
    pub start_time: String,
    /// Seconds.
    pub duration: u64,
}

/// A window is required exactly for the maintenance window apply times.
pub(crate) fn validate_apply_time(
    apply_time: ApplyTime,
    window: Option<&MaintenanceWindow>,
) -> Result<(), ValidationError> {
    match (apply_time.is_maintenance_window(), window) {
        (true, None) => Err(ValidationError::new(
            "maintenance_window is required for maintenance window apply times",
        )),
        (false, Some(_)) => Err(ValidationError::new(
            "maintenance_window is only valid with maintenance window apply times",
        )),
        (true, Some(window)) if window.duration == 0 => Err(ValidationError::new(
            "maintenance_window duration must be greater than zero",
        )),
        _ => Ok(()),
    }
}

pub(crate) fn settings_apply_time(
    apply_time: ApplyTime,
    window: Option<&MaintenanceWindow>,
) -> SettingsApplyTime {
    SettingsApplyTime {
        apply_time,
        maintenance_window_start_time: window.map(|w| w.start_time.clone()),
        maintenance_window_duration_in_seconds: window.map(|w| w.duration),
    }
}

pub(crate) mod defaults {
    use crate::schema::system::ResetType;

    pub const fn reset_type() -> ResetType {
        ResetType::ForceRestart
    }

    pub const fn reset_timeout() -> u64 {
        120
    }

    pub const fn job_timeout() -> u64 {
        1200
    }

    pub const fn yes() -> bool {
        true
    }
}
