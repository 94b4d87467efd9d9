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

//! Host power control.

use crate::config::Validate;
use crate::config::ValidationError;
use crate::context::Server;
use crate::poll::PollSettings;
use crate::resources::ManagedResource;
use crate::schema::system::ComputerSystem;
use crate::schema::system::PowerState;
use crate::schema::system::ResetType;
use crate::Error;
use dell_redfish_core::Bmc;
use serde::Deserialize;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub desired_power_action: ResetType,
    /// Seconds to wait for the power state.
    #[serde(default = "default_maximum_wait_time")]
    pub maximum_wait_time: u64,
    /// Seconds between power state checks.
    #[serde(default = "default_check_interval")]
    pub check_interval: u64,
}

const fn default_maximum_wait_time() -> u64 {
    120
}

const fn default_check_interval() -> u64 {
    10
}

impl Config {
    #[must_use]
    pub const fn new(desired_power_action: ResetType) -> Self {
        Self {
            desired_power_action,
            maximum_wait_time: default_maximum_wait_time(),
            check_interval: default_check_interval(),
        }
    }

    fn poll_settings(&self) -> Result<PollSettings, ValidationError> {
        Ok(PollSettings::from_secs(
            self.check_interval,
            self.maximum_wait_time,
        )?)
    }
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ValidationError> {
        self.poll_settings().map(|_| ())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct State {
    pub desired_power_action: ResetType,
    pub maximum_wait_time: u64,
    pub check_interval: u64,
    pub power_state: Option<PowerState>,
}

/// Reset to issue and the power state it leads to, `None` if the host
/// is already where the action would bring it.
#[must_use]
pub fn plan(action: ResetType, current: Option<PowerState>) -> Option<(ResetType, PowerState)> {
    let is_on = matches!(current, Some(PowerState::On | PowerState::PoweringOn));
    match action {
        ResetType::On | ResetType::ForceOn if is_on => None,
        ResetType::On | ResetType::ForceOn => Some((action, PowerState::On)),
        ResetType::ForceOff | ResetType::GracefulShutdown if !is_on => None,
        ResetType::ForceOff | ResetType::GracefulShutdown => Some((action, PowerState::Off)),
        ResetType::PushPowerButton if is_on => Some((action, PowerState::Off)),
        ResetType::PushPowerButton => Some((action, PowerState::On)),
        // Restarting a host that is off means powering it on.
        _ if !is_on => Some((ResetType::On, PowerState::On)),
        _ => Some((action, PowerState::On)),
    }
}

pub struct Power;

impl Power {
    async fn converge<B: Bmc>(server: &Server<B>, config: &Config) -> Result<State, Error<B>> {
        config.validate()?;
        let settings = config.poll_settings()?;
        let _guard = server.lock().await;
        let system = server.system().await?;
        let power_state = match plan(config.desired_power_action, system.power_state) {
            Some((reset_type, expected)) => {
                server.reset_with(&system, reset_type).await?;
                server.wait_for_reset(reset_type, expected, settings).await?;
                info!(power_state = ?expected, "power state reached");
                Some(expected)
            }
            None => {
                info!(
                    action = ?config.desired_power_action,
                    power_state = ?system.power_state,
                    "host already in requested power state"
                );
                system.power_state
            }
        };
        Ok(State {
            desired_power_action: config.desired_power_action,
            maximum_wait_time: config.maximum_wait_time,
            check_interval: config.check_interval,
            power_state,
        })
    }
}

impl<B: Bmc> ManagedResource<B> for Power {
    type Config = Config;
    type State = State;

    const NAME: &'static str = "power";

    #[tracing::instrument(skip_all, fields(endpoint = %server.key()))]
    async fn create(server: &Server<B>, config: &Config) -> Result<State, Error<B>> {
        Self::converge(server, config).await
    }

    async fn read(server: &Server<B>, state: &State) -> Result<Option<State>, Error<B>> {
        let system = server
            .find::<ComputerSystem>(&server.system_id())
            .await?;
        Ok(system.map(|system| State {
            power_state: system.power_state,
            ..state.clone()
        }))
    }

    #[tracing::instrument(skip_all, fields(endpoint = %server.key()))]
    async fn update(
        server: &Server<B>,
        _state: &State,
        config: &Config,
    ) -> Result<State, Error<B>> {
        Self::converge(server, config).await
    }

    async fn delete(server: &Server<B>, _state: &State) -> Result<(), Error<B>> {
        info!(endpoint = %server.key(), "power resource removed, host left as is");
        Ok(())
    }
}
