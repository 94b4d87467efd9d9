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

//! BIOS attributes.

use crate::config::Validate;
use crate::config::ValidationError;
use crate::context::Server;
use crate::resources::defaults;
use crate::resources::settings_apply_time;
use crate::resources::validate_apply_time;
use crate::resources::MaintenanceWindow;
use crate::resources::ManagedResource;
use crate::schema::bios::Bios as BiosSchema;
use crate::schema::bios::BiosSettingsUpdate;
use crate::schema::system::ResetType;
use crate::schema::ApplyTime;
use crate::Error;
use dell_redfish_core::Bmc;
use dell_redfish_core::ODataId;
use dell_redfish_core::TaskLocation;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use tracing::info;

fn default_apply_time() -> ApplyTime {
    ApplyTime::OnReset
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Attribute name to value, e.g. `NumLock = "On"`.
    pub attributes: BTreeMap<String, JsonValue>,
    #[serde(default = "default_apply_time")]
    pub settings_apply_time: ApplyTime,
    pub maintenance_window: Option<MaintenanceWindow>,
    #[serde(default = "defaults::reset_type")]
    pub reset_type: ResetType,
    #[serde(default = "defaults::job_timeout")]
    pub bios_job_timeout: u64,
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.attributes.is_empty() {
            return Err(ValidationError::new("attributes must not be empty"));
        }
        validate_apply_time(self.settings_apply_time, self.maintenance_window.as_ref())?;
        if self.bios_job_timeout == 0 {
            return Err(ValidationError::new(
                "bios_job_timeout must be greater than zero",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct State {
    /// Current values of the managed attributes.
    pub attributes: BTreeMap<String, JsonValue>,
    pub settings_apply_time: ApplyTime,
    pub job: Option<ODataId>,
}

/// Attributes whose current value differs from the requested one.
///
/// # Errors
///
/// Returns the first requested attribute the BIOS does not have.
pub fn changed_attributes(
    current: &Map<String, JsonValue>,
    wanted: &BTreeMap<String, JsonValue>,
) -> Result<Map<String, JsonValue>, String> {
    let mut changed = Map::new();
    for (name, value) in wanted {
        match current.get(name) {
            None => return Err(name.clone()),
            Some(v) if v == value => {}
            Some(_) => {
                changed.insert(name.clone(), value.clone());
            }
        }
    }
    Ok(changed)
}

fn managed<'a>(
    current: &Map<String, JsonValue>,
    keys: impl Iterator<Item = &'a String>,
) -> BTreeMap<String, JsonValue> {
    keys.filter_map(|key| current.get(key).map(|v| (key.clone(), v.clone())))
        .collect()
}

pub struct Bios;

impl Bios {
    async fn converge<B: Bmc>(server: &Server<B>, config: &Config) -> Result<State, Error<B>> {
        config.validate()?;
        let settings = server.job_settings(config.bios_job_timeout)?;
        let _guard = server.lock().await;
        let id = server.system_id().child("Bios");
        let bios = server.get::<BiosSchema>(&id).await?;
        let changed = changed_attributes(&bios.attributes, &config.attributes)
            .map_err(Error::AttributeNotFound)?;
        if changed.is_empty() {
            info!("BIOS attributes already set");
            return Ok(State {
                attributes: managed(&bios.attributes, config.attributes.keys()),
                settings_apply_time: config.settings_apply_time,
                job: None,
            });
        }
        info!(count = changed.len(), "updating BIOS attributes");
        let location: TaskLocation = server
            .bmc()
            .update(
                &id.child("Settings"),
                None,
                &BiosSettingsUpdate {
                    apply_time: settings_apply_time(
                        config.settings_apply_time,
                        config.maintenance_window.as_ref(),
                    ),
                    attributes: changed,
                },
            )
            .await
            .map_err(Error::Bmc)?;
        if config.settings_apply_time.is_maintenance_window() {
            info!(job = ?location.location, "BIOS settings scheduled for maintenance window");
            return Ok(State {
                attributes: managed(&bios.attributes, config.attributes.keys()),
                settings_apply_time: config.settings_apply_time,
                job: location.location,
            });
        }
        // Dell BIOS settings only take effect on the next boot.
        server.reboot_to_apply(config.reset_type).await?;
        let job = server.wait_for_job(&location, "BIOS job", settings).await?;
        let bios = server.get::<BiosSchema>(&id).await?;
        Ok(State {
            attributes: managed(&bios.attributes, config.attributes.keys()),
            settings_apply_time: config.settings_apply_time,
            job: Some(job),
        })
    }
}

impl<B: Bmc> ManagedResource<B> for Bios {
    type Config = Config;
    type State = State;

    const NAME: &'static str = "bios";

    #[tracing::instrument(skip_all, fields(endpoint = %server.key()))]
    async fn create(server: &Server<B>, config: &Config) -> Result<State, Error<B>> {
        Self::converge(server, config).await
    }

    async fn read(server: &Server<B>, state: &State) -> Result<Option<State>, Error<B>> {
        let bios = server
            .find::<BiosSchema>(&server.system_id().child("Bios"))
            .await?;
        Ok(bios.map(|bios| State {
            attributes: managed(&bios.attributes, state.attributes.keys()),
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

    async fn delete(_server: &Server<B>, _state: &State) -> Result<(), Error<B>> {
        Ok(())
    }
}
