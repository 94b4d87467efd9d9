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

//! RAID controller settings and controller security keys.

use crate::config::Validate;
use crate::config::ValidationError;
use crate::context::Server;
use crate::resources::defaults;
use crate::resources::settings_apply_time;
use crate::resources::validate_apply_time;
use crate::resources::MaintenanceWindow;
use crate::resources::ManagedResource;
use crate::schema::dell::raid_service;
use crate::schema::dell::ReKeyRequest;
use crate::schema::dell::RemoveControllerKeyRequest;
use crate::schema::dell::SetControllerKeyRequest;
use crate::schema::storage::ControllerOem;
use crate::schema::storage::ControllerRates;
use crate::schema::storage::DellControllerOem;
use crate::schema::storage::StorageController as StorageControllerSchema;
use crate::schema::storage::StorageControllerSettingsUpdate;
use crate::schema::system::ResetType;
use crate::schema::ApplyTime;
use crate::Error;
use dell_redfish_core::Action;
use dell_redfish_core::ActionTarget;
use dell_redfish_core::Bmc;
use dell_redfish_core::ODataId;
use dell_redfish_core::TaskLocation;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Rates {
    pub consistency_check_rate_percent: Option<u32>,
    pub rebuild_rate_percent: Option<u32>,
}

impl From<&Rates> for ControllerRates {
    fn from(rates: &Rates) -> Self {
        Self {
            consistency_check_rate_percent: rates.consistency_check_rate_percent,
            rebuild_rate_percent: rates.rebuild_rate_percent,
        }
    }
}

impl From<&ControllerRates> for Rates {
    fn from(rates: &ControllerRates) -> Self {
        Self {
            consistency_check_rate_percent: rates.consistency_check_rate_percent,
            rebuild_rate_percent: rates.rebuild_rate_percent,
        }
    }
}

/// Controller properties to change.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ControllerSettings {
    pub controller_rates: Option<Rates>,
    /// `DellStorageController` OEM properties, e.g. `ControllerMode`.
    #[serde(default)]
    pub dell_attributes: BTreeMap<String, JsonValue>,
}

/// Controller security key operation run through the Dell RAID service.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", deny_unknown_fields)]
pub enum SecurityAction {
    SetControllerKey {
        key_id: String,
        key: String,
    },
    ReKey {
        key_id: String,
        old_key: String,
        new_key: String,
        #[serde(default = "default_key_mode")]
        mode: String,
    },
    RemoveControllerKey,
}

fn default_key_mode() -> String {
    "LKM".into()
}

impl SecurityAction {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SetControllerKey { .. } => "SetControllerKey",
            Self::ReKey { .. } => "ReKey",
            Self::RemoveControllerKey => "RemoveControllerKey",
        }
    }
}

impl Debug for SecurityAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

/// Change applied to the controller. Exactly one is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerChange {
    Settings(ControllerSettings),
    Security(SecurityAction),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    storage_id: String,
    controller_id: String,
    #[serde(default)]
    apply_time: ApplyTime,
    maintenance_window: Option<MaintenanceWindow>,
    #[serde(default = "defaults::reset_type")]
    reset_type: ResetType,
    #[serde(default = "defaults::reset_timeout")]
    reset_timeout: u64,
    #[serde(default = "defaults::job_timeout")]
    job_timeout: u64,
    storage_controller: Option<ControllerSettings>,
    security: Option<SecurityAction>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawConfig")]
pub struct Config {
    /// Storage FQDD, e.g. `RAID.Integrated.1-1`.
    pub storage_id: String,
    pub controller_id: String,
    pub apply_time: ApplyTime,
    pub maintenance_window: Option<MaintenanceWindow>,
    pub reset_type: ResetType,
    pub reset_timeout: u64,
    pub job_timeout: u64,
    pub change: ControllerChange,
}

impl TryFrom<RawConfig> for Config {
    type Error = ValidationError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let change = match (raw.storage_controller, raw.security) {
            (Some(settings), None) => ControllerChange::Settings(settings),
            (None, Some(security)) => ControllerChange::Security(security),
            (Some(_), Some(_)) => {
                return Err(ValidationError::conflicting("storage_controller", "security"))
            }
            (None, None) => {
                return Err(ValidationError::missing_one_of(
                    "storage_controller",
                    "security",
                ))
            }
        };
        Ok(Self {
            storage_id: raw.storage_id,
            controller_id: raw.controller_id,
            apply_time: raw.apply_time,
            maintenance_window: raw.maintenance_window,
            reset_type: raw.reset_type,
            reset_timeout: raw.reset_timeout,
            job_timeout: raw.job_timeout,
            change,
        })
    }
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.storage_id.is_empty() || self.controller_id.is_empty() {
            return Err(ValidationError::new(
                "storage_id and controller_id are required",
            ));
        }
        validate_apply_time(self.apply_time, self.maintenance_window.as_ref())?;
        match &self.change {
            ControllerChange::Settings(settings) => {
                let rates = settings.controller_rates.clone().unwrap_or_default();
                let out_of_range = [
                    rates.consistency_check_rate_percent,
                    rates.rebuild_rate_percent,
                ]
                .into_iter()
                .flatten()
                .any(|v| v > 100);
                if out_of_range {
                    return Err(ValidationError::new("controller rates must be 0 to 100"));
                }
                if settings.controller_rates.is_none() && settings.dell_attributes.is_empty() {
                    return Err(ValidationError::new(
                        "storage_controller must change at least one property",
                    ));
                }
            }
            ControllerChange::Security(SecurityAction::SetControllerKey { key_id, key }) => {
                if key_id.is_empty() || key.is_empty() {
                    return Err(ValidationError::new("key_id and key are required"));
                }
            }
            ControllerChange::Security(SecurityAction::ReKey {
                key_id,
                old_key,
                new_key,
                ..
            }) => {
                if key_id.is_empty() || old_key.is_empty() || new_key.is_empty() {
                    return Err(ValidationError::new(
                        "key_id, old_key and new_key are required",
                    ));
                }
            }
            ControllerChange::Security(SecurityAction::RemoveControllerKey) => {}
        }
        if self.reset_timeout == 0 || self.job_timeout == 0 {
            return Err(ValidationError::new("timeouts must be greater than zero"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct State {
    pub storage_id: String,
    pub controller_id: String,
    pub apply_time: ApplyTime,
    pub controller_rates: Option<Rates>,
    pub dell_attributes: BTreeMap<String, JsonValue>,
    pub security_action: Option<String>,
    /// Job of the last change.
    pub job: Option<ODataId>,
}

pub struct StorageController;

impl StorageController {
    fn controller_id<B: Bmc>(server: &Server<B>, storage_id: &str, controller_id: &str) -> ODataId {
        server
            .system_id()
            .child("Storage")
            .child(storage_id)
            .child("Controllers")
            .child(controller_id)
    }

    fn observed(
        controller: &StorageControllerSchema,
        keys: impl Iterator<Item = String>,
    ) -> (Option<Rates>, BTreeMap<String, JsonValue>) {
        let attributes = controller.dell_attributes();
        let observed = keys
            .filter_map(|key| {
                attributes
                    .and_then(|a| a.get(&key))
                    .map(|v| (key, v.clone()))
            })
            .collect();
        (controller.controller_rates.as_ref().map(Rates::from), observed)
    }

    async fn apply_settings<B: Bmc>(
        server: &Server<B>,
        id: &ODataId,
        config: &Config,
        settings: &ControllerSettings,
    ) -> Result<Option<ODataId>, Error<B>> {
        let oem = (!settings.dell_attributes.is_empty()).then(|| ControllerOem {
            dell: Some(DellControllerOem {
                dell_storage_controller: settings
                    .dell_attributes
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect::<Map<_, _>>(),
            }),
        });
        let update = StorageControllerSettingsUpdate {
            apply_time: settings_apply_time(config.apply_time, config.maintenance_window.as_ref()),
            controller_rates: settings.controller_rates.as_ref().map(ControllerRates::from),
            oem,
        };
        let location: TaskLocation = server
            .bmc()
            .update(&id.child("Settings"), None, &update)
            .await
            .map_err(Error::Bmc)?;
        let poll = server.job_settings(config.job_timeout)?;
        match config.apply_time {
            ApplyTime::Immediate => {}
            ApplyTime::OnReset => {
                let reset = server.job_settings(config.reset_timeout)?;
                server.reboot_and_wait(config.reset_type, reset).await?;
            }
            ApplyTime::AtMaintenanceWindowStart | ApplyTime::InMaintenanceWindowOnReset => {
                info!(job = ?location.location, "controller settings scheduled for maintenance window");
                return Ok(location.location);
            }
        }
        server
            .wait_for_job(&location, "storage controller job", poll)
            .await
            .map(Some)
    }

    async fn apply_security<B: Bmc>(
        server: &Server<B>,
        config: &Config,
        security: &SecurityAction,
    ) -> Result<ODataId, Error<B>> {
        let service = raid_service(&server.system_id());
        let target = |name: &str| {
            ActionTarget::new(format!("{service}/Actions/DellRaidService.{name}"))
        };
        let target_fqdd = config.controller_id.clone();
        let location = match security {
            SecurityAction::SetControllerKey { key_id, key } => {
                Action::<SetControllerKeyRequest, TaskLocation>::new(target(security.name()))
                    .run(
                        server.bmc(),
                        &SetControllerKeyRequest {
                            target_fqdd,
                            key_id: key_id.clone(),
                            key: key.clone(),
                        },
                    )
                    .await
            }
            SecurityAction::ReKey {
                key_id,
                old_key,
                new_key,
                mode,
            } => {
                Action::<ReKeyRequest, TaskLocation>::new(target(security.name()))
                    .run(
                        server.bmc(),
                        &ReKeyRequest {
                            target_fqdd,
                            key_id: key_id.clone(),
                            old_key: old_key.clone(),
                            new_key: new_key.clone(),
                            mode: mode.clone(),
                        },
                    )
                    .await
            }
            SecurityAction::RemoveControllerKey => {
                Action::<RemoveControllerKeyRequest, TaskLocation>::new(target(security.name()))
                    .run(server.bmc(), &RemoveControllerKeyRequest { target_fqdd })
                    .await
            }
        }
        .map_err(Error::Bmc)?;
        info!(action = security.name(), "controller security action submitted");
        let settings = server.job_settings(config.job_timeout)?;
        server
            .wait_for_job(&location, "controller security job", settings)
            .await
    }

    async fn converge<B: Bmc>(server: &Server<B>, config: &Config) -> Result<State, Error<B>> {
        config.validate()?;
        let _guard = server.lock().await;
        let id = Self::controller_id(server, &config.storage_id, &config.controller_id);
        if server.find::<StorageControllerSchema>(&id).await?.is_none() {
            return Err(Error::StorageNotFound(format!(
                "{}/{}",
                config.storage_id, config.controller_id
            )));
        }
        let (job, keys, security_action) = match &config.change {
            ControllerChange::Settings(settings) => (
                Self::apply_settings(server, &id, config, settings).await?,
                settings.dell_attributes.keys().cloned().collect(),
                None,
            ),
            ControllerChange::Security(security) => (
                Some(Self::apply_security(server, config, security).await?),
                Vec::new(),
                Some(security.name().to_string()),
            ),
        };
        let controller = server.get::<StorageControllerSchema>(&id).await?;
        let (controller_rates, dell_attributes) = Self::observed(&controller, keys.into_iter());
        Ok(State {
            storage_id: config.storage_id.clone(),
            controller_id: config.controller_id.clone(),
            apply_time: config.apply_time,
            controller_rates,
            dell_attributes,
            security_action,
            job,
        })
    }
}

impl<B: Bmc> ManagedResource<B> for StorageController {
    type Config = Config;
    type State = State;

    const NAME: &'static str = "storage_controller";

    #[tracing::instrument(
        skip_all,
        fields(endpoint = %server.key(), controller = %config.controller_id)
    )]
    async fn create(server: &Server<B>, config: &Config) -> Result<State, Error<B>> {
        Self::converge(server, config).await
    }

    async fn read(server: &Server<B>, state: &State) -> Result<Option<State>, Error<B>> {
        let id = Self::controller_id(server, &state.storage_id, &state.controller_id);
        let Some(controller) = server.find::<StorageControllerSchema>(&id).await? else {
            return Ok(None);
        };
        let (controller_rates, dell_attributes) =
            Self::observed(&controller, state.dell_attributes.keys().cloned());
        Ok(Some(State {
            controller_rates,
            dell_attributes,
            ..state.clone()
        }))
    }

    #[tracing::instrument(
        skip_all,
        fields(endpoint = %server.key(), controller = %config.controller_id)
    )]
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
