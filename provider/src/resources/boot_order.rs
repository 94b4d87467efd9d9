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

//! Persistent boot order and boot option enablement.

use crate::config::Validate;
use crate::config::ValidationError;
use crate::context::Server;
use crate::poll::poll_until;
use crate::poll::PollStatus;
use crate::resources::defaults;
use crate::resources::ManagedResource;
use crate::schema::system::BootOption;
use crate::schema::system::BootOptionUpdate;
use crate::schema::system::BootPatch;
use crate::schema::system::ComputerSystem;
use crate::schema::system::ResetType;
use crate::schema::system::SystemBootUpdate;
use crate::Error;
use dell_redfish_core::Bmc;
use dell_redfish_core::Empty;
use dell_redfish_core::ODataId;
use dell_redfish_core::TaskLocation;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::info;

/// What the resource manages. Exactly one is configured.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BootSelection {
    /// Full boot order, as `BootOptionReference` values.
    BootOrder(Vec<String>),
    /// Enable or disable individual boot options.
    BootOptions(Vec<BootOptionSetting>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BootOptionSetting {
    pub boot_option_reference: String,
    pub boot_option_enabled: bool,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    boot_order: Option<Vec<String>>,
    boot_options: Option<Vec<BootOptionSetting>>,
    #[serde(default = "defaults::reset_type")]
    reset_type: ResetType,
    #[serde(default = "defaults::reset_timeout")]
    reset_timeout: u64,
    #[serde(default = "defaults::job_timeout")]
    boot_order_job_timeout: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawConfig")]
pub struct Config {
    pub boot: BootSelection,
    pub reset_type: ResetType,
    /// Seconds to wait for the boot order to be applied after reset.
    pub reset_timeout: u64,
    pub boot_order_job_timeout: u64,
}

impl TryFrom<RawConfig> for Config {
    type Error = ValidationError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let boot = match (raw.boot_order, raw.boot_options) {
            (Some(order), None) => BootSelection::BootOrder(order),
            (None, Some(options)) => BootSelection::BootOptions(options),
            (Some(_), Some(_)) => {
                return Err(ValidationError::conflicting("boot_order", "boot_options"))
            }
            (None, None) => {
                return Err(ValidationError::missing_one_of("boot_order", "boot_options"))
            }
        };
        Ok(Self {
            boot,
            reset_type: raw.reset_type,
            reset_timeout: raw.reset_timeout,
            boot_order_job_timeout: raw.boot_order_job_timeout,
        })
    }
}

impl Config {
    #[must_use]
    pub const fn new(boot: BootSelection) -> Self {
        Self {
            boot,
            reset_type: defaults::reset_type(),
            reset_timeout: defaults::reset_timeout(),
            boot_order_job_timeout: defaults::job_timeout(),
        }
    }
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ValidationError> {
        let refs: Vec<&str> = match &self.boot {
            BootSelection::BootOrder(order) => order.iter().map(String::as_str).collect(),
            BootSelection::BootOptions(options) => options
                .iter()
                .map(|o| o.boot_option_reference.as_str())
                .collect(),
        };
        if refs.is_empty() {
            return Err(ValidationError::new("at least one boot option is required"));
        }
        let unique: BTreeSet<_> = refs.iter().collect();
        if unique.len() != refs.len() {
            return Err(ValidationError::new("boot option references must be unique"));
        }
        if self.reset_timeout == 0 || self.boot_order_job_timeout == 0 {
            return Err(ValidationError::new("timeouts must be greater than zero"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct State {
    pub boot: BootSelection,
    pub reset_type: ResetType,
    pub reset_timeout: u64,
    pub boot_order_job_timeout: u64,
}

pub struct BootOrder;

impl BootOrder {
    fn option_id<B: Bmc>(server: &Server<B>, reference: &str) -> ODataId {
        server.system_id().child("BootOptions").child(reference)
    }

    async fn current<B: Bmc>(
        server: &Server<B>,
        system: &ComputerSystem,
        wanted: &BootSelection,
    ) -> Result<BootSelection, Error<B>> {
        Ok(match wanted {
            BootSelection::BootOrder(_) => BootSelection::BootOrder(
                system
                    .boot
                    .as_ref()
                    .map(|boot| boot.boot_order.clone())
                    .unwrap_or_default(),
            ),
            BootSelection::BootOptions(options) => {
                let mut current = Vec::with_capacity(options.len());
                for option in options {
                    let id = Self::option_id(server, &option.boot_option_reference);
                    if let Some(found) = server.find::<BootOption>(&id).await? {
                        current.push(BootOptionSetting {
                            boot_option_reference: option.boot_option_reference.clone(),
                            boot_option_enabled: found.boot_option_enabled.unwrap_or(false),
                        });
                    }
                }
                BootSelection::BootOptions(current)
            }
        })
    }

    async fn converge<B: Bmc>(server: &Server<B>, config: &Config) -> Result<State, Error<B>> {
        config.validate()?;
        let _guard = server.lock().await;
        let system = server.system().await?;
        let current = Self::current(server, &system, &config.boot).await?;
        let pending = match (&config.boot, &current) {
            _ if current == config.boot => {
                info!("boot configuration already applied");
                None
            }
            (BootSelection::BootOrder(wanted), BootSelection::BootOrder(current)) => {
                let wanted_set: BTreeSet<_> = wanted.iter().collect();
                let current_set: BTreeSet<_> = current.iter().collect();
                if wanted_set != current_set {
                    return Err(Error::Validation(format!(
                        "boot_order must list each boot option of the system exactly once: {}",
                        current.join(", ")
                    )));
                }
                let update = SystemBootUpdate {
                    boot: BootPatch {
                        boot_order: Some(wanted.clone()),
                        ..BootPatch::default()
                    },
                };
                let location: TaskLocation = server
                    .bmc()
                    .update(&server.system_id().child("Settings"), None, &update)
                    .await
                    .map_err(Error::Bmc)?;
                Some(location)
            }
            (BootSelection::BootOptions(wanted), _) => {
                for option in wanted {
                    let id = Self::option_id(server, &option.boot_option_reference);
                    let update = BootOptionUpdate {
                        boot_option_enabled: option.boot_option_enabled,
                    };
                    let _: Empty = server
                        .bmc()
                        .update(&id, None, &update)
                        .await
                        .map_err(Error::Bmc)?;
                }
                // Boot option changes do not create a job.
                Some(TaskLocation::default())
            }
            (BootSelection::BootOrder(_), BootSelection::BootOptions(_)) => None,
        };

        if let Some(location) = pending {
            server.reboot_to_apply(config.reset_type).await?;
            if location.location.is_some() {
                let settings = server.job_settings(config.boot_order_job_timeout)?;
                server
                    .wait_for_job(&location, "boot order job", settings)
                    .await?;
            }
            Self::wait_applied(server, config).await?;
        }

        Ok(State {
            boot: config.boot.clone(),
            reset_type: config.reset_type,
            reset_timeout: config.reset_timeout,
            boot_order_job_timeout: config.boot_order_job_timeout,
        })
    }

    async fn wait_applied<B: Bmc>(server: &Server<B>, config: &Config) -> Result<(), Error<B>> {
        let settings = server.job_settings(config.reset_timeout)?;
        let wanted = &config.boot;
        poll_until(settings, move || async move {
            let system = server.system().await?;
            let current = Self::current(server, &system, wanted).await?;
            Ok::<_, Error<B>>(if current == *wanted {
                PollStatus::Succeeded
            } else {
                PollStatus::Pending
            })
        })
        .await
        .map_err(|err| Error::from_poll("boot order", err))
    }
}

impl<B: Bmc> ManagedResource<B> for BootOrder {
    type Config = Config;
    type State = State;

    const NAME: &'static str = "boot_order";

    #[tracing::instrument(skip_all, fields(endpoint = %server.key()))]
    async fn create(server: &Server<B>, config: &Config) -> Result<State, Error<B>> {
        Self::converge(server, config).await
    }

    async fn read(server: &Server<B>, state: &State) -> Result<Option<State>, Error<B>> {
        let Some(system) = server
            .find::<ComputerSystem>(&server.system_id())
            .await?
        else {
            return Ok(None);
        };
        let boot = Self::current(server, &system, &state.boot).await?;
        Ok(Some(State {
            boot,
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
