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

//! One-time or continuous boot source override.

use crate::config::Validate;
use crate::config::ValidationError;
use crate::context::Server;
use crate::resources::defaults;
use crate::resources::ManagedResource;
use crate::schema::system::Boot;
use crate::schema::system::BootPatch;
use crate::schema::system::ComputerSystem;
use crate::schema::system::PowerState;
use crate::schema::system::ResetType;
use crate::schema::system::SystemBootUpdate;
use crate::Error;
use dell_redfish_core::Bmc;
use dell_redfish_core::Empty;
use serde::Deserialize;
use serde::Serialize;
use tracing::info;

const TARGETS: [&str; 15] = [
    "None",
    "Pxe",
    "Floppy",
    "Cd",
    "Usb",
    "Hdd",
    "BiosSetup",
    "Utilities",
    "Diags",
    "UefiShell",
    "UefiTarget",
    "SDCard",
    "UefiHttp",
    "RemoteDrive",
    "UefiBootNext",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OverrideEnabled {
    Once,
    Continuous,
    Disabled,
}

impl OverrideEnabled {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Once => "Once",
            Self::Continuous => "Continuous",
            Self::Disabled => "Disabled",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BootMode {
    #[serde(rename = "UEFI")]
    Uefi,
    Legacy,
}

impl BootMode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Uefi => "UEFI",
            Self::Legacy => "Legacy",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub boot_source_override_enabled: OverrideEnabled,
    pub boot_source_override_target: String,
    pub boot_source_override_mode: Option<BootMode>,
    pub uefi_target_boot_source_override: Option<String>,
    #[serde(default = "defaults::reset_type")]
    pub reset_type: ResetType,
    #[serde(default = "defaults::reset_timeout")]
    pub reset_timeout: u64,
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ValidationError> {
        let target = self.boot_source_override_target.as_str();
        if !TARGETS.contains(&target) {
            return Err(ValidationError::new(format!(
                "unsupported boot_source_override_target {target}, expected one of: {}",
                TARGETS.join(", ")
            )));
        }
        match (target, &self.uefi_target_boot_source_override) {
            ("UefiTarget", None) => {
                return Err(ValidationError::new(
                    "uefi_target_boot_source_override is required for UefiTarget",
                ))
            }
            (t, Some(_)) if t != "UefiTarget" => {
                return Err(ValidationError::new(
                    "uefi_target_boot_source_override is only valid with UefiTarget",
                ))
            }
            _ => {}
        }
        if self.boot_source_override_mode == Some(BootMode::Legacy) && target.starts_with("Uefi")
        {
            return Err(ValidationError::new(format!(
                "{target} requires UEFI boot mode"
            )));
        }
        if self.reset_timeout == 0 {
            return Err(ValidationError::new("reset_timeout must be greater than zero"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct State {
    pub boot_source_override_enabled: Option<String>,
    pub boot_source_override_target: Option<String>,
    pub boot_source_override_mode: Option<String>,
    pub uefi_target_boot_source_override: Option<String>,
    pub reset_type: ResetType,
    pub reset_timeout: u64,
}

impl State {
    fn from_boot(boot: &Boot, reset_type: ResetType, reset_timeout: u64) -> Self {
        Self {
            boot_source_override_enabled: boot.boot_source_override_enabled.clone(),
            boot_source_override_target: boot.boot_source_override_target.clone(),
            boot_source_override_mode: boot.boot_source_override_mode.clone(),
            uefi_target_boot_source_override: boot.uefi_target_boot_source_override.clone(),
            reset_type,
            reset_timeout,
        }
    }
}

pub struct BootSourceOverride;

impl BootSourceOverride {
    async fn converge<B: Bmc>(server: &Server<B>, config: &Config) -> Result<State, Error<B>> {
        config.validate()?;
        let settings = server.job_settings(config.reset_timeout)?;
        let _guard = server.lock().await;
        let update = SystemBootUpdate {
            boot: BootPatch {
                boot_source_override_enabled: Some(
                    config.boot_source_override_enabled.as_str().into(),
                ),
                boot_source_override_target: Some(config.boot_source_override_target.clone()),
                boot_source_override_mode: config
                    .boot_source_override_mode
                    .map(|mode| mode.as_str().into()),
                uefi_target_boot_source_override: config.uefi_target_boot_source_override.clone(),
                ..BootPatch::default()
            },
        };
        let _: Empty = server
            .bmc()
            .update(&server.system_id(), None, &update)
            .await
            .map_err(Error::Bmc)?;
        info!(
            boot_target = %config.boot_source_override_target,
            enabled = config.boot_source_override_enabled.as_str(),
            "boot source override set"
        );
        if server.reset_system(config.reset_type).await? {
            server
                .wait_for_reset(config.reset_type, PowerState::On, settings)
                .await?;
        }
        let system = server.system().await?;
        Ok(State::from_boot(
            &system.boot.clone().unwrap_or_default(),
            config.reset_type,
            config.reset_timeout,
        ))
    }
}

impl<B: Bmc> ManagedResource<B> for BootSourceOverride {
    type Config = Config;
    type State = State;

    const NAME: &'static str = "boot_source_override";

    #[tracing::instrument(skip_all, fields(endpoint = %server.key()))]
    async fn create(server: &Server<B>, config: &Config) -> Result<State, Error<B>> {
        Self::converge(server, config).await
    }

    async fn read(server: &Server<B>, state: &State) -> Result<Option<State>, Error<B>> {
        let system = server
            .find::<ComputerSystem>(&server.system_id())
            .await?;
        Ok(system.map(|system| {
            State::from_boot(
                &system.boot.clone().unwrap_or_default(),
                state.reset_type,
                state.reset_timeout,
            )
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
