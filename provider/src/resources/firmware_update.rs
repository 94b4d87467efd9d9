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

//! Firmware update through `UpdateService.SimpleUpdate`.
//!
//! iDRAC stages most packages and schedules them for the next host
//! reboot. The handler waits for the job to be staged, reboots the
//! host if the job is scheduled and then waits for completion.

use crate::config::Validate;
use crate::config::ValidationError;
use crate::context::Server;
use crate::resources::defaults;
use crate::resources::ManagedResource;
use crate::schema::job::Job;
use crate::schema::system::ResetType;
use crate::schema::update::SimpleUpdateRequest;
use crate::schema::update::UpdateService;
use crate::Error;
use dell_redfish_core::Bmc;
use dell_redfish_core::ODataId;
use serde::Deserialize;
use serde::Serialize;
use tokio::time::Instant;
use tracing::info;

pub const UPDATE_SERVICE: &str = "/redfish/v1/UpdateService";

const PROTOCOLS: &[&str] = &["HTTP", "HTTPS", "NFS", "CIFS", "TFTP", "FTP"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// URI of the update package, e.g. `http://repo/BIOS_X.EXE`.
    pub image_uri: String,
    pub transfer_protocol: Option<String>,
    #[serde(default = "defaults::reset_type")]
    pub reset_type: ResetType,
    #[serde(default = "defaults::job_timeout")]
    pub job_timeout: u64,
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ValidationError> {
        let scheme = self
            .image_uri
            .split_once("://")
            .map(|(scheme, _)| scheme.to_ascii_uppercase())
            .ok_or_else(|| ValidationError::new("image_uri must be an absolute URI"))?;
        if !PROTOCOLS.contains(&scheme.as_str()) {
            return Err(ValidationError::new(format!(
                "unsupported image_uri scheme {scheme}"
            )));
        }
        if let Some(protocol) = &self.transfer_protocol {
            if !PROTOCOLS.contains(&protocol.as_str()) {
                return Err(ValidationError::new(format!(
                    "transfer_protocol must be one of {}",
                    PROTOCOLS.join(", ")
                )));
            }
        }
        if self.job_timeout == 0 {
            return Err(ValidationError::new("job_timeout must be greater than zero"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct State {
    pub image_uri: String,
    pub transfer_protocol: Option<String>,
    pub job: ODataId,
    /// Whether the host was rebooted to apply the update.
    pub rebooted: bool,
}

pub struct FirmwareUpdate;

impl FirmwareUpdate {
    async fn converge<B: Bmc>(server: &Server<B>, config: &Config) -> Result<State, Error<B>> {
        config.validate()?;
        let settings = server.job_settings(config.job_timeout)?;
        let _guard = server.lock().await;
        let service = server
            .get::<UpdateService>(&ODataId::from(UPDATE_SERVICE))
            .await?;
        let action = service
            .actions
            .as_ref()
            .and_then(|a| a.simple_update.as_ref())
            .ok_or(Error::ActionNotAvailable("UpdateService.SimpleUpdate"))?;
        info!(image_uri = %config.image_uri, "starting firmware update");
        let location = action
            .run(
                server.bmc(),
                &SimpleUpdateRequest {
                    image_uri: config.image_uri.clone(),
                    transfer_protocol: config.transfer_protocol.clone(),
                },
            )
            .await
            .map_err(Error::Bmc)?;
        let job = location
            .location
            .ok_or(Error::MissingLocation("firmware update"))?;
        let start = Instant::now();
        server
            .watch_job(&job, "firmware update", settings, Job::staged_status)
            .await?;
        let staged = server.get::<Job>(&job).await?;
        let rebooted = staged.is_scheduled();
        if rebooted {
            info!(%job, "firmware update scheduled, rebooting host");
            // Staging and flashing share job_timeout.
            let settings = settings
                .remaining(start.elapsed())
                .ok_or_else(|| Error::Timeout {
                    operation: "firmware update",
                    elapsed: start.elapsed(),
                })?;
            server.reboot_to_apply(config.reset_type).await?;
            server
                .watch_job(&job, "firmware update", settings, Job::status)
                .await?;
        }
        info!(%job, "firmware update completed");
        Ok(State {
            image_uri: config.image_uri.clone(),
            transfer_protocol: config.transfer_protocol.clone(),
            job,
            rebooted,
        })
    }
}

impl<B: Bmc> ManagedResource<B> for FirmwareUpdate {
    type Config = Config;
    type State = State;

    const NAME: &'static str = "firmware_update";

    #[tracing::instrument(skip_all, fields(endpoint = %server.key()))]
    async fn create(server: &Server<B>, config: &Config) -> Result<State, Error<B>> {
        Self::converge(server, config).await
    }

    /// The installed package cannot be told apart from other firmware,
    /// so the recorded state is kept.
    async fn read(_server: &Server<B>, state: &State) -> Result<Option<State>, Error<B>> {
        Ok(Some(state.clone()))
    }

    #[tracing::instrument(skip_all, fields(endpoint = %server.key()))]
    async fn update(server: &Server<B>, state: &State, config: &Config) -> Result<State, Error<B>> {
        if state.image_uri == config.image_uri
            && state.transfer_protocol == config.transfer_protocol
        {
            config.validate()?;
            return Ok(state.clone());
        }
        Self::converge(server, config).await
    }

    async fn delete(_server: &Server<B>, _state: &State) -> Result<(), Error<B>> {
        Ok(())
    }
}
