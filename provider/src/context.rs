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

//! Provider context and per-server handles.

use crate::config::ConfigError;
use crate::config::ProviderConfig;
use crate::config::RedfishServer;
use crate::config::ValidationError;
use crate::lock::EndpointGuard;
use crate::lock::EndpointKey;
use crate::lock::EndpointLocks;
use crate::poll::poll_until;
use crate::poll::PollSettings;
use crate::poll::PollStatus;
use crate::schema::job::Job;
use crate::schema::manager::Manager;
use crate::schema::system::ComputerSystem;
use crate::schema::system::PowerState;
use crate::schema::system::ResetRequest;
use crate::schema::system::ResetType;
use crate::schema::Collection;
use crate::Error;
use dell_redfish_bmc_http::reqwest::Client;
use dell_redfish_bmc_http::reqwest::ClientParams;
use dell_redfish_bmc_http::HttpBmc;
use dell_redfish_core::Bmc;
use dell_redfish_core::BmcErrorClass as _;
use dell_redfish_core::ODataId;
use dell_redfish_core::TaskLocation;
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;
use tracing::info;

pub const DEFAULT_SYSTEM_ID: &str = "/redfish/v1/Systems/System.Embedded.1";
pub const DEFAULT_MANAGER_ID: &str = "/redfish/v1/Managers/iDRAC.Embedded.1";

/// Server reached over HTTPS.
pub type HttpServer = Server<HttpBmc<Client>>;

/// Top-level provider state shared by all resource operations.
pub struct Provider {
    config: ProviderConfig,
    locks: Arc<EndpointLocks>,
}

impl Provider {
    #[must_use]
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            locks: Arc::new(EndpointLocks::new()),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ProviderConfig {
        &self.config
    }

    #[must_use]
    pub const fn locks(&self) -> &Arc<EndpointLocks> {
        &self.locks
    }

    /// Open a handle to the server described by a resource block.
    ///
    /// # Errors
    ///
    /// Returns an error if the block cannot be resolved or the HTTP
    /// client cannot be built.
    pub fn connect(&self, server: &RedfishServer) -> Result<HttpServer, ConfigError> {
        let resolved = self.config.resolve(server)?;
        let params = ClientParams::new().accept_invalid_certs(resolved.ssl_insecure);
        let client =
            Client::with_params(params).map_err(|err| ConfigError::Client(err.to_string()))?;
        let key = EndpointKey::new(resolved.endpoint.to_string());
        let bmc = HttpBmc::new(client, resolved.endpoint, resolved.credentials);
        Ok(self.server(Arc::new(bmc), key))
    }

    /// Handle to a server reached through an arbitrary [`Bmc`].
    pub fn server<B: Bmc>(&self, bmc: Arc<B>, key: EndpointKey) -> Server<B> {
        Server::new(
            bmc,
            key,
            self.locks.clone(),
            Duration::from_secs(self.config.poll_interval()),
        )
    }
}

/// One managed server.
pub struct Server<B: Bmc> {
    bmc: Arc<B>,
    key: EndpointKey,
    locks: Arc<EndpointLocks>,
    poll_interval: Duration,
    system_id: OnceLock<ODataId>,
    manager_id: OnceLock<ODataId>,
}

impl<B: Bmc> Server<B> {
    pub fn new(
        bmc: Arc<B>,
        key: EndpointKey,
        locks: Arc<EndpointLocks>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            bmc,
            key,
            locks,
            poll_interval,
            system_id: OnceLock::new(),
            manager_id: OnceLock::new(),
        }
    }

    pub fn bmc(&self) -> &B {
        &self.bmc
    }

    pub const fn key(&self) -> &EndpointKey {
        &self.key
    }

    /// Serialize with other mutating operations on this server.
    pub async fn lock(&self) -> EndpointGuard {
        self.locks.acquire(&self.key).await
    }

    /// Computer system managed by the resources.
    pub fn system_id(&self) -> ODataId {
        self.system_id
            .get()
            .cloned()
            .unwrap_or_else(|| DEFAULT_SYSTEM_ID.into())
    }

    pub fn manager_id(&self) -> ODataId {
        self.manager_id
            .get()
            .cloned()
            .unwrap_or_else(|| DEFAULT_MANAGER_ID.into())
    }

    /// Look up the first system and manager of the service. Servers
    /// that do not list their collections keep the iDRAC defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a collection read fails for another reason
    /// than absence.
    pub async fn discover(&self) -> Result<(), Error<B>> {
        let root = ODataId::service_root();
        if let Some(id) = self.first_member(&root.child("Systems")).await? {
            let _ = self.system_id.set(id);
        }
        if let Some(id) = self.first_member(&root.child("Managers")).await? {
            let _ = self.manager_id.set(id);
        }
        debug!(
            endpoint = %self.key,
            system = %self.system_id(),
            manager = %self.manager_id(),
            "discovered"
        );
        Ok(())
    }

    async fn first_member(&self, collection: &ODataId) -> Result<Option<ODataId>, Error<B>> {
        match self.bmc.get::<Collection>(collection).await {
            Ok(c) => Ok(c.members.first().map(|m| m.odata_id.clone())),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(Error::Bmc(err)),
        }
    }

    /// Read an entity.
    ///
    /// # Errors
    ///
    /// Returns the BMC error if the request fails.
    pub async fn get<T>(&self, id: &ODataId) -> Result<Arc<T>, Error<B>>
    where
        T: for<'de> Deserialize<'de> + Send + Sync + 'static,
    {
        self.bmc.get::<T>(id).await.map_err(Error::Bmc)
    }

    /// Read an entity, `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns the BMC error if the request fails for another reason.
    pub async fn find<T>(&self, id: &ODataId) -> Result<Option<Arc<T>>, Error<B>>
    where
        T: for<'de> Deserialize<'de> + Send + Sync + 'static,
    {
        match self.bmc.get::<T>(id).await {
            Ok(v) => Ok(Some(v)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(Error::Bmc(err)),
        }
    }

    /// Read all members of a collection.
    ///
    /// # Errors
    ///
    /// Returns the BMC error if any read fails.
    pub async fn members<T>(&self, collection: &ODataId) -> Result<Vec<Arc<T>>, Error<B>>
    where
        T: for<'de> Deserialize<'de> + Send + Sync + 'static,
    {
        let collection = self.get::<Collection>(collection).await?;
        let mut members = Vec::with_capacity(collection.members.len());
        for member in &collection.members {
            members.push(self.get::<T>(&member.odata_id).await?);
        }
        Ok(members)
    }

    /// # Errors
    ///
    /// Returns [`Error::SystemNotFound`] if the system does not exist.
    pub async fn system(&self) -> Result<Arc<ComputerSystem>, Error<B>> {
        let id = self.system_id();
        self.find::<ComputerSystem>(&id)
            .await?
            .ok_or_else(|| Error::SystemNotFound(id.to_string()))
    }

    /// Poll settings for a job wait of `timeout` seconds at the
    /// provider poll interval.
    ///
    /// # Errors
    ///
    /// Returns an error if `timeout` is zero.
    pub fn job_settings(&self, timeout: u64) -> Result<PollSettings, ValidationError> {
        let timeout = Duration::from_secs(timeout);
        Ok(PollSettings::new(self.poll_interval.min(timeout), timeout)?)
    }

    /// Issue `reset_type` on the system.
    ///
    /// # Errors
    ///
    /// Returns an error if the system has no reset action or the
    /// action fails.
    pub async fn reset_with(
        &self,
        system: &ComputerSystem,
        reset_type: ResetType,
    ) -> Result<(), Error<B>> {
        let action = system
            .actions
            .as_ref()
            .and_then(|a| a.reset.as_ref())
            .ok_or(Error::ActionNotAvailable("ComputerSystem.Reset"))?;
        info!(endpoint = %self.key, ?reset_type, "resetting system");
        action
            .run(self.bmc(), &ResetRequest { reset_type })
            .await
            .map_err(Error::Bmc)?;
        Ok(())
    }

    /// Reset the system unless the host is off and `reset_type` would
    /// not power it on. Returns whether a reset was issued.
    ///
    /// # Errors
    ///
    /// See [`Server::reset_with`].
    pub async fn reset_system(&self, reset_type: ResetType) -> Result<bool, Error<B>> {
        let system = self.system().await?;
        if system.power_state == Some(PowerState::Off)
            && !matches!(reset_type, ResetType::On | ResetType::ForceOn)
        {
            info!(endpoint = %self.key, ?reset_type, "host is off, reset skipped");
            return Ok(false);
        }
        self.reset_with(&system, reset_type).await?;
        Ok(true)
    }

    /// Boot the host so that pending settings are applied: power it on
    /// if it is off, otherwise reset it with `reset_type`. Returns the
    /// reset that was issued.
    ///
    /// # Errors
    ///
    /// See [`Server::reset_with`].
    pub async fn reboot_to_apply(&self, reset_type: ResetType) -> Result<ResetType, Error<B>> {
        let system = self.system().await?;
        let reset_type = if system.power_state == Some(PowerState::Off) {
            ResetType::On
        } else {
            reset_type
        };
        self.reset_with(&system, reset_type).await?;
        Ok(reset_type)
    }

    /// [`Server::reboot_to_apply`] and wait until the host is back on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if the host is not on within `settings`.
    pub async fn reboot_and_wait(
        &self,
        reset_type: ResetType,
        settings: PollSettings,
    ) -> Result<(), Error<B>> {
        let issued = self.reboot_to_apply(reset_type).await?;
        self.wait_for_reset(issued, PowerState::On, settings).await
    }

    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if the state is not reached in time.
    pub async fn wait_for_power_state(
        &self,
        target: PowerState,
        settings: PollSettings,
    ) -> Result<(), Error<B>> {
        let server = self;
        let id = &self.system_id();
        poll_until(settings, move || async move {
            let system = server.get::<ComputerSystem>(id).await?;
            debug!(endpoint = %server.key, power_state = ?system.power_state, "power state");
            Ok::<_, Error<B>>(if system.power_state == Some(target) {
                PollStatus::Succeeded
            } else {
                PollStatus::Pending
            })
        })
        .await
        .map_err(|err| Error::from_poll("power state", err))
    }

    /// Wait for a running host to reboot after a restart-type reset.
    /// The host has to leave `On` (or the controller has to stop
    /// answering) before `On` counts as converged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if the host does not come back in time.
    pub async fn wait_for_restart(&self, settings: PollSettings) -> Result<(), Error<B>> {
        let server = self;
        let id = &self.system_id();
        let went_down = &AtomicBool::new(false);
        poll_until(settings, move || async move {
            let power_state = match server.get::<ComputerSystem>(id).await {
                Ok(system) => system.power_state,
                Err(err) if err.is_unreachable() => {
                    debug!(endpoint = %server.key, error = %err, "host restarting");
                    went_down.store(true, Ordering::Relaxed);
                    return Ok(PollStatus::Pending);
                }
                Err(err) => return Err(err),
            };
            debug!(endpoint = %server.key, ?power_state, "power state");
            Ok::<_, Error<B>>(match power_state {
                Some(PowerState::On) if went_down.load(Ordering::Relaxed) => PollStatus::Succeeded,
                Some(PowerState::Off | PowerState::PoweringOff | PowerState::PoweringOn) => {
                    went_down.store(true, Ordering::Relaxed);
                    PollStatus::Pending
                }
                _ => PollStatus::Pending,
            })
        })
        .await
        .map_err(|err| Error::from_poll("host restart", err))
    }

    /// Wait for the outcome of `reset_type`: a reboot for restarts,
    /// otherwise the `target` power state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if the host does not get there in time.
    pub async fn wait_for_reset(
        &self,
        reset_type: ResetType,
        target: PowerState,
        settings: PollSettings,
    ) -> Result<(), Error<B>> {
        if reset_type.is_restart() {
            self.wait_for_restart(settings).await
        } else {
            self.wait_for_power_state(target, settings).await
        }
    }

    /// Wait for the job referenced by an asynchronous action response.
    /// Returns the job id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingLocation`] if the response has no job,
    /// [`Error::JobFailed`] or [`Error::Timeout`] per the job outcome.
    pub async fn wait_for_job(
        &self,
        location: &TaskLocation,
        operation: &'static str,
        settings: PollSettings,
    ) -> Result<ODataId, Error<B>> {
        let job = job_id::<B>(location, operation)?;
        self.watch_job(&job, operation, settings, Job::status).await?;
        Ok(job)
    }

    /// Poll `job` until `classify` reports a terminal status.
    ///
    /// # Errors
    ///
    /// See [`Server::wait_for_job`].
    pub async fn watch_job(
        &self,
        job: &ODataId,
        operation: &'static str,
        settings: PollSettings,
        classify: fn(&Job) -> PollStatus,
    ) -> Result<(), Error<B>> {
        info!(endpoint = %self.key, %job, operation, "waiting for job");
        let server = self;
        poll_until(settings, move || async move {
            let state = server.get::<Job>(job).await?;
            debug!(
                endpoint = %server.key,
                %job,
                task_state = ?state.task_state,
                job_state = ?state.dell_job_state(),
                percent = ?state.percent_complete(),
                "job status"
            );
            Ok::<_, Error<B>>(classify(&state))
        })
        .await
        .map_err(|err| Error::from_poll(operation, err))
    }

    /// Reset iDRAC and wait until it answers again. Polling starts after
    /// `settle` so that the manager has gone down.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if iDRAC is not back in time.
    pub async fn reset_manager_and_wait(
        &self,
        reset_type: ResetType,
        settle: Duration,
        settings: PollSettings,
    ) -> Result<(), Error<B>> {
        let id = &self.manager_id();
        let manager = self.get::<Manager>(id).await?;
        let action = manager
            .actions
            .as_ref()
            .and_then(|a| a.reset.as_ref())
            .ok_or(Error::ActionNotAvailable("Manager.Reset"))?;
        info!(endpoint = %self.key, ?reset_type, "resetting iDRAC");
        action
            .run(self.bmc(), &ResetRequest { reset_type })
            .await
            .map_err(Error::Bmc)?;
        sleep(settle).await;
        let server = self;
        poll_until(settings, move || async move {
            server.get::<Manager>(id).await?;
            Ok::<_, Error<B>>(PollStatus::Succeeded)
        })
        .await
        .map_err(|err| Error::from_poll("iDRAC reset", err))
    }
}

fn job_id<B: Bmc>(location: &TaskLocation, operation: &'static str) -> Result<ODataId, Error<B>> {
    location
        .location
        .clone()
        .ok_or(Error::MissingLocation(operation))
}
