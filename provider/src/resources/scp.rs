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

//! Server configuration profile (SCP) export and import.

use crate::config::Validate;
use crate::config::ValidationError;
use crate::context::Server;
use crate::resources::defaults;
use crate::resources::ManagedResource;
use crate::schema::dell::export_system_configuration;
use crate::schema::dell::import_system_configuration;
use crate::schema::dell::ExportSystemConfigurationRequest;
use crate::schema::dell::ImportSystemConfigurationRequest;
use crate::schema::dell::ShareParameters;
use crate::Error;
use dell_redfish_core::Action;
use dell_redfish_core::ActionTarget;
use dell_redfish_core::Bmc;
use dell_redfish_core::ODataId;
use dell_redfish_core::TaskLocation;
use serde::Deserialize;
use serde::Serialize;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use tracing::info;

const TARGETS: &[&str] = &[
    "ALL",
    "IDRAC",
    "BIOS",
    "NIC",
    "RAID",
    "FC",
    "InfiniBand",
    "SupportAssist",
    "EventFilters",
    "System",
    "LifecycleController",
    "AHCI",
    "PCIeSSD",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShareType {
    Nfs,
    Cifs,
    Http,
    Https,
}

impl ShareType {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Nfs => "NFS",
            Self::Cifs => "CIFS",
            Self::Http => "HTTP",
            Self::Https => "HTTPS",
        }
    }
}

/// Network share holding the profile file.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Share {
    pub share_type: ShareType,
    pub ip_address: String,
    pub share_name: String,
    pub file_name: String,
    pub port_number: Option<u16>,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    #[serde(default)]
    pub ignore_certificate_warning: bool,
}

impl Debug for Share {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Share")
            .field("share_type", &self.share_type)
            .field("ip_address", &self.ip_address)
            .field("share_name", &self.share_name)
            .field("file_name", &self.file_name)
            .field("port_number", &self.port_number)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl Validate for Share {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.ip_address.is_empty() || self.file_name.is_empty() {
            return Err(ValidationError::new(
                "share ip_address and file_name are required",
            ));
        }
        if self.share_type == ShareType::Cifs
            && (self.username.is_none() || self.password.is_none())
        {
            return Err(ValidationError::new(
                "CIFS share requires username and password",
            ));
        }
        Ok(())
    }
}

impl Share {
    fn parameters(&self, targets: &[String]) -> ShareParameters {
        let https = self.share_type == ShareType::Https;
        ShareParameters {
            target: targets.join(","),
            share_type: Some(self.share_type.as_str().into()),
            ip_address: Some(self.ip_address.clone()),
            share_name: Some(self.share_name.clone()),
            file_name: Some(self.file_name.clone()),
            port_number: self.port_number.map(|p| p.to_string()),
            username: self.username.clone(),
            password: self.password.clone(),
            ignore_certificate_warning: https.then(|| {
                if self.ignore_certificate_warning {
                    "Enabled".into()
                } else {
                    "Disabled".into()
                }
            }),
        }
    }
}

fn default_targets() -> Vec<String> {
    vec!["ALL".into()]
}

fn validate_targets(targets: &[String]) -> Result<(), ValidationError> {
    if targets.is_empty() {
        return Err(ValidationError::new("target must not be empty"));
    }
    match targets.iter().find(|t| !TARGETS.contains(&t.as_str())) {
        Some(unknown) => Err(ValidationError::new(format!(
            "unknown target {unknown}, expected one of {}",
            TARGETS.join(", ")
        ))),
        None => Ok(()),
    }
}

fn check_one_of(name: &str, value: &str, allowed: &[&str]) -> Result<(), ValidationError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new(format!(
            "{name} must be one of {}",
            allowed.join(", ")
        )))
    }
}

fn default_export_format() -> String {
    "XML".into()
}

fn default_export_use() -> String {
    "Default".into()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    pub share_parameters: Share,
    #[serde(default = "default_targets")]
    pub target: Vec<String>,
    #[serde(default = "default_export_format")]
    pub export_format: String,
    #[serde(default = "default_export_use")]
    pub export_use: String,
    #[serde(default = "default_export_use")]
    pub include_in_export: String,
    #[serde(default = "defaults::job_timeout")]
    pub job_timeout: u64,
}

impl Validate for ExportConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        self.share_parameters.validate()?;
        validate_targets(&self.target)?;
        check_one_of("export_format", &self.export_format, &["XML", "JSON"])?;
        check_one_of("export_use", &self.export_use, &["Default", "Clone", "Replace"])?;
        check_one_of(
            "include_in_export",
            &self.include_in_export,
            &[
                "Default",
                "IncludeReadOnly",
                "IncludePasswordHashValues",
                "IncludeReadOnly,IncludePasswordHashValues",
            ],
        )?;
        if self.job_timeout == 0 {
            return Err(ValidationError::new("job_timeout must be greater than zero"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportState {
    pub share_parameters: Share,
    pub target: Vec<String>,
    pub export_format: String,
    pub job: ODataId,
}

pub struct ScpExport;

impl ScpExport {
    async fn export<B: Bmc>(
        server: &Server<B>,
        config: &ExportConfig,
    ) -> Result<ExportState, Error<B>> {
        config.validate()?;
        let settings = server.job_settings(config.job_timeout)?;
        let _guard = server.lock().await;
        let action = Action::<ExportSystemConfigurationRequest, TaskLocation>::new(
            ActionTarget::from(&export_system_configuration(&server.manager_id())),
        );
        let location = action
            .run(
                server.bmc(),
                &ExportSystemConfigurationRequest {
                    export_format: config.export_format.clone(),
                    export_use: config.export_use.clone(),
                    include_in_export: config.include_in_export.clone(),
                    share_parameters: config.share_parameters.parameters(&config.target),
                },
            )
            .await
            .map_err(Error::Bmc)?;
        info!(file = %config.share_parameters.file_name, "configuration export started");
        let job = server
            .wait_for_job(&location, "configuration export", settings)
            .await?;
        Ok(ExportState {
            share_parameters: config.share_parameters.clone(),
            target: config.target.clone(),
            export_format: config.export_format.clone(),
            job,
        })
    }
}

impl<B: Bmc> ManagedResource<B> for ScpExport {
    type Config = ExportConfig;
    type State = ExportState;

    const NAME: &'static str = "scp_export";

    #[tracing::instrument(skip_all, fields(endpoint = %server.key()))]
    async fn create(server: &Server<B>, config: &ExportConfig) -> Result<ExportState, Error<B>> {
        Self::export(server, config).await
    }

    async fn read(
        _server: &Server<B>,
        state: &ExportState,
    ) -> Result<Option<ExportState>, Error<B>> {
        Ok(Some(state.clone()))
    }

    #[tracing::instrument(skip_all, fields(endpoint = %server.key()))]
    async fn update(
        server: &Server<B>,
        _state: &ExportState,
        config: &ExportConfig,
    ) -> Result<ExportState, Error<B>> {
        Self::export(server, config).await
    }

    async fn delete(_server: &Server<B>, _state: &ExportState) -> Result<(), Error<B>> {
        Ok(())
    }
}

/// Where the imported profile comes from. Exactly one is configured.
#[derive(Clone, PartialEq, Eq)]
pub enum ImportSource {
    Share(Share),
    /// Profile content, XML or JSON.
    Buffer(String),
}

impl Debug for ImportSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Share(share) => f.debug_tuple("Share").field(share).finish(),
            Self::Buffer(buffer) => write!(f, "Buffer({} bytes)", buffer.len()),
        }
    }
}

fn default_shutdown_type() -> String {
    "Graceful".into()
}

fn default_host_power_state() -> String {
    "On".into()
}

const fn default_time_to_wait() -> u32 {
    1200
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawImportConfig {
    share_parameters: Option<Share>,
    import_buffer: Option<String>,
    #[serde(default = "default_targets")]
    target: Vec<String>,
    #[serde(default = "default_shutdown_type")]
    shutdown_type: String,
    #[serde(default = "default_host_power_state")]
    host_power_state: String,
    #[serde(default = "default_time_to_wait")]
    time_to_wait: u32,
    #[serde(default = "defaults::job_timeout")]
    job_timeout: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawImportConfig")]
pub struct ImportConfig {
    pub source: ImportSource,
    pub target: Vec<String>,
    pub shutdown_type: String,
    pub host_power_state: String,
    /// Seconds iDRAC waits for a graceful shutdown.
    pub time_to_wait: u32,
    pub job_timeout: u64,
}

impl TryFrom<RawImportConfig> for ImportConfig {
    type Error = ValidationError;

    fn try_from(raw: RawImportConfig) -> Result<Self, Self::Error> {
        let source = match (raw.share_parameters, raw.import_buffer) {
            (Some(share), None) => ImportSource::Share(share),
            (None, Some(buffer)) => ImportSource::Buffer(buffer),
            (Some(_), Some(_)) => {
                return Err(ValidationError::conflicting(
                    "share_parameters",
                    "import_buffer",
                ))
            }
            (None, None) => {
                return Err(ValidationError::missing_one_of(
                    "share_parameters",
                    "import_buffer",
                ))
            }
        };
        Ok(Self {
            source,
            target: raw.target,
            shutdown_type: raw.shutdown_type,
            host_power_state: raw.host_power_state,
            time_to_wait: raw.time_to_wait,
            job_timeout: raw.job_timeout,
        })
    }
}

impl Validate for ImportConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        match &self.source {
            ImportSource::Share(share) => share.validate()?,
            ImportSource::Buffer(buffer) if buffer.trim().is_empty() => {
                return Err(ValidationError::new("import_buffer must not be empty"))
            }
            ImportSource::Buffer(_) => {}
        }
        validate_targets(&self.target)?;
        check_one_of(
            "shutdown_type",
            &self.shutdown_type,
            &["Graceful", "Forced", "NoReboot"],
        )?;
        check_one_of("host_power_state", &self.host_power_state, &["On", "Off"])?;
        if !(300..=3600).contains(&self.time_to_wait) {
            return Err(ValidationError::new(
                "time_to_wait must be between 300 and 3600 seconds",
            ));
        }
        if self.job_timeout == 0 {
            return Err(ValidationError::new("job_timeout must be greater than zero"));
        }
        Ok(())
    }
}

impl ImportConfig {
    fn request(&self) -> ImportSystemConfigurationRequest {
        let (import_buffer, share_parameters) = match &self.source {
            ImportSource::Share(share) => (None, share.parameters(&self.target)),
            ImportSource::Buffer(buffer) => (
                Some(buffer.clone()),
                ShareParameters {
                    target: self.target.join(","),
                    ..ShareParameters::default()
                },
            ),
        };
        ImportSystemConfigurationRequest {
            import_buffer,
            share_parameters,
            shutdown_type: self.shutdown_type.clone(),
            host_power_state: self.host_power_state.clone(),
            time_to_wait: self.time_to_wait,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportState {
    pub target: Vec<String>,
    pub shutdown_type: String,
    pub host_power_state: String,
    pub job: ODataId,
}

pub struct ScpImport;

impl ScpImport {
    async fn import<B: Bmc>(
        server: &Server<B>,
        config: &ImportConfig,
    ) -> Result<ImportState, Error<B>> {
        config.validate()?;
        let settings = server.job_settings(config.job_timeout)?;
        let _guard = server.lock().await;
        let action = Action::<ImportSystemConfigurationRequest, TaskLocation>::new(
            ActionTarget::from(&import_system_configuration(&server.manager_id())),
        );
        let location = action
            .run(server.bmc(), &config.request())
            .await
            .map_err(Error::Bmc)?;
        info!(shutdown_type = %config.shutdown_type, "configuration import started");
        let job = server
            .wait_for_job(&location, "configuration import", settings)
            .await?;
        Ok(ImportState {
            target: config.target.clone(),
            shutdown_type: config.shutdown_type.clone(),
            host_power_state: config.host_power_state.clone(),
            job,
        })
    }
}

impl<B: Bmc> ManagedResource<B> for ScpImport {
    type Config = ImportConfig;
    type State = ImportState;

    const NAME: &'static str = "scp_import";

    #[tracing::instrument(skip_all, fields(endpoint = %server.key()))]
    async fn create(server: &Server<B>, config: &ImportConfig) -> Result<ImportState, Error<B>> {
        Self::import(server, config).await
    }

    async fn read(
        _server: &Server<B>,
        state: &ImportState,
    ) -> Result<Option<ImportState>, Error<B>> {
        Ok(Some(state.clone()))
    }

    #[tracing::instrument(skip_all, fields(endpoint = %server.key()))]
    async fn update(
        server: &Server<B>,
        _state: &ImportState,
        config: &ImportConfig,
    ) -> Result<ImportState, Error<B>> {
        Self::import(server, config).await
    }

    async fn delete(_server: &Server<B>, _state: &ImportState) -> Result<(), Error<B>> {
        Ok(())
    }
}
