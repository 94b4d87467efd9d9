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

//! iDRAC SSL certificate import.

use crate::config::Validate;
use crate::config::ValidationError;
use crate::context::Server;
use crate::resources::ManagedResource;
use crate::schema::dell::import_ssl_certificate;
use crate::schema::dell::ImportSslCertificateRequest;
use crate::schema::system::ResetType;
use crate::Error;
use dell_redfish_core::Action;
use dell_redfish_core::ActionTarget;
use dell_redfish_core::Bmc;
use dell_redfish_core::Empty;
use serde::Deserialize;
use serde::Serialize;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::time::Duration;
use tracing::info;

/// iDRAC drops off the network shortly after the reset request.
const RESET_SETTLE: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CertificateType {
    Server,
    CustomCertificate,
    #[serde(rename = "CSC")]
    Csc,
    ClientTrustCertificate,
}

impl CertificateType {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Server => "Server",
            Self::CustomCertificate => "CustomCertificate",
            Self::Csc => "CSC",
            Self::ClientTrustCertificate => "ClientTrustCertificate",
        }
    }
}

const fn default_reset_timeout() -> u64 {
    600
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub certificate_type: CertificateType,
    /// PEM certificate, or base64 PKCS#12 for a custom certificate.
    pub ssl_certificate_content: String,
    pub passphrase: Option<String>,
    /// Seconds to wait for iDRAC to come back after the reset.
    #[serde(default = "default_reset_timeout")]
    pub reset_timeout: u64,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Config")
            .field("certificate_type", &self.certificate_type)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "[REDACTED]"))
            .field("reset_timeout", &self.reset_timeout)
            .finish_non_exhaustive()
    }
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.ssl_certificate_content.trim().is_empty() {
            return Err(ValidationError::new(
                "ssl_certificate_content must not be empty",
            ));
        }
        if self.passphrase.is_some() && self.certificate_type != CertificateType::CustomCertificate
        {
            return Err(ValidationError::new(
                "passphrase is only valid for CustomCertificate",
            ));
        }
        if self.reset_timeout == 0 {
            return Err(ValidationError::new("reset_timeout must be greater than zero"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct State {
    pub certificate_type: CertificateType,
}

pub struct Certificate;

impl Certificate {
    async fn import<B: Bmc>(server: &Server<B>, config: &Config) -> Result<State, Error<B>> {
        config.validate()?;
        let settings = server.job_settings(config.reset_timeout)?;
        let _guard = server.lock().await;
        Action::<ImportSslCertificateRequest, Empty>::new(ActionTarget::from(
            &import_ssl_certificate(&server.manager_id()),
        ))
        .run(
            server.bmc(),
            &ImportSslCertificateRequest {
                certificate_type: config.certificate_type.as_str().into(),
                ssl_certificate_file: config.ssl_certificate_content.clone(),
                passphrase: config.passphrase.clone(),
            },
        )
        .await
        .map_err(Error::Bmc)?;
        info!(certificate_type = ?config.certificate_type, "certificate imported");
        server
            .reset_manager_and_wait(ResetType::GracefulRestart, RESET_SETTLE, settings)
            .await?;
        Ok(State {
            certificate_type: config.certificate_type,
        })
    }
}

impl<B: Bmc> ManagedResource<B> for Certificate {
    type Config = Config;
    type State = State;

    const NAME: &'static str = "certificate";

    #[tracing::instrument(skip_all, fields(endpoint = %server.key()))]
    async fn create(server: &Server<B>, config: &Config) -> Result<State, Error<B>> {
        Self::import(server, config).await
    }

    async fn read(_server: &Server<B>, state: &State) -> Result<Option<State>, Error<B>> {
        Ok(Some(state.clone()))
    }

    #[tracing::instrument(skip_all, fields(endpoint = %server.key()))]
    async fn update(
        server: &Server<B>,
        _state: &State,
        config: &Config,
    ) -> Result<State, Error<B>> {
        Self::import(server, config).await
    }

    async fn delete(_server: &Server<B>, _state: &State) -> Result<(), Error<B>> {
        Ok(())
    }
}
