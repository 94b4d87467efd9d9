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

//! Provider configuration.
//!
//! The provider reads a TOML document with default credentials and a
//! table of named servers:
//!
//! ```toml
//! user = "root"
//! password = "calvin"
//! log_level = "debug"
//!
//! [redfish_servers.rack1]
//! endpoint = "https://10.0.0.1"
//! ssl_insecure = true
//! ```
//!
//! Resources address a server either inline or by `redfish_alias`.

use crate::poll::InvalidPollSettings;
use dell_redfish_core::BmcCredentials;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::path::Path;
use std::path::PathBuf;
use url::Url;

pub const ENV_USER: &str = "REDFISH_USER";
pub const ENV_PASSWORD: &str = "REDFISH_PASSWORD";
pub const ENV_LOG_LEVEL: &str = "REDFISH_LOG_LEVEL";

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_POLL_INTERVAL: u64 = 10;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    #[serde(default)]
    pub redfish_servers: BTreeMap<String, RedfishServer>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub log_level: Option<String>,
    /// Seconds between job status checks when a resource does not
    /// configure its own interval.
    pub poll_interval: Option<u64>,
}

/// Connection parameters of one server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RedfishServer {
    pub endpoint: Option<Url>,
    pub user: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub ssl_insecure: Option<bool>,
    pub redfish_alias: Option<String>,
}

impl RedfishServer {
    #[must_use]
    pub fn alias(alias: impl Into<String>) -> Self {
        Self {
            redfish_alias: Some(alias.into()),
            ..Self::default()
        }
    }
}

/// Server block with aliases and defaults applied.
#[derive(Debug, Clone)]
pub struct ResolvedServer {
    pub endpoint: Url,
    pub credentials: BmcCredentials,
    pub ssl_insecure: bool,
}

impl ProviderConfig {
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML or has
    /// unknown keys.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_toml_str(&content)
    }

    /// Fill missing credentials and override the log level from the
    /// process environment.
    #[must_use]
    pub fn apply_env(self) -> Self {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    #[must_use]
    pub fn apply_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if self.user.is_none() {
            self.user = lookup(ENV_USER);
        }
        if self.password.is_none() {
            self.password = lookup(ENV_PASSWORD);
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = Some(level);
        }
        self
    }

    #[must_use]
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    #[must_use]
    pub fn poll_interval(&self) -> u64 {
        self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval == Some(0) {
            return Err(ConfigError::Invalid(
                "poll_interval must be greater than zero".into(),
            ));
        }
        for (name, server) in &self.redfish_servers {
            if server.redfish_alias.is_some() {
                return Err(ConfigError::Invalid(format!(
                    "server {name}: redfish_alias cannot be nested"
                )));
            }
            if let Some(endpoint) = &server.endpoint {
                check_scheme(endpoint)?;
            }
        }
        Ok(())
    }

    /// Merge a resource server block with its alias and provider
    /// defaults. Values set on the block win.
    ///
    /// # Errors
    ///
    /// Returns an error if the alias is unknown or the endpoint or
    /// credentials are missing.
    pub fn resolve(&self, server: &RedfishServer) -> Result<ResolvedServer, ConfigError> {
        let base = match &server.redfish_alias {
            Some(alias) => Some(
                self.redfish_servers
                    .get(alias)
                    .ok_or_else(|| ConfigError::UnknownAlias(alias.clone()))?,
            ),
            None => None,
        };
        let endpoint = server
            .endpoint
            .as_ref()
            .or_else(|| base.and_then(|b| b.endpoint.as_ref()))
            .cloned()
            .ok_or(ConfigError::Missing("endpoint"))?;
        check_scheme(&endpoint)?;
        let user = server
            .user
            .as_ref()
            .or_else(|| base.and_then(|b| b.user.as_ref()))
            .or(self.user.as_ref())
            .cloned()
            .ok_or(ConfigError::Missing("user"))?;
        let password = server
            .password
            .as_ref()
            .or_else(|| base.and_then(|b| b.password.as_ref()))
            .or(self.password.as_ref())
            .cloned()
            .ok_or(ConfigError::Missing("password"))?;
        let ssl_insecure = server
            .ssl_insecure
            .or_else(|| base.and_then(|b| b.ssl_insecure))
            .unwrap_or(false);
        Ok(ResolvedServer {
            endpoint,
            credentials: BmcCredentials::new(user, password),
            ssl_insecure,
        })
    }
}

fn check_scheme(endpoint: &Url) -> Result<(), ConfigError> {
    match endpoint.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Invalid(format!(
            "endpoint {endpoint}: unsupported scheme {other}"
        ))),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Toml(toml::de::Error),
    UnknownAlias(String),
    Missing(&'static str),
    Invalid(String),
    Client(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Io(path, err) => write!(f, "cannot read {}: {err}", path.display()),
            Self::Toml(err) => write!(f, "cannot parse configuration: {err}"),
            Self::UnknownAlias(alias) => write!(f, "unknown redfish_alias: {alias}"),
            Self::Missing(field) => write!(
                f,
                "{field} is not set on the server, its alias or the provider"
            ),
            Self::Invalid(err) => write!(f, "{err}"),
            Self::Client(err) => write!(f, "cannot create HTTP client: {err}"),
        }
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io(_, err) => Some(err),
            Self::Toml(err) => Some(err),
            _ => None,
        }
    }
}

/// Configuration value that is rejected before any remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Both blocks of a mutually exclusive pair are set.
    #[must_use]
    pub fn conflicting(a: &str, b: &str) -> Self {
        Self(format!("only one of {a} or {b} can be set"))
    }

    /// Neither block of a required pair is set.
    #[must_use]
    pub fn missing_one_of(a: &str, b: &str) -> Self {
        Self(format!("one of {a} or {b} must be set"))
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        self.0.fmt(f)
    }
}

impl StdError for ValidationError {}

impl From<InvalidPollSettings> for ValidationError {
    fn from(err: InvalidPollSettings) -> Self {
        Self(err.0)
    }
}

/// Configuration checked before the resource touches the server.
pub trait Validate {
    /// # Errors
    ///
    /// Returns the first rejected value.
    fn validate(&self) -> Result<(), ValidationError>;
}
