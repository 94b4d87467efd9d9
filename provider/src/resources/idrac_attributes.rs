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

//! Dell iDRAC attributes, e.g. `SNMP.1.AgentCommunity`.

use crate::config::Validate;
use crate::config::ValidationError;
use crate::context::Server;
use crate::resources::ManagedResource;
use crate::schema::dell::idrac_attributes;
use crate::schema::dell::DellAttributes;
use crate::schema::dell::DellAttributesUpdate;
use crate::Error;
use dell_redfish_core::Bmc;
use dell_redfish_core::Empty;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use tracing::info;

/// iDRAC never returns the value of these attributes.
fn is_password(name: &str) -> bool {
    name.contains("Password")
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub attributes: BTreeMap<String, JsonValue>,
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.attributes.is_empty() {
            return Err(ValidationError::new("attributes must not be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct State {
    pub attributes: BTreeMap<String, JsonValue>,
}

impl State {
    /// Current values of the `wanted` keys. Passwords keep the
    /// configured value.
    fn observed(current: &Map<String, JsonValue>, wanted: &BTreeMap<String, JsonValue>) -> Self {
        let attributes = wanted
            .iter()
            .filter_map(|(name, value)| {
                if is_password(name) {
                    Some((name.clone(), value.clone()))
                } else {
                    current.get(name).map(|v| (name.clone(), v.clone()))
                }
            })
            .collect();
        Self { attributes }
    }
}

pub struct IdracAttributes;

impl IdracAttributes {
    async fn converge<B: Bmc>(server: &Server<B>, config: &Config) -> Result<State, Error<B>> {
        config.validate()?;
        let _guard = server.lock().await;
        let id = idrac_attributes(&server.manager_id());
        let current = server.get::<DellAttributes>(&id).await?;
        if let Some(unknown) = config
            .attributes
            .keys()
            .find(|name| !current.attributes.contains_key(*name))
        {
            return Err(Error::AttributeNotFound(unknown.clone()));
        }
        let changed: Map<String, JsonValue> = config
            .attributes
            .iter()
            .filter(|(name, value)| {
                is_password(name) || current.attributes.get(*name) != Some(*value)
            })
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        if changed.is_empty() {
            info!("iDRAC attributes already set");
            return Ok(State::observed(&current.attributes, &config.attributes));
        }
        info!(count = changed.len(), "updating iDRAC attributes");
        let _: Empty = server
            .bmc()
            .update(&id, None, &DellAttributesUpdate { attributes: changed })
            .await
            .map_err(Error::Bmc)?;
        let current = server.get::<DellAttributes>(&id).await?;
        Ok(State::observed(&current.attributes, &config.attributes))
    }
}

impl<B: Bmc> ManagedResource<B> for IdracAttributes {
    type Config = Config;
    type State = State;

    const NAME: &'static str = "idrac_attributes";

    #[tracing::instrument(skip_all, fields(endpoint = %server.key()))]
    async fn create(server: &Server<B>, config: &Config) -> Result<State, Error<B>> {
        Self::converge(server, config).await
    }

    async fn read(server: &Server<B>, state: &State) -> Result<Option<State>, Error<B>> {
        let current = server
            .find::<DellAttributes>(&idrac_attributes(&server.manager_id()))
            .await?;
        Ok(current.map(|current| State::observed(&current.attributes, &state.attributes)))
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
