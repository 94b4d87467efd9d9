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

use crate::config::Validate;
use crate::config::ValidationError;
use crate::context::Server;
use crate::data_sources::DataSource;
use crate::schema::storage::Storage as StorageSchema;
use crate::Error;
use dell_redfish_core::Bmc;
use serde::Deserialize;
use serde::Serialize;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFilter {
    controller_ids: Option<Vec<String>>,
    controller_names: Option<Vec<String>>,
}

/// Which storage subsystems to report.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawFilter")]
pub enum StorageFilter {
    #[default]
    All,
    /// Storage ids, e.g. `RAID.Integrated.1-1`.
    Ids(Vec<String>),
    /// Controller names, e.g. `PERC H755 Front`.
    Names(Vec<String>),
}

impl TryFrom<RawFilter> for StorageFilter {
    type Error = ValidationError;

    fn try_from(raw: RawFilter) -> Result<Self, Self::Error> {
        match (raw.controller_ids, raw.controller_names) {
            (Some(_), Some(_)) => Err(ValidationError::conflicting(
                "controller_ids",
                "controller_names",
            )),
            (Some(ids), None) => Ok(Self::Ids(ids)),
            (None, Some(names)) => Ok(Self::Names(names)),
            (None, None) => Ok(Self::All),
        }
    }
}

impl Validate for StorageFilter {
    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Ids(v) | Self::Names(v) if v.is_empty() => {
                Err(ValidationError::new("storage filter must not be empty"))
            }
            _ => Ok(()),
        }
    }
}

impl StorageFilter {
    fn matches(&self, storage: &StorageSchema) -> bool {
        match self {
            Self::All => true,
            Self::Ids(ids) => ids.contains(&storage.id),
            Self::Names(names) => storage
                .storage_controllers
                .iter()
                .filter_map(|c| c.name.as_ref())
                .chain(storage.name.as_ref())
                .any(|name| names.contains(name)),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Controller {
    pub name: Option<String>,
    pub model: Option<String>,
    pub firmware_version: Option<String>,
    pub speed_gbps: Option<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StorageInfo {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub health: Option<String>,
    pub state: Option<String>,
    pub drives: Vec<String>,
    pub controllers: Vec<Controller>,
}

impl From<&StorageSchema> for StorageInfo {
    fn from(storage: &StorageSchema) -> Self {
        Self {
            id: storage.id.clone(),
            name: storage.name.clone(),
            description: storage.description.clone(),
            health: storage.status.as_ref().and_then(|s| s.health.clone()),
            state: storage.status.as_ref().and_then(|s| s.state.clone()),
            drives: storage
                .drives
                .iter()
                .map(|d| d.odata_id.last_segment().to_string())
                .collect(),
            controllers: storage
                .storage_controllers
                .iter()
                .map(|c| Controller {
                    name: c.name.clone(),
                    model: c.model.clone(),
                    firmware_version: c.firmware_version.clone(),
                    speed_gbps: c.speed_gbps,
                })
                .collect(),
        }
    }
}

/// Storage subsystems of the system.
pub struct Storage;

impl<B: Bmc> DataSource<B> for Storage {
    type Filter = StorageFilter;
    type Output = Vec<StorageInfo>;

    const NAME: &'static str = "storage";

    async fn read(server: &Server<B>, filter: &StorageFilter) -> Result<Vec<StorageInfo>, Error<B>> {
        filter.validate()?;
        let collection = server.system_id().child("Storage");
        let found: Vec<StorageInfo> = server
            .members::<StorageSchema>(&collection)
            .await?
            .iter()
            .filter(|storage| filter.matches(storage))
            .map(|storage| StorageInfo::from(storage.as_ref()))
            .collect();
        if let StorageFilter::Ids(ids) = filter {
            if let Some(missing) = ids.iter().find(|id| !found.iter().any(|s| &s.id == *id)) {
                return Err(Error::StorageNotFound(missing.clone()));
            }
        }
        Ok(found)
    }
}
