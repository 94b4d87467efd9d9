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

use crate::context::Server;
use crate::data_sources::DataSource;
use crate::resources::firmware_update::UPDATE_SERVICE;
use crate::schema::update::SoftwareInventory;
use crate::schema::update::UpdateService;
use crate::Error;
use dell_redfish_core::Bmc;
use dell_redfish_core::ODataId;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Firmware {
    pub id: String,
    pub name: Option<String>,
    pub version: Option<String>,
    pub updateable: Option<bool>,
    pub software_id: Option<String>,
    pub release_date: Option<String>,
}

impl From<&SoftwareInventory> for Firmware {
    fn from(v: &SoftwareInventory) -> Self {
        Self {
            id: v.id.clone(),
            name: v.name.clone(),
            version: v.version.clone(),
            updateable: v.updateable,
            software_id: v.software_id.clone(),
            release_date: v.release_date.clone(),
        }
    }
}

/// Installed firmware components.
pub struct FirmwareInventory;

impl<B: Bmc> DataSource<B> for FirmwareInventory {
    type Filter = ();
    type Output = Vec<Firmware>;

    const NAME: &'static str = "firmware_inventory";

    async fn read(server: &Server<B>, _filter: &()) -> Result<Vec<Firmware>, Error<B>> {
        let service = server
            .get::<UpdateService>(&ODataId::from(UPDATE_SERVICE))
            .await?;
        let inventory = service.firmware_inventory.as_ref().map_or_else(
            || ODataId::from(UPDATE_SERVICE).child("FirmwareInventory"),
            |link| link.odata_id.clone(),
        );
        Ok(server
            .members::<SoftwareInventory>(&inventory)
            .await?
            .iter()
            .map(|v| Firmware::from(v.as_ref()))
            .collect())
    }
}
