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

use crate::schema::ODataLink;
use dell_redfish_core::Action;
use dell_redfish_core::TaskLocation;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateService {
    pub firmware_inventory: Option<ODataLink>,
    pub actions: Option<UpdateServiceActions>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateServiceActions {
    #[serde(rename = "#UpdateService.SimpleUpdate")]
    pub simple_update: Option<Action<SimpleUpdateRequest, TaskLocation>>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct SimpleUpdateRequest {
    #[serde(rename = "ImageURI")]
    pub image_uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_protocol: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SoftwareInventory {
    pub id: String,
    pub name: Option<String>,
    pub version: Option<String>,
    pub updateable: Option<bool>,
    pub software_id: Option<String>,
    pub release_date: Option<String>,
}
