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
use crate::schema::SettingsApplyTime;
use crate::schema::Status;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Storage {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<Status>,
    #[serde(default)]
    pub drives: Vec<ODataLink>,
    pub controllers: Option<ODataLink>,
    #[serde(default)]
    pub storage_controllers: Vec<StorageControllerSummary>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StorageControllerSummary {
    pub member_id: Option<String>,
    pub name: Option<String>,
    pub model: Option<String>,
    pub firmware_version: Option<String>,
    #[serde(default)]
    pub speed_gbps: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ControllerRates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistency_check_rate_percent: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rebuild_rate_percent: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StorageController {
    pub id: String,
    pub name: Option<String>,
    pub controller_rates: Option<ControllerRates>,
    pub oem: Option<ControllerOem>,
}

impl StorageController {
    /// Dell OEM controller attributes.
    #[must_use]
    pub fn dell_attributes(&self) -> Option<&Map<String, JsonValue>> {
        self.oem
            .as_ref()
            .and_then(|oem| oem.dell.as_ref())
            .map(|dell| &dell.dell_storage_controller)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControllerOem {
    #[serde(rename = "Dell", skip_serializing_if = "Option::is_none")]
    pub dell: Option<DellControllerOem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DellControllerOem {
    #[serde(rename = "DellStorageController", default)]
    pub dell_storage_controller: Map<String, JsonValue>,
}

/// Body of controller `Settings` PATCH.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StorageControllerSettingsUpdate {
    #[serde(rename = "@Redfish.SettingsApplyTime")]
    pub apply_time: SettingsApplyTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_rates: Option<ControllerRates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oem: Option<ControllerOem>,
}
