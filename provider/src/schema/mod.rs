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

//! Hand-written Redfish and Dell OEM payloads used by the resources.
//!
//! Only the properties the provider reads or writes are modelled.
//! Unknown properties are ignored on deserialization.

pub mod account;
pub mod bios;
pub mod dell;
pub mod job;
pub mod manager;
pub mod storage;
pub mod system;
pub mod update;
pub mod virtual_media;

use dell_redfish_core::ODataId;
use serde::Deserialize;
use serde::Serialize;

/// Reference to another resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ODataLink {
    #[serde(rename = "@odata.id")]
    pub odata_id: ODataId,
}

/// Any Redfish resource collection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Collection {
    #[serde(default)]
    pub members: Vec<ODataLink>,
}

/// When pending settings are applied.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ApplyTime {
    #[default]
    Immediate,
    OnReset,
    AtMaintenanceWindowStart,
    InMaintenanceWindowOnReset,
}

impl ApplyTime {
    #[must_use]
    pub const fn is_maintenance_window(self) -> bool {
        matches!(
            self,
            Self::AtMaintenanceWindowStart | Self::InMaintenanceWindowOnReset
        )
    }
}

/// `@Redfish.SettingsApplyTime` annotation of a settings PATCH.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct SettingsApplyTime {
    pub apply_time: ApplyTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_window_start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_window_duration_in_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Status {
    pub health: Option<String>,
    pub state: Option<String>,
}
