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
use dell_redfish_core::Empty;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PowerState {
    On,
    Off,
    PoweringOn,
    PoweringOff,
    Paused,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ResetType {
    On,
    ForceOff,
    GracefulShutdown,
    GracefulRestart,
    ForceRestart,
    Nmi,
    ForceOn,
    PushPowerButton,
    PowerCycle,
}

impl ResetType {
    /// Reset types that reboot a running host.
    #[must_use]
    pub const fn is_restart(self) -> bool {
        matches!(
            self,
            Self::GracefulRestart | Self::ForceRestart | Self::PowerCycle | Self::Nmi
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ResetRequest {
    pub reset_type: ResetType,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ComputerSystem {
    pub id: String,
    pub power_state: Option<PowerState>,
    pub boot: Option<Boot>,
    pub bios: Option<ODataLink>,
    pub storage: Option<ODataLink>,
    pub virtual_media: Option<ODataLink>,
    pub actions: Option<SystemActions>,
}

#[derive(Debug, Deserialize)]
pub struct SystemActions {
    #[serde(rename = "#ComputerSystem.Reset")]
    pub reset: Option<Action<ResetRequest, Empty>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Boot {
    #[serde(default)]
    pub boot_order: Vec<String>,
    pub boot_source_override_enabled: Option<String>,
    pub boot_source_override_target: Option<String>,
    pub boot_source_override_mode: Option<String>,
    pub uefi_target_boot_source_override: Option<String>,
    pub boot_options: Option<ODataLink>,
}

/// `Boot` property of a system PATCH.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BootPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boot_order: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boot_source_override_enabled: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boot_source_override_target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boot_source_override_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uefi_target_boot_source_override: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SystemBootUpdate {
    pub boot: BootPatch,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BootOption {
    pub id: String,
    pub display_name: Option<String>,
    pub boot_option_enabled: Option<bool>,
    pub boot_option_reference: Option<String>,
    pub uefi_device_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BootOptionUpdate {
    pub boot_option_enabled: bool,
}
