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
use crate::schema::system::BootOption;
use crate::Error;
use dell_redfish_core::Bmc;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BootOptionEntry {
    pub id: String,
    pub display_name: Option<String>,
    pub boot_option_enabled: Option<bool>,
    pub boot_option_reference: Option<String>,
    pub uefi_device_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SystemBootInfo {
    pub system_id: String,
    pub boot_order: Vec<String>,
    pub boot_source_override_enabled: Option<String>,
    pub boot_source_override_target: Option<String>,
    pub boot_source_override_mode: Option<String>,
    pub uefi_target_boot_source_override: Option<String>,
    pub boot_options: Vec<BootOptionEntry>,
}

/// Boot configuration and boot options of the system.
pub struct SystemBoot;

impl<B: Bmc> DataSource<B> for SystemBoot {
    type Filter = ();
    type Output = SystemBootInfo;

    const NAME: &'static str = "system_boot";

    async fn read(server: &Server<B>, _filter: &()) -> Result<SystemBootInfo, Error<B>> {
        let system = server.system().await?;
        let boot = system.boot.clone().unwrap_or_default();
        let options = boot.boot_options.as_ref().map_or_else(
            || server.system_id().child("BootOptions"),
            |link| link.odata_id.clone(),
        );
        let boot_options = server
            .members::<BootOption>(&options)
            .await?
            .iter()
            .map(|option| BootOptionEntry {
                id: option.id.clone(),
                display_name: option.display_name.clone(),
                boot_option_enabled: option.boot_option_enabled,
                boot_option_reference: option.boot_option_reference.clone(),
                uefi_device_path: option.uefi_device_path.clone(),
            })
            .collect();
        Ok(SystemBootInfo {
            system_id: system.id.clone(),
            boot_order: boot.boot_order,
            boot_source_override_enabled: boot.boot_source_override_enabled,
            boot_source_override_target: boot.boot_source_override_target,
            boot_source_override_mode: boot.boot_source_override_mode,
            uefi_target_boot_source_override: boot.uefi_target_boot_source_override,
            boot_options,
        })
    }
}
