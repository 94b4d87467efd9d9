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

//! Integration tests for BIOS attributes.

use dell_redfish_provider::error::ErrorCategory;
use dell_redfish_provider::resources::bios::Bios;
use dell_redfish_provider::resources::bios::Config;
use dell_redfish_provider::ManagedResource;
use dell_redfish_tests::fixtures::job;
use dell_redfish_tests::fixtures::job_started;
use dell_redfish_tests::fixtures::reset;
use dell_redfish_tests::fixtures::system;
use dell_redfish_tests::fixtures::JOB;
use dell_redfish_tests::fixtures::SYSTEM;
use dell_redfish_tests::fixtures::SYSTEM_RESET;
use dell_redfish_tests::server;
use dell_redfish_tests::Bmc;
use dell_redfish_tests::Error;
use dell_redfish_tests::Expect;
use dell_redfish_tests::ODATA_ID;
use serde_json::from_value;
use serde_json::json;
use serde_json::Value;
use std::error::Error as StdError;
use std::sync::Arc;
use tokio::test;

fn bios_id() -> String {
    format!("{SYSTEM}/Bios")
}

fn bios(num_lock: &str, boot_mode: &str) -> Value {
    json!({
        ODATA_ID: bios_id(),
        "Id": "Bios",
        "Attributes": {
            "NumLock": num_lock,
            "BootMode": boot_mode,
            "ProcVirtualization": "Enabled",
            "SysProfile": "PerfPerWattOptimizedDapc"
        }
    })
}

#[test(start_paused = true)]
async fn changed_attributes_applied_on_reboot() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    bmc.expect_all([
        Expect::get(bios_id(), bios("On", "Uefi")),
        // Unchanged BootMode is not sent.
        Expect::update(
            format!("{}/Settings", bios_id()),
            json!({
                "@Redfish.SettingsApplyTime": { "ApplyTime": "OnReset" },
                "Attributes": { "NumLock": "Off" }
            }),
            job_started(),
        ),
        Expect::get(SYSTEM, system("On", json!({}))),
        Expect::action(SYSTEM_RESET, reset("ForceRestart"), json!({})),
        Expect::get(JOB, job("Running", "Task successfully scheduled.")),
        Expect::get(JOB, job("Completed", "Job completed successfully.")),
        Expect::get(bios_id(), bios("Off", "Uefi")),
    ]);
    let server = server(bmc.clone());
    let config: Config = from_value(json!({
        "attributes": { "NumLock": "Off", "BootMode": "Uefi" }
    }))?;

    let state = Bios::create(&server, &config).await?;

    assert_eq!(state.attributes["NumLock"], json!("Off"));
    assert_eq!(state.attributes.len(), 2);
    assert_eq!(state.job.map(|job| job.to_string()), Some(JOB.to_string()));
    assert!(bmc.is_exhausted());
    Ok(())
}

#[test]
async fn attributes_already_set_skip_job() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    bmc.expect(Expect::get(bios_id(), bios("On", "Uefi")));
    let server = server(bmc.clone());
    let config: Config = from_value(json!({ "attributes": { "NumLock": "On" } }))?;

    let state = Bios::create(&server, &config).await?;

    assert_eq!(state.job, None);
    assert!(bmc.is_exhausted());
    Ok(())
}

#[test]
async fn off_host_is_powered_on_for_settings() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    bmc.expect_all([
        Expect::get(bios_id(), bios("On", "Uefi")),
        Expect::update(
            format!("{}/Settings", bios_id()),
            json!({
                "@Redfish.SettingsApplyTime": { "ApplyTime": "OnReset" },
                "Attributes": { "ProcVirtualization": "Disabled" }
            }),
            job_started(),
        ),
        Expect::get(SYSTEM, system("Off", json!({}))),
        Expect::action(SYSTEM_RESET, reset("On"), json!({})),
        Expect::get(JOB, job("Completed", "Job completed successfully.")),
        Expect::get(bios_id(), bios("On", "Uefi")),
    ]);
    let server = server(bmc.clone());
    let config: Config = from_value(json!({
        "attributes": { "ProcVirtualization": "Disabled" }
    }))?;

    Bios::create(&server, &config).await?;

    assert!(bmc.is_exhausted());
    Ok(())
}

#[test]
async fn maintenance_window_returns_scheduled_job() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    bmc.expect_all([
        Expect::get(bios_id(), bios("On", "Uefi")),
        Expect::update(
            format!("{}/Settings", bios_id()),
            json!({
                "@Redfish.SettingsApplyTime": {
                    "ApplyTime": "InMaintenanceWindowOnReset",
                    "MaintenanceWindowStartTime": "2026-11-05T23:00:00-06:00",
                    "MaintenanceWindowDurationInSeconds": 7200
                },
                "Attributes": { "SysProfile": "PerfOptimized" }
            }),
            job_started(),
        ),
    ]);
    let server = server(bmc.clone());
    let config: Config = from_value(json!({
        "attributes": { "SysProfile": "PerfOptimized" },
        "settings_apply_time": "InMaintenanceWindowOnReset",
        "maintenance_window": { "start_time": "2026-11-05T23:00:00-06:00", "duration": 7200 }
    }))?;

    let state = Bios::create(&server, &config).await?;

    assert_eq!(state.job.map(|job| job.to_string()), Some(JOB.to_string()));
    assert_eq!(state.attributes["SysProfile"], json!("PerfPerWattOptimizedDapc"));
    assert!(bmc.is_exhausted());
    Ok(())
}

#[test]
async fn unknown_attribute_is_reported() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    bmc.expect(Expect::get(bios_id(), bios("On", "Uefi")));
    let server = server(bmc.clone());
    let config: Config = from_value(json!({ "attributes": { "NumLok": "Off" } }))?;

    let err = Bios::create(&server, &config).await.unwrap_err();

    assert!(matches!(&err, Error::AttributeNotFound(name) if name == "NumLok"));
    assert_eq!(err.category(), ErrorCategory::State);
    assert!(bmc.is_exhausted());
    Ok(())
}

#[test]
async fn maintenance_apply_time_needs_window() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    let server = server(bmc.clone());
    let config: Config = from_value(json!({
        "attributes": { "NumLock": "Off" },
        "settings_apply_time": "AtMaintenanceWindowStart"
    }))?;

    let err = Bios::create(&server, &config).await.unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Validation);
    Ok(())
}
