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

//! Integration tests for the boot order resource.

use dell_redfish_provider::error::ErrorCategory;
use dell_redfish_provider::resources::boot_order::BootOrder;
use dell_redfish_provider::resources::boot_order::BootSelection;
use dell_redfish_provider::resources::boot_order::Config;
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
use dell_redfish_tests::Expect;
use dell_redfish_tests::ODATA_ID;
use serde_json::from_value;
use serde_json::json;
use serde_json::Value;
use std::error::Error as StdError;
use std::sync::Arc;
use tokio::test;

const HDD: &str = "HardDisk.List.1-1";
const PXE: &str = "NIC.PxeDevice.1-1";

fn boot_option(enabled: bool) -> Value {
    json!({
        ODATA_ID: format!("{SYSTEM}/BootOptions/{HDD}"),
        "Id": HDD,
        "DisplayName": "Hard drive C:",
        "BootOptionEnabled": enabled,
        "BootOptionReference": HDD
    })
}

#[test(start_paused = true)]
async fn boot_order_applied_after_reboot() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    let reordered = system("On", json!({ "Boot": { "BootOrder": [HDD, PXE] } }));
    bmc.expect_all([
        Expect::get(SYSTEM, system("On", json!({}))),
        Expect::update(
            format!("{SYSTEM}/Settings"),
            json!({ "Boot": { "BootOrder": [HDD, PXE] } }),
            job_started(),
        ),
        Expect::get(SYSTEM, system("On", json!({}))),
        Expect::action(SYSTEM_RESET, reset("ForceRestart"), json!({})),
        Expect::get(JOB, job("Running", "Task successfully scheduled.")),
        Expect::get(JOB, job("Completed", "Job completed successfully.")),
        Expect::get(SYSTEM, reordered),
    ]);
    let server = server(bmc.clone());
    let config: Config = from_value(json!({ "boot_order": [HDD, PXE] }))?;

    let state = BootOrder::create(&server, &config).await?;

    assert_eq!(
        state.boot,
        BootSelection::BootOrder(vec![HDD.into(), PXE.into()])
    );
    assert!(bmc.is_exhausted());
    Ok(())
}

#[test]
async fn unchanged_boot_order_is_not_applied() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    bmc.expect(Expect::get(SYSTEM, system("On", json!({}))));
    let server = server(bmc.clone());
    let config: Config = from_value(json!({ "boot_order": [PXE, HDD] }))?;

    BootOrder::create(&server, &config).await?;

    assert!(bmc.is_exhausted());
    Ok(())
}

#[test]
async fn boot_order_must_list_every_option() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    bmc.expect(Expect::get(SYSTEM, system("On", json!({}))));
    let server = server(bmc.clone());
    let config: Config = from_value(json!({ "boot_order": [HDD] }))?;

    let err = BootOrder::create(&server, &config).await.unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Validation);
    assert!(bmc.is_exhausted());
    Ok(())
}

#[test]
async fn boot_order_and_boot_options_are_exclusive() {
    let config = from_value::<Config>(json!({
        "boot_order": [HDD, PXE],
        "boot_options": [{ "boot_option_reference": HDD, "boot_option_enabled": false }]
    }));
    assert!(config.is_err());
}

#[test(start_paused = true)]
async fn boot_option_disabled_without_job() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    let option = format!("{SYSTEM}/BootOptions/{HDD}");
    bmc.expect_all([
        Expect::get(SYSTEM, system("Off", json!({}))),
        Expect::get(&option, boot_option(true)),
        Expect::update(&option, json!({ "BootOptionEnabled": false }), json!({})),
        Expect::get(SYSTEM, system("Off", json!({}))),
        // Host is off, so it is powered on instead of restarted.
        Expect::action(SYSTEM_RESET, reset("On"), json!({})),
        Expect::get(SYSTEM, system("On", json!({}))),
        Expect::get(&option, boot_option(false)),
    ]);
    let server = server(bmc.clone());
    let config: Config = from_value(json!({
        "boot_options": [{ "boot_option_reference": HDD, "boot_option_enabled": false }]
    }))?;

    BootOrder::create(&server, &config).await?;

    assert!(bmc.is_exhausted());
    Ok(())
}
