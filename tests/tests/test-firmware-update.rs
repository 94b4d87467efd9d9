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

//! Integration tests for firmware updates.

use dell_redfish_provider::error::ErrorCategory;
use dell_redfish_provider::resources::firmware_update::Config;
use dell_redfish_provider::resources::firmware_update::FirmwareUpdate;
use dell_redfish_provider::resources::firmware_update::State;
use dell_redfish_provider::resources::firmware_update::UPDATE_SERVICE;
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
use dell_redfish_tests::Failure;
use dell_redfish_tests::ODATA_ID;
use serde_json::from_value;
use serde_json::json;
use serde_json::Value;
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;
use tokio::test;
use tokio::time::Instant;

const IMAGE: &str = "http://10.0.0.5/BIOS_W1NXD_WN64_2.18.1.EXE";

fn simple_update() -> String {
    format!("{UPDATE_SERVICE}/Actions/UpdateService.SimpleUpdate")
}

fn update_service() -> Value {
    json!({
        ODATA_ID: UPDATE_SERVICE,
        "Id": "UpdateService",
        "FirmwareInventory": { ODATA_ID: format!("{UPDATE_SERVICE}/FirmwareInventory") },
        "Actions": {
            "#UpdateService.SimpleUpdate": {
                "target": simple_update(),
                "TransferProtocol@Redfish.AllowableValues": ["HTTP", "HTTPS", "NFS", "CIFS", "TFTP"]
            }
        }
    })
}

#[test(start_paused = true)]
async fn scheduled_update_reboots_host() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    bmc.expect_all([
        Expect::get(UPDATE_SERVICE, update_service()),
        Expect::action(simple_update(), json!({ "ImageURI": IMAGE }), job_started()),
        Expect::get(JOB, job("Downloading", "Downloading the update package.")),
        Expect::get(JOB, job("Scheduled", "Task successfully scheduled.")),
        Expect::get(JOB, job("Scheduled", "Task successfully scheduled.")),
        Expect::get(SYSTEM, system("On", json!({}))),
        Expect::action(SYSTEM_RESET, reset("ForceRestart"), json!({})),
        // Host is flashing the package.
        Expect::get(JOB, "{}").failing(Failure::Unreachable),
        Expect::get(JOB, job("Completed", "Job completed successfully.")),
    ]);
    let server = server(bmc.clone());
    let config: Config = from_value(json!({ "image_uri": IMAGE }))?;

    let state = FirmwareUpdate::create(&server, &config).await?;

    assert!(state.rebooted);
    assert_eq!(state.job.to_string(), JOB);
    assert!(bmc.is_exhausted());
    Ok(())
}

#[test(start_paused = true)]
async fn staging_and_flashing_share_job_timeout() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    bmc.expect_all([
        Expect::get(UPDATE_SERVICE, update_service()),
        Expect::action(simple_update(), json!({ "ImageURI": IMAGE }), job_started()),
        Expect::get(JOB, job("Downloading", "Downloading the update package.")),
        Expect::get(JOB, job("Scheduled", "Task successfully scheduled.")),
        Expect::get(JOB, job("Scheduled", "Task successfully scheduled.")),
        Expect::get(SYSTEM, system("On", json!({}))),
        Expect::action(SYSTEM_RESET, reset("ForceRestart"), json!({})),
    ]);
    // 20 seconds are left after staging: checks at 10, 20 and 30.
    let running = || Expect::get(JOB, job("Running", "Updating firmware."));
    bmc.expect_all((0..3).map(|_| running()));
    let server = server(bmc.clone());
    let config: Config = from_value(json!({ "image_uri": IMAGE, "job_timeout": 30 }))?;
    let start = Instant::now();

    let err = FirmwareUpdate::create(&server, &config).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Timeout {
            operation: "firmware update",
            ..
        }
    ));
    assert_eq!(start.elapsed(), Duration::from_secs(30));
    assert!(bmc.is_exhausted());
    Ok(())
}

#[test]
async fn immediate_update_does_not_reboot() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    bmc.expect_all([
        Expect::get(UPDATE_SERVICE, update_service()),
        Expect::action(
            simple_update(),
            json!({ "ImageURI": "https://10.0.0.5/iDRAC-with-Lifecycle-Controller.exe", "TransferProtocol": "HTTPS" }),
            job_started(),
        ),
        Expect::get(JOB, job("Completed", "Job completed successfully.")),
        Expect::get(JOB, job("Completed", "Job completed successfully.")),
    ]);
    let server = server(bmc.clone());
    let config: Config = from_value(json!({
        "image_uri": "https://10.0.0.5/iDRAC-with-Lifecycle-Controller.exe",
        "transfer_protocol": "HTTPS"
    }))?;

    let state = FirmwareUpdate::create(&server, &config).await?;

    assert!(!state.rebooted);
    assert!(bmc.is_exhausted());
    Ok(())
}

#[test]
async fn failed_package_stops_update() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    bmc.expect_all([
        Expect::get(UPDATE_SERVICE, update_service()),
        Expect::action(simple_update(), json!({ "ImageURI": IMAGE }), job_started()),
        Expect::get(JOB, job("Failed", "Unable to verify Update Package signature.")),
    ]);
    let server = server(bmc.clone());
    let config: Config = from_value(json!({ "image_uri": IMAGE }))?;

    let err = FirmwareUpdate::create(&server, &config).await.unwrap_err();

    assert!(matches!(
        &err,
        Error::JobFailed { reason, .. } if reason == "Unable to verify Update Package signature."
    ));
    assert_eq!(err.category(), ErrorCategory::ConvergenceFailed);
    assert!(bmc.is_exhausted());
    Ok(())
}

#[test]
async fn update_with_same_image_is_noop() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    let server = server(bmc.clone());
    let config: Config = from_value(json!({ "image_uri": IMAGE }))?;
    let state: State = from_value(json!({
        "image_uri": IMAGE,
        "transfer_protocol": null,
        "job": JOB,
        "rebooted": true
    }))?;

    let updated = FirmwareUpdate::update(&server, &state, &config).await?;

    assert_eq!(updated, state);
    assert!(bmc.is_exhausted());
    Ok(())
}

#[test]
async fn unsupported_scheme_is_rejected() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    let server = server(bmc.clone());
    let config: Config = from_value(json!({ "image_uri": "scp://10.0.0.5/fw.exe" }))?;

    let err = FirmwareUpdate::create(&server, &config).await.unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Validation);
    Ok(())
}
