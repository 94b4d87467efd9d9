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

//! Integration tests for Server Configuration Profile export and import.

use dell_redfish_provider::error::ErrorCategory;
use dell_redfish_provider::resources::scp::ExportConfig;
use dell_redfish_provider::resources::scp::ImportConfig;
use dell_redfish_provider::resources::scp::ScpExport;
use dell_redfish_provider::resources::scp::ScpImport;
use dell_redfish_provider::ManagedResource;
use dell_redfish_tests::fixtures::job;
use dell_redfish_tests::fixtures::job_started;
use dell_redfish_tests::fixtures::EXPORT_SCP;
use dell_redfish_tests::fixtures::IMPORT_SCP;
use dell_redfish_tests::fixtures::JOB;
use dell_redfish_tests::server;
use dell_redfish_tests::Bmc;
use dell_redfish_tests::Error;
use dell_redfish_tests::Expect;
use serde_json::from_value;
use serde_json::json;
use std::error::Error as StdError;
use std::sync::Arc;
use tokio::test;

const PROFILE: &str = r#"<SystemConfiguration><Component FQDD="iDRAC.Embedded.1"><Attribute Name="NTPConfigGroup.1#NTP1">10.0.0.2</Attribute></Component></SystemConfiguration>"#;

#[test(start_paused = true)]
async fn export_to_https_share() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    bmc.expect_all([
        Expect::action(
            EXPORT_SCP,
            json!({
                "ExportFormat": "XML",
                "ExportUse": "Default",
                "IncludeInExport": "Default",
                "ShareParameters": {
                    "Target": "BIOS,IDRAC",
                    "ShareType": "HTTPS",
                    "IPAddress": "10.0.0.5",
                    "ShareName": "scp",
                    "FileName": "r750.xml",
                    "IgnoreCertificateWarning": "Enabled"
                }
            }),
            job_started(),
        ),
        Expect::get(JOB, job("Running", "Exporting Server Configuration Profile.")),
        Expect::get(JOB, job("Completed", "Successfully exported Server Configuration Profile")),
    ]);
    let server = server(bmc.clone());
    let config: ExportConfig = from_value(json!({
        "share_parameters": {
            "share_type": "HTTPS",
            "ip_address": "10.0.0.5",
            "share_name": "scp",
            "file_name": "r750.xml",
            "ignore_certificate_warning": true
        },
        "target": ["BIOS", "IDRAC"]
    }))?;

    let state = ScpExport::create(&server, &config).await?;

    assert_eq!(state.job.to_string(), JOB);
    assert_eq!(state.export_format, "XML");
    assert!(bmc.is_exhausted());
    Ok(())
}

#[test]
async fn import_from_buffer() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    bmc.expect_all([
        Expect::action(
            IMPORT_SCP,
            json!({
                "ImportBuffer": PROFILE,
                "ShareParameters": { "Target": "IDRAC" },
                "ShutdownType": "NoReboot",
                "HostPowerState": "On",
                "TimeToWait": 600
            }),
            job_started(),
        ),
        Expect::get(JOB, job("Completed", "Successfully imported and applied Server Configuration Profile.")),
    ]);
    let server = server(bmc.clone());
    let config: ImportConfig = from_value(json!({
        "import_buffer": PROFILE,
        "target": ["IDRAC"],
        "shutdown_type": "NoReboot",
        "time_to_wait": 600
    }))?;

    let state = ScpImport::create(&server, &config).await?;

    assert_eq!(state.shutdown_type, "NoReboot");
    assert!(bmc.is_exhausted());
    Ok(())
}

#[test]
async fn import_from_cifs_share_fails_with_job_message() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    bmc.expect_all([
        Expect::action(
            IMPORT_SCP,
            json!({
                "ShareParameters": {
                    "Target": "ALL",
                    "ShareType": "CIFS",
                    "IPAddress": "10.0.0.6",
                    "ShareName": "profiles",
                    "FileName": "r750.json",
                    "Username": "svc",
                    "Password": "Dell_123!"
                },
                "ShutdownType": "Graceful",
                "HostPowerState": "On",
                "TimeToWait": 1200
            }),
            job_started(),
        ),
        Expect::get(JOB, job("Failed", "Unable to access the network share.")),
    ]);
    let server = server(bmc.clone());
    let config: ImportConfig = from_value(json!({
        "share_parameters": {
            "share_type": "CIFS",
            "ip_address": "10.0.0.6",
            "share_name": "profiles",
            "file_name": "r750.json",
            "username": "svc",
            "password": "Dell_123!"
        }
    }))?;

    let err = ScpImport::create(&server, &config).await.unwrap_err();

    assert!(matches!(
        &err,
        Error::JobFailed { reason, .. } if reason == "Unable to access the network share."
    ));
    assert!(bmc.is_exhausted());
    Ok(())
}

#[test]
async fn response_without_job_is_an_error() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    bmc.expect(Expect::action(
        EXPORT_SCP,
        json!({
            "ExportFormat": "JSON",
            "ExportUse": "Clone",
            "IncludeInExport": "Default",
            "ShareParameters": {
                "Target": "ALL",
                "ShareType": "NFS",
                "IPAddress": "10.0.0.7",
                "ShareName": "/exports/scp",
                "FileName": "r750.json"
            }
        }),
        json!({}),
    ));
    let server = server(bmc.clone());
    let config: ExportConfig = from_value(json!({
        "share_parameters": {
            "share_type": "NFS",
            "ip_address": "10.0.0.7",
            "share_name": "/exports/scp",
            "file_name": "r750.json"
        },
        "export_format": "JSON",
        "export_use": "Clone"
    }))?;

    let err = ScpExport::create(&server, &config).await.unwrap_err();

    assert!(matches!(err, Error::MissingLocation(_)));
    assert_eq!(err.category(), ErrorCategory::RemoteApi);
    assert!(bmc.is_exhausted());
    Ok(())
}
