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

//! Integration tests for the read-only data sources.

use dell_redfish_provider::data_sources::firmware_inventory::FirmwareInventory;
use dell_redfish_provider::data_sources::storage::Storage;
use dell_redfish_provider::data_sources::storage::StorageFilter;
use dell_redfish_provider::data_sources::system_boot::SystemBoot;
use dell_redfish_provider::data_sources::virtual_media::VirtualMedia;
use dell_redfish_provider::error::ErrorCategory;
use dell_redfish_provider::resources::firmware_update::UPDATE_SERVICE;
use dell_redfish_provider::DataSource;
use dell_redfish_tests::fixtures::collection;
use dell_redfish_tests::fixtures::manager;
use dell_redfish_tests::fixtures::system;
use dell_redfish_tests::fixtures::MANAGER;
use dell_redfish_tests::fixtures::SYSTEM;
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

fn storage(id: &str, controller_name: &str, drives: &[&str]) -> Value {
    json!({
        ODATA_ID: format!("{SYSTEM}/Storage/{id}"),
        "Id": id,
        "Name": controller_name,
        "Description": "RAID Controller",
        "Status": { "Health": "OK", "State": "Enabled" },
        "Drives": drives
            .iter()
            .map(|d| json!({ ODATA_ID: format!("{SYSTEM}/Storage/Drives/{d}") }))
            .collect::<Vec<_>>(),
        "StorageControllers": [{
            "MemberId": id,
            "Name": controller_name,
            "Model": controller_name,
            "FirmwareVersion": "52.16.1-4405",
            "SpeedGbps": 12
        }]
    })
}

fn expect_storage(bmc: &Bmc) {
    let collection_id = format!("{SYSTEM}/Storage");
    let ids = [
        format!("{collection_id}/RAID.Integrated.1-1"),
        format!("{collection_id}/AHCI.Embedded.1-1"),
    ];
    bmc.expect_all([
        Expect::get(&collection_id, collection(&collection_id, &ids)),
        Expect::get(
            &ids[0],
            storage(
                "RAID.Integrated.1-1",
                "PERC H755 Front",
                &["Disk.Bay.0:Enclosure.Internal.0-1:RAID.Integrated.1-1"],
            ),
        ),
        Expect::get(&ids[1], storage("AHCI.Embedded.1-1", "BOSS-N1", &[])),
    ]);
}

#[test]
async fn firmware_inventory_lists_components() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    let inventory = format!("{UPDATE_SERVICE}/FirmwareInventory");
    let bios = format!("{inventory}/Installed-159-2.18.1__BIOS.Setup.1-1");
    bmc.expect_all([
        Expect::get(
            UPDATE_SERVICE,
            json!({ ODATA_ID: UPDATE_SERVICE, "FirmwareInventory": { ODATA_ID: &inventory } }),
        ),
        Expect::get(&inventory, collection(&inventory, std::slice::from_ref(&bios))),
        Expect::get(
            &bios,
            json!({
                ODATA_ID: &bios,
                "Id": "Installed-159-2.18.1__BIOS.Setup.1-1",
                "Name": "BIOS",
                "Version": "2.18.1",
                "Updateable": true,
                "SoftwareId": "159",
                "ReleaseDate": "2024-05-13T00:00:00Z"
            }),
        ),
    ]);
    let server = server(bmc.clone());

    let firmware = FirmwareInventory::read(&server, &()).await?;

    assert_eq!(firmware.len(), 1);
    assert_eq!(firmware[0].name.as_deref(), Some("BIOS"));
    assert_eq!(firmware[0].version.as_deref(), Some("2.18.1"));
    assert!(bmc.is_exhausted());
    Ok(())
}

#[test]
async fn system_boot_reports_options() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    let options = format!("{SYSTEM}/BootOptions");
    let nic = format!("{options}/NIC.PxeDevice.1-1");
    bmc.expect_all([
        Expect::get(SYSTEM, system("On", json!({}))),
        Expect::get(&options, collection(&options, std::slice::from_ref(&nic))),
        Expect::get(
            &nic,
            json!({
                ODATA_ID: &nic,
                "Id": "NIC.PxeDevice.1-1",
                "DisplayName": "PXE Device 1: Integrated NIC 1 Port 1 Partition 1",
                "BootOptionEnabled": true,
                "BootOptionReference": "NIC.PxeDevice.1-1",
                "UefiDevicePath": "VenHw(3A191845-5F86-4E78-8FCE-C4CFF59F9DAA)"
            }),
        ),
    ]);
    let server = server(bmc.clone());

    let boot = SystemBoot::read(&server, &()).await?;

    assert_eq!(boot.system_id, "System.Embedded.1");
    assert_eq!(boot.boot_order, ["NIC.PxeDevice.1-1", "HardDisk.List.1-1"]);
    assert_eq!(boot.boot_source_override_mode.as_deref(), Some("UEFI"));
    assert_eq!(boot.boot_options.len(), 1);
    assert_eq!(boot.boot_options[0].boot_option_enabled, Some(true));
    assert!(bmc.is_exhausted());
    Ok(())
}

#[test]
async fn virtual_media_falls_back_to_manager() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    let media = format!("{MANAGER}/VirtualMedia");
    let cd = format!("{media}/CD");
    bmc.expect_all([
        Expect::get(SYSTEM, system("On", json!({}))),
        Expect::get(MANAGER, manager()),
        Expect::get(&media, collection(&media, std::slice::from_ref(&cd))),
        Expect::get(
            &cd,
            json!({
                ODATA_ID: &cd,
                "Id": "CD",
                "Image": "http://10.0.0.5/ubuntu-24.04-live-server-amd64.iso",
                "Inserted": true,
                "WriteProtected": true,
                "ConnectedVia": "URI",
                "MediaTypes": ["CD", "DVD"]
            }),
        ),
    ]);
    let server = server(bmc.clone());

    let slots = VirtualMedia::read(&server, &()).await?;

    assert_eq!(slots.len(), 1);
    assert!(slots[0].inserted);
    assert_eq!(slots[0].connected_via.as_deref(), Some("URI"));
    assert!(bmc.is_exhausted());
    Ok(())
}

#[test]
async fn storage_filtered_by_controller_name() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    expect_storage(&bmc);
    let server = server(bmc.clone());
    let filter: StorageFilter = from_value(json!({ "controller_names": ["BOSS-N1"] }))?;

    let found = Storage::read(&server, &filter).await?;

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "AHCI.Embedded.1-1");
    assert!(found[0].drives.is_empty());
    assert!(bmc.is_exhausted());
    Ok(())
}

#[test]
async fn storage_without_filter_lists_all() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    expect_storage(&bmc);
    let server = server(bmc.clone());

    let found = Storage::read(&server, &StorageFilter::All).await?;

    assert_eq!(found.len(), 2);
    assert_eq!(
        found[0].drives,
        ["Disk.Bay.0:Enclosure.Internal.0-1:RAID.Integrated.1-1"]
    );
    assert_eq!(found[0].health.as_deref(), Some("OK"));
    assert!(bmc.is_exhausted());
    Ok(())
}

#[test]
async fn missing_storage_id_is_reported() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    expect_storage(&bmc);
    let server = server(bmc.clone());
    let filter: StorageFilter = from_value(json!({
        "controller_ids": ["RAID.Integrated.1-1", "RAID.Slot.3-1"]
    }))?;

    let err = Storage::read(&server, &filter).await.unwrap_err();

    assert!(matches!(&err, Error::StorageNotFound(id) if id == "RAID.Slot.3-1"));
    assert_eq!(err.category(), ErrorCategory::State);
    assert!(bmc.is_exhausted());
    Ok(())
}
