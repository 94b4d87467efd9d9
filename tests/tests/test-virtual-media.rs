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

//! Integration tests for the virtual media resource.

use dell_redfish_provider::resources::virtual_media::Config;
use dell_redfish_provider::resources::virtual_media::State;
use dell_redfish_provider::resources::virtual_media::VirtualMedia;
use dell_redfish_provider::ManagedResource;
use dell_redfish_tests::fixtures::collection;
use dell_redfish_tests::fixtures::system;
use dell_redfish_tests::fixtures::SYSTEM;
use dell_redfish_tests::server;
use dell_redfish_tests::Bmc;
use dell_redfish_tests::Error;
use dell_redfish_tests::Expect;
use dell_redfish_tests::ODATA_ID;
use serde_json::json;
use serde_json::Value;
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;
use tokio::test;
use tokio::time::Instant;

const ISO: &str = "http://10.0.0.7/images/ubuntu-24.04-live-server-amd64.iso";

fn media() -> String {
    format!("{SYSTEM}/VirtualMedia")
}

fn slot_id(id: u32) -> String {
    format!("{}/{id}", media())
}

fn slot(id: u32, media_types: &[&str], image: Option<&str>) -> Value {
    let slot = slot_id(id);
    let connected_via = if image.is_some() { "URI" } else { "NotConnected" };
    json!({
        ODATA_ID: slot,
        "Id": id.to_string(),
        "MediaTypes": media_types,
        "ConnectedVia": connected_via,
        "Image": image,
        "Inserted": image.is_some(),
        "WriteProtected": true,
        "Actions": {
            "#VirtualMedia.InsertMedia": {
                "target": format!("{slot}/Actions/VirtualMedia.InsertMedia")
            },
            "#VirtualMedia.EjectMedia": {
                "target": format!("{slot}/Actions/VirtualMedia.EjectMedia")
            }
        }
    })
}

fn expect_slots(bmc: &Bmc, slots: Vec<Value>) {
    let ids: Vec<String> = (1..=slots.len() as u32).map(slot_id).collect();
    bmc.expect(Expect::get(
        SYSTEM,
        system("On", json!({ "VirtualMedia": { ODATA_ID: media() } })),
    ));
    bmc.expect(Expect::get(media(), collection(&media(), &ids)));
    for (id, slot) in ids.iter().zip(slots) {
        bmc.expect(Expect::get(id, slot));
    }
}

fn insert(id: u32, image: &str) -> Expect {
    Expect::action(
        format!("{}/Actions/VirtualMedia.InsertMedia", slot_id(id)),
        json!({ "Image": image, "Inserted": true, "WriteProtected": true }),
        json!({}),
    )
}

fn eject(id: u32) -> Expect {
    Expect::action(
        format!("{}/Actions/VirtualMedia.EjectMedia", slot_id(id)),
        json!({}),
        json!({}),
    )
}

#[test(start_paused = true)]
async fn iso_mounted_in_free_cd_slot() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    expect_slots(
        &bmc,
        vec![
            slot(1, &["CD", "DVD"], Some("http://10.0.0.7/images/other.iso")),
            slot(2, &["CD", "DVD"], None),
        ],
    );
    bmc.expect_all([
        insert(2, ISO),
        Expect::get(slot_id(2), slot(2, &["CD", "DVD"], None)),
        Expect::get(slot_id(2), slot(2, &["CD", "DVD"], Some(ISO))),
    ]);
    let server = server(bmc.clone());
    let start = Instant::now();

    let state = VirtualMedia::create(&server, &Config::new(ISO)).await?;

    assert_eq!(state.virtual_media_id.to_string(), slot_id(2));
    assert!(state.inserted);
    assert_eq!(start.elapsed(), Duration::from_secs(2));
    assert!(bmc.is_exhausted());
    Ok(())
}

#[test]
async fn disk_image_needs_removable_disk_slot() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    expect_slots(&bmc, vec![slot(1, &["CD", "DVD"], None)]);
    let server = server(bmc.clone());

    let err = VirtualMedia::create(&server, &Config::new("http://10.0.0.7/images/fw.img"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NoVirtualMediaSlot));
    assert!(bmc.is_exhausted());
    Ok(())
}

#[test(start_paused = true)]
async fn changed_image_remounted_in_same_slot() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    let old = "http://10.0.0.7/images/other.iso";
    bmc.expect(Expect::get(slot_id(1), slot(1, &["CD", "DVD"], Some(old))));
    bmc.expect_all([
        eject(1),
        insert(1, ISO),
        Expect::get(slot_id(1), slot(1, &["CD", "DVD"], Some(ISO))),
    ]);
    let server = server(bmc.clone());

    let state = VirtualMedia::update(&server, &mounted(old), &Config::new(ISO)).await?;

    assert_eq!(state.image, ISO);
    assert!(bmc.is_exhausted());
    Ok(())
}

#[test]
async fn ejected_media_is_gone() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    bmc.expect(Expect::get(slot_id(1), slot(1, &["CD", "DVD"], None)));
    let server = server(bmc.clone());

    assert_eq!(VirtualMedia::read(&server, &mounted(ISO)).await?, None);
    Ok(())
}

#[test]
async fn delete_ejects_media() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    bmc.expect_all([
        Expect::get(slot_id(1), slot(1, &["CD", "DVD"], Some(ISO))),
        eject(1),
    ]);
    let server = server(bmc.clone());

    VirtualMedia::delete(&server, &mounted(ISO)).await?;

    assert!(bmc.is_exhausted());
    Ok(())
}

fn mounted(image: &str) -> State {
    State {
        virtual_media_id: slot_id(1).into(),
        image: image.into(),
        inserted: true,
        write_protected: true,
        transfer_protocol_type: None,
        transfer_method: None,
    }
}
