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

//! Integration tests for iDRAC attributes.

use dell_redfish_provider::resources::idrac_attributes::Config;
use dell_redfish_provider::resources::idrac_attributes::IdracAttributes;
use dell_redfish_provider::resources::idrac_attributes::State;
use dell_redfish_provider::ManagedResource;
use dell_redfish_tests::fixtures::MANAGER;
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

fn attributes_id() -> String {
    format!("{MANAGER}/Oem/Dell/DellAttributes/iDRAC.Embedded.1")
}

fn attributes(community: &str, timeout: u32) -> Value {
    json!({
        ODATA_ID: attributes_id(),
        "Id": "iDRAC.Embedded.1",
        "Attributes": {
            "SNMP.1.AgentCommunity": community,
            "WebServer.1.Timeout": timeout,
            "Users.3.UserName": "ops",
            "Users.3.Password": null
        }
    })
}

#[test]
async fn only_changed_attributes_are_patched() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    bmc.expect_all([
        Expect::get(attributes_id(), attributes("public", 1800)),
        Expect::update(
            attributes_id(),
            json!({ "Attributes": { "SNMP.1.AgentCommunity": "private" } }),
            json!({}),
        ),
        Expect::get(attributes_id(), attributes("private", 1800)),
    ]);
    let server = server(bmc.clone());
    let config: Config = from_value(json!({
        "attributes": { "SNMP.1.AgentCommunity": "private", "WebServer.1.Timeout": 1800 }
    }))?;

    let state = IdracAttributes::create(&server, &config).await?;

    assert_eq!(state.attributes["SNMP.1.AgentCommunity"], json!("private"));
    assert_eq!(state.attributes["WebServer.1.Timeout"], json!(1800));
    assert!(bmc.is_exhausted());
    Ok(())
}

#[test]
async fn passwords_are_always_sent() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    bmc.expect_all([
        Expect::get(attributes_id(), attributes("public", 1800)),
        Expect::update(
            attributes_id(),
            json!({ "Attributes": { "Users.3.Password": "Dell_123!" } }),
            json!({}),
        ),
        Expect::get(attributes_id(), attributes("public", 1800)),
    ]);
    let server = server(bmc.clone());
    let config: Config = from_value(json!({
        "attributes": { "Users.3.Password": "Dell_123!", "Users.3.UserName": "ops" }
    }))?;

    let state = IdracAttributes::create(&server, &config).await?;

    // iDRAC reads passwords back as null.
    assert_eq!(state.attributes["Users.3.Password"], json!("Dell_123!"));
    assert!(bmc.is_exhausted());
    Ok(())
}

#[test]
async fn read_detects_drift() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    bmc.expect(Expect::get(attributes_id(), attributes("public", 900)));
    let server = server(bmc.clone());
    let state: State = from_value(json!({
        "attributes": { "WebServer.1.Timeout": 1800 }
    }))?;

    let current = IdracAttributes::read(&server, &state).await?;

    assert_eq!(
        current.map(|s| s.attributes["WebServer.1.Timeout"].clone()),
        Some(json!(900))
    );
    assert!(bmc.is_exhausted());
    Ok(())
}

#[test]
async fn unknown_attribute_is_reported() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    bmc.expect(Expect::get(attributes_id(), attributes("public", 1800)));
    let server = server(bmc.clone());
    let config: Config = from_value(json!({ "attributes": { "SNMP.9.AgentCommunity": "x" } }))?;

    let err = IdracAttributes::create(&server, &config).await.unwrap_err();

    assert!(matches!(&err, Error::AttributeNotFound(name) if name == "SNMP.9.AgentCommunity"));
    assert!(bmc.is_exhausted());
    Ok(())
}
