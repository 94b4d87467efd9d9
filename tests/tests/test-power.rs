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

//! Integration tests for the power resource.

use dell_redfish_provider::error::ErrorCategory;
use dell_redfish_provider::resources::power::Config;
use dell_redfish_provider::resources::power::Power;
use dell_redfish_provider::schema::system::PowerState;
use dell_redfish_provider::schema::system::ResetType;
use dell_redfish_provider::EndpointLocks;
use dell_redfish_provider::ManagedResource;
use dell_redfish_tests::fixtures::reset;
use dell_redfish_tests::fixtures::system;
use dell_redfish_tests::fixtures::SYSTEM;
use dell_redfish_tests::fixtures::SYSTEM_RESET;
use dell_redfish_tests::server;
use dell_redfish_tests::server_with_locks;
use dell_redfish_tests::Bmc;
use dell_redfish_tests::Error;
use dell_redfish_tests::Expect;
use dell_redfish_tests::Failure;
use serde_json::json;
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;
use tokio::test;
use tokio::time::timeout;
use tokio::time::Instant;

#[test(start_paused = true)]
async fn power_on_waits_for_power_state() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    bmc.expect_all([
        Expect::get(SYSTEM, system("Off", json!({}))),
        Expect::action(SYSTEM_RESET, reset("On"), json!({})),
        Expect::get(SYSTEM, system("PoweringOn", json!({}))),
        Expect::get(SYSTEM, system("On", json!({}))),
    ]);
    let server = server(bmc.clone());
    let start = Instant::now();

    let state = Power::create(&server, &Config::new(ResetType::On)).await?;

    assert_eq!(state.power_state, Some(PowerState::On));
    assert_eq!(start.elapsed(), Duration::from_secs(10));
    assert!(bmc.is_exhausted());
    Ok(())
}

#[test]
async fn host_in_target_state_is_not_reset() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    bmc.expect(Expect::get(SYSTEM, system("Off", json!({}))));
    let server = server(bmc.clone());

    let state = Power::create(&server, &Config::new(ResetType::ForceOff)).await?;

    assert_eq!(state.power_state, Some(PowerState::Off));
    assert!(bmc.is_exhausted());
    Ok(())
}

#[test(start_paused = true)]
async fn unreachable_during_restart_keeps_polling() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    bmc.expect_all([
        Expect::get(SYSTEM, system("On", json!({}))),
        Expect::action(SYSTEM_RESET, reset("ForceRestart"), json!({})),
        Expect::get(SYSTEM, "{}").failing(Failure::Unreachable),
        Expect::get(SYSTEM, "{}").failing(Failure::Status(503, "Service Unavailable".into())),
        Expect::get(SYSTEM, system("On", json!({}))),
    ]);
    let server = server(bmc.clone());

    let state = Power::create(&server, &Config::new(ResetType::ForceRestart)).await?;

    assert_eq!(state.power_state, Some(PowerState::On));
    assert!(bmc.is_exhausted());
    Ok(())
}

#[test(start_paused = true)]
async fn restart_waits_for_host_to_go_down() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    bmc.expect_all([
        Expect::get(SYSTEM, system("On", json!({}))),
        Expect::action(SYSTEM_RESET, reset("PowerCycle"), json!({})),
        Expect::get(SYSTEM, system("On", json!({}))),
        Expect::get(SYSTEM, system("Off", json!({}))),
        Expect::get(SYSTEM, system("PoweringOn", json!({}))),
        Expect::get(SYSTEM, system("On", json!({}))),
    ]);
    let server = server(bmc.clone());
    let start = Instant::now();

    let state = Power::create(&server, &Config::new(ResetType::PowerCycle)).await?;

    assert_eq!(state.power_state, Some(PowerState::On));
    assert_eq!(start.elapsed(), Duration::from_secs(30));
    assert!(bmc.is_exhausted());
    Ok(())
}

#[test(start_paused = true)]
async fn restart_that_never_leaves_on_times_out() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    bmc.expect_all([
        Expect::get(SYSTEM, system("On", json!({}))),
        Expect::action(SYSTEM_RESET, reset("ForceRestart"), json!({})),
    ]);
    // Checks at 0, 10 and 20 seconds.
    let on = || Expect::get(SYSTEM, system("On", json!({})));
    bmc.expect_all((0..3).map(|_| on()));
    let server = server(bmc.clone());
    let config = Config {
        maximum_wait_time: 20,
        check_interval: 10,
        ..Config::new(ResetType::ForceRestart)
    };
    let start = Instant::now();

    let err = Power::create(&server, &config).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Timeout {
            operation: "host restart",
            ..
        }
    ));
    assert_eq!(start.elapsed(), Duration::from_secs(20));
    assert!(bmc.is_exhausted());
    Ok(())
}

#[test(start_paused = true)]
async fn power_state_not_reached_times_out() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    bmc.expect_all([
        Expect::get(SYSTEM, system("On", json!({}))),
        Expect::action(SYSTEM_RESET, reset("GracefulShutdown"), json!({})),
    ]);
    // Checks at 0, 10, 20 and 30 seconds.
    bmc.expect_all((0..4).map(|_| Expect::get(SYSTEM, system("On", json!({})))));
    let server = server(bmc.clone());
    let config = Config {
        maximum_wait_time: 30,
        check_interval: 10,
        ..Config::new(ResetType::GracefulShutdown)
    };
    let start = Instant::now();

    let err = Power::create(&server, &config).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Timeout {
            operation: "power state",
            ..
        }
    ));
    assert_eq!(err.category(), ErrorCategory::ConvergenceTimeout);
    assert_eq!(start.elapsed(), Duration::from_secs(30));
    assert!(bmc.is_exhausted());
    Ok(())
}

#[test]
async fn remote_error_is_not_retried() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    bmc.expect_all([
        Expect::get(SYSTEM, system("Off", json!({}))),
        Expect::action(SYSTEM_RESET, reset("On"), json!({})).failing(Failure::Status(
            400,
            r#"{"error":{"@Message.ExtendedInfo":[{"MessageId":"Base.1.12.ActionNotSupported"}]}}"#
                .into(),
        )),
    ]);
    let server = server(bmc.clone());

    let err = Power::create(&server, &Config::new(ResetType::On))
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::RemoteApi);
    assert!(err.diagnostic().detail.contains("ActionNotSupported"));
    assert!(bmc.is_exhausted());
    Ok(())
}

#[test]
async fn invalid_wait_settings_are_rejected_before_any_request() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    let server = server(bmc.clone());
    let config = Config {
        check_interval: 0,
        ..Config::new(ResetType::On)
    };

    let err = Power::create(&server, &config).await.unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Validation);
    Ok(())
}

#[test(start_paused = true)]
async fn operation_waits_for_endpoint_lock() -> Result<(), Box<dyn StdError>> {
    let bmc = Arc::new(Bmc::default());
    bmc.expect(Expect::get(SYSTEM, system("On", json!({}))));
    let locks = Arc::new(EndpointLocks::new());
    let server = server_with_locks(bmc.clone(), locks.clone());
    let config = Config::new(ResetType::On);

    let guard = locks.acquire(server.key()).await;
    let operation = Power::create(&server, &config);
    tokio::pin!(operation);
    assert!(timeout(Duration::from_secs(60), &mut operation)
        .await
        .is_err());
    assert!(!bmc.is_exhausted());

    drop(guard);
    let state = operation.await?;
    assert_eq!(state.power_state, Some(PowerState::On));
    assert!(bmc.is_exhausted());
    Ok(())
}
