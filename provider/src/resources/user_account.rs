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

//! iDRAC local user accounts.
//!
//! iDRAC has a fixed table of account slots. Slot 1 is reserved, a
//! slot with an empty user name is free. Creating a user fills a free
//! slot and deleting it empties the slot again.

use crate::config::Validate;
use crate::config::ValidationError;
use crate::context::Server;
use crate::resources::defaults;
use crate::resources::ManagedResource;
use crate::schema::account::ManagerAccount;
use crate::schema::account::ManagerAccountUpdate;
use crate::Error;
use dell_redfish_core::Bmc;
use dell_redfish_core::Empty;
use dell_redfish_core::ODataId;
use serde::Deserialize;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

pub const ACCOUNTS: &str = "/redfish/v1/AccountService/Accounts";

const FIRST_SLOT: u32 = 2;
const LAST_SLOT: u32 = 16;
const FORBIDDEN_CHARS: &[char] = &['/', '\\', '\'', '"', '@', '<', '>', '&', ':', ' ', '\t'];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    Administrator,
    Operator,
    ReadOnly,
    None,
}

impl Role {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Administrator => "Administrator",
            Self::Operator => "Operator",
            Self::ReadOnly => "ReadOnly",
            Self::None => "None",
        }
    }
}

#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub username: String,
    pub password: String,
    pub role_id: Role,
    #[serde(default = "defaults::yes")]
    pub enabled: bool,
    /// Slot to use instead of the first free one.
    pub user_id: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("role_id", &self.role_id)
            .field("enabled", &self.enabled)
            .field("user_id", &self.user_id)
            .finish()
    }
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ValidationError> {
        let len = self.username.chars().count();
        if !(1..=16).contains(&len) {
            return Err(ValidationError::new(
                "username must be between 1 and 16 characters",
            ));
        }
        if self.username.contains(FORBIDDEN_CHARS) {
            return Err(ValidationError::new(format!(
                "username {} contains a forbidden character",
                self.username
            )));
        }
        if !(4..=40).contains(&self.password.chars().count()) {
            return Err(ValidationError::new(
                "password must be between 4 and 40 characters",
            ));
        }
        if let Some(id) = &self.user_id {
            match id.parse::<u32>() {
                Ok(slot) if (FIRST_SLOT..=LAST_SLOT).contains(&slot) => {}
                _ => {
                    return Err(ValidationError::new(format!(
                        "user_id must be between {FIRST_SLOT} and {LAST_SLOT}"
                    )))
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct State {
    pub user_id: String,
    pub username: String,
    pub role_id: Option<String>,
    pub enabled: Option<bool>,
}

impl From<&ManagerAccount> for State {
    fn from(account: &ManagerAccount) -> Self {
        Self {
            user_id: account.id.clone(),
            username: account.user_name.clone(),
            role_id: account.role_id.clone(),
            enabled: account.enabled,
        }
    }
}

pub struct UserAccount;

impl UserAccount {
    fn account_id(id: &str) -> ODataId {
        ODataId::from(ACCOUNTS).child(id)
    }

    /// Slot for a new user.
    pub fn choose_slot<B: Bmc>(
        accounts: &[Arc<ManagerAccount>],
        username: &str,
        user_id: Option<&str>,
    ) -> Result<String, Error<B>> {
        if accounts.iter().any(|a| a.user_name == username) {
            return Err(Error::UserAlreadyExists(username.into()));
        }
        match user_id {
            Some(id) => {
                let account = accounts
                    .iter()
                    .find(|a| a.id == id)
                    .ok_or_else(|| Error::Validation(format!("user_id {id} does not exist")))?;
                if account.is_free() {
                    Ok(account.id.clone())
                } else {
                    Err(Error::UserIdAlreadyExists(id.into()))
                }
            }
            None => accounts
                .iter()
                .filter(|a| a.is_free() && a.slot().is_some_and(|slot| slot >= FIRST_SLOT))
                .min_by_key(|a| a.slot())
                .map(|a| a.id.clone())
                .ok_or(Error::NoRoomForNewUser),
        }
    }

    fn account_update(config: &Config) -> ManagerAccountUpdate {
        ManagerAccountUpdate {
            user_name: Some(config.username.clone()),
            password: Some(config.password.clone()),
            role_id: Some(config.role_id.as_str().into()),
            enabled: Some(config.enabled),
        }
    }
}

impl<B: Bmc> ManagedResource<B> for UserAccount {
    type Config = Config;
    type State = State;

    const NAME: &'static str = "user_account";

    #[tracing::instrument(skip_all, fields(endpoint = %server.key(), username = %config.username))]
    async fn create(server: &Server<B>, config: &Config) -> Result<State, Error<B>> {
        config.validate()?;
        let _guard = server.lock().await;
        let accounts = server.members::<ManagerAccount>(&ACCOUNTS.into()).await?;
        let id = Self::choose_slot::<B>(&accounts, &config.username, config.user_id.as_deref())?;
        let _: Empty = server
            .bmc()
            .update(&Self::account_id(&id), None, &Self::account_update(config))
            .await
            .map_err(Error::Bmc)?;
        info!(user_id = %id, "user created");
        Ok(State {
            user_id: id,
            username: config.username.clone(),
            role_id: Some(config.role_id.as_str().into()),
            enabled: Some(config.enabled),
        })
    }

    async fn read(server: &Server<B>, state: &State) -> Result<Option<State>, Error<B>> {
        let account = server
            .find::<ManagerAccount>(&Self::account_id(&state.user_id))
            .await?;
        Ok(account
            .filter(|account| !account.is_free())
            .map(|account| State::from(account.as_ref())))
    }

    #[tracing::instrument(skip_all, fields(endpoint = %server.key(), user_id = %state.user_id))]
    async fn update(server: &Server<B>, state: &State, config: &Config) -> Result<State, Error<B>> {
        config.validate()?;
        if config.user_id.as_ref().is_some_and(|id| *id != state.user_id) {
            return Err(Error::Validation(
                "user_id cannot be changed, recreate the user instead".into(),
            ));
        }
        let _guard = server.lock().await;
        if config.username != state.username {
            let accounts = server.members::<ManagerAccount>(&ACCOUNTS.into()).await?;
            if accounts
                .iter()
                .any(|a| a.user_name == config.username && a.id != state.user_id)
            {
                return Err(Error::UserAlreadyExists(config.username.clone()));
            }
        }
        let _: Empty = server
            .bmc()
            .update(&Self::account_id(&state.user_id), None, &Self::account_update(config))
            .await
            .map_err(Error::Bmc)?;
        info!("user updated");
        Ok(State {
            user_id: state.user_id.clone(),
            username: config.username.clone(),
            role_id: Some(config.role_id.as_str().into()),
            enabled: Some(config.enabled),
        })
    }

    #[tracing::instrument(skip_all, fields(endpoint = %server.key(), user_id = %state.user_id))]
    async fn delete(server: &Server<B>, state: &State) -> Result<(), Error<B>> {
        let _guard = server.lock().await;
        let empty = ManagerAccountUpdate {
            user_name: Some(String::new()),
            role_id: Some(Role::None.as_str().into()),
            enabled: Some(false),
            ..ManagerAccountUpdate::default()
        };
        let _: Empty = server
            .bmc()
            .update(&Self::account_id(&state.user_id), None, &empty)
            .await
            .map_err(Error::Bmc)?;
        info!("user removed");
        Ok(())
    }
}
