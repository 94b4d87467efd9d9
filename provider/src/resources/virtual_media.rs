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

//! Remote image mounted as virtual media.

use crate::config::Validate;
use crate::config::ValidationError;
use crate::context::Server;
use crate::poll::poll_until;
use crate::poll::PollSettings;
use crate::poll::PollStatus;
use crate::resources::defaults;
use crate::resources::ManagedResource;
use crate::schema::manager::Manager;
use crate::schema::virtual_media::InsertMediaRequest;
use crate::schema::virtual_media::VirtualMedia as VirtualMediaSchema;
use crate::Error;
use dell_redfish_core::Bmc;
use dell_redfish_core::Empty;
use dell_redfish_core::ODataId;
use serde::Deserialize;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

const PROTOCOLS: [&str; 4] = ["HTTP", "HTTPS", "NFS", "CIFS"];
const METHODS: [&str; 2] = ["Stream", "Upload"];
const CD_MEDIA: &[&str] = &["CD", "DVD"];
const DISK_MEDIA: &[&str] = &["RemovableDisk", "USBStick", "Floppy"];

// Mount is quick, iDRAC only has to open the share.
const MOUNT_CHECK_INTERVAL: u64 = 2;
const MOUNT_TIMEOUT: u64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub image: String,
    #[serde(default = "defaults::yes")]
    pub write_protected: bool,
    pub transfer_protocol_type: Option<String>,
    pub transfer_method: Option<String>,
}

impl Config {
    #[must_use]
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            write_protected: true,
            transfer_protocol_type: None,
            transfer_method: None,
        }
    }

    /// Media types of slots that can hold the image.
    #[must_use]
    pub fn media_types(&self) -> &'static [&'static str] {
        media_types(&self.image)
    }

    fn request(&self) -> InsertMediaRequest {
        InsertMediaRequest {
            image: self.image.clone(),
            inserted: true,
            write_protected: self.write_protected,
            transfer_method: self.transfer_method.clone(),
            transfer_protocol_type: self.transfer_protocol_type.clone(),
        }
    }
}

/// `.iso` goes to a CD slot, `.img` to a removable disk slot.
#[must_use]
pub fn media_types(image: &str) -> &'static [&'static str] {
    let image = image.to_ascii_lowercase();
    if image.ends_with(".iso") {
        CD_MEDIA
    } else if image.ends_with(".img") {
        DISK_MEDIA
    } else {
        &[]
    }
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.media_types().is_empty() {
            return Err(ValidationError::new(format!(
                "image {} must be an .iso or .img file",
                self.image
            )));
        }
        if let Some(protocol) = &self.transfer_protocol_type {
            if !PROTOCOLS.contains(&protocol.as_str()) {
                return Err(ValidationError::new(format!(
                    "unsupported transfer_protocol_type {protocol}"
                )));
            }
        }
        if let Some(method) = &self.transfer_method {
            if !METHODS.contains(&method.as_str()) {
                return Err(ValidationError::new(format!(
                    "unsupported transfer_method {method}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct State {
    pub virtual_media_id: ODataId,
    pub image: String,
    pub inserted: bool,
    pub write_protected: bool,
    pub transfer_protocol_type: Option<String>,
    pub transfer_method: Option<String>,
}

pub struct VirtualMedia;

impl VirtualMedia {
    /// Virtual media collection. Recent iDRAC firmware lists it under the
    /// system, older firmware under the manager.
    pub async fn collection<B: Bmc>(server: &Server<B>) -> Result<ODataId, Error<B>> {
        let system = server.system().await?;
        if let Some(link) = &system.virtual_media {
            return Ok(link.odata_id.clone());
        }
        let manager = server.get::<Manager>(&server.manager_id()).await?;
        Ok(manager
            .virtual_media
            .as_ref()
            .map_or_else(|| server.manager_id().child("VirtualMedia"), |l| l.odata_id.clone()))
    }

    fn free_slot<'a>(
        slots: &'a [Arc<VirtualMediaSchema>],
        collection: &ODataId,
        config: &Config,
    ) -> Option<(ODataId, &'a VirtualMediaSchema)> {
        slots
            .iter()
            .find(|slot| {
                !slot.is_inserted() && config.media_types().iter().any(|t| slot.supports(t))
            })
            .map(|slot| (collection.child(&slot.id), slot.as_ref()))
    }

    async fn insert<B: Bmc>(
        server: &Server<B>,
        id: &ODataId,
        slot: &VirtualMediaSchema,
        config: &Config,
    ) -> Result<State, Error<B>> {
        let action = slot
            .actions
            .as_ref()
            .and_then(|a| a.insert_media.as_ref())
            .ok_or(Error::ActionNotAvailable("VirtualMedia.InsertMedia"))?;
        action
            .run(server.bmc(), &config.request())
            .await
            .map_err(Error::Bmc)?;
        info!(slot = %id, image = %config.image, "inserting media");
        Self::wait_inserted(server, id, &config.image).await?;
        Ok(State {
            virtual_media_id: id.clone(),
            image: config.image.clone(),
            inserted: true,
            write_protected: config.write_protected,
            transfer_protocol_type: config.transfer_protocol_type.clone(),
            transfer_method: config.transfer_method.clone(),
        })
    }

    async fn eject<B: Bmc>(
        server: &Server<B>,
        id: &ODataId,
        slot: &VirtualMediaSchema,
    ) -> Result<(), Error<B>> {
        let action = slot
            .actions
            .as_ref()
            .and_then(|a| a.eject_media.as_ref())
            .ok_or(Error::ActionNotAvailable("VirtualMedia.EjectMedia"))?;
        action
            .run(server.bmc(), &Empty {})
            .await
            .map_err(Error::Bmc)?;
        info!(slot = %id, "media ejected");
        Ok(())
    }

    async fn wait_inserted<B: Bmc>(
        server: &Server<B>,
        id: &ODataId,
        image: &str,
    ) -> Result<(), Error<B>> {
        let settings = PollSettings::from_secs(MOUNT_CHECK_INTERVAL, MOUNT_TIMEOUT)
            .map_err(ValidationError::from)?;
        poll_until(settings, move || async move {
            let slot = server.get::<VirtualMediaSchema>(id).await?;
            Ok::<_, Error<B>>(
                if slot.is_inserted() && slot.image.as_deref() == Some(image) {
                    PollStatus::Succeeded
                } else {
                    PollStatus::Pending
                },
            )
        })
        .await
        .map_err(|err| Error::from_poll("virtual media mount", err))
    }
}

impl<B: Bmc> ManagedResource<B> for VirtualMedia {
    type Config = Config;
    type State = State;

    const NAME: &'static str = "virtual_media";

    #[tracing::instrument(skip_all, fields(endpoint = %server.key(), image = %config.image))]
    async fn create(server: &Server<B>, config: &Config) -> Result<State, Error<B>> {
        config.validate()?;
        let _guard = server.lock().await;
        let collection = Self::collection(server).await?;
        let slots = server.members::<VirtualMediaSchema>(&collection).await?;
        let (id, slot) =
            Self::free_slot(&slots, &collection, config).ok_or(Error::NoVirtualMediaSlot)?;
        Self::insert(server, &id, slot, config).await
    }

    async fn read(server: &Server<B>, state: &State) -> Result<Option<State>, Error<B>> {
        let slot = server
            .find::<VirtualMediaSchema>(&state.virtual_media_id)
            .await?;
        Ok(slot
            .filter(|slot| slot.is_inserted())
            .map(|slot| State {
                image: slot.image.clone().unwrap_or_default(),
                inserted: true,
                write_protected: slot.write_protected.unwrap_or(state.write_protected),
                ..state.clone()
            }))
    }

    #[tracing::instrument(skip_all, fields(endpoint = %server.key(), image = %config.image))]
    async fn update(server: &Server<B>, state: &State, config: &Config) -> Result<State, Error<B>> {
        config.validate()?;
        let _guard = server.lock().await;
        let current = server
            .get::<VirtualMediaSchema>(&state.virtual_media_id)
            .await?;
        if current.is_inserted() {
            Self::eject(server, &state.virtual_media_id, &current).await?;
        }
        if config.media_types().iter().any(|t| current.supports(t)) {
            return Self::insert(server, &state.virtual_media_id, &current, config).await;
        }
        let collection = Self::collection(server).await?;
        let slots = server.members::<VirtualMediaSchema>(&collection).await?;
        let (id, slot) =
            Self::free_slot(&slots, &collection, config).ok_or(Error::NoVirtualMediaSlot)?;
        Self::insert(server, &id, slot, config).await
    }

    #[tracing::instrument(skip_all, fields(endpoint = %server.key()))]
    async fn delete(server: &Server<B>, state: &State) -> Result<(), Error<B>> {
        let _guard = server.lock().await;
        let Some(slot) = server
            .find::<VirtualMediaSchema>(&state.virtual_media_id)
            .await?
        else {
            return Ok(());
        };
        if slot.is_inserted() {
            Self::eject(server, &state.virtual_media_id, &slot).await?;
        }
        Ok(())
    }
}
