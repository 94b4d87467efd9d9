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

use crate::context::Server;
use crate::data_sources::DataSource;
use crate::resources::virtual_media::VirtualMedia as VirtualMediaResource;
use crate::schema::virtual_media::VirtualMedia as VirtualMediaSchema;
use crate::Error;
use dell_redfish_core::Bmc;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VirtualMediaSlot {
    pub id: String,
    pub image: Option<String>,
    pub inserted: bool,
    pub write_protected: Option<bool>,
    pub connected_via: Option<String>,
    pub media_types: Vec<String>,
}

/// Virtual media slots and what is mounted in them.
pub struct VirtualMedia;

impl<B: Bmc> DataSource<B> for VirtualMedia {
    type Filter = ();
    type Output = Vec<VirtualMediaSlot>;

    const NAME: &'static str = "virtual_media";

    async fn read(server: &Server<B>, _filter: &()) -> Result<Vec<VirtualMediaSlot>, Error<B>> {
        let collection = VirtualMediaResource::collection(server).await?;
        Ok(server
            .members::<VirtualMediaSchema>(&collection)
            .await?
            .iter()
            .map(|slot| VirtualMediaSlot {
                id: slot.id.clone(),
                image: slot.image.clone(),
                inserted: slot.is_inserted(),
                write_protected: slot.write_protected,
                connected_via: slot.connected_via.clone(),
                media_types: slot.media_types.clone(),
            })
            .collect())
    }
}
