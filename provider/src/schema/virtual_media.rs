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

use dell_redfish_core::Action;
use dell_redfish_core::Empty;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VirtualMedia {
    pub id: String,
    pub image: Option<String>,
    pub inserted: Option<bool>,
    pub write_protected: Option<bool>,
    pub connected_via: Option<String>,
    #[serde(default)]
    pub media_types: Vec<String>,
    pub transfer_method: Option<String>,
    pub transfer_protocol_type: Option<String>,
    pub actions: Option<VirtualMediaActions>,
}

impl VirtualMedia {
    #[must_use]
    pub fn is_inserted(&self) -> bool {
        self.inserted.unwrap_or(false)
    }

    #[must_use]
    pub fn supports(&self, media_type: &str) -> bool {
        self.media_types.iter().any(|v| v == media_type)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VirtualMediaActions {
    #[serde(rename = "#VirtualMedia.InsertMedia")]
    pub insert_media: Option<Action<InsertMediaRequest, Empty>>,
    #[serde(rename = "#VirtualMedia.EjectMedia")]
    pub eject_media: Option<Action<Empty, Empty>>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct InsertMediaRequest {
    pub image: String,
    pub inserted: bool,
    pub write_protected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_protocol_type: Option<String>,
}
