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

use crate::schema::system::ResetRequest;
use crate::schema::ODataLink;
use dell_redfish_core::Action;
use dell_redfish_core::Empty;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Manager {
    pub id: String,
    pub firmware_version: Option<String>,
    pub virtual_media: Option<ODataLink>,
    pub actions: Option<ManagerActions>,
}

#[derive(Debug, Deserialize)]
pub struct ManagerActions {
    #[serde(rename = "#Manager.Reset")]
    pub reset: Option<Action<ResetRequest, Empty>>,
}
