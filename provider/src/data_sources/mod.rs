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

//! Read-only data sources. They never take the endpoint lock.

pub mod firmware_inventory;
pub mod storage;
pub mod system_boot;
pub mod virtual_media;

use crate::context::Server;
use crate::Error;
use dell_redfish_core::Bmc;
use std::future::Future;

pub trait DataSource<B: Bmc> {
    /// Query arguments supplied by the user.
    type Filter: Send + Sync;
    type Output: Send + Sync;

    const NAME: &'static str;

    fn read(
        server: &Server<B>,
        filter: &Self::Filter,
    ) -> impl Future<Output = Result<Self::Output, Error<B>>> + Send;
}
