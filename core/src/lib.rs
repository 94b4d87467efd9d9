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

//! Core types shared by the dell-redfish crates.
//!
//! This crate holds the transport-agnostic pieces:
//! - [`Bmc`]: asynchronous access to a Redfish service.
//! - [`ODataId`] / [`ODataETag`]: opaque Redfish identifiers.
//! - [`Action`]: typed description of a Redfish action target.
//! - [`TaskLocation`]: job/task monitor reference returned by
//!   asynchronous operations.
//! - [`BmcErrorClass`]: classification of transport errors so callers can
//!   tell an unreachable controller from an explicit failure.

pub mod action;
pub mod bmc;
pub mod odata;

#[doc(inline)]
pub use action::Action;
#[doc(inline)]
pub use action::ActionTarget;
#[doc(inline)]
pub use bmc::Bmc;
#[doc(inline)]
pub use bmc::BmcCredentials;
#[doc(inline)]
pub use bmc::BmcErrorClass;
#[doc(inline)]
pub use odata::ODataETag;
#[doc(inline)]
pub use odata::ODataId;
#[doc(inline)]
pub use odata::TaskLocation;

use serde::Deserialize;
use serde::Serialize;

/// Name of the JSON field the HTTP transport uses to expose the
/// `Location` response header.
pub const LOCATION_FIELD: &str = "@odata.location";

/// Empty response or request body.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Empty {}
