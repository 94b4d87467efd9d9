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

use crate::Bmc;
use crate::ODataId;
use core::fmt::Display;
use core::fmt::Formatter;
use core::fmt::Result as FmtResult;
use serde::Deserialize;
use serde::Serialize;
use std::marker::PhantomData;

/// Type for `target` field of Action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ActionTarget(String);

impl ActionTarget {
    #[must_use]
    pub const fn new(v: String) -> Self {
        Self(v)
    }
}

impl Display for ActionTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        self.0.fmt(f)
    }
}

impl From<&ODataId> for ActionTarget {
    fn from(id: &ODataId) -> Self {
        Self(id.to_string())
    }
}

/// Redfish action with parameters `T` and return type `R`.
///
/// Usually deserialized from the `Actions` object of a resource
/// (`{"target": "..."}`). Dell OEM actions that are not advertised in
/// `Actions` are built with [`Action::new`].
#[derive(Deserialize, Debug)]
pub struct Action<T, R> {
    #[serde(rename = "target")]
    pub target: ActionTarget,
    #[serde(skip_deserializing)]
    pub _marker: PhantomData<T>,
    #[serde(skip_deserializing)]
    pub _marker_retval: PhantomData<R>,
}

impl<T, R> Action<T, R> {
    #[must_use]
    pub const fn new(target: ActionTarget) -> Self {
        Self {
            target,
            _marker: PhantomData,
            _marker_retval: PhantomData,
        }
    }
}

impl<T, R> Clone for Action<T, R> {
    fn clone(&self) -> Self {
        Self::new(self.target.clone())
    }
}

impl<T: Send + Sync + Serialize, R: Send + Sync + Sized + for<'a> Deserialize<'a>> Action<T, R> {
    /// Run specific action with parameters passed as argument.
    ///
    /// # Errors
    ///
    /// Returns the BMC error if the request fails.
    pub async fn run<B: Bmc>(&self, bmc: &B, params: &T) -> Result<R, B::Error> {
        bmc.action::<T, R>(self, params).await
    }
}
