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

//! Baseboard Management Controller (BMC) client abstraction
//!
//! This module defines the transport-agnostic [`Bmc`] trait, a minimal
//! interface for interacting with Redfish services. Implementors provide
//! asynchronous operations to retrieve entities, create/update resources,
//! delete entities, and invoke actions.
//!
//! Operation semantics:
//! - `get` fetches the entity at the given `@odata.id`.
//! - `create` performs a POST to a collection identified by `id` and
//!   returns the server-provided representation (`R`).
//! - `update` performs a PATCH on an entity identified by `id` and
//!   returns the response representation (`R`).
//! - `delete` removes the entity at `id`.
//! - `action` posts to an action endpoint (`Action.target`).
//!
//! Asynchronous operations (HTTP 202) answer with a job or task monitor
//! in the `Location` header. Implementations expose it to `R` through the
//! [`crate::LOCATION_FIELD`] member, see [`crate::TaskLocation`].
//!
//! Errors must implement [`BmcErrorClass`] so that callers waiting for a
//! controller to come back (reset, firmware flash) can tell a dropped
//! connection from a genuine failure.

use crate::Action;
use crate::Empty;
use crate::ODataETag;
use crate::ODataId;
use serde::Deserialize;
use serde::Serialize;
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// BMC trait defines access to a Baseboard Management Controller using
/// the Redfish protocol.
pub trait Bmc: Send + Sync {
    /// BMC Error.
    type Error: StdError + BmcErrorClass + Send + Sync + 'static;

    /// Get data of the entity.
    ///
    /// `T` is structure that is used for return type.
    fn get<T: Sized + for<'a> Deserialize<'a> + 'static + Send + Sync>(
        &self,
        id: &ODataId,
    ) -> impl Future<Output = Result<Arc<T>, Self::Error>> + Send;

    /// Creates element of the collection.
    ///
    /// `V` is structure that is used for create.
    /// `R` is structure that is used for return type.
    fn create<V: Sync + Send + Serialize, R: Send + Sync + Sized + for<'a> Deserialize<'a>>(
        &self,
        id: &ODataId,
        query: &V,
    ) -> impl Future<Output = Result<R, Self::Error>> + Send;

    /// Update entity.
    ///
    /// `V` is structure that is used for update.
    /// `R` is structure that is used for return type.
    fn update<V: Sync + Send + Serialize, R: Send + Sync + Sized + for<'a> Deserialize<'a>>(
        &self,
        id: &ODataId,
        etag: Option<&ODataETag>,
        query: &V,
    ) -> impl Future<Output = Result<R, Self::Error>> + Send;

    /// Delete entity.
    fn delete(&self, id: &ODataId) -> impl Future<Output = Result<Empty, Self::Error>> + Send;

    /// Run action.
    ///
    /// `T` is structure that contains action parameters.
    /// `R` is structure with return type.
    fn action<T: Send + Sync + Serialize, R: Send + Sync + Sized + for<'a> Deserialize<'a>>(
        &self,
        action: &Action<T, R>,
        params: &T,
    ) -> impl Future<Output = Result<R, Self::Error>> + Send;
}

/// Classification of BMC errors.
pub trait BmcErrorClass {
    /// The controller could not be reached or answered with a gateway
    /// error. Typical while a manager reset or firmware flash is in
    /// progress.
    fn is_unreachable(&self) -> bool;

    /// HTTP status received from the controller, if any.
    fn status(&self) -> Option<u16>;

    /// The addressed entity does not exist.
    fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Statuses returned by proxies and by iDRAC while its web server restarts.
#[must_use]
pub const fn is_gateway_status(status: u16) -> bool {
    matches!(status, 502..=504)
}

/// Credentials used to access the BMC.
///
/// `Debug`/`Display` redact the password.
#[derive(Clone)]
pub struct BmcCredentials {
    /// Username to access BMC.
    pub username: String,
    password: String,
}

impl BmcCredentials {
    /// Create new credentials.
    #[must_use]
    pub const fn new(username: String, password: String) -> Self {
        Self { username, password }
    }

    /// Get password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for BmcCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BmcCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for BmcCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BmcCredentials(username: {}, password: [REDACTED])",
            self.username
        )
    }
}
