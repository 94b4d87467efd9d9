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

//! HTTP transport for the [`Bmc`] trait.
//!
//! [`HttpBmc`] binds an [`HttpClient`] to one iDRAC endpoint and its
//! credentials. Ids are resolved against the endpoint URL, so the
//! endpoint may carry a scheme, host and port but no path. The
//! `reqwest` feature provides [`reqwest::Client`].

#[cfg(feature = "reqwest")]
pub mod reqwest;

use dell_redfish_core::Action;
use dell_redfish_core::Bmc;
use dell_redfish_core::BmcErrorClass;
use dell_redfish_core::Empty;
use dell_redfish_core::ODataETag;
use dell_redfish_core::ODataId;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;
use std::error::Error as StdError;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;
use url::Url;

#[doc(inline)]
pub use dell_redfish_core::BmcCredentials;

/// Minimal HTTP client used by [`HttpBmc`]. Every request carries basic
/// authentication. Implementations deserialize success bodies (an empty
/// body reads as `{}`) and turn any other status into an error.
pub trait HttpClient: Send + Sync {
    type Error: Send + StdError;

    fn get<T>(
        &self,
        url: Url,
        credentials: &BmcCredentials,
    ) -> impl Future<Output = Result<T, Self::Error>> + Send
    where
        T: DeserializeOwned + Send + Sync;

    fn post<B, T>(
        &self,
        url: Url,
        body: &B,
        credentials: &BmcCredentials,
    ) -> impl Future<Output = Result<T, Self::Error>> + Send
    where
        B: Serialize + Send + Sync,
        T: DeserializeOwned + Send + Sync;

    /// `If-Match` carries `etag`, or `*` without one.
    fn patch<B, T>(
        &self,
        url: Url,
        etag: Option<&ODataETag>,
        body: &B,
        credentials: &BmcCredentials,
    ) -> impl Future<Output = Result<T, Self::Error>> + Send
    where
        B: Serialize + Send + Sync,
        T: DeserializeOwned + Send + Sync;

    fn delete(
        &self,
        url: Url,
        credentials: &BmcCredentials,
    ) -> impl Future<Output = Result<Empty, Self::Error>> + Send;
}

/// [`Bmc`] over HTTP.
///
/// ```rust,no_run
/// use dell_redfish_bmc_http::reqwest::Client;
/// use dell_redfish_bmc_http::BmcCredentials;
/// use dell_redfish_bmc_http::HttpBmc;
/// use url::Url;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let bmc = HttpBmc::new(
///     Client::new()?,
///     Url::parse("https://10.0.0.1")?,
///     BmcCredentials::new("root".into(), "calvin".into()),
/// );
/// # Ok(())
/// # }
/// ```
pub struct HttpBmc<C: HttpClient> {
    client: C,
    endpoint: Url,
    credentials: BmcCredentials,
}

impl<C: HttpClient> HttpBmc<C> {
    pub fn new(client: C, endpoint: Url, credentials: BmcCredentials) -> Self {
        Self {
            client,
            endpoint,
            credentials,
        }
    }

    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn url(&self, path: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.set_path(path);
        url
    }
}

impl<C: HttpClient> Bmc for HttpBmc<C>
where
    C::Error: BmcErrorClass + StdError + Send + Sync + 'static,
{
    type Error = C::Error;

    async fn get<T: Sized + for<'de> Deserialize<'de> + 'static + Send + Sync>(
        &self,
        id: &ODataId,
    ) -> Result<Arc<T>, Self::Error> {
        debug!(%id, "GET");
        self.client
            .get::<T>(self.url(id.as_str()), &self.credentials)
            .await
            .map(Arc::new)
    }

    async fn create<V: Sync + Send + Serialize, R: Sync + Send + for<'de> Deserialize<'de>>(
        &self,
        id: &ODataId,
        v: &V,
    ) -> Result<R, Self::Error> {
        debug!(%id, "POST");
        self.client
            .post(self.url(id.as_str()), v, &self.credentials)
            .await
    }

    async fn update<V: Sync + Send + Serialize, R: Sync + Send + for<'de> Deserialize<'de>>(
        &self,
        id: &ODataId,
        etag: Option<&ODataETag>,
        v: &V,
    ) -> Result<R, Self::Error> {
        debug!(%id, "PATCH");
        self.client
            .patch(self.url(id.as_str()), etag, v, &self.credentials)
            .await
    }

    async fn delete(&self, id: &ODataId) -> Result<Empty, Self::Error> {
        debug!(%id, "DELETE");
        self.client
            .delete(self.url(id.as_str()), &self.credentials)
            .await
    }

    async fn action<
        T: Sync + Send + Serialize,
        R: Sync + Send + Sized + for<'de> Deserialize<'de>,
    >(
        &self,
        action: &Action<T, R>,
        params: &T,
    ) -> Result<R, Self::Error> {
        let target = action.target.to_string();
        debug!(%target, "POST action");
        self.client
            .post(self.url(&target), params, &self.credentials)
            .await
    }
}
