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

use crate::BmcCredentials;
use crate::HttpClient;
use dell_redfish_core::bmc::is_gateway_status;
use dell_redfish_core::BmcErrorClass;
use dell_redfish_core::Empty;
use dell_redfish_core::ODataETag;
use dell_redfish_core::LOCATION_FIELD;
use http::header;
use http::HeaderMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::time::Duration;
use url::Url;

#[derive(Debug)]
pub enum BmcError {
    ReqwestError(reqwest::Error),
    JsonError(serde_path_to_error::Error<serde_json::Error>),
    BodyError(serde_json::Error),
    InvalidResponse {
        status: reqwest::StatusCode,
        body: String,
    },
}

impl From<reqwest::Error> for BmcError {
    fn from(value: reqwest::Error) -> Self {
        Self::ReqwestError(value)
    }
}

impl BmcErrorClass for BmcError {
    fn is_unreachable(&self) -> bool {
        match self {
            Self::ReqwestError(e) => e.is_connect() || e.is_timeout() || e.is_request() || e.is_body(),
            Self::InvalidResponse { status, .. } => is_gateway_status(status.as_u16()),
            Self::JsonError(_) | Self::BodyError(_) => false,
        }
    }

    fn status(&self) -> Option<u16> {
        match self {
            Self::ReqwestError(e) => e.status().map(|s| s.as_u16()),
            Self::InvalidResponse { status, .. } => Some(status.as_u16()),
            Self::JsonError(_) | Self::BodyError(_) => None,
        }
    }
}

#[allow(clippy::absolute_paths)]
impl std::fmt::Display for BmcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReqwestError(e) => write!(f, "HTTP client error: {e}"),
            Self::InvalidResponse { status, body } if body.is_empty() => {
                write!(f, "Invalid HTTP response: {status}")
            }
            Self::InvalidResponse { status, body } => {
                write!(f, "Invalid HTTP response: {status}: {body}")
            }
            Self::JsonError(e) => write!(
                f,
                "JSON deserialization error at line {} column {} path {}: {e}",
                e.inner().line(),
                e.inner().column(),
                e.path(),
            ),
            Self::BodyError(e) => write!(f, "response body is not JSON: {e}"),
        }
    }
}

#[allow(clippy::absolute_paths)]
impl std::error::Error for BmcError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReqwestError(e) => Some(e),
            Self::JsonError(e) => Some(e.inner()),
            Self::BodyError(e) => Some(e),
            Self::InvalidResponse { .. } => None,
        }
    }
}

/// Configuration parameters for the reqwest HTTP client.
///
/// # Examples
///
/// ```rust
/// use dell_redfish_bmc_http::reqwest::ClientParams;
/// use std::time::Duration;
///
/// let params = ClientParams::new()
///     .timeout(Duration::from_secs(30))
///     .connect_timeout(Duration::from_secs(10))
///     .user_agent("MyApp/1.0")
///     .accept_invalid_certs(true);
/// ```
#[derive(Debug, Clone)]
pub struct ClientParams {
    /// HTTP request timeout
    pub timeout: Option<Duration>,
    /// TCP connection timeout
    pub connect_timeout: Option<Duration>,
    /// User-Agent header value
    pub user_agent: Option<String>,
    /// Whether to accept invalid TLS certificates
    pub accept_invalid_certs: bool,
    /// Maximum number of HTTP redirects to follow
    pub max_redirects: Option<usize>,
    /// TCP keep-alive timeout
    pub tcp_keepalive: Option<Duration>,
    /// Connection pool idle timeout
    pub pool_idle_timeout: Option<Duration>,
    /// Maximum idle connections per host
    pub pool_max_idle_per_host: Option<usize>,
    /// List of default headers, added to every request
    pub default_headers: Option<HeaderMap>,
    /// Forces use of rust TLS, enabled by default
    pub use_rust_tls: bool,
}

impl Default for ClientParams {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(120)),
            connect_timeout: Some(Duration::from_secs(5)),
            user_agent: Some("dell-redfish-provider/v1".to_string()),
            accept_invalid_certs: false,
            max_redirects: Some(10),
            tcp_keepalive: Some(Duration::from_secs(60)),
            // iDRAC keeps a small session table; don't hold idle sockets open.
            pool_idle_timeout: Some(Duration::from_secs(30)),
            pool_max_idle_per_host: Some(1),
            default_headers: None,
            use_rust_tls: true,
        }
    }
}

impl ClientParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    #[must_use]
    pub const fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    #[must_use]
    pub const fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = Some(max);
        self
    }

    #[must_use]
    pub const fn tcp_keepalive(mut self, keepalive: Duration) -> Self {
        self.tcp_keepalive = Some(keepalive);
        self
    }

    #[must_use]
    pub const fn pool_max_idle_per_host(mut self, pool_max_idle_per_host: usize) -> Self {
        self.pool_max_idle_per_host = Some(pool_max_idle_per_host);
        self
    }

    #[must_use]
    pub const fn idle_timeout(mut self, pool_idle_timeout: Duration) -> Self {
        self.pool_idle_timeout = Some(pool_idle_timeout);
        self
    }

    #[must_use]
    pub const fn no_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    #[must_use]
    pub fn default_headers(mut self, default_headers: HeaderMap) -> Self {
        self.default_headers = Some(default_headers);
        self
    }
}

/// HTTP client implementation using the reqwest library.
///
/// # Examples
///
/// ```rust,no_run
/// use dell_redfish_bmc_http::HttpBmc;
/// use dell_redfish_bmc_http::reqwest::Client;
/// use dell_redfish_bmc_http::BmcCredentials;
/// use dell_redfish_bmc_http::reqwest::ClientParams;
/// use std::time::Duration;
/// use url::Url;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let params = ClientParams::new().timeout(Duration::from_secs(60));
/// let client = Client::with_params(params)?;
///
/// let credentials = BmcCredentials::new("root".to_string(), "calvin".to_string());
/// let endpoint = Url::parse("https://192.168.1.100")?;
/// let bmc = HttpBmc::new(client, endpoint, credentials);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    client: reqwest::Client,
}

#[allow(clippy::missing_errors_doc)]
#[allow(clippy::absolute_paths)]
impl Client {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_params(ClientParams::default())
    }

    pub fn with_params(params: ClientParams) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();

        if params.use_rust_tls {
            builder = builder.use_rustls_tls();
        }

        if let Some(timeout) = params.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(connect_timeout) = params.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        if let Some(user_agent) = params.user_agent {
            builder = builder.user_agent(user_agent);
        }

        if params.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(max_redirects) = params.max_redirects {
            builder = builder.redirect(reqwest::redirect::Policy::limited(max_redirects));
        }

        if let Some(keepalive) = params.tcp_keepalive {
            builder = builder.tcp_keepalive(keepalive);
        }

        if let Some(idle_timeout) = params.pool_idle_timeout {
            builder = builder.pool_idle_timeout(idle_timeout);
        }

        if let Some(max_idle) = params.pool_max_idle_per_host {
            builder = builder.pool_max_idle_per_host(max_idle);
        }

        if let Some(default_headers) = params.default_headers {
            builder = builder.default_headers(default_headers);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

/// Path part of a `Location` header. iDRAC sends relative paths, some
/// firmware sends absolute URLs.
fn location_path(location: &str) -> String {
    Url::parse(location).map_or_else(|_| location.to_string(), |url| url.path().to_string())
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

impl Client {
    fn request(
        &self,
        method: reqwest::Method,
        url: Url,
        credentials: &BmcCredentials,
    ) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .basic_auth(&credentials.username, Some(credentials.password()))
    }

    /// Success bodies are read as JSON with the `ETag` and `Location`
    /// headers injected, an empty body reads as `{}`.
    async fn handle_response<T>(response: reqwest::Response) -> Result<T, BmcError>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(%status, %body, "redfish request failed");
            return Err(BmcError::InvalidResponse { status, body });
        }

        let etag = header_value(response.headers(), header::ETAG);
        let location = header_value(response.headers(), header::LOCATION).map(|v| location_path(&v));

        let bytes = response.bytes().await?;
        let mut value: JsonValue = if bytes.iter().all(u8::is_ascii_whitespace) {
            JsonValue::Object(serde_json::Map::new())
        } else {
            serde_json::from_slice(&bytes).map_err(BmcError::BodyError)?
        };

        if let Some(obj) = value.as_object_mut() {
            if let Some(etag) = etag {
                obj.insert("@odata.etag".to_string(), JsonValue::String(etag));
            }
            if let Some(location) = location {
                obj.insert(LOCATION_FIELD.to_string(), JsonValue::String(location));
            }
        }

        serde_path_to_error::deserialize(value).map_err(BmcError::JsonError)
    }
}

impl HttpClient for Client {
    type Error = BmcError;

    async fn get<T>(&self, url: Url, credentials: &BmcCredentials) -> Result<T, Self::Error>
    where
        T: DeserializeOwned + Send + Sync,
    {
        let response = self
            .request(reqwest::Method::GET, url, credentials)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn post<B, T>(
        &self,
        url: Url,
        body: &B,
        credentials: &BmcCredentials,
    ) -> Result<T, Self::Error>
    where
        B: Serialize + Send + Sync,
        T: DeserializeOwned + Send + Sync,
    {
        let response = self
            .request(reqwest::Method::POST, url, credentials)
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn patch<B, T>(
        &self,
        url: Url,
        etag: Option<&ODataETag>,
        body: &B,
        credentials: &BmcCredentials,
    ) -> Result<T, Self::Error>
    where
        B: Serialize + Send + Sync,
        T: DeserializeOwned + Send + Sync,
    {
        let if_match = etag.map_or_else(|| "*".to_string(), ToString::to_string);
        let response = self
            .request(reqwest::Method::PATCH, url, credentials)
            .header(header::IF_MATCH, if_match)
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn delete(&self, url: Url, credentials: &BmcCredentials) -> Result<Empty, Self::Error> {
        let response = self
            .request(reqwest::Method::DELETE, url, credentials)
            .send()
            .await?;
        Self::handle_response(response).await
    }
}
