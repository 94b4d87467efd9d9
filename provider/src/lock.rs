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

//! Per-endpoint serialization of mutating operations.
//!
//! iDRAC does not tolerate concurrent conflicting configuration
//! changes, so every mutating resource operation holds the lock of its
//! endpoint for its whole duration. Operations on different endpoints
//! never block each other.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use tagged_types::TaggedType;
use tokio::sync::Mutex as AsyncMutex;
use tokio::sync::OwnedMutexGuard;
use tracing::debug;

/// Key of the lock table: the base URL of the managed server.
pub type EndpointKey = TaggedType<String, EndpointKeyTag>;
#[doc(hidden)]
#[derive(tagged_types::Tag)]
#[implement(Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[transparent(Debug, Display, FromStr, Serialize, Deserialize)]
#[capability(inner_access, cloned)]
pub enum EndpointKeyTag {}

/// Registry of endpoint locks.
///
/// Entries are created on first use and live as long as the registry.
#[derive(Default)]
pub struct EndpointLocks {
    locks: Mutex<HashMap<EndpointKey, Arc<AsyncMutex<()>>>>,
}

impl EndpointLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no one else holds the lock of `key` and take it.
    ///
    /// The lock is released when the returned guard is dropped.
    pub async fn acquire(&self, key: &EndpointKey) -> EndpointGuard {
        let lock = self.entry(key);
        debug!(endpoint = %key, "waiting for endpoint lock");
        let guard = lock.lock_owned().await;
        debug!(endpoint = %key, "endpoint lock acquired");
        EndpointGuard {
            key: key.clone(),
            _guard: guard,
        }
    }

    /// Number of distinct endpoints seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }

    fn entry(&self, key: &EndpointKey) -> Arc<AsyncMutex<()>> {
        self.table().entry(key.clone()).or_default().clone()
    }

    // The table only holds `Arc`s, so a panic while it is locked cannot
    // leave it inconsistent.
    fn table(&self) -> std::sync::MutexGuard<'_, HashMap<EndpointKey, Arc<AsyncMutex<()>>>> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Exclusive ownership of one endpoint.
pub struct EndpointGuard {
    key: EndpointKey,
    _guard: OwnedMutexGuard<()>,
}

impl EndpointGuard {
    #[must_use]
    pub const fn key(&self) -> &EndpointKey {
        &self.key
    }
}

impl Drop for EndpointGuard {
    fn drop(&mut self) {
        debug!(endpoint = %self.key, "endpoint lock released");
    }
}
