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

//! Dell iDRAC resource management over Redfish.
//!
//! Every mutating resource operation runs under a per-endpoint lock
//! taken from [`EndpointLocks`]. Asynchronous hardware operations
//! (resets, jobs, media mounts) are awaited with [`poll_until`].

/// Provider configuration and validation.
pub mod config;
/// Provider context and per-server handles.
pub mod context;
/// Read-only data sources.
pub mod data_sources;
/// Error type and host diagnostics.
pub mod error;
/// Per-endpoint locks.
pub mod lock;
/// Log initialization.
pub mod logging;
/// Convergence poller.
pub mod poll;
/// Resource handlers.
pub mod resources;
/// Redfish and Dell OEM payloads.
pub mod schema;

/// Reexport `Error` to make it available through crate root.
pub use error::Error;

#[doc(inline)]
pub use config::ProviderConfig;
#[doc(inline)]
pub use context::Provider;
#[doc(inline)]
pub use context::Server;
#[doc(inline)]
pub use data_sources::DataSource;
#[doc(inline)]
pub use lock::EndpointLocks;
#[doc(inline)]
pub use poll::poll_until;
#[doc(inline)]
pub use poll::PollSettings;
#[doc(inline)]
pub use poll::PollStatus;
#[doc(inline)]
pub use resources::ManagedResource;
