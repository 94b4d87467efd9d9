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

//! Provider errors and their diagnostics.

use crate::config::ConfigError;
use crate::config::ValidationError;
use crate::poll::PollError;
use dell_redfish_core::Bmc;
use dell_redfish_core::BmcErrorClass;
use serde_json::Error as JsonError;
use std::error::Error as StdError;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::time::Duration;

pub enum Error<B: Bmc> {
    /// Configuration value rejected before any remote call.
    Validation(String),
    /// Remote API returned an error or could not be reached.
    Bmc(B::Error),
    /// Failed to build or read JSON payload.
    Json(JsonError),
    /// Asynchronous job reached a failed state.
    JobFailed { job: String, reason: String },
    /// Operation did not converge in time. Its outcome is unknown.
    Timeout {
        operation: &'static str,
        elapsed: Duration,
    },
    /// Wait was cancelled by the caller.
    Cancelled,
    /// Every account slot is in use.
    NoRoomForNewUser,
    /// Requested account slot already holds a user.
    UserIdAlreadyExists(String),
    /// Account with the same name exists.
    UserAlreadyExists(String),
    /// No free virtual media slot supports the image type.
    NoVirtualMediaSlot,
    /// Attribute is not present in the attribute registry.
    AttributeNotFound(String),
    /// Resource does not provide the action.
    ActionNotAvailable(&'static str),
    /// Asynchronous action response carried no job location.
    MissingLocation(&'static str),
    SystemNotFound(String),
    StorageNotFound(String),
    /// Provider configuration is invalid.
    Config(String),
}

/// Class of an error as reported to the host framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    RemoteApi,
    ConvergenceFailed,
    ConvergenceTimeout,
    State,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// Structured error report for the host framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
}

impl<B: Bmc> Error<B> {
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) | Self::Config(_) => ErrorCategory::Validation,
            Self::Bmc(_)
            | Self::Json(_)
            | Self::ActionNotAvailable(_)
            | Self::MissingLocation(_) => ErrorCategory::RemoteApi,
            Self::JobFailed { .. } => ErrorCategory::ConvergenceFailed,
            Self::Timeout { .. } | Self::Cancelled => ErrorCategory::ConvergenceTimeout,
            Self::NoRoomForNewUser
            | Self::UserIdAlreadyExists(_)
            | Self::UserAlreadyExists(_)
            | Self::NoVirtualMediaSlot
            | Self::AttributeNotFound(_)
            | Self::SystemNotFound(_)
            | Self::StorageNotFound(_) => ErrorCategory::State,
        }
    }

    #[must_use]
    pub fn diagnostic(&self) -> Diagnostic {
        let summary = match self.category() {
            ErrorCategory::Validation => "Invalid configuration",
            ErrorCategory::RemoteApi => "Redfish request failed",
            ErrorCategory::ConvergenceFailed => "Operation failed",
            ErrorCategory::ConvergenceTimeout => "Timed out waiting for operation",
            ErrorCategory::State => "Operation conflicts with server state",
        };
        Diagnostic {
            severity: Severity::Error,
            summary: summary.into(),
            detail: self.to_string(),
        }
    }

    /// Convert the outcome of a poll that waited for `operation`.
    pub fn from_poll(operation: &'static str, err: PollError<Self>) -> Self {
        match err {
            PollError::Failed(reason) => Self::JobFailed {
                job: operation.into(),
                reason,
            },
            PollError::TimedOut { elapsed } => Self::Timeout { operation, elapsed },
            PollError::Check(err) => err,
            PollError::Cancelled => Self::Cancelled,
        }
    }
}

impl<B: Bmc> Display for Error<B> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Validation(err) => write!(f, "invalid configuration: {err}"),
            Self::Bmc(err) => write!(f, "BMC error: {err}"),
            Self::Json(err) => write!(f, "JSON error: {err}"),
            Self::JobFailed { job, reason } => write!(f, "{job} failed: {reason}"),
            Self::Timeout { operation, elapsed } => write!(
                f,
                "timed out after {}s waiting for {operation}; current state of the server is unknown",
                elapsed.as_secs()
            ),
            Self::Cancelled => write!(f, "operation cancelled"),
            Self::NoRoomForNewUser => write!(f, "cannot add new user: no free account slot"),
            Self::UserIdAlreadyExists(id) => write!(f, "user id {id} already exists"),
            Self::UserAlreadyExists(name) => write!(f, "user {name} already exists"),
            Self::NoVirtualMediaSlot => {
                write!(f, "no free virtual media slot supports this image type")
            }
            Self::AttributeNotFound(name) => write!(f, "attribute is not found: {name}"),
            Self::ActionNotAvailable(action) => write!(f, "action is not available: {action}"),
            Self::MissingLocation(action) => {
                write!(f, "response of {action} does not contain job location")
            }
            Self::SystemNotFound(id) => write!(f, "system is not found: {id}"),
            Self::StorageNotFound(id) => write!(f, "storage is not found: {id}"),
            Self::Config(err) => write!(f, "provider configuration: {err}"),
        }
    }
}

impl<B: Bmc> Debug for Error<B> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(self, f)
    }
}

impl<B: Bmc> StdError for Error<B> {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Bmc(err) => Some(err),
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl<B: Bmc> BmcErrorClass for Error<B> {
    fn is_unreachable(&self) -> bool {
        match self {
            Self::Bmc(err) => err.is_unreachable(),
            _ => false,
        }
    }

    fn status(&self) -> Option<u16> {
        match self {
            Self::Bmc(err) => err.status(),
            _ => None,
        }
    }
}

impl<B: Bmc> From<ValidationError> for Error<B> {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.0)
    }
}

impl<B: Bmc> From<ConfigError> for Error<B> {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
