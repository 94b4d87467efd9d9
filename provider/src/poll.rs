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

//! Waiting for asynchronous hardware operations to converge.
//!
//! The check runs immediately and then once per interval until it
//! reports a terminal status or the timeout elapses. Errors that only
//! mean the controller is temporarily unreachable (a reset or a
//! firmware flash in progress) are treated as [`PollStatus::Pending`].

use dell_redfish_core::BmcErrorClass;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tokio::time::Instant;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// Result of one check of the remote state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus {
    Pending,
    Succeeded,
    /// Remote reported a terminal failure with the given reason.
    Failed(String),
}

/// Cadence and deadline of a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    interval: Duration,
    timeout: Duration,
}

impl PollSettings {
    /// # Errors
    ///
    /// Returns an error if `interval` is zero or longer than `timeout`.
    pub fn new(interval: Duration, timeout: Duration) -> Result<Self, InvalidPollSettings> {
        if interval.is_zero() {
            return Err(InvalidPollSettings(
                "check interval must be greater than zero".into(),
            ));
        }
        if interval > timeout {
            return Err(InvalidPollSettings(format!(
                "check interval ({}s) must not exceed the timeout ({}s)",
                interval.as_secs(),
                timeout.as_secs()
            )));
        }
        Ok(Self { interval, timeout })
    }

    /// # Errors
    ///
    /// Same as [`PollSettings::new`].
    pub fn from_secs(interval: u64, timeout: u64) -> Result<Self, InvalidPollSettings> {
        Self::new(Duration::from_secs(interval), Duration::from_secs(timeout))
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Settings for what is left of the deadline after `elapsed`, for
    /// consecutive polls that share one timeout. `None` once the
    /// deadline has passed.
    #[must_use]
    pub fn remaining(self, elapsed: Duration) -> Option<Self> {
        let timeout = self
            .timeout
            .checked_sub(elapsed)
            .filter(|timeout| !timeout.is_zero())?;
        Some(Self {
            interval: self.interval.min(timeout),
            timeout,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPollSettings(pub String);

impl Display for InvalidPollSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        self.0.fmt(f)
    }
}

impl StdError for InvalidPollSettings {}

/// Terminal outcome of a poll other than success.
#[derive(Debug)]
pub enum PollError<E> {
    /// Remote reported failure.
    Failed(String),
    /// Deadline passed without a terminal status. The outcome is unknown.
    TimedOut { elapsed: Duration },
    /// Check failed with a non-transient error.
    Check(E),
    /// Cancellation future resolved first.
    Cancelled,
}

impl<E: Display> Display for PollError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Failed(reason) => write!(f, "operation failed: {reason}"),
            Self::TimedOut { elapsed } => {
                write!(f, "timed out after {}s", elapsed.as_secs())
            }
            Self::Check(err) => write!(f, "status check failed: {err}"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl<E: StdError + 'static> StdError for PollError<E> {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Check(err) => Some(err),
            _ => None,
        }
    }
}

/// Poll `check` until it succeeds, fails or `settings` timeout elapses.
///
/// # Errors
///
/// See [`PollError`].
pub async fn poll_until<E, F, Fut>(settings: PollSettings, check: F) -> Result<(), PollError<E>>
where
    E: BmcErrorClass + Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PollStatus, E>>,
{
    poll_until_cancelled(settings, std::future::pending::<()>(), check).await
}

/// Same as [`poll_until`] but gives up with [`PollError::Cancelled`]
/// as soon as `cancel` resolves.
///
/// # Errors
///
/// See [`PollError`].
pub async fn poll_until_cancelled<E, F, Fut, C>(
    settings: PollSettings,
    cancel: C,
    mut check: F,
) -> Result<(), PollError<E>>
where
    E: BmcErrorClass + Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PollStatus, E>>,
    C: Future<Output = ()>,
{
    let start = Instant::now();
    let poll = async {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let status = match check().await {
                Ok(status) => status,
                Err(err) if err.is_unreachable() => {
                    warn!(attempt, error = %err, "controller unreachable, still waiting");
                    PollStatus::Pending
                }
                Err(err) => return Err(PollError::Check(err)),
            };
            let elapsed = start.elapsed();
            match status {
                PollStatus::Succeeded => {
                    info!(attempt, elapsed_secs = elapsed.as_secs(), "converged");
                    return Ok(());
                }
                PollStatus::Failed(reason) => {
                    info!(attempt, %reason, "remote reported failure");
                    return Err(PollError::Failed(reason));
                }
                PollStatus::Pending => {
                    debug!(attempt, elapsed_secs = elapsed.as_secs(), "pending");
                }
            }
            if elapsed >= settings.timeout {
                info!(attempt, elapsed_secs = elapsed.as_secs(), "timed out");
                return Err(PollError::TimedOut { elapsed });
            }
            sleep(settings.interval.min(settings.timeout - elapsed)).await;
        }
    };
    tokio::select! {
        result = poll => result,
        () = cancel => {
            info!("poll cancelled");
            Err(PollError::Cancelled)
        }
    }
}
