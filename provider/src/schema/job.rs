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

//! Redfish tasks and Dell jobs.
//!
//! iDRAC reports asynchronous operations either as a Redfish `Task`
//! (`TaskState`, with the Dell job state under `Oem.Dell`) or as a Dell
//! `Job` (`JobState`). Both are read through [`Job`].

use crate::poll::PollStatus;
use serde::Deserialize;

const COMPLETED: &str = "Completed";
const SCHEDULED: &str = "Scheduled";
const FAILED_STATES: [&str; 5] = [
    "Failed",
    "Exception",
    "Killed",
    "Cancelled",
    "CompletedWithErrors",
];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Job {
    pub id: String,
    pub name: Option<String>,
    pub task_state: Option<String>,
    pub job_state: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub messages: Vec<JobMessage>,
    pub percent_complete: Option<u32>,
    pub oem: Option<JobOem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobMessage {
    pub message: Option<String>,
    pub message_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobOem {
    #[serde(rename = "Dell")]
    pub dell: Option<DellJob>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DellJob {
    pub job_state: Option<String>,
    pub message: Option<String>,
    pub percent_complete: Option<u32>,
}

impl Job {
    /// Dell job state, from the job itself or from the task OEM section.
    #[must_use]
    pub fn dell_job_state(&self) -> Option<&str> {
        self.job_state.as_deref().or_else(|| {
            self.oem
                .as_ref()
                .and_then(|oem| oem.dell.as_ref())
                .and_then(|dell| dell.job_state.as_deref())
        })
    }

    fn states(&self) -> impl Iterator<Item = &str> {
        self.task_state.as_deref().into_iter().chain(self.dell_job_state())
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.states().any(|s| FAILED_STATES.contains(&s))
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        !self.is_failed() && self.states().any(|s| s == COMPLETED)
    }

    /// Job waits for a host reboot to run.
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.dell_job_state() == Some(SCHEDULED)
    }

    /// Most specific message the controller reported.
    #[must_use]
    pub fn reason(&self) -> String {
        self.messages
            .iter()
            .rev()
            .find_map(|m| m.message.clone())
            .or_else(|| self.message.clone())
            .or_else(|| {
                self.oem
                    .as_ref()
                    .and_then(|oem| oem.dell.as_ref())
                    .and_then(|dell| dell.message.clone())
            })
            .unwrap_or_else(|| {
                format!(
                    "job {} ended in state {}",
                    self.id,
                    self.states().collect::<Vec<_>>().join("/")
                )
            })
    }

    #[must_use]
    pub fn percent_complete(&self) -> Option<u32> {
        self.percent_complete.or_else(|| {
            self.oem
                .as_ref()
                .and_then(|oem| oem.dell.as_ref())
                .and_then(|dell| dell.percent_complete)
        })
    }

    /// Completion status of the job.
    #[must_use]
    pub fn status(&self) -> PollStatus {
        if self.is_failed() {
            PollStatus::Failed(self.reason())
        } else if self.is_completed() {
            PollStatus::Succeeded
        } else {
            PollStatus::Pending
        }
    }

    /// Status for the first phase of a staged update: scheduled jobs
    /// are done until the host reboots.
    #[must_use]
    pub fn staged_status(&self) -> PollStatus {
        match self.status() {
            PollStatus::Pending if self.is_scheduled() => PollStatus::Succeeded,
            status => status,
        }
    }
}
