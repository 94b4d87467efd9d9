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

//! Expectations for Bmc Mock.

use dell_redfish_core::ActionTarget;
use dell_redfish_core::ODataId;
use serde_json::from_str;
use serde_json::Value as JsonValue;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

pub type Response = Result<JsonValue, Failure>;

/// Scripted failure returned instead of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// Connection could not be established.
    Unreachable,
    /// Controller answered with a non-success status.
    Status(u16, String),
}

impl Display for Failure {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Unreachable => write!(f, "connection refused"),
            Self::Status(status, body) => write!(f, "status {status}: {body}"),
        }
    }
}

/// Request expected by BMC.
#[derive(Debug)]
pub enum ExpectedRequest {
    /// Expected Get.
    Get { id: ODataId },
    /// Expected Update.
    Update { id: ODataId, request: JsonValue },
    /// Expected Create.
    Create { id: ODataId, request: JsonValue },
    /// Expected Delete.
    Delete { id: ODataId },
    /// Expected ActionTarget
    Action {
        target: ActionTarget,
        request: JsonValue,
    },
}

/// Expectation for the tests.
#[derive(Debug)]
pub struct Expect {
    pub request: ExpectedRequest,
    pub response: Response,
}

fn json(v: impl Display) -> JsonValue {
    from_str(&v.to_string()).expect("invalid json")
}

impl Expect {
    pub fn get(uri: impl Display, response: impl Display) -> Self {
        Self {
            request: ExpectedRequest::Get {
                id: uri.to_string().into(),
            },
            response: Ok(json(response)),
        }
    }
    pub fn update(uri: impl Display, request: impl Display, response: impl Display) -> Self {
        Self {
            request: ExpectedRequest::Update {
                id: uri.to_string().into(),
                request: json(request),
            },
            response: Ok(json(response)),
        }
    }
    pub fn create(uri: impl Display, request: impl Display, response: impl Display) -> Self {
        Self {
            request: ExpectedRequest::Create {
                id: uri.to_string().into(),
                request: json(request),
            },
            response: Ok(json(response)),
        }
    }
    pub fn delete(uri: impl Display) -> Self {
        Self {
            request: ExpectedRequest::Delete {
                id: uri.to_string().into(),
            },
            response: Ok(JsonValue::Object(serde_json::Map::new())),
        }
    }
    pub fn action(uri: impl Display, request: impl Display, response: impl Display) -> Self {
        Self {
            request: ExpectedRequest::Action {
                target: ActionTarget::new(uri.to_string()),
                request: json(request),
            },
            response: Ok(json(response)),
        }
    }

    /// Replace the response with a failure.
    #[must_use]
    pub fn failing(mut self, failure: Failure) -> Self {
        self.response = Err(failure);
        self
    }
}
