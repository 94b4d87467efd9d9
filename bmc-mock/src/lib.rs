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

//! Mock BMC driven by a queue of expectations.
//!
//! Every request pops the next [`Expect`] and checks that it matches.
//! Responses are canned JSON or a scripted [`Failure`].

pub mod expect;

#[doc(inline)]
pub use expect::Expect;
pub use expect::ExpectedRequest;
pub use expect::Failure;

use dell_redfish_core::bmc::is_gateway_status;
use dell_redfish_core::Action;
use dell_redfish_core::ActionTarget;
use dell_redfish_core::Bmc as DellRedfishBmc;
use dell_redfish_core::BmcErrorClass;
use dell_redfish_core::Empty;
use dell_redfish_core::ODataETag;
use dell_redfish_core::ODataId;
use serde::Deserialize;
use serde::Serialize;
use serde_json::from_value;
use serde_json::to_value;
use serde_json::Error as JsonError;
use serde_json::Value as JsonValue;
use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

#[derive(Debug)]
pub enum Error {
    ErrorResponse(Failure),
    MutexLock(String),
    NothingIsExpected,
    BadResponseJson(JsonError),
    BadRequestJson(JsonError),
    UnexpectedGet(ODataId, ExpectedRequest),
    UnexpectedUpdate(ODataId, String, ExpectedRequest),
    UnexpectedCreate(ODataId, String, ExpectedRequest),
    UnexpectedDelete(ODataId, ExpectedRequest),
    UnexpectedAction(ActionTarget, String, ExpectedRequest),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::ErrorResponse(err) => write!(f, "response: {err}"),
            Self::MutexLock(err) => write!(f, "lock error: {err}"),
            Self::NothingIsExpected => {
                write!(f, "nothing is expected to happen but something happened")
            }
            Self::BadResponseJson(err) => write!(f, "bad json response: {err}"),
            Self::BadRequestJson(err) => write!(f, "request is not serializable: {err}"),
            Self::UnexpectedGet(id, expected) => {
                write!(f, "unexpected get: {id}; expected: {expected:?}")
            }
            Self::UnexpectedUpdate(id, json, expected) => {
                write!(
                    f,
                    "unexpected update: {id}; json: {json} expected: {expected:?}"
                )
            }
            Self::UnexpectedCreate(id, json, expected) => {
                write!(
                    f,
                    "unexpected create: {id}; json: {json} expected: {expected:?}"
                )
            }
            Self::UnexpectedDelete(id, expected) => {
                write!(f, "unexpected delete: {id}; expected: {expected:?}")
            }
            Self::UnexpectedAction(id, json, expected) => {
                write!(
                    f,
                    "unexpected action: {id}; json: {json} expected: {expected:?}"
                )
            }
        }
    }
}

impl StdError for Error {}

impl BmcErrorClass for Error {
    fn is_unreachable(&self) -> bool {
        match self {
            Self::ErrorResponse(Failure::Unreachable) => true,
            Self::ErrorResponse(Failure::Status(status, _)) => is_gateway_status(*status),
            _ => false,
        }
    }

    fn status(&self) -> Option<u16> {
        match self {
            Self::ErrorResponse(Failure::Status(status, _)) => Some(*status),
            _ => None,
        }
    }
}

impl Error {
    pub fn mutex_lock<T>(err: PoisonError<T>) -> Self {
        Self::MutexLock(err.to_string())
    }
}

#[derive(Default)]
pub struct Bmc {
    expect: Mutex<VecDeque<Expect>>,
}

impl Bmc {
    /// Queue an expectation after the ones already queued.
    pub fn expect(&self, exp: Expect) {
        self.expect.lock().expect("not poisoned").push_back(exp);
    }

    /// Queue several expectations in order.
    pub fn expect_all(&self, exps: impl IntoIterator<Item = Expect>) {
        self.expect.lock().expect("not poisoned").extend(exps);
    }

    /// True when every queued expectation was consumed.
    pub fn is_exhausted(&self) -> bool {
        self.expect.lock().expect("not poisoned").is_empty()
    }

    pub fn debug_expect(&self) {
        let expect: &VecDeque<Expect> = &self.expect.lock().expect("not poisoned");
        println!("Expectations (total: {})", expect.len());
        for v in expect {
            println!("{:#?}", v.request);
        }
    }

    fn next(&self) -> Result<Expect, Error> {
        self.expect
            .lock()
            .map_err(Error::mutex_lock)?
            .pop_front()
            .ok_or(Error::NothingIsExpected)
    }

    /// Pop the next expectation and answer with its response if
    /// `matches` accepts it.
    fn answer<R: for<'a> Deserialize<'a>>(
        &self,
        matches: impl FnOnce(&ExpectedRequest) -> bool,
        unexpected: impl FnOnce(ExpectedRequest) -> Error,
    ) -> Result<R, Error> {
        let Expect { request, response } = self.next()?;
        if !matches(&request) {
            return Err(unexpected(request));
        }
        let response = response.map_err(Error::ErrorResponse)?;
        from_value(response).map_err(Error::BadResponseJson)
    }
}

fn body(v: &impl Serialize) -> Result<JsonValue, Error> {
    to_value(v).map_err(Error::BadRequestJson)
}

impl DellRedfishBmc for Bmc {
    type Error = Error;

    async fn get<T: Sized + for<'a> Deserialize<'a> + 'static + Send + Sync>(
        &self,
        in_id: &ODataId,
    ) -> Result<Arc<T>, Self::Error> {
        self.answer(
            |r| matches!(r, ExpectedRequest::Get { id } if id == in_id),
            |r| Error::UnexpectedGet(in_id.clone(), r),
        )
        .map(Arc::new)
    }

    async fn update<
        V: Sync + Send + Serialize,
        R: Sync + Send + Sized + for<'a> Deserialize<'a>,
    >(
        &self,
        in_id: &ODataId,
        _etag: Option<&ODataETag>,
        update: &V,
    ) -> Result<R, Self::Error> {
        let in_request = body(update)?;
        self.answer(
            |r| {
                matches!(r, ExpectedRequest::Update { id, request }
                    if id == in_id && *request == in_request)
            },
            |r| Error::UnexpectedUpdate(in_id.clone(), in_request.to_string(), r),
        )
    }

    async fn create<
        V: Sync + Send + Serialize,
        R: Sync + Send + Sized + for<'a> Deserialize<'a>,
    >(
        &self,
        in_id: &ODataId,
        create: &V,
    ) -> Result<R, Self::Error> {
        let in_request = body(create)?;
        self.answer(
            |r| {
                matches!(r, ExpectedRequest::Create { id, request }
                    if id == in_id && *request == in_request)
            },
            |r| Error::UnexpectedCreate(in_id.clone(), in_request.to_string(), r),
        )
    }

    async fn delete(&self, in_id: &ODataId) -> Result<Empty, Self::Error> {
        self.answer(
            |r| matches!(r, ExpectedRequest::Delete { id } if id == in_id),
            |r| Error::UnexpectedDelete(in_id.clone(), r),
        )
    }

    async fn action<
        T: Send + Sync + Serialize,
        R: Send + Sync + Sized + for<'a> Deserialize<'a>,
    >(
        &self,
        action: &Action<T, R>,
        params: &T,
    ) -> Result<R, Self::Error> {
        let in_request = body(params)?;
        self.answer(
            |r| {
                matches!(r, ExpectedRequest::Action { target, request }
                    if *target == action.target && *request == in_request)
            },
            |r| Error::UnexpectedAction(action.target.clone(), in_request.to_string(), r),
        )
    }
}
