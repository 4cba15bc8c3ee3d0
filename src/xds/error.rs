/*
 * Copyright 2024 Google LLC
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use super::ResourceType;

/// A fault on the discovery stream. Always recoverable by reconnecting.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to connect to {target}: {source:?}")]
    Connect {
        target: String,
        #[source]
        source: tonic::transport::Error,
    },
    #[error("timed out connecting to the management server")]
    ConnectTimeout,
    #[error("error occurred on the discovery stream. Status: {0}")]
    Rpc(#[from] tonic::Status),
    #[error("the discovery stream was closed")]
    Closed,
}

/// A discovery response that could not be turned into configuration. The
/// response is discarded as a whole.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error(transparent)]
    UnknownType(#[from] super::UnknownResourceType),
    #[error("resource of type {found} in a {expected} response")]
    MismatchedType {
        expected: ResourceType,
        found: String,
    },
    #[error("failed to decode {resource_type} resource: {source}")]
    Decode {
        resource_type: ResourceType,
        #[source]
        source: prost::DecodeError,
    },
    #[error("invalid {resource_type} `{name}`: {reason}")]
    Invalid {
        resource_type: ResourceType,
        name: String,
        reason: String,
    },
}

impl ConvertError {
    pub(crate) fn invalid(
        resource_type: ResourceType,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Invalid {
            resource_type,
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// A subscription request that could not be queued.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum EnqueueError {
    #[error("resource names must not be empty, use `*` to subscribe to everything")]
    EmptyName,
    #[error("request queue is full, `{0}` was not queued")]
    Full(String),
    #[error("subscription pump is stopped, `{0}` was not queued")]
    Stopped(String),
}
