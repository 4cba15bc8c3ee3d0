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

//! The discovery client: long lived streaming subscriptions against a
//! management server, and the conversion of what they deliver into the
//! effective configuration.
//!
//! A [`SubscriptionPump`] owns a request queue and two tasks. The send task
//! drains the queue onto the current [`Session`]; the receive task hands each
//! response to the [`ResponseConverter`]. Either task asks the
//! [`ReconnectController`] for a fresh session when the current one fails.

pub mod convert;
mod error;
pub(crate) mod metrics;
pub mod pump;
mod resource;
pub mod session;
pub mod transport;

pub use self::{
    convert::{Applied, ResponseConverter},
    error::{ConvertError, EnqueueError, SessionError},
    pump::{PumpConfig, SubscriptionPump, REQUEST_QUEUE_CAPACITY},
    resource::{
        ResourceType, UnknownResourceType, CLUSTER_TYPE, ENDPOINT_TYPE, LISTENER_TYPE, ROUTE_TYPE,
        SECRET_TYPE,
    },
    session::{ExponentialBackoff, ReconnectController, ReconnectPolicy, Session},
    transport::{
        max_grpc_message_size, GrpcTransport, RequestStream, ResponseStream, Service, Transport,
    },
};

pub(crate) use self::resource::HTTP_CONNECTION_MANAGER_TYPE;

/// The resource name that subscribes to every resource of a type.
pub const WILDCARD: &str = "*";

/// Resolves once `shutdown` carries `true`, or its sender is gone.
pub(crate) async fn stopped(shutdown: &mut tokio::sync::watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}
