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

//! The proxy's own view of discovered configuration. These are the types the
//! forwarding path reads; wire messages are converted into them by
//! [`crate::xds::ResponseConverter`] and never stored directly.

pub mod cluster;
pub mod listener;
pub mod route;
pub mod secret;

pub use self::{
    cluster::{Cluster, DiscoveryType, Host, LbType},
    listener::{ConnectionManager, Filter, FilterChain, Listener, OpaqueFilter},
    route::{
        ClusterWeight, HeaderMatch, RouteAction, RouteConfig, Router, RouterMatch, VirtualHost,
        WeightedCluster,
    },
    secret::{DataSource, Secret, SecretKind},
};
