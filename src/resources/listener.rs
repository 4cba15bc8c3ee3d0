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

use serde::{Deserialize, Serialize};

use super::route::VirtualHost;

fn default_true() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

/// A named network listener and the filter chains attached to it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listener {
    pub name: String,
    /// `ip:port`, or a filesystem path for unix socket listeners.
    pub address: String,
    /// Whether the listener owns its port. Listeners that only receive
    /// redirected connections from a virtual listener leave this unset.
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub bind_port: bool,
    #[serde(default)]
    pub use_original_dst: bool,
    #[serde(default)]
    pub filter_chains: Vec<FilterChain>,
}

impl Listener {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            bind_port: true,
            ..Self::default()
        }
    }

    /// Iterates over every connection manager in every filter chain, in
    /// declaration order.
    pub fn connection_managers(&self) -> impl Iterator<Item = &ConnectionManager> {
        self.filter_chains
            .iter()
            .flat_map(|chain| chain.filters.iter())
            .filter_map(|filter| match filter {
                Filter::ConnectionManager(manager) => Some(manager),
                Filter::Opaque(_) => None,
            })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterChain {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub filters: Vec<Filter>,
}

/// A network filter. Only the HTTP connection manager is understood; every
/// other filter is carried by name so it survives a dump unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "snake_case")]
pub enum Filter {
    ConnectionManager(ConnectionManager),
    Opaque(OpaqueFilter),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionManager {
    /// Set when the route table is delivered separately over route discovery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router_config_name: Option<String>,
    #[serde(default)]
    pub virtual_hosts: Vec<VirtualHost>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpaqueFilter {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub type_url: String,
}
