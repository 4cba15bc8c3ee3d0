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

use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_weight() -> u32 {
    1
}

/// An upstream cluster and the hosts currently assigned to it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub name: String,
    #[serde(default)]
    pub discovery_type: DiscoveryType,
    #[serde(default)]
    pub lb_type: LbType,
    #[serde(default)]
    pub hosts: Vec<Host>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout: Option<Duration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_connection_buffer_limit_bytes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_requests_per_connection: Option<u32>,
}

impl Cluster {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_hosts(mut self, hosts: impl IntoIterator<Item = Host>) -> Self {
        self.hosts = hosts.into_iter().collect();
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    pub address: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hostname: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

impl Host {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            hostname: String::new(),
            weight: default_weight(),
        }
    }
}

impl From<&'_ str> for Host {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LbType {
    #[default]
    #[serde(rename = "LB_ROUNDROBIN")]
    RoundRobin,
    #[serde(rename = "LB_RANDOM")]
    Random,
    #[serde(rename = "LB_LEAST_REQUEST")]
    LeastRequest,
    #[serde(rename = "LB_RING_HASH")]
    RingHash,
    #[serde(rename = "LB_MAGLEV")]
    Maglev,
    #[serde(rename = "LB_CLUSTER_PROVIDED")]
    ClusterProvided,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscoveryType {
    #[default]
    Static,
    StrictDns,
    LogicalDns,
    Eds,
    OriginalDst,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn lb_type_uses_proxy_names() {
        assert_eq!(json!("LB_ROUNDROBIN"), serde_json::to_value(LbType::RoundRobin).unwrap());
        assert_eq!(
            LbType::LeastRequest,
            serde_json::from_value(json!("LB_LEAST_REQUEST")).unwrap()
        );
    }

    #[test]
    fn host_weight_defaults_to_one() {
        let host: Host = serde_json::from_value(json!({ "address": "10.0.0.1:80" })).unwrap();
        assert_eq!(Host::new("10.0.0.1:80"), host);
    }
}
