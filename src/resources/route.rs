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

/// A route table delivered through route discovery.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    pub name: String,
    #[serde(default)]
    pub virtual_hosts: Vec<VirtualHost>,
}

/// A set of domains and the ordered routes that apply to them.
///
/// Virtual hosts keep their position in the table even when they carry no
/// usable routes, so consumers addressing hosts by index see a stable layout.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualHost {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub routers: Vec<Router>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Router {
    #[serde(rename = "match", default)]
    pub matcher: RouterMatch,
    pub route: RouteAction,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterMatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<HeaderMatch>,
}

/// Matches a request header by name, and by exact value when one is given.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMatch {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Where a matched request is sent.
///
/// Exactly one of `cluster_name`, `cluster_header` or `weighted_clusters` is
/// populated. Weighted targets keep their declaration order and the weights
/// exactly as delivered.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_header: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weighted_clusters: Vec<WeightedCluster>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix_rewrite: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
}

impl RouteAction {
    pub fn cluster(name: impl Into<String>) -> Self {
        Self {
            cluster_name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn weighted(clusters: impl IntoIterator<Item = (String, u32)>) -> Self {
        Self {
            weighted_clusters: clusters
                .into_iter()
                .map(|(name, weight)| WeightedCluster {
                    cluster: ClusterWeight { name, weight },
                })
                .collect(),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedCluster {
    pub cluster: ClusterWeight,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterWeight {
    pub name: String,
    pub weight: u32,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn weighted_route_omits_cluster_name() {
        let action = RouteAction::weighted([
            ("outbound|9080|v1|reviews.default.svc.cluster.local".into(), 50),
            ("outbound|9080|v3|reviews.default.svc.cluster.local".into(), 50),
        ]);

        assert_eq!(
            json!({
                "weighted_clusters": [
                    { "cluster": { "name": "outbound|9080|v1|reviews.default.svc.cluster.local", "weight": 50 } },
                    { "cluster": { "name": "outbound|9080|v3|reviews.default.svc.cluster.local", "weight": 50 } },
                ]
            }),
            serde_json::to_value(&action).unwrap()
        );
    }

    #[test]
    fn router_match_is_renamed() {
        let router = Router {
            matcher: RouterMatch {
                prefix: Some("/".into()),
                ..<_>::default()
            },
            route: RouteAction::cluster("a"),
        };

        assert_eq!(
            json!({ "match": { "prefix": "/" }, "route": { "cluster_name": "a" } }),
            serde_json::to_value(&router).unwrap()
        );
    }
}
