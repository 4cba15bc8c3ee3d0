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

use super::route_proto;
use crate::resources::{
    ClusterWeight, HeaderMatch, RouteAction, RouteConfig, Router, RouterMatch, VirtualHost,
    WeightedCluster,
};

pub(super) fn convert_route_configuration(config: route_proto::RouteConfiguration) -> RouteConfig {
    RouteConfig {
        name: config.name,
        virtual_hosts: config
            .virtual_hosts
            .into_iter()
            .map(convert_virtual_host)
            .collect(),
    }
}

// A host whose routes are all unsupported stays in place with no routers.
fn convert_virtual_host(host: route_proto::VirtualHost) -> VirtualHost {
    let name = host.name;
    let routers = host
        .routes
        .into_iter()
        .filter_map(|route| {
            let router = convert_route(route);
            if router.is_none() {
                tracing::debug!(virtual_host = %name, "skipping route without a forwarding action");
            }
            router
        })
        .collect();

    VirtualHost {
        name,
        domains: host.domains,
        routers,
    }
}

fn convert_route(route: route_proto::Route) -> Option<Router> {
    use route_proto::{route::Action, route_action::ClusterSpecifier};

    let Action::Route(action) = route.action?;
    let cluster_specifier = action.cluster_specifier?;

    let mut route_action = RouteAction {
        prefix_rewrite: Some(action.prefix_rewrite).filter(|rewrite| !rewrite.is_empty()),
        timeout: action.timeout.and_then(duration),
        ..RouteAction::default()
    };

    match cluster_specifier {
        ClusterSpecifier::Cluster(name) => route_action.cluster_name = Some(name),
        ClusterSpecifier::ClusterHeader(header) => route_action.cluster_header = Some(header),
        ClusterSpecifier::WeightedClusters(weighted) => {
            route_action.weighted_clusters = weighted
                .clusters
                .into_iter()
                .map(|cluster| WeightedCluster {
                    cluster: ClusterWeight {
                        name: cluster.name,
                        weight: cluster.weight.unwrap_or(0),
                    },
                })
                .collect();
        }
    }

    Some(Router {
        matcher: route.r#match.map(convert_match).unwrap_or_default(),
        route: route_action,
    })
}

fn convert_match(matcher: route_proto::RouteMatch) -> RouterMatch {
    use route_proto::{header_matcher::HeaderMatchSpecifier, route_match::PathSpecifier};

    let (prefix, path) = match matcher.path_specifier {
        Some(PathSpecifier::Prefix(prefix)) => (Some(prefix), None),
        Some(PathSpecifier::Path(path)) => (None, Some(path)),
        None => (None, None),
    };

    RouterMatch {
        prefix,
        path,
        headers: matcher
            .headers
            .into_iter()
            .map(|header| HeaderMatch {
                name: header.name,
                value: match header.header_match_specifier {
                    Some(HeaderMatchSpecifier::ExactMatch(value)) => Some(value),
                    Some(HeaderMatchSpecifier::PresentMatch(_)) | None => None,
                },
            })
            .collect(),
    }
}

fn duration(duration: prost_types::Duration) -> Option<Duration> {
    let seconds = u64::try_from(duration.seconds).ok()?;
    let nanos = u32::try_from(duration.nanos).ok()?;
    Some(Duration::new(seconds, nanos))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test;

    #[test]
    fn weighted_clusters_keep_order_and_weight() {
        let config = test::route_configuration(
            "9080",
            vec![test::virtual_host(
                "reviews.default.svc.cluster.local:9080",
                vec![test::route_to_weighted(
                    "/",
                    &[
                        ("outbound|9080|v1|reviews.default.svc.cluster.local", 50),
                        ("outbound|9080|v3|reviews.default.svc.cluster.local", 50),
                    ],
                )],
            )],
        );

        let converted = convert_route_configuration(config);
        let action = &converted.virtual_hosts[0].routers[0].route;

        assert_eq!(None, action.cluster_name);
        assert_eq!(
            vec![
                ("outbound|9080|v1|reviews.default.svc.cluster.local", 50),
                ("outbound|9080|v3|reviews.default.svc.cluster.local", 50),
            ],
            action
                .weighted_clusters
                .iter()
                .map(|w| (&*w.cluster.name, w.cluster.weight))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn sparse_virtual_hosts_keep_position() {
        let mut unsupported = test::route_to_cluster("/", "ignored");
        unsupported.action = None;

        let config = test::route_configuration(
            "9080",
            vec![
                test::virtual_host("a", vec![unsupported]),
                test::virtual_host("b", vec![]),
                test::virtual_host("c", vec![test::route_to_cluster("/", "c-cluster")]),
            ],
        );

        let converted = convert_route_configuration(config);
        assert_eq!(3, converted.virtual_hosts.len());
        assert!(converted.virtual_hosts[0].routers.is_empty());
        assert!(converted.virtual_hosts[1].routers.is_empty());
        assert_eq!(
            Some("c-cluster".into()),
            converted.virtual_hosts[2].routers[0].route.cluster_name
        );
    }

    #[test]
    fn match_and_action_details() {
        use route_proto::{header_matcher::HeaderMatchSpecifier, route_match::PathSpecifier};

        let mut route = test::route_to_cluster("/", "a");
        route.r#match = Some(route_proto::RouteMatch {
            path_specifier: Some(PathSpecifier::Path("/health".into())),
            headers: vec![route_proto::HeaderMatcher {
                name: "x-version".into(),
                header_match_specifier: Some(HeaderMatchSpecifier::ExactMatch("v2".into())),
            }],
        });
        if let Some(route_proto::route::Action::Route(action)) = &mut route.action {
            action.prefix_rewrite = "/".into();
            action.timeout = Some(prost_types::Duration {
                seconds: 15,
                nanos: 0,
            });
        }

        let router = convert_route(route).unwrap();
        assert_eq!(Some("/health".into()), router.matcher.path);
        assert_eq!(None, router.matcher.prefix);
        assert_eq!(
            vec![HeaderMatch {
                name: "x-version".into(),
                value: Some("v2".into()),
            }],
            router.matcher.headers
        );
        assert_eq!(Some("/".into()), router.route.prefix_rewrite);
        assert_eq!(Some(Duration::from_secs(15)), router.route.timeout);
    }

    #[test]
    fn negative_duration_is_dropped() {
        assert_eq!(
            None,
            duration(prost_types::Duration {
                seconds: -1,
                nanos: 0
            })
        );
    }
}
