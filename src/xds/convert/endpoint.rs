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

use super::{address_string, endpoint_proto};
use crate::{
    resources::Host,
    xds::{ConvertError, ResourceType},
};

pub(super) fn convert(
    assignment: endpoint_proto::ClusterLoadAssignment,
) -> Result<(String, Vec<Host>), ConvertError> {
    if assignment.cluster_name.is_empty() {
        return Err(ConvertError::invalid(
            ResourceType::Endpoint,
            "",
            "load assignment without a cluster name",
        ));
    }

    let hosts = hosts(&assignment);
    Ok((assignment.cluster_name, hosts))
}

/// Flattens every locality group into a single host list. Endpoints without
/// a usable address are skipped.
pub(super) fn hosts(assignment: &endpoint_proto::ClusterLoadAssignment) -> Vec<Host> {
    use endpoint_proto::lb_endpoint::HostIdentifier;

    assignment
        .endpoints
        .iter()
        .flat_map(|locality| locality.lb_endpoints.iter())
        .filter_map(|lb_endpoint| {
            let endpoint = match lb_endpoint.host_identifier.as_ref()? {
                HostIdentifier::Endpoint(endpoint) => endpoint,
                HostIdentifier::EndpointName(name) => {
                    tracing::debug!(cluster = %assignment.cluster_name, %name, "skipping named endpoint");
                    return None;
                }
            };

            Some(Host {
                address: address_string(endpoint.address.as_ref()?)?,
                hostname: endpoint.hostname.clone(),
                weight: lb_endpoint.load_balancing_weight.unwrap_or(1),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test;

    #[test]
    fn weights_default_to_one() {
        let (name, hosts) = convert(test::load_assignment(
            "outbound|9080||ratings.default.svc.cluster.local",
            &[("10.0.0.1", 9080, None), ("10.0.0.2", 9080, Some(3))],
        ))
        .unwrap();

        assert_eq!("outbound|9080||ratings.default.svc.cluster.local", name);
        assert_eq!(
            vec![
                Host::new("10.0.0.1:9080"),
                Host {
                    weight: 3,
                    ..Host::new("10.0.0.2:9080")
                },
            ],
            hosts
        );
    }

    #[test]
    fn localities_are_flattened() {
        let mut assignment = test::load_assignment("c", &[("10.0.0.1", 80, None)]);
        let mut second = assignment.endpoints[0].clone();
        second.lb_endpoints = test::load_assignment("c", &[("10.0.1.1", 80, None)]).endpoints[0]
            .lb_endpoints
            .clone();
        assignment.endpoints.push(second);

        let (_, hosts) = convert(assignment).unwrap();
        assert_eq!(
            vec!["10.0.0.1:80", "10.0.1.1:80"],
            hosts.iter().map(|h| &*h.address).collect::<Vec<_>>()
        );
    }

    #[test]
    fn missing_cluster_name() {
        assert!(convert(endpoint_proto::ClusterLoadAssignment::default()).is_err());
    }
}
