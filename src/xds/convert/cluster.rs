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

use super::{address_string, cluster_proto, endpoint};
use crate::{
    resources::{Cluster, DiscoveryType, Host, LbType},
    xds::{ConvertError, ResourceType},
};

pub(super) fn convert(cluster: cluster_proto::Cluster) -> Result<Cluster, ConvertError> {
    use cluster_proto::cluster::{ClusterDiscoveryType, DiscoveryType as ProtoType, LbPolicy};

    if cluster.name.is_empty() {
        return Err(ConvertError::invalid(ResourceType::Cluster, "", "empty cluster name"));
    }

    let lb_type = match LbPolicy::try_from(cluster.lb_policy) {
        Ok(LbPolicy::RoundRobin) => LbType::RoundRobin,
        Ok(LbPolicy::LeastRequest) => LbType::LeastRequest,
        Ok(LbPolicy::RingHash) => LbType::RingHash,
        Ok(LbPolicy::Random) => LbType::Random,
        Ok(LbPolicy::Maglev) => LbType::Maglev,
        Ok(LbPolicy::ClusterProvided) => LbType::ClusterProvided,
        Ok(LbPolicy::LoadBalancingPolicyConfig) | Err(_) => {
            return Err(ConvertError::invalid(
                ResourceType::Cluster,
                cluster.name,
                format!("unsupported lb policy {}", cluster.lb_policy),
            ))
        }
    };

    let discovery_type = match cluster.cluster_discovery_type {
        None => DiscoveryType::Static,
        Some(ClusterDiscoveryType::Type(value)) => match ProtoType::try_from(value) {
            Ok(ProtoType::Static) => DiscoveryType::Static,
            Ok(ProtoType::StrictDns) => DiscoveryType::StrictDns,
            Ok(ProtoType::LogicalDns) => DiscoveryType::LogicalDns,
            Ok(ProtoType::Eds) => DiscoveryType::Eds,
            Ok(ProtoType::OriginalDst) => DiscoveryType::OriginalDst,
            Err(_) => {
                return Err(ConvertError::invalid(
                    ResourceType::Cluster,
                    cluster.name,
                    format!("unsupported discovery type {value}"),
                ))
            }
        },
    };

    // `load_assignment` wins over the deprecated `hosts` list.
    let hosts = match &cluster.load_assignment {
        Some(assignment) => endpoint::hosts(assignment),
        None => cluster
            .hosts
            .iter()
            .filter_map(address_string)
            .map(Host::new)
            .collect(),
    };

    Ok(Cluster {
        name: cluster.name,
        discovery_type,
        lb_type,
        hosts,
        connect_timeout: cluster.connect_timeout.and_then(|timeout| {
            Some(Duration::new(
                u64::try_from(timeout.seconds).ok()?,
                u32::try_from(timeout.nanos).ok()?,
            ))
        }),
        per_connection_buffer_limit_bytes: cluster.per_connection_buffer_limit_bytes,
        max_requests_per_connection: cluster.max_requests_per_connection,
    })
}
