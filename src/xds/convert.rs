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

//! Conversion of discovery responses into the effective configuration.

mod cluster;
mod endpoint;
mod listener;
mod route;
mod secret;

use std::{net::IpAddr, sync::Arc};

use bytes::Bytes;

use super::{ConvertError, ResourceType};
use crate::{
    config::ConfigStore,
    generated::envoy::{
        config::{
            cluster::v3 as cluster_proto, core::v3 as core_proto, endpoint::v3 as endpoint_proto,
            listener::v3 as listener_proto, route::v3 as route_proto,
        },
        extensions::transport_sockets::tls::v3 as tls_proto,
        service::discovery::v3::DiscoveryResponse,
    },
    resources::RouteConfig,
    secret::SecretProvider,
};

/// What a successfully converted response changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Applied {
    /// Names of the listeners that were upserted.
    Listeners(Vec<String>),
    /// The complete set of cluster names now present.
    Clusters(Vec<String>),
    /// Names of the clusters whose hosts were replaced.
    Endpoints(Vec<String>),
    /// Route tables are reported but not stored.
    Routes(Vec<RouteConfig>),
    /// Names of the secrets that were replaced.
    Secrets(Vec<String>),
}

impl Applied {
    pub fn resource_type(&self) -> ResourceType {
        match self {
            Self::Listeners(_) => ResourceType::Listener,
            Self::Clusters(_) => ResourceType::Cluster,
            Self::Endpoints(_) => ResourceType::Endpoint,
            Self::Routes(_) => ResourceType::Route,
            Self::Secrets(_) => ResourceType::Secret,
        }
    }
}

/// Applies discovery responses onto a [`ConfigStore`] and a
/// [`SecretProvider`].
///
/// Every resource in a response is decoded and converted before anything is
/// written, so a response either applies completely or not at all.
#[derive(Clone)]
pub struct ResponseConverter {
    store: Arc<ConfigStore>,
    secrets: Arc<dyn SecretProvider>,
}

impl ResponseConverter {
    pub fn new(store: Arc<ConfigStore>, secrets: Arc<dyn SecretProvider>) -> Self {
        Self { store, secrets }
    }

    pub fn store(&self) -> &Arc<ConfigStore> {
        &self.store
    }

    pub fn apply(&self, response: DiscoveryResponse) -> Result<Applied, ConvertError> {
        let resource_type = ResourceType::try_from(&*response.type_url)?;
        tracing::debug!(
            %resource_type,
            version = %response.version_info,
            nonce = %response.nonce,
            resources = response.resources.len(),
            "applying discovery response"
        );

        match resource_type {
            ResourceType::Listener => {
                let listeners = decode::<listener_proto::Listener>(resource_type, response.resources)?
                    .into_iter()
                    .map(listener::convert)
                    .collect::<Result<Vec<_>, _>>()?;
                let names = listeners.iter().map(|l| l.name.clone()).collect();
                self.store.upsert_listeners(listeners);
                Ok(Applied::Listeners(names))
            }
            ResourceType::Cluster => {
                let clusters = decode::<cluster_proto::Cluster>(resource_type, response.resources)?
                    .into_iter()
                    .map(cluster::convert)
                    .collect::<Result<Vec<_>, _>>()?;
                let names = clusters.iter().map(|c| c.name.clone()).collect();
                self.store.replace_clusters(clusters);
                Ok(Applied::Clusters(names))
            }
            ResourceType::Endpoint => {
                let assignments = decode::<endpoint_proto::ClusterLoadAssignment>(
                    resource_type,
                    response.resources,
                )?
                .into_iter()
                .map(endpoint::convert)
                .collect::<Result<Vec<_>, _>>()?;
                let names = assignments.iter().map(|(name, _)| name.clone()).collect();
                for name in self.store.update_endpoints(assignments) {
                    tracing::warn!(cluster = %name, "endpoints received for unknown cluster");
                }
                Ok(Applied::Endpoints(names))
            }
            ResourceType::Route => {
                let routes = decode::<route_proto::RouteConfiguration>(resource_type, response.resources)?
                    .into_iter()
                    .map(route::convert_route_configuration)
                    .collect();
                Ok(Applied::Routes(routes))
            }
            ResourceType::Secret => {
                let secrets = decode::<tls_proto::Secret>(resource_type, response.resources)?
                    .into_iter()
                    .map(secret::convert)
                    .collect::<Result<Vec<_>, _>>()?;
                let names = secrets.iter().map(|(name, _)| name.clone()).collect();
                for (name, material) in secrets {
                    self.secrets.set_secret(&name, material);
                }
                Ok(Applied::Secrets(names))
            }
        }
    }
}

fn decode<M: prost::Message + Default>(
    resource_type: ResourceType,
    resources: Vec<prost_types::Any>,
) -> Result<Vec<M>, ConvertError> {
    resources
        .into_iter()
        .map(|resource| {
            if resource.type_url != resource_type.type_url() {
                return Err(ConvertError::MismatchedType {
                    expected: resource_type,
                    found: resource.type_url,
                });
            }

            M::decode(Bytes::from(resource.value)).map_err(|source| ConvertError::Decode {
                resource_type,
                source,
            })
        })
        .collect()
}

/// Renders an address as `ip:port`, `host:port`, or a unix socket path.
fn address_string(address: &core_proto::Address) -> Option<String> {
    use core_proto::{address, socket_address::PortSpecifier};

    match address.address.as_ref()? {
        address::Address::SocketAddress(socket) => {
            let port = match socket.port_specifier.as_ref()? {
                PortSpecifier::PortValue(port) => port.to_string(),
                PortSpecifier::NamedPort(name) => name.clone(),
            };
            Some(match socket.address.parse::<IpAddr>() {
                Ok(IpAddr::V6(ip)) => format!("[{ip}]:{port}"),
                Ok(IpAddr::V4(ip)) => format!("{ip}:{port}"),
                Err(_) => format!("{}:{port}", socket.address),
            })
        }
        address::Address::Pipe(pipe) => Some(pipe.path.clone()),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        secret::SecretStore,
        test::{self, any},
        xds::{CLUSTER_TYPE, LISTENER_TYPE},
    };

    fn converter() -> (ResponseConverter, Arc<ConfigStore>, Arc<SecretStore>) {
        let store = Arc::new(ConfigStore::default());
        let secrets = Arc::new(SecretStore::new());
        (
            ResponseConverter::new(store.clone(), secrets.clone()),
            store,
            secrets,
        )
    }

    #[test]
    fn unknown_type_is_rejected() {
        let (converter, store, _) = converter();
        let before = store.snapshot();

        let error = converter
            .apply(DiscoveryResponse {
                type_url: "type.googleapis.com/envoy.service.runtime.v3.Runtime".into(),
                ..<_>::default()
            })
            .unwrap_err();

        assert!(matches!(error, ConvertError::UnknownType(_)));
        assert_eq!(before, store.snapshot());
    }

    #[test]
    fn malformed_resource_discards_whole_response() {
        let (converter, store, _) = converter();
        let mut response = test::cluster_response("1", [test::cluster("a", &["10.0.0.1:80"])]);
        response.resources.push(prost_types::Any {
            type_url: CLUSTER_TYPE.into(),
            value: vec![0xff, 0xff, 0xff],
        });

        let error = converter.apply(response).unwrap_err();
        assert!(matches!(error, ConvertError::Decode { .. }), "{error}");
        assert!(store.snapshot().clusters.is_empty());
    }

    #[test]
    fn mismatched_resource_type() {
        let (converter, store, _) = converter();
        let mut response = test::cluster_response("1", []);
        response
            .resources
            .push(any(LISTENER_TYPE, &test::listener("l", "0.0.0.0", 80)));

        assert!(matches!(
            converter.apply(response),
            Err(ConvertError::MismatchedType { expected: ResourceType::Cluster, .. })
        ));
        assert!(store.snapshot().clusters.is_empty());
    }

    #[test]
    fn empty_cluster_response_clears_clusters() {
        let (converter, store, _) = converter();
        converter
            .apply(test::cluster_response("1", [test::cluster("a", &[])]))
            .unwrap();
        assert_eq!(
            Applied::Clusters(vec![]),
            converter.apply(test::cluster_response("2", [])).unwrap()
        );
        assert!(store.snapshot().clusters.is_empty());
    }

    #[test]
    fn endpoints_for_unknown_cluster_are_ignored() {
        let (converter, store, _) = converter();
        converter
            .apply(test::cluster_response("1", [test::cluster("a", &["10.0.0.1:80"])]))
            .unwrap();

        let applied = converter
            .apply(test::endpoint_response(
                "1",
                [
                    test::load_assignment("a", &[("10.0.0.2", 80, None)]),
                    test::load_assignment("b", &[("10.0.0.3", 80, None)]),
                ],
            ))
            .unwrap();

        assert_eq!(Applied::Endpoints(vec!["a".into(), "b".into()]), applied);
        let snapshot = store.snapshot();
        assert_eq!(1, snapshot.clusters.len());
        assert_eq!("10.0.0.2:80", snapshot.clusters["a"].hosts[0].address);
    }

    #[test]
    fn address_rendering() {
        use core_proto::{address, socket_address::PortSpecifier, Pipe, SocketAddress};

        let socket = |ip: &str| core_proto::Address {
            address: Some(address::Address::SocketAddress(SocketAddress {
                address: ip.into(),
                port_specifier: Some(PortSpecifier::PortValue(9080)),
                ..<_>::default()
            })),
        };

        assert_eq!(Some("0.0.0.0:9080".into()), address_string(&socket("0.0.0.0")));
        assert_eq!(Some("[::1]:9080".into()), address_string(&socket("::1")));
        assert_eq!(
            Some("reviews.default:9080".into()),
            address_string(&socket("reviews.default"))
        );
        assert_eq!(
            Some("/var/run/app.sock".into()),
            address_string(&core_proto::Address {
                address: Some(address::Address::Pipe(Pipe {
                    path: "/var/run/app.sock".into(),
                    mode: 0,
                })),
            })
        );
        assert_eq!(None, address_string(&core_proto::Address::default()));
    }
}
