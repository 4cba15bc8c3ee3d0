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

//! Static base configuration and the discovery sources it names.

mod error;
pub mod store;

use std::{collections::HashSet, fmt, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    generated::envoy::config::core::v3 as proto,
    resources::{Cluster, Listener},
};

pub use self::{error::ConfigError, store::ConfigStore};

const USER_AGENT: &str = "sidecar-xds";

/// The configuration the proxy starts with, before anything is discovered.
///
/// Static listeners and clusters only ever live here; the dynamic maps in
/// [`ConfigStore`] are a separate namespace.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseConfig {
    #[serde(default)]
    pub node: NodeIdentity,
    #[serde(default)]
    pub listeners: Vec<Listener>,
    #[serde(default)]
    pub clusters: Vec<Cluster>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_resources: Option<DynamicResources>,
}

impl BaseConfig {
    /// Parses a YAML (or JSON) document and validates it.
    pub fn from_reader<R: std::io::Read>(input: R) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_reader(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for listener in &self.listeners {
            if !seen.insert(&*listener.name) {
                return Err(ConfigError::NotUnique("listener", listener.name.clone()));
            }
        }

        seen.clear();
        for cluster in &self.clusters {
            if !seen.insert(&*cluster.name) {
                return Err(ConfigError::NotUnique("cluster", cluster.name.clone()));
            }
        }

        Ok(())
    }

    pub fn static_cluster(&self, name: &str) -> Option<&Cluster> {
        self.clusters.iter().find(|cluster| cluster.name == name)
    }
}

/// How this proxy identifies itself to the management server.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeIdentity {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub cluster: String,
}

impl NodeIdentity {
    pub fn new(id: impl Into<String>, cluster: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cluster: cluster.into(),
        }
    }

    pub fn to_node(&self) -> proto::Node {
        proto::Node {
            id: self.id.clone(),
            cluster: self.cluster.clone(),
            user_agent_name: USER_AGENT.into(),
            user_agent_version_type: Some(proto::node::UserAgentVersionType::UserAgentVersion(
                env!("CARGO_PKG_VERSION").into(),
            )),
            ..<_>::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicResources {
    /// Aggregated source for listeners, clusters, endpoints and routes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ads_config: Option<DiscoverySource>,
    /// Source for TLS secrets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sds_config: Option<DiscoverySource>,
}

/// An api config source as it appears in the base configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoverySource {
    pub api_type: ApiType,
    #[serde(default)]
    pub grpc_services: Vec<GrpcService>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiType {
    Rest,
    Grpc,
    DeltaGrpc,
    AggregatedGrpc,
    AggregatedDeltaGrpc,
}

impl fmt::Display for ApiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rest => "REST",
            Self::Grpc => "GRPC",
            Self::DeltaGrpc => "DELTA_GRPC",
            Self::AggregatedGrpc => "AGGREGATED_GRPC",
            Self::AggregatedDeltaGrpc => "AGGREGATED_DELTA_GRPC",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrpcService {
    /// A cluster from the static configuration that hosts the server.
    EnvoyGrpc { cluster_name: String },
    /// A direct target: a unix socket path, a `unix:` URI, or an authority.
    GoogleGrpc {
        target_uri: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        stat_prefix: String,
    },
}

impl DiscoverySource {
    pub fn grpc(service: GrpcService) -> Self {
        Self {
            api_type: ApiType::Grpc,
            grpc_services: vec![service],
        }
    }

    /// Resolves the source into a connectable target for `node`.
    pub fn target(
        &self,
        base: &BaseConfig,
        node: &NodeIdentity,
    ) -> Result<StreamTarget, ConfigError> {
        if self.api_type != ApiType::Grpc {
            return Err(ConfigError::UnsupportedApiType(self.api_type.to_string()));
        }

        let [service] = &*self.grpc_services else {
            return Err(ConfigError::GrpcServiceCount(self.grpc_services.len()));
        };

        let endpoint = match service {
            GrpcService::GoogleGrpc { target_uri, .. } => TargetEndpoint::parse(target_uri)?,
            GrpcService::EnvoyGrpc { cluster_name } => {
                let cluster = base
                    .static_cluster(cluster_name)
                    .ok_or_else(|| ConfigError::UnknownCluster(cluster_name.clone()))?;
                let host = cluster
                    .hosts
                    .first()
                    .ok_or_else(|| ConfigError::EmptyCluster(cluster_name.clone()))?;
                TargetEndpoint::parse(&host.address)?
            }
        };

        Ok(StreamTarget {
            endpoint,
            node: node.clone(),
        })
    }
}

impl TryFrom<&'_ proto::ConfigSource> for DiscoverySource {
    type Error = ConfigError;

    fn try_from(source: &proto::ConfigSource) -> Result<Self, Self::Error> {
        use proto::{api_config_source::ApiType as ProtoApiType, grpc_service::TargetSpecifier};

        let Some(proto::config_source::ConfigSourceSpecifier::ApiConfigSource(api)) =
            &source.config_source_specifier
        else {
            return Err(ConfigError::MissingApiConfigSource);
        };

        let api_type = match ProtoApiType::try_from(api.api_type) {
            Ok(ProtoApiType::Rest) => ApiType::Rest,
            Ok(ProtoApiType::Grpc) => ApiType::Grpc,
            Ok(ProtoApiType::DeltaGrpc) => ApiType::DeltaGrpc,
            Ok(ProtoApiType::AggregatedGrpc) => ApiType::AggregatedGrpc,
            Ok(ProtoApiType::AggregatedDeltaGrpc) => ApiType::AggregatedDeltaGrpc,
            Ok(ProtoApiType::DeprecatedAndUnavailableDoNotUse) | Err(_) => {
                return Err(ConfigError::UnsupportedApiType(api.api_type.to_string()))
            }
        };

        let grpc_services = api
            .grpc_services
            .iter()
            .map(|service| match &service.target_specifier {
                Some(TargetSpecifier::EnvoyGrpc(envoy)) => Ok(GrpcService::EnvoyGrpc {
                    cluster_name: envoy.cluster_name.clone(),
                }),
                Some(TargetSpecifier::GoogleGrpc(google)) => Ok(GrpcService::GoogleGrpc {
                    target_uri: google.target_uri.clone(),
                    stat_prefix: google.stat_prefix.clone(),
                }),
                None => Err(ConfigError::UnsupportedTarget),
            })
            .collect::<Result<_, _>>()?;

        Ok(Self {
            api_type,
            grpc_services,
        })
    }
}

/// Where a discovery stream connects to, and who it connects as.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamTarget {
    pub endpoint: TargetEndpoint,
    pub node: NodeIdentity,
}

impl fmt::Display for StreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.endpoint.fmt(f)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetEndpoint {
    Unix(PathBuf),
    Uri(String),
}

impl TargetEndpoint {
    pub fn parse(target: &str) -> Result<Self, ConfigError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(ConfigError::UnsupportedTarget);
        }

        if let Some(path) = target
            .strip_prefix("unix://")
            .or_else(|| target.strip_prefix("unix:"))
        {
            return Ok(Self::Unix(path.into()));
        }

        Ok(if target.starts_with('/') {
            Self::Unix(target.into())
        } else if target.contains("://") {
            Self::Uri(target.into())
        } else {
            Self::Uri(format!("http://{target}"))
        })
    }
}

impl fmt::Display for TargetEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unix(path) => write!(f, "unix:{}", path.display()),
            Self::Uri(uri) => f.write_str(uri),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::resources::Host;

    fn node() -> NodeIdentity {
        NodeIdentity::new(
            "sidecar~10.0.0.1~productpage.default~default.svc.cluster.local",
            "productpage",
        )
    }

    fn proto_source(
        api_type: proto::api_config_source::ApiType,
        services: Vec<proto::GrpcService>,
    ) -> proto::ConfigSource {
        use proto::config_source::ConfigSourceSpecifier;

        proto::ConfigSource {
            config_source_specifier: Some(ConfigSourceSpecifier::ApiConfigSource(
                proto::ApiConfigSource {
                    api_type: api_type as i32,
                    grpc_services: services,
                    ..<_>::default()
                },
            )),
        }
    }

    fn google_grpc(target_uri: &str) -> proto::GrpcService {
        proto::GrpcService {
            target_specifier: Some(proto::grpc_service::TargetSpecifier::GoogleGrpc(
                proto::grpc_service::GoogleGrpc {
                    target_uri: target_uri.into(),
                    stat_prefix: "sdsstat".into(),
                },
            )),
            ..<_>::default()
        }
    }

    #[test]
    fn parse_base_config() {
        let yaml = "
node:
  id: sidecar-1
  cluster: productpage
clusters:
  - name: xds-grpc
    hosts:
      - address: istio-pilot.istio-system:15010
dynamic_resources:
  ads_config:
    api_type: GRPC
    grpc_services:
      - envoy_grpc:
          cluster_name: xds-grpc
  sds_config:
    api_type: GRPC
    grpc_services:
      - google_grpc:
          target_uri: /var/run/sds/uds_path
";
        let config = BaseConfig::from_reader(yaml.as_bytes()).unwrap();
        let dynamic = config.dynamic_resources.clone().unwrap();

        let ads = dynamic.ads_config.unwrap().target(&config, &config.node).unwrap();
        assert_eq!(
            TargetEndpoint::Uri("http://istio-pilot.istio-system:15010".into()),
            ads.endpoint
        );
        assert_eq!("sidecar-1", ads.node.id);

        let sds = dynamic.sds_config.unwrap().target(&config, &config.node).unwrap();
        assert_eq!(TargetEndpoint::Unix("/var/run/sds/uds_path".into()), sds.endpoint);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let config: BaseConfig = serde_json::from_value(json!({
            "clusters": [ { "name": "a" }, { "name": "a" } ]
        }))
        .unwrap();

        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotUnique("cluster", name)) if name == "a"
        ));
    }

    #[test]
    fn single_google_grpc_service() {
        let source = DiscoverySource::try_from(&proto_source(
            proto::api_config_source::ApiType::Grpc,
            vec![google_grpc("unix:/var/run/sds")],
        ))
        .unwrap();

        let target = source.target(&BaseConfig::default(), &node()).unwrap();
        assert_eq!(TargetEndpoint::Unix("/var/run/sds".into()), target.endpoint);
        assert_eq!("unix:/var/run/sds", target.to_string());
    }

    #[test]
    fn service_count_must_be_one() {
        for services in [vec![], vec![google_grpc("/a"), google_grpc("/b")]] {
            let expected = services.len();
            let source = DiscoverySource::try_from(&proto_source(
                proto::api_config_source::ApiType::Grpc,
                services,
            ))
            .unwrap();

            match source.target(&BaseConfig::default(), &node()) {
                Err(ConfigError::GrpcServiceCount(count)) => assert_eq!(expected, count),
                other => panic!("unexpected result: {other:?}"),
            }
        }
    }

    #[test]
    fn api_type_must_be_grpc() {
        let source = DiscoverySource::try_from(&proto_source(
            proto::api_config_source::ApiType::Rest,
            vec![google_grpc("/a")],
        ))
        .unwrap();

        let error = source.target(&BaseConfig::default(), &node()).unwrap_err();
        assert_eq!("unsupported api type REST, only GRPC is supported", error.to_string());
    }

    #[test]
    fn missing_target_specifier() {
        let error = DiscoverySource::try_from(&proto_source(
            proto::api_config_source::ApiType::Grpc,
            vec![proto::GrpcService::default()],
        ))
        .unwrap_err();

        assert_eq!("unsupported sds target specifier", error.to_string());
    }

    #[test]
    fn not_an_api_config_source() {
        let source = proto::ConfigSource {
            config_source_specifier: Some(proto::config_source::ConfigSourceSpecifier::Ads(
                proto::AggregatedConfigSource {},
            )),
        };

        assert!(matches!(
            DiscoverySource::try_from(&source),
            Err(ConfigError::MissingApiConfigSource)
        ));
    }

    #[test]
    fn envoy_grpc_resolves_static_cluster() {
        let base = BaseConfig {
            clusters: vec![
                Cluster::new("sds-grpc").with_hosts([Host::new("/etc/istio/proxy/SDS")])
            ],
            ..<_>::default()
        };

        let target = DiscoverySource::grpc(GrpcService::EnvoyGrpc {
            cluster_name: "sds-grpc".into(),
        })
        .target(&base, &node())
        .unwrap();
        assert_eq!(TargetEndpoint::Unix("/etc/istio/proxy/SDS".into()), target.endpoint);

        let missing = DiscoverySource::grpc(GrpcService::EnvoyGrpc {
            cluster_name: "nope".into(),
        })
        .target(&base, &node());
        assert!(matches!(missing, Err(ConfigError::UnknownCluster(name)) if name == "nope"));
    }

    #[test]
    fn node_carries_user_agent() {
        let node = node().to_node();
        assert_eq!("sidecar-xds", node.user_agent_name);
        assert_eq!("productpage", node.cluster);
    }
}
