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

use std::{path::Path, path::PathBuf, time::Duration};

use tokio::signal;

use crate::{
    config::{BaseConfig, ConfigStore, NodeIdentity},
    secret::SecretStore,
    xds::{
        PumpConfig, ReconnectPolicy, ResourceType, ResponseConverter, Service, SubscriptionPump,
        WILDCARD,
    },
};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const GIT_COMMIT_HASH: Option<&str> = option_env!("GIT_COMMIT_HASH");

/// Runs the dynamic configuration engine of a sidecar against the management
/// servers named in its base configuration.
#[derive(Debug, clap::Parser)]
#[command(version, about)]
#[non_exhaustive]
pub struct Cli {
    /// Path to the base configuration (YAML or JSON).
    #[clap(short, long, env = "SIDECAR_XDS_CONFIG", default_value = "sidecar.yaml")]
    pub base_config: PathBuf,
    /// Node id sent to the management server. Defaults to the base
    /// configuration's, or a random id.
    #[clap(long, env = "SIDECAR_XDS_NODE_ID")]
    pub node_id: Option<String>,
    /// Service cluster sent to the management server.
    #[clap(long, env = "SIDECAR_XDS_NODE_CLUSTER")]
    pub node_cluster: Option<String>,
    /// Secret to subscribe to over SDS. May be repeated.
    #[clap(long = "secret", value_name = "NAME")]
    pub secrets: Vec<String>,
    /// Delay between reconnection attempts.
    #[clap(long, env = "SIDECAR_XDS_RECONNECT_INTERVAL_MS", default_value_t = 1000)]
    pub reconnect_interval_ms: u64,
    /// Whether to report anything to stdout/stderr.
    #[clap(short, long, env)]
    pub quiet: bool,
}

impl Cli {
    /// Drives the engine until the process receives SIGINT or SIGTERM.
    #[tracing::instrument(skip_all)]
    pub async fn drive(self) -> crate::Result<()> {
        let version: std::borrow::Cow<'static, str> = if cfg!(debug_assertions) {
            format!("{VERSION}+debug").into()
        } else {
            VERSION.into()
        };

        if !self.quiet {
            let env_filter = tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy();
            tracing_subscriber::fmt()
                .json()
                .with_file(true)
                .with_env_filter(env_filter)
                .init();
        }

        tracing::info!(
            version = &*version,
            commit = GIT_COMMIT_HASH.unwrap_or("unknown"),
            "starting sidecar-xds"
        );

        let base = Self::read_config(&self.base_config)?;
        let node = self.node_identity(&base.node);
        tracing::info!(id = %node.id, cluster = %node.cluster, "node identity");

        let store = ConfigStore::global();
        store.set_base(base);
        let base = store.base();
        let converter = ResponseConverter::new(store.clone(), SecretStore::global());
        let policy = ReconnectPolicy::fixed(Duration::from_millis(self.reconnect_interval_ms));
        let dynamic = base.dynamic_resources.clone().unwrap_or_default();

        let mut pumps = Vec::new();
        match &dynamic.ads_config {
            Some(source) => {
                let config = PumpConfig {
                    node: node.clone(),
                    resource_type: ResourceType::Listener,
                    policy: policy.clone(),
                };
                let pump = SubscriptionPump::from_source(
                    config,
                    source,
                    &base,
                    Service::AggregatedDiscovery,
                    converter.clone(),
                )?
                .with_dependent_subscriptions()
                .with_update_hook(|applied| {
                    tracing::info!(resource_type = %applied.resource_type(), "configuration updated")
                });
                pump.start();
                pump.enqueue_resource(ResourceType::Listener, WILDCARD).await?;
                pump.enqueue_resource(ResourceType::Cluster, WILDCARD).await?;
                pumps.push(pump);
            }
            None => tracing::warn!("no ads source configured, running on the base configuration"),
        }

        match (&dynamic.sds_config, self.secrets.is_empty()) {
            (_, true) => {}
            (Some(source), false) => {
                let config = PumpConfig {
                    node,
                    resource_type: ResourceType::Secret,
                    policy,
                };
                let pump = SubscriptionPump::from_source(
                    config,
                    source,
                    &base,
                    Service::SecretDiscovery,
                    converter,
                )?;
                pump.start();
                for name in &self.secrets {
                    pump.enqueue(name.clone()).await?;
                }
                pumps.push(pump);
            }
            (None, false) => {
                eyre::bail!("secrets were requested but no sds source is configured")
            }
        }

        let signal = Self::shutdown_signal().await?;
        tracing::info!(%signal, "shutting down from signal");
        for pump in &pumps {
            pump.stop().await;
        }

        Ok(())
    }

    fn node_identity(&self, configured: &NodeIdentity) -> NodeIdentity {
        let id = self
            .node_id
            .clone()
            .or_else(|| (!configured.id.is_empty()).then(|| configured.id.clone()))
            .unwrap_or_else(|| format!("sidecar~{}", uuid::Uuid::new_v4()));
        let cluster = self
            .node_cluster
            .clone()
            .unwrap_or_else(|| configured.cluster.clone());

        NodeIdentity::new(id, cluster)
    }

    async fn shutdown_signal() -> std::io::Result<&'static str> {
        #[cfg(unix)]
        let mut sig_term = signal::unix::signal(signal::unix::SignalKind::terminate())?;

        #[cfg(unix)]
        let sig_term = sig_term.recv();
        #[cfg(not(unix))]
        let sig_term = std::future::pending::<Option<()>>();

        Ok(tokio::select! {
            result = signal::ctrl_c() => result.map(|_| "SIGINT")?,
            _ = sig_term => "SIGTERM",
        })
    }

    /// Reads the base configuration. A missing file means an empty base.
    fn read_config(path: &Path) -> crate::Result<BaseConfig> {
        match std::fs::File::open(path) {
            Ok(file) => Ok(BaseConfig::from_reader(file)?),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "base configuration not found, using defaults");
                Ok(BaseConfig::default())
            }
            Err(error) => Err(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn arguments() {
        let cli = Cli::try_parse_from([
            "sidecar-xds",
            "--base-config",
            "/etc/sidecar/base.yaml",
            "--node-id",
            "sidecar~10.0.0.1~reviews",
            "--secret",
            "default",
            "--secret",
            "ROOTCA",
        ])
        .unwrap();

        assert_eq!(PathBuf::from("/etc/sidecar/base.yaml"), cli.base_config);
        assert_eq!(vec!["default", "ROOTCA"], cli.secrets);
        assert_eq!(1000, cli.reconnect_interval_ms);
    }

    #[test]
    fn node_identity_precedence() {
        let cli = Cli::try_parse_from(["sidecar-xds", "--node-cluster", "ratings"]).unwrap();
        let node = cli.node_identity(&NodeIdentity::new("configured", "reviews"));
        assert_eq!(NodeIdentity::new("configured", "ratings"), node);

        let node = cli.node_identity(&NodeIdentity::default());
        assert!(node.id.starts_with("sidecar~"));
    }

    #[test]
    fn missing_config_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = Cli::read_config(&dir.path().join("missing.yaml")).unwrap();
        assert_eq!(BaseConfig::default(), config);
    }

    #[test]
    fn reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("base.yaml");
        std::fs::write(
            &path,
            "node:\n  id: sidecar~10.0.0.1\n  cluster: reviews\n",
        )
        .unwrap();

        let config = Cli::read_config(&path).unwrap();
        assert_eq!(NodeIdentity::new("sidecar~10.0.0.1", "reviews"), config.node);
    }
}
