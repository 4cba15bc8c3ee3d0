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

use std::{collections::BTreeMap, sync::Arc};

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::Serialize;

use super::BaseConfig;
use crate::resources::{Cluster, DiscoveryType, Host, Listener};

static GLOBAL: Lazy<Arc<ConfigStore>> = Lazy::new(<_>::default);

/// A point in time copy of the effective configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Snapshot {
    #[serde(rename = "base_config")]
    pub base: Arc<BaseConfig>,
    #[serde(rename = "listener")]
    pub listeners: BTreeMap<String, Listener>,
    #[serde(rename = "cluster")]
    pub clusters: BTreeMap<String, Cluster>,
}

#[derive(Default)]
struct State {
    base: Arc<BaseConfig>,
    listeners: BTreeMap<String, Listener>,
    clusters: BTreeMap<String, Cluster>,
}

/// The process wide holder of the active configuration: the static base plus
/// everything discovered so far.
///
/// Writers are exclusive and every mutation is visible as a whole; readers
/// never see half of an update. The lock is only held for the duration of a
/// single mutation or copy.
#[derive(Default)]
pub struct ConfigStore {
    state: RwLock<State>,
}

impl ConfigStore {
    pub fn new(base: BaseConfig) -> Self {
        Self {
            state: RwLock::new(State {
                base: Arc::new(base),
                ..<_>::default()
            }),
        }
    }

    /// The store shared by the whole process.
    pub fn global() -> Arc<Self> {
        GLOBAL.clone()
    }

    pub fn set_base(&self, base: BaseConfig) {
        self.state.write().base = Arc::new(base);
    }

    pub fn base(&self) -> Arc<BaseConfig> {
        self.state.read().base.clone()
    }

    /// Inserts or replaces a dynamic listener by name.
    pub fn upsert_listener(&self, listener: Listener) {
        self.upsert_listeners([listener]);
    }

    /// Upserts every listener in one critical section.
    pub fn upsert_listeners(&self, listeners: impl IntoIterator<Item = Listener>) {
        let mut state = self.state.write();
        for listener in listeners {
            tracing::debug!(name = %listener.name, address = %listener.address, "upserting listener");
            state.listeners.insert(listener.name.clone(), listener);
        }
    }

    /// Replaces the whole set of dynamic clusters. Clusters absent from
    /// `clusters` are removed. An EDS cluster that arrives without hosts
    /// keeps the hosts endpoint discovery delivered for it.
    pub fn replace_clusters(&self, clusters: impl IntoIterator<Item = Cluster>) {
        let mut clusters: BTreeMap<_, _> = clusters
            .into_iter()
            .map(|cluster| (cluster.name.clone(), cluster))
            .collect();

        let mut state = self.state.write();
        for (name, cluster) in clusters.iter_mut() {
            if cluster.discovery_type != DiscoveryType::Eds || !cluster.hosts.is_empty() {
                continue;
            }
            if let Some(previous) = state.clusters.get(name) {
                cluster.hosts = previous.hosts.clone();
            }
        }
        for removed in state.clusters.keys().filter(|name| !clusters.contains_key(*name)) {
            tracing::debug!(name = %removed, "removing cluster");
        }
        state.clusters = clusters;
    }

    /// Replaces the host list of each named cluster, leaving every other
    /// cluster untouched. Returns the names that had no matching cluster.
    pub fn update_endpoints(
        &self,
        assignments: impl IntoIterator<Item = (String, Vec<Host>)>,
    ) -> Vec<String> {
        let mut unknown = Vec::new();
        let mut state = self.state.write();
        for (name, hosts) in assignments {
            match state.clusters.get_mut(&name) {
                Some(cluster) => {
                    tracing::debug!(%name, hosts = hosts.len(), "updating cluster hosts");
                    cluster.hosts = hosts;
                }
                None => unknown.push(name),
            }
        }

        unknown
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.state.read();
        Snapshot {
            base: state.base.clone(),
            listeners: state.listeners.clone(),
            clusters: state.clusters.clone(),
        }
    }

    pub fn listener(&self, name: &str) -> Option<Listener> {
        self.state.read().listeners.get(name).cloned()
    }

    pub fn cluster(&self, name: &str) -> Option<Cluster> {
        self.state.read().clusters.get(name).cloned()
    }

    /// Clears every discovered listener and cluster. The base is kept.
    pub fn reset(&self) {
        let mut state = self.state.write();
        state.listeners.clear();
        state.clusters.clear();
    }

    /// The effective configuration as served by the admin surface.
    pub fn dump(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::resources::LbType;

    fn base() -> BaseConfig {
        serde_json::from_value(json!({
            "node": { "id": "sidecar-1", "cluster": "productpage" },
            "listeners": [ { "name": "admin", "address": "127.0.0.1:15000" } ],
        }))
        .unwrap()
    }

    #[test]
    fn upsert_is_idempotent() {
        let store = ConfigStore::new(base());
        let listener = Listener::new("0.0.0.0_9080", "0.0.0.0:9080");

        store.upsert_listener(listener.clone());
        let first = store.snapshot();
        store.upsert_listener(listener.clone());
        let second = store.snapshot();

        assert_eq!(first, second);
        assert_eq!(1, second.listeners.len());
        assert_eq!(Some(listener), store.listener("0.0.0.0_9080"));
    }

    #[test]
    fn upsert_replaces_whole_entry() {
        let store = ConfigStore::default();
        let mut listener = Listener::new("l", "0.0.0.0:80");
        listener.use_original_dst = true;
        store.upsert_listener(listener);
        store.upsert_listener(Listener::new("l", "0.0.0.0:81"));

        let listener = store.listener("l").unwrap();
        assert_eq!("0.0.0.0:81", listener.address);
        assert!(!listener.use_original_dst);
    }

    #[test]
    fn clusters_are_replaced_as_a_set() {
        let store = ConfigStore::default();
        store.replace_clusters([Cluster::new("a"), Cluster::new("b")]);
        store.replace_clusters([Cluster::new("a"), Cluster::new("c")]);

        let names: Vec<_> = store.snapshot().clusters.into_keys().collect();
        assert_eq!(vec!["a", "c"], names);
    }

    #[test]
    fn eds_hosts_survive_cluster_replacement() {
        let eds = |name: &str| Cluster {
            discovery_type: DiscoveryType::Eds,
            ..Cluster::new(name)
        };
        let store = ConfigStore::default();
        store.replace_clusters([eds("reviews"), Cluster::new("ratings")]);
        store.update_endpoints([
            ("reviews".to_owned(), vec![Host::new("10.0.0.1:9080")]),
            ("ratings".to_owned(), vec![Host::new("10.0.0.2:9080")]),
        ]);

        store.replace_clusters([eds("reviews"), Cluster::new("ratings")]);
        assert_eq!(
            vec![Host::new("10.0.0.1:9080")],
            store.cluster("reviews").unwrap().hosts
        );
        assert!(store.cluster("ratings").unwrap().hosts.is_empty());
    }

    #[test]
    fn endpoints_are_scoped_to_their_cluster() {
        let store = ConfigStore::default();
        store.replace_clusters([
            Cluster::new("a").with_hosts([Host::new("10.0.0.1:80")]),
            Cluster::new("b").with_hosts([Host::new("10.0.0.2:80")]),
        ]);

        let unknown = store.update_endpoints([
            ("a".to_owned(), vec![Host::new("10.0.0.3:80"), Host::new("10.0.0.4:80")]),
            ("missing".to_owned(), vec![Host::new("10.0.0.5:80")]),
        ]);

        assert_eq!(vec!["missing".to_owned()], unknown);
        assert_eq!(2, store.cluster("a").unwrap().hosts.len());
        assert_eq!(
            vec![Host::new("10.0.0.2:80")],
            store.cluster("b").unwrap().hosts
        );
        assert!(store.cluster("missing").is_none());
    }

    #[test]
    fn reset_clears_dynamic_only() {
        let store = ConfigStore::new(base());
        store.upsert_listener(Listener::new("l", "0.0.0.0:80"));
        store.replace_clusters([Cluster::new("c")]);

        store.reset();

        let snapshot = store.snapshot();
        assert!(snapshot.listeners.is_empty());
        assert!(snapshot.clusters.is_empty());
        assert_eq!(base(), *snapshot.base);
    }

    #[test]
    fn dump_layout() {
        let store = ConfigStore::new(base());
        store.replace_clusters([Cluster::new("outbound|9080||productpage.default.svc.cluster.local")
            .with_hosts([Host::new("172.16.1.171:9080")])]);

        let dump = store.dump().unwrap();
        assert_eq!("sidecar-1", dump["base_config"]["node"]["id"]);
        assert_eq!(json!({}), dump["listener"]);

        let cluster = &dump["cluster"]["outbound|9080||productpage.default.svc.cluster.local"];
        assert_eq!(json!(LbType::RoundRobin), cluster["lb_type"]);
        assert_eq!("LB_ROUNDROBIN", cluster["lb_type"]);
        assert_eq!("172.16.1.171:9080", cluster["hosts"][0]["address"]);
    }

    #[test]
    fn readers_never_see_partial_updates() {
        let store = Arc::new(ConfigStore::default());
        let writer = {
            let store = store.clone();
            std::thread::spawn(move || {
                for i in 0..500 {
                    let prefix = if i % 2 == 0 { "even" } else { "odd" };
                    store.replace_clusters(
                        (0..8).map(|n| Cluster::new(format!("{prefix}-{n}"))),
                    );
                }
            })
        };

        for _ in 0..500 {
            let snapshot = store.snapshot();
            let even = snapshot.clusters.keys().filter(|k| k.starts_with("even")).count();
            let odd = snapshot.clusters.keys().filter(|k| k.starts_with("odd")).count();
            assert!(even == 0 || odd == 0, "mixed snapshot: {even} even, {odd} odd");
        }

        writer.join().unwrap();
    }
}
