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

//! Named TLS material, served to TLS consumers independently of how it was
//! obtained.

use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use tokio::sync::watch;

pub use crate::resources::{Secret, SecretKind};

static GLOBAL: Lazy<Arc<SecretStore>> = Lazy::new(<_>::default);

/// A source of TLS material keyed by secret name.
pub trait SecretProvider: Send + Sync {
    /// Replaces the material stored under `name`.
    fn set_secret(&self, name: &str, material: SecretKind);

    /// Returns the current material for `name`, or `None` when it has not
    /// been delivered yet.
    fn get_secret(&self, name: &str) -> Option<Arc<Secret>>;
}

/// The default [`SecretProvider`], safe for concurrent readers and writers.
///
/// Every update bumps a generation counter that consumers can
/// [`subscribe`][SecretStore::subscribe] to, so TLS contexts can be rebuilt
/// when their material rotates.
pub struct SecretStore {
    secrets: DashMap<String, Arc<Secret>>,
    generation: watch::Sender<u64>,
}

impl Default for SecretStore {
    fn default() -> Self {
        Self {
            secrets: DashMap::new(),
            generation: watch::channel(0).0,
        }
    }
}

impl SecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The store shared by the whole process.
    pub fn global() -> Arc<Self> {
        GLOBAL.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.secrets.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

impl SecretProvider for SecretStore {
    fn set_secret(&self, name: &str, material: SecretKind) {
        tracing::debug!(%name, "updating secret");
        let secret = Arc::new(Secret {
            name: name.to_owned(),
            kind: material,
        });
        self.secrets.insert(name.to_owned(), secret);
        self.generation.send_modify(|generation| *generation += 1);
    }

    fn get_secret(&self, name: &str) -> Option<Arc<Secret>> {
        self.secrets.get(name).map(|entry| entry.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::resources::DataSource;

    fn certificate(version: &str) -> SecretKind {
        SecretKind::TlsCertificate {
            certificate_chain: DataSource::InlineString(format!("cert-{version}")),
            private_key: DataSource::InlineString(format!("key-{version}")),
            password: None,
        }
    }

    #[test]
    fn missing_secret_is_none() {
        assert!(SecretStore::new().get_secret("default").is_none());
    }

    #[test]
    fn rotation_replaces_material() {
        let store = SecretStore::new();
        store.set_secret("default", certificate("v1"));
        store.set_secret("default", certificate("v2"));

        let secret = store.get_secret("default").unwrap();
        assert_eq!(certificate("v2"), secret.kind);
        assert_eq!(vec!["default".to_owned()], store.names());
    }

    #[tokio::test]
    async fn subscribers_observe_updates() {
        let store = SecretStore::new();
        let mut updates = store.subscribe();

        store.set_secret("ROOTCA", SecretKind::ValidationContext {
            trusted_ca: DataSource::Filename("/etc/certs/root-cert.pem".into()),
        });

        updates.changed().await.unwrap();
        assert_eq!(1, *updates.borrow());
    }

    #[test]
    fn concurrent_readers_and_writers() {
        let store = Arc::new(SecretStore::new());
        let handles: Vec<_> = (0..4)
            .map(|n| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        store.set_secret(&format!("secret-{n}"), certificate(&i.to_string()));
                        assert!(store.get_secret(&format!("secret-{n}")).is_some());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(4, store.len());
        assert_eq!(400, *store.subscribe().borrow());
    }
}
