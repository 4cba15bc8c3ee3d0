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

//! Registry of connection pool constructors, keyed by upstream protocol.
//!
//! Nothing is registered implicitly; protocol implementations call
//! [`register_pool_factory`] during startup.

use std::{collections::HashMap, fmt, sync::Arc};

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::resources::Host;

static GLOBAL: Lazy<PoolRegistry> = Lazy::new(PoolRegistry::default);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    Http1,
    Http2,
    Tcp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Http1 => "http1",
            Self::Http2 => "http2",
            Self::Tcp => "tcp",
        })
    }
}

/// A pool of upstream connections to a single host.
pub trait ConnectionPool: Send + Sync {
    fn protocol(&self) -> Protocol;
    fn host(&self) -> &Host;
}

pub type PoolFactory = Arc<dyn Fn(&Host) -> Box<dyn ConnectionPool> + Send + Sync>;

#[derive(Default)]
pub struct PoolRegistry {
    factories: RwLock<HashMap<Protocol, PoolFactory>>,
}

impl PoolRegistry {
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Registers `factory` for `protocol`, replacing any earlier registration.
    pub fn register(
        &self,
        protocol: Protocol,
        factory: impl Fn(&Host) -> Box<dyn ConnectionPool> + Send + Sync + 'static,
    ) {
        if self
            .factories
            .write()
            .insert(protocol, Arc::new(factory))
            .is_some()
        {
            tracing::warn!(%protocol, "replacing connection pool factory");
        } else {
            tracing::debug!(%protocol, "registered connection pool factory");
        }
    }

    /// Creates a pool for `host`, or `None` when no factory handles `protocol`.
    pub fn create(&self, protocol: Protocol, host: &Host) -> Option<Box<dyn ConnectionPool>> {
        // Clone out so the factory runs without the lock held.
        let factory = self.factories.read().get(&protocol).cloned()?;
        Some((factory)(host))
    }

    pub fn protocols(&self) -> Vec<Protocol> {
        let mut protocols: Vec<_> = self.factories.read().keys().copied().collect();
        protocols.sort();
        protocols
    }
}

/// Registers `factory` with the process wide [`PoolRegistry`].
pub fn register_pool_factory(
    protocol: Protocol,
    factory: impl Fn(&Host) -> Box<dyn ConnectionPool> + Send + Sync + 'static,
) {
    PoolRegistry::global().register(protocol, factory);
}
