/*
 * Copyright 2024 Google LLC All Rights Reserved.
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

use once_cell::sync::Lazy;
use prometheus::core::Collector;
pub use prometheus::Result;
use prometheus::{Opts, Registry};

const NAMESPACE: &str = "sidecar";

static REGISTRY: Lazy<Registry> =
    Lazy::new(|| Registry::new_custom(Some(NAMESPACE.into()), None).unwrap());

/// The registry every metric in the crate is registered with.
pub fn registry() -> &'static Registry {
    &REGISTRY
}

pub fn opts(name: &str, subsystem: &str, description: &str) -> Opts {
    Opts::new(name, description).subsystem(subsystem)
}

/// Encodes every registered metric in the prometheus text format.
pub fn gather_text() -> String {
    use prometheus::Encoder;

    let mut buffer = Vec::new();
    let encoder = prometheus::TextEncoder::new();
    if let Err(error) = encoder.encode(&registry().gather(), &mut buffer) {
        tracing::warn!(%error, "failed to encode metrics");
    }

    String::from_utf8(buffer).unwrap_or_default()
}

pub trait CollectorExt: Collector + Clone + Sized + 'static {
    fn register_if_not_exists(self, registry: &Registry) -> Result<Self> {
        match registry.register(Box::new(self.clone())) {
            Ok(_) | Err(prometheus::Error::AlreadyReg) => Ok(self),
            Err(prometheus::Error::Msg(msg)) if msg.contains("already exists") => Ok(self),
            Err(err) => Err(err),
        }
    }
}

impl<C: Collector + Clone + 'static> CollectorExt for C {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_twice_is_not_an_error() {
        let registry = Registry::default();
        let counter = prometheus::IntCounter::with_opts(opts("twice", "test", "test counter"))
            .unwrap();

        counter.clone().register_if_not_exists(&registry).unwrap();
        counter.register_if_not_exists(&registry).unwrap();
    }

    #[test]
    fn namespace_is_applied() {
        let counter = prometheus::IntCounter::with_opts(opts(
            "namespace_probe",
            "test",
            "namespace probe",
        ))
        .unwrap()
        .register_if_not_exists(registry())
        .unwrap();
        counter.inc();

        assert!(gather_text().contains("sidecar_test_namespace_probe 1"));
    }
}
