/*
 * Copyright 2024 Google LLC
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *       http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 */

use once_cell::sync::Lazy;
use prometheus::{IntCounterVec, IntGaugeVec};

pub(crate) const SERVICE_LABEL: &str = "service";
pub(crate) const TYPE_LABEL: &str = "type";

const SUBSYSTEM: &str = "xds";

pub(crate) static ACTIVE_SESSIONS: Lazy<IntGaugeVec> = Lazy::new(|| {
    prometheus::register_int_gauge_vec_with_registry! {
        crate::metrics::opts(
            "active_sessions",
            SUBSYSTEM,
            "Number of discovery sessions currently connected",
        ),
        &[SERVICE_LABEL],
        crate::metrics::registry(),
    }
    .unwrap()
});

pub(crate) static RECONNECTS: Lazy<IntCounterVec> = Lazy::new(|| {
    prometheus::register_int_counter_vec_with_registry! {
        crate::metrics::opts(
            "reconnects",
            SUBSYSTEM,
            "Total number of discovery session rebuilds",
        ),
        &[SERVICE_LABEL],
        crate::metrics::registry(),
    }
    .unwrap()
});

pub(crate) static DISCOVERY_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    prometheus::register_int_counter_vec_with_registry! {
        crate::metrics::opts(
            "discovery_requests",
            SUBSYSTEM,
            "Total number of discovery requests sent",
        ),
        &[TYPE_LABEL],
        crate::metrics::registry(),
    }
    .unwrap()
});

pub(crate) static DISCOVERY_RESPONSES: Lazy<IntCounterVec> = Lazy::new(|| {
    prometheus::register_int_counter_vec_with_registry! {
        crate::metrics::opts(
            "discovery_responses",
            SUBSYSTEM,
            "Total number of discovery responses received",
        ),
        &[TYPE_LABEL],
        crate::metrics::registry(),
    }
    .unwrap()
});

pub(crate) static CONVERSION_ERRORS: Lazy<IntCounterVec> = Lazy::new(|| {
    prometheus::register_int_counter_vec_with_registry! {
        crate::metrics::opts(
            "conversion_errors",
            SUBSYSTEM,
            "Total number of discovery responses discarded because they could not be converted",
        ),
        &[TYPE_LABEL],
        crate::metrics::registry(),
    }
    .unwrap()
});

/// Marks a session as connected for as long as it is alive.
pub struct SessionMetrics {
    service: &'static str,
}

impl SessionMetrics {
    pub fn new(service: &'static str) -> Self {
        ACTIVE_SESSIONS.with_label_values(&[service]).inc();
        Self { service }
    }
}

impl Drop for SessionMetrics {
    fn drop(&mut self) {
        ACTIVE_SESSIONS.with_label_values(&[self.service]).dec();
    }
}
