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

//! Wire messages for the subset of the envoy v3 discovery API consumed by
//! this crate. Field tags match the upstream protos so payloads produced by
//! any v3 management server decode unchanged; fields the engine never reads
//! are left out and skipped by the decoder.

#![allow(
    clippy::doc_markdown,
    clippy::use_self,
    clippy::enum_variant_names,
    clippy::large_enum_variant
)]

pub mod envoy {
    pub mod config {
        pub mod cluster {
            pub mod v3;
        }
        pub mod core {
            pub mod v3;
        }
        pub mod endpoint {
            pub mod v3;
        }
        pub mod listener {
            pub mod v3;
        }
        pub mod route {
            pub mod v3;
        }
    }
    pub mod extensions {
        pub mod filters {
            pub mod network {
                pub mod http_connection_manager {
                    pub mod v3;
                }
            }
        }
        pub mod transport_sockets {
            pub mod tls {
                pub mod v3;
            }
        }
    }
    pub mod service {
        pub mod discovery {
            pub mod v3;
        }
    }
}

pub mod google {
    pub mod rpc;
}
