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

/// Failure to load the base configuration or to turn a discovery source
/// into something a subscription can connect to.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse base configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("{0} `{1}` is not unique")]
    NotUnique(&'static str, String),
    #[error("config source does not describe an api config source")]
    MissingApiConfigSource,
    #[error("unsupported api type {0}, only GRPC is supported")]
    UnsupportedApiType(String),
    #[error("only support one grpc service, found {0}")]
    GrpcServiceCount(usize),
    #[error("unsupported sds target specifier")]
    UnsupportedTarget,
    #[error("cluster `{0}` is not defined in the static configuration")]
    UnknownCluster(String),
    #[error("cluster `{0}` has no hosts")]
    EmptyCluster(String),
}
