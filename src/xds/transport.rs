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

use std::{pin::Pin, time::Duration};

use futures::{Stream, StreamExt};
use once_cell::sync::Lazy;
use tonic::{codec::ProstCodec, codegen::http::uri::PathAndQuery, transport::Endpoint, Request};

use super::SessionError;
use crate::{
    config::{StreamTarget, TargetEndpoint},
    generated::envoy::service::discovery::v3::{DiscoveryRequest, DiscoveryResponse},
};

const DEFAULT_MAX_GRPC_MESSAGE_SIZE: usize = 256 * 1024 * 1024;

static MAX_GRPC_MESSAGE_SIZE: Lazy<usize> = Lazy::new(|| {
    std::env::var("SIDECAR_XDS_MAX_GRPC_MESSAGE_SIZE")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_MAX_GRPC_MESSAGE_SIZE)
});

/// The largest discovery message accepted from or sent to a management
/// server. Overridden with `SIDECAR_XDS_MAX_GRPC_MESSAGE_SIZE`.
pub fn max_grpc_message_size() -> usize {
    *MAX_GRPC_MESSAGE_SIZE
}

pub type RequestStream = Pin<Box<dyn Stream<Item = DiscoveryRequest> + Send>>;

pub type ResponseStream =
    Pin<Box<dyn Stream<Item = Result<DiscoveryResponse, SessionError>> + Send>>;

/// Opens bidirectional discovery streams.
///
/// The stream lives as long as both `requests` and the returned response
/// stream; dropping either side releases it. A request counts as sent once
/// the transport has polled it out of `requests`, so implementations must
/// only poll when they are able to write.
#[async_trait::async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn open(&self, requests: RequestStream) -> Result<ResponseStream, SessionError>;

    /// Label used for the streams this transport opens in logs and metrics.
    fn label(&self) -> &'static str;
}

/// The streaming discovery services a sidecar talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Service {
    /// Listener, cluster, endpoint, and route discovery multiplexed on one
    /// stream.
    AggregatedDiscovery,
    SecretDiscovery,
}

impl Service {
    pub const fn path(&self) -> &'static str {
        match self {
            Self::AggregatedDiscovery => {
                "/envoy.service.discovery.v3.AggregatedDiscoveryService/StreamAggregatedResources"
            }
            Self::SecretDiscovery => "/envoy.service.secret.v3.SecretDiscoveryService/StreamSecrets",
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::AggregatedDiscovery => "ads",
            Self::SecretDiscovery => "sds",
        }
    }
}

/// A [`Transport`] speaking gRPC over TCP or a unix domain socket.
#[derive(Clone, Debug)]
pub struct GrpcTransport {
    target: StreamTarget,
    service: Service,
    connect_timeout: Duration,
}

impl GrpcTransport {
    pub fn new(target: StreamTarget, service: Service) -> Self {
        Self {
            target,
            service,
            connect_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn target(&self) -> &StreamTarget {
        &self.target
    }

    async fn connect(&self) -> Result<tonic::transport::Channel, SessionError> {
        let connect_error = |source| SessionError::Connect {
            target: self.target.to_string(),
            source,
        };

        match &self.target.endpoint {
            TargetEndpoint::Uri(uri) => Endpoint::from_shared(uri.clone())
                .map_err(connect_error)?
                .connect_timeout(self.connect_timeout)
                .connect()
                .await
                .map_err(connect_error),
            #[cfg(unix)]
            TargetEndpoint::Unix(path) => {
                let path = path.clone();
                // The URI is ignored by the connector, it only has to parse.
                Endpoint::from_static("http://[::]:50051")
                    .connect_timeout(self.connect_timeout)
                    .connect_with_connector(tower::service_fn(move |_: tonic::transport::Uri| {
                        tokio::net::UnixStream::connect(path.clone())
                    }))
                    .await
                    .map_err(connect_error)
            }
            #[cfg(not(unix))]
            TargetEndpoint::Unix(path) => Err(SessionError::Rpc(tonic::Status::unimplemented(
                format!("unix sockets are unsupported on this platform: {}", path.display()),
            ))),
        }
    }
}

#[async_trait::async_trait]
impl Transport for GrpcTransport {
    #[tracing::instrument(skip_all, fields(target = %self.target, service = self.service.label()))]
    async fn open(&self, requests: RequestStream) -> Result<ResponseStream, SessionError> {
        tracing::debug!("connecting to management server");
        let channel = self.connect().await?;

        let mut client = tonic::client::Grpc::new(channel)
            .max_decoding_message_size(max_grpc_message_size())
            .max_encoding_message_size(max_grpc_message_size());
        client
            .ready()
            .await
            .map_err(|error| tonic::Status::unavailable(format!("service was not ready: {error}")))?;

        let responses = client
            .streaming(
                Request::new(requests),
                PathAndQuery::from_static(self.service.path()),
                ProstCodec::<DiscoveryRequest, DiscoveryResponse>::default(),
            )
            .await?
            .into_inner();

        tracing::info!("discovery stream established");
        Ok(Box::pin(responses.map(|response| response.map_err(SessionError::Rpc))))
    }

    fn label(&self) -> &'static str {
        self.service.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NodeIdentity;

    #[test]
    fn service_paths() {
        assert_eq!(
            "/envoy.service.secret.v3.SecretDiscoveryService/StreamSecrets",
            Service::SecretDiscovery.path()
        );
        assert!(Service::AggregatedDiscovery
            .path()
            .ends_with("AggregatedDiscoveryService/StreamAggregatedResources"));
    }

    #[test]
    fn default_message_size() {
        if std::env::var_os("SIDECAR_XDS_MAX_GRPC_MESSAGE_SIZE").is_none() {
            assert_eq!(DEFAULT_MAX_GRPC_MESSAGE_SIZE, max_grpc_message_size());
        }
    }

    #[tokio::test]
    async fn connect_failure_is_a_session_error() {
        let target = StreamTarget {
            endpoint: TargetEndpoint::Uri("http://127.0.0.1:1".into()),
            node: NodeIdentity::new("node", "cluster"),
        };
        let transport = GrpcTransport::new(target, Service::AggregatedDiscovery)
            .with_connect_timeout(Duration::from_millis(200));

        let error = transport
            .open(Box::pin(futures::stream::pending()))
            .await
            .err()
            .unwrap();
        assert!(
            matches!(error, SessionError::Connect { .. }),
            "unexpected error: {error}"
        );
    }
}
