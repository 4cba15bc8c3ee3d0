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

use std::{
    collections::{BTreeSet, HashMap, HashSet},
    sync::Arc,
    time::Duration,
};

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::Instrument;

use super::{
    metrics::{CONVERSION_ERRORS, DISCOVERY_REQUESTS, DISCOVERY_RESPONSES},
    session::{ReconnectController, ReconnectPolicy},
    transport::{GrpcTransport, Service, Transport},
    Applied, EnqueueError, ResourceType, ResponseConverter,
};
use crate::{
    config::{BaseConfig, ConfigError, DiscoverySource, NodeIdentity},
    resources::DiscoveryType,
    generated::envoy::{
        config::core::v3::Node,
        service::discovery::v3::{DiscoveryRequest, DiscoveryResponse},
    },
};

/// Subscriptions waiting to be sent. Enqueueing waits once this many are
/// pending.
pub const REQUEST_QUEUE_CAPACITY: usize = 10_240;

#[derive(Clone, Debug)]
pub struct PumpConfig {
    pub node: NodeIdentity,
    /// The type requested by [`SubscriptionPump::enqueue`].
    pub resource_type: ResourceType,
    pub policy: ReconnectPolicy,
}

type UpdateHook = Box<dyn Fn(&Applied) + Send + Sync>;

#[derive(Debug)]
struct Subscription {
    resource_type: ResourceType,
    name: String,
}

/// Drives one discovery subscription: a bounded request queue, a send task
/// and a receive task sharing a [`ReconnectController`].
pub struct SubscriptionPump {
    inner: Arc<Inner>,
    queue: mpsc::Sender<Subscription>,
    pending: parking_lot::Mutex<Option<mpsc::Receiver<Subscription>>>,
    shutdown: watch::Sender<bool>,
    tasks: parking_lot::Mutex<Vec<JoinHandle<()>>>,
}

struct Inner {
    node: Node,
    resource_type: ResourceType,
    controller: ReconnectController,
    converter: ResponseConverter,
    hook: Option<UpdateHook>,
    notifier: Option<mpsc::UnboundedSender<ResourceType>>,
    /// Last accepted `(version_info, nonce)` per type.
    accepted: parking_lot::Mutex<HashMap<ResourceType, (String, String)>>,
    /// Set when applied clusters and listeners should pull in their
    /// endpoints and route tables.
    follow_dependencies: bool,
    followed: parking_lot::Mutex<HashSet<(ResourceType, String)>>,
    queue: mpsc::Sender<Subscription>,
}

impl SubscriptionPump {
    pub fn new(
        config: PumpConfig,
        transport: Arc<dyn Transport>,
        converter: ResponseConverter,
    ) -> Self {
        let (shutdown, shutdown_rx) = watch::channel(false);
        let (queue, pending) = mpsc::channel(REQUEST_QUEUE_CAPACITY);

        Self {
            inner: Arc::new(Inner {
                node: config.node.to_node(),
                resource_type: config.resource_type,
                controller: ReconnectController::new(transport, config.policy, shutdown_rx),
                converter,
                hook: None,
                notifier: None,
                accepted: <_>::default(),
                follow_dependencies: false,
                followed: <_>::default(),
                queue: queue.clone(),
            }),
            queue,
            pending: parking_lot::Mutex::new(Some(pending)),
            shutdown,
            tasks: <_>::default(),
        }
    }

    /// Builds a pump talking gRPC to the management server described by
    /// `source`. Fails without starting anything when the source is not a
    /// single gRPC service.
    pub fn from_source(
        config: PumpConfig,
        source: &DiscoverySource,
        base: &BaseConfig,
        service: Service,
        converter: ResponseConverter,
    ) -> Result<Self, ConfigError> {
        let target = source.target(base, &config.node)?;
        tracing::debug!(%target, service = service.label(), "configured discovery source");
        let transport = GrpcTransport::new(target, service)
            .with_connect_timeout(config.policy.connect_timeout);
        Ok(Self::new(config, Arc::new(transport), converter))
    }

    /// Registers a callback run after every successfully applied response.
    ///
    /// Only takes effect before [`Self::start`].
    pub fn with_update_hook(mut self, hook: impl Fn(&Applied) + Send + Sync + 'static) -> Self {
        match Arc::get_mut(&mut self.inner) {
            Some(inner) => inner.hook = Some(Box::new(hook)),
            None => tracing::warn!("update hook registered after the pump started, ignoring"),
        }
        self
    }

    /// Sends the type of every successfully applied response on `notifier`.
    ///
    /// Only takes effect before [`Self::start`].
    pub fn with_notifier(mut self, notifier: mpsc::UnboundedSender<ResourceType>) -> Self {
        match Arc::get_mut(&mut self.inner) {
            Some(inner) => inner.notifier = Some(notifier),
            None => tracing::warn!("notifier registered after the pump started, ignoring"),
        }
        self
    }

    /// Subscribes to the endpoints of every EDS cluster and to every route
    /// table a listener names, as they are applied. Meant for a pump on the
    /// aggregated service, where all of those share the stream.
    ///
    /// Only takes effect before [`Self::start`].
    pub fn with_dependent_subscriptions(mut self) -> Self {
        match Arc::get_mut(&mut self.inner) {
            Some(inner) => inner.follow_dependencies = true,
            None => tracing::warn!("dependent subscriptions enabled after the pump started, ignoring"),
        }
        self
    }

    pub fn controller(&self) -> &ReconnectController {
        &self.inner.controller
    }

    pub async fn enqueue(&self, name: impl Into<String>) -> Result<(), EnqueueError> {
        self.enqueue_resource(self.inner.resource_type, name).await
    }

    /// Queues a request for `name` of `resource_type`, waiting while the
    /// queue is full.
    pub async fn enqueue_resource(
        &self,
        resource_type: ResourceType,
        name: impl Into<String>,
    ) -> Result<(), EnqueueError> {
        let subscription = self.subscription(resource_type, name)?;
        self.queue
            .send(subscription)
            .await
            .map_err(|error| EnqueueError::Stopped(error.0.name))
    }

    /// Like [`Self::enqueue`], blocking the current thread while the queue
    /// is full. Must not be called from within an async context.
    pub fn blocking_enqueue(&self, name: impl Into<String>) -> Result<(), EnqueueError> {
        let subscription = self.subscription(self.inner.resource_type, name)?;
        self.queue
            .blocking_send(subscription)
            .map_err(|error| EnqueueError::Stopped(error.0.name))
    }

    pub fn try_enqueue(&self, name: impl Into<String>) -> Result<(), EnqueueError> {
        use mpsc::error::TrySendError;

        let subscription = self.subscription(self.inner.resource_type, name)?;
        self.queue.try_send(subscription).map_err(|error| match error {
            TrySendError::Full(subscription) => EnqueueError::Full(subscription.name),
            TrySendError::Closed(subscription) => EnqueueError::Stopped(subscription.name),
        })
    }

    fn subscription(
        &self,
        resource_type: ResourceType,
        name: impl Into<String>,
    ) -> Result<Subscription, EnqueueError> {
        let name = name.into();
        if name.is_empty() {
            return Err(EnqueueError::EmptyName);
        }
        if *self.shutdown.borrow() {
            return Err(EnqueueError::Stopped(name));
        }

        Ok(Subscription {
            resource_type,
            name,
        })
    }

    /// Spawns the send and receive tasks. Calling it again, or after
    /// [`Self::stop`], does nothing.
    pub fn start(&self) {
        let Some(pending) = self.pending.lock().take() else {
            tracing::debug!("subscription pump already started");
            return;
        };

        let label = self.inner.resource_type.label();
        let send = tokio::spawn(
            self.inner
                .clone()
                .send_loop(pending, self.shutdown.subscribe())
                .instrument(tracing::debug_span!("send_loop", resource_type = label)),
        );
        let receive = tokio::spawn(
            self.inner
                .clone()
                .receive_loop(self.shutdown.subscribe())
                .instrument(tracing::debug_span!("receive_loop", resource_type = label)),
        );

        self.tasks.lock().extend([send, receive]);
    }

    /// Stops both loops and cancels the live session. Safe to call more than
    /// once.
    pub async fn stop(&self) {
        self.shutdown.send_replace(true);
        self.pending.lock().take();
        self.inner.controller.close().await;

        let tasks = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            if let Err(error) = task.await {
                tracing::error!(%error, "subscription task failed");
            }
        }
    }
}

impl Inner {
    fn interval(&self) -> Duration {
        self.controller.policy().interval
    }

    /// Waits one retry interval. Returns `false` if stopped meanwhile.
    async fn pause(&self, shutdown: &mut watch::Receiver<bool>) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(self.interval()) => true,
            _ = super::stopped(shutdown) => false,
        }
    }

    async fn send_loop(
        self: Arc<Self>,
        mut queue: mpsc::Receiver<Subscription>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            let subscription = tokio::select! {
                biased;
                _ = super::stopped(&mut shutdown) => break,
                next = queue.recv() => match next {
                    Some(subscription) => subscription,
                    None => break,
                },
            };

            // The same subscription is retried until it reaches a session.
            loop {
                let session = match self.controller.current() {
                    Some(session) => session,
                    None => match self.controller.rebuild(None).await {
                        Some(session) => session,
                        None => return,
                    },
                };

                let request = self.request(&subscription);
                match session.send(request).await {
                    Ok(()) => {
                        DISCOVERY_REQUESTS
                            .with_label_values(&[subscription.resource_type.label()])
                            .inc();
                        tracing::debug!(
                            name = %subscription.name,
                            resource_type = %subscription.resource_type,
                            generation = session.generation(),
                            "sent discovery request"
                        );
                        break;
                    }
                    Err(error) => {
                        tracing::warn!(
                            %error,
                            name = %subscription.name,
                            generation = session.generation(),
                            "failed to send discovery request, reconnecting"
                        );
                        session.cancel();
                        if !self.pause(&mut shutdown).await
                            || self
                                .controller
                                .rebuild(Some(session.generation()))
                                .await
                                .is_none()
                        {
                            return;
                        }
                    }
                }
            }
        }

        tracing::debug!("send loop stopped");
    }

    async fn receive_loop(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        loop {
            let Some(session) = self.controller.current() else {
                if !self.pause(&mut shutdown).await {
                    break;
                }
                continue;
            };

            let result = tokio::select! {
                _ = super::stopped(&mut shutdown) => break,
                result = session.recv() => result,
            };

            match result {
                Ok(response) => self.process_response(response),
                Err(error) => {
                    tracing::warn!(
                        %error,
                        generation = session.generation(),
                        "discovery stream failed, reconnecting"
                    );
                    // Retire the session now so senders stop using it during
                    // the pause.
                    session.cancel();
                    if !self.pause(&mut shutdown).await
                        || self
                            .controller
                            .rebuild(Some(session.generation()))
                            .await
                            .is_none()
                    {
                        break;
                    }
                }
            }
        }

        tracing::debug!("receive loop stopped");
    }

    fn request(&self, subscription: &Subscription) -> DiscoveryRequest {
        let (version_info, response_nonce) = self
            .accepted
            .lock()
            .get(&subscription.resource_type)
            .cloned()
            .unwrap_or_default();

        DiscoveryRequest {
            version_info,
            node: Some(self.node.clone()),
            resource_names: vec![subscription.name.clone()],
            type_url: subscription.resource_type.type_url().into(),
            response_nonce,
            error_detail: None,
        }
    }

    fn process_response(&self, response: DiscoveryResponse) {
        let type_url = response.type_url.clone();
        let label = ResourceType::try_from(&*type_url)
            .map(|resource_type| resource_type.label())
            .unwrap_or("unknown");
        DISCOVERY_RESPONSES.with_label_values(&[label]).inc();

        let accepted = (response.version_info.clone(), response.nonce.clone());
        match self.converter.apply(response) {
            Ok(applied) => {
                let resource_type = applied.resource_type();
                tracing::debug!(
                    %resource_type,
                    version = %accepted.0,
                    "applied discovery response"
                );
                self.accepted.lock().insert(resource_type, accepted);
                if self.follow_dependencies {
                    self.subscribe_dependencies(&applied);
                }

                if let Some(hook) = &self.hook {
                    hook(&applied);
                }
                if let Some(notifier) = &self.notifier {
                    if notifier.send(resource_type).is_err() {
                        tracing::trace!("update notifier closed");
                    }
                }
            }
            Err(error) => {
                CONVERSION_ERRORS.with_label_values(&[label]).inc();
                tracing::error!(%error, %type_url, "failed to convert discovery response");
            }
        }
    }

    /// Queues endpoint discovery for newly seen EDS clusters and route
    /// discovery for newly referenced route tables.
    fn subscribe_dependencies(&self, applied: &Applied) {
        let snapshot = self.converter.store().snapshot();
        let (resource_type, names): (_, BTreeSet<String>) = match applied {
            Applied::Clusters(names) => (
                ResourceType::Endpoint,
                names
                    .iter()
                    .filter(|name| {
                        snapshot
                            .clusters
                            .get(*name)
                            .is_some_and(|cluster| cluster.discovery_type == DiscoveryType::Eds)
                    })
                    .cloned()
                    .collect(),
            ),
            Applied::Listeners(names) => (
                ResourceType::Route,
                names
                    .iter()
                    .filter_map(|name| snapshot.listeners.get(name))
                    .flat_map(|listener| listener.connection_managers())
                    .filter_map(|manager| manager.router_config_name.clone())
                    .collect(),
            ),
            _ => return,
        };

        let mut followed = self.followed.lock();
        for name in names {
            if !followed.insert((resource_type, name.clone())) {
                continue;
            }

            tracing::debug!(%resource_type, %name, "subscribing to dependent resource");
            let subscription = Subscription {
                resource_type,
                name,
            };
            match self.queue.try_send(subscription) {
                Ok(()) => {}
                // The receive loop must not wait on the queue it feeds.
                Err(mpsc::error::TrySendError::Full(subscription)) => {
                    let queue = self.queue.clone();
                    tokio::spawn(async move {
                        let _ = queue.send(subscription).await;
                    });
                }
                Err(mpsc::error::TrySendError::Closed(_)) => return,
            }
        }
    }
}
