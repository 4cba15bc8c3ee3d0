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
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use arc_swap::ArcSwapOption;
use futures::StreamExt;
use rand::Rng;
use tokio::sync::{mpsc, oneshot, watch};
use tokio_stream::wrappers::ReceiverStream;
use tryhard::{RetryFutureConfig, RetryPolicy};

use super::{
    metrics::{SessionMetrics, RECONNECTS},
    transport::{RequestStream, ResponseStream, Transport},
    SessionError,
};
use crate::generated::envoy::service::discovery::v3::{DiscoveryRequest, DiscoveryResponse};

/// A request together with the signal fired once the transport takes it.
type PendingRequest = (DiscoveryRequest, oneshot::Sender<()>);

/// Wraps the session's request channel into the stream handed to the
/// transport, acknowledging each request as it is polled out.
fn request_stream(requests: mpsc::Receiver<PendingRequest>) -> RequestStream {
    Box::pin(ReceiverStream::new(requests).map(|(request, taken)| {
        let _ = taken.send(());
        request
    }))
}

/// One open discovery stream. Never reused once it has failed or been
/// cancelled.
pub struct Session {
    generation: u64,
    requests: parking_lot::Mutex<Option<mpsc::Sender<PendingRequest>>>,
    responses: tokio::sync::Mutex<ResponseStream>,
    cancelled: watch::Sender<bool>,
    _metrics: SessionMetrics,
}

impl Session {
    fn new(
        generation: u64,
        requests: mpsc::Sender<PendingRequest>,
        responses: ResponseStream,
        label: &'static str,
    ) -> Self {
        let (cancelled, mut on_cancel) = watch::channel(false);
        let responses: ResponseStream = Box::pin(
            responses.take_until(async move { super::stopped(&mut on_cancel).await }),
        );
        Self {
            generation,
            requests: parking_lot::Mutex::new(Some(requests)),
            responses: tokio::sync::Mutex::new(responses),
            cancelled,
            _metrics: SessionMetrics::new(label),
        }
    }

    /// Identifies this session among all sessions built by the same
    /// controller.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Resolves once the transport has taken `request`. Fails with
    /// [`SessionError::Closed`] if the session is cancelled first, in which
    /// case the request must be sent again on another session.
    pub async fn send(&self, request: DiscoveryRequest) -> Result<(), SessionError> {
        let sender = self.requests.lock().clone().ok_or(SessionError::Closed)?;
        let mut cancelled = self.cancelled.subscribe();
        let (taken, on_taken) = oneshot::channel();

        let delivered = async move {
            sender
                .send((request, taken))
                .await
                .map_err(|_| SessionError::Closed)?;
            on_taken.await.map_err(|_| SessionError::Closed)
        };

        tokio::select! {
            result = delivered => result,
            _ = super::stopped(&mut cancelled) => Err(SessionError::Closed),
        }
    }

    /// Waits for the next response. Resolves with [`SessionError::Closed`]
    /// once the stream ends or the session is cancelled.
    pub async fn recv(&self) -> Result<DiscoveryResponse, SessionError> {
        let mut responses = self.responses.lock().await;
        match responses.next().await {
            Some(result) => result,
            None => {
                *responses = Box::pin(futures::stream::empty());
                Err(SessionError::Closed)
            }
        }
    }

    /// Fires the cancel handle and releases the request side of the stream.
    /// Returns `false` if the session was already cancelled.
    pub fn cancel(&self) -> bool {
        if !self
            .cancelled
            .send_if_modified(|cancelled| !std::mem::replace(cancelled, true))
        {
            return false;
        }

        self.requests.lock().take();
        tracing::debug!(generation = self.generation, "discovery session cancelled");
        true
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("generation", &self.generation)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Exponential growth of the reconnect delay, starting from the policy's
/// interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExponentialBackoff {
    pub max_delay: Duration,
    pub multiplier: u32,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            max_delay: Duration::from_secs(30),
            multiplier: 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub interval: Duration,
    pub backoff: Option<ExponentialBackoff>,
    /// Upper bound of the random delay added to every retry.
    pub jitter: Duration,
    pub connect_timeout: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            backoff: None,
            jitter: Duration::ZERO,
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl ReconnectPolicy {
    pub fn fixed(interval: Duration) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }

    pub fn with_backoff(mut self, backoff: ExponentialBackoff) -> Self {
        self.backoff = Some(backoff);
        self
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// The delay before retry number `attempt`, counting from 1.
    pub fn delay(&self, attempt: u32) -> Duration {
        let delay = match self.backoff {
            None => self.interval,
            Some(backoff) => {
                let factor = backoff
                    .multiplier
                    .max(1)
                    .saturating_pow(attempt.saturating_sub(1));
                self.interval.saturating_mul(factor).min(backoff.max_delay)
            }
        };

        if self.jitter.is_zero() {
            return delay;
        }

        let max_jitter = u64::try_from(self.jitter.as_millis()).unwrap_or(u64::MAX);
        delay + Duration::from_millis(rand::thread_rng().gen_range(0..=max_jitter))
    }
}

/// Owns the current session of one subscription and is the only thing that
/// replaces it.
///
/// Rebuilds are serialised: concurrent callers reporting the same failed
/// session get the same replacement, and a session is torn down exactly once.
pub struct ReconnectController {
    transport: Arc<dyn Transport>,
    policy: ReconnectPolicy,
    current: ArcSwapOption<Session>,
    rebuild_lock: tokio::sync::Mutex<()>,
    next_generation: AtomicU64,
    shutdown: watch::Receiver<bool>,
}

impl ReconnectController {
    pub fn new(
        transport: Arc<dyn Transport>,
        policy: ReconnectPolicy,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            transport,
            policy,
            current: ArcSwapOption::empty(),
            rebuild_lock: tokio::sync::Mutex::new(()),
            next_generation: AtomicU64::new(0),
            shutdown,
        }
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    /// The live session, if any.
    pub fn current(&self) -> Option<Arc<Session>> {
        self.current.load_full().filter(|session| !session.is_cancelled())
    }

    /// Replaces the session with generation `failed` (or establishes the
    /// first one when `None`), retrying until it succeeds. Returns `None`
    /// when the controller is shut down first.
    pub async fn rebuild(&self, failed: Option<u64>) -> Option<Arc<Session>> {
        let mut shutdown = self.shutdown.clone();
        let _guard = tokio::select! {
            guard = self.rebuild_lock.lock() => guard,
            _ = super::stopped(&mut shutdown) => return None,
        };

        if let Some(current) = self.current() {
            if Some(current.generation()) != failed {
                return Some(current);
            }
        }

        if let Some(previous) = self.current.swap(None) {
            previous.cancel();
            RECONNECTS.with_label_values(&[self.transport.label()]).inc();
            tracing::info!(
                generation = previous.generation(),
                service = self.transport.label(),
                "rebuilding discovery session"
            );
        }

        let retry_config = RetryFutureConfig::new(u32::MAX).custom_backoff(
            |attempt, error: &SessionError| {
                let delay = self.policy.delay(attempt);
                tracing::warn!(
                    %error,
                    attempt,
                    ?delay,
                    service = self.transport.label(),
                    "unable to open discovery session"
                );
                RetryPolicy::Delay(delay)
            },
        );

        let session = tokio::select! {
            result = tryhard::retry_fn(|| self.open()).with_config(retry_config) => result.ok()?,
            _ = super::stopped(&mut shutdown) => return None,
        };

        if *self.shutdown.borrow() {
            session.cancel();
            return None;
        }

        self.current.store(Some(session.clone()));
        Some(session)
    }

    /// Cancels the live session and waits for any in-flight rebuild to
    /// observe shutdown.
    pub async fn close(&self) {
        let _guard = self.rebuild_lock.lock().await;
        if let Some(session) = self.current.swap(None) {
            session.cancel();
        }
    }

    async fn open(&self) -> Result<Arc<Session>, SessionError> {
        let (requests, rx) = mpsc::channel(1);
        let responses = tokio::time::timeout(
            self.policy.connect_timeout,
            self.transport.open(request_stream(rx)),
        )
        .await
        .map_err(|_| SessionError::ConnectTimeout)??;

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(
            generation,
            service = self.transport.label(),
            "discovery session established"
        );
        Ok(Arc::new(Session::new(
            generation,
            requests,
            responses,
            self.transport.label(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test::mock_transport;

    fn controller(
        transport: impl Transport,
    ) -> (ReconnectController, watch::Sender<bool>) {
        let (shutdown, rx) = watch::channel(false);
        (
            ReconnectController::new(
                Arc::new(transport),
                ReconnectPolicy::fixed(Duration::from_secs(1)),
                rx,
            ),
            shutdown,
        )
    }

    #[test]
    fn fixed_delay() {
        let policy = ReconnectPolicy::default();
        assert_eq!(Duration::from_secs(1), policy.delay(1));
        assert_eq!(Duration::from_secs(1), policy.delay(20));
    }

    #[test]
    fn exponential_delay_is_capped() {
        let policy = ReconnectPolicy::fixed(Duration::from_millis(500)).with_backoff(
            ExponentialBackoff {
                max_delay: Duration::from_secs(3),
                multiplier: 2,
            },
        );

        assert_eq!(Duration::from_millis(500), policy.delay(1));
        assert_eq!(Duration::from_secs(1), policy.delay(2));
        assert_eq!(Duration::from_secs(2), policy.delay(3));
        assert_eq!(Duration::from_secs(3), policy.delay(4));
        assert_eq!(Duration::from_secs(3), policy.delay(u32::MAX));
    }

    #[test]
    fn jitter_is_bounded() {
        let policy = ReconnectPolicy::default().with_jitter(Duration::from_millis(100));
        for attempt in 1..50 {
            let delay = policy.delay(attempt);
            assert!(delay >= Duration::from_secs(1));
            assert!(delay <= Duration::from_millis(1100));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rebuild_is_idempotent() {
        let (transport, server) = mock_transport();
        let (controller, _shutdown) = controller(transport);

        let first = controller.rebuild(None).await.unwrap();
        assert_eq!(1, first.generation());

        // A stale failure report for an older session keeps the current one.
        let again = controller.rebuild(Some(0)).await.unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        let second = controller.rebuild(Some(first.generation())).await.unwrap();
        assert_eq!(2, second.generation());
        assert!(first.is_cancelled());
        assert!(!first.cancel());

        let third = controller.rebuild(Some(first.generation())).await.unwrap();
        assert!(Arc::ptr_eq(&second, &third));
        assert_eq!(2, server.connections());
    }

    #[tokio::test(start_paused = true)]
    async fn rebuild_retries_until_connected() {
        let (transport, server) = mock_transport();
        server.fail_next_opens(3);
        let (controller, _shutdown) = controller(transport);

        let session = controller.rebuild(None).await.unwrap();
        assert_eq!(1, session.generation());
        assert_eq!(1, server.connections());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_interrupts_rebuild() {
        let (transport, server) = mock_transport();
        server.fail_next_opens(u32::MAX);
        let (controller, shutdown) = controller(transport);
        let controller = Arc::new(controller);

        let rebuild = tokio::spawn({
            let controller = controller.clone();
            async move { controller.rebuild(None).await }
        });
        tokio::time::sleep(Duration::from_secs(10)).await;
        shutdown.send_replace(true);

        assert!(rebuild.await.unwrap().is_none());
        assert!(controller.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_completes_pending_recv() {
        let (transport, _server) = mock_transport();
        let (controller, _shutdown) = controller(transport);
        let session = controller.rebuild(None).await.unwrap();

        let recv = tokio::spawn({
            let session = session.clone();
            async move { session.recv().await }
        });
        tokio::task::yield_now().await;

        controller.close().await;
        assert!(matches!(recv.await.unwrap(), Err(SessionError::Closed)));
        assert!(session.is_cancelled());
        assert!(matches!(
            session.send(DiscoveryRequest::default()).await,
            Err(SessionError::Closed)
        ));
        assert!(controller.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn send_waits_for_the_transport() {
        let (transport, mut server) = mock_transport();
        server.stall_next_opens(1);
        let (controller, _shutdown) = controller(transport);
        let session = controller.rebuild(None).await.unwrap();

        let send = tokio::spawn({
            let session = session.clone();
            async move { session.send(DiscoveryRequest::default()).await }
        });
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(!send.is_finished());
        assert!(server.try_next_request().is_none());

        // The request never left the session, so its sender must retry it.
        session.cancel();
        assert!(matches!(send.await.unwrap(), Err(SessionError::Closed)));
        assert!(controller.current().is_none());
    }
}
