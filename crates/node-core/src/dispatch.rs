//! # Message Dispatcher
//!
//! Owns the bounded inbound queue, the intake loop, and the worker pool.
//!
//! ## Flow
//!
//! 1. The transport layer calls [`MessageDispatcher::dispatch`] (or
//!    `blocking_dispatch` from a non-async thread). Ownership of the
//!    message moves into the queue. A full queue blocks the producer —
//!    backpressure is applied to the network-receiving side and messages
//!    are never dropped on overflow.
//! 2. A dedicated intake task dequeues messages and submits each one as an
//!    independent worker job. The intake loop never processes a message
//!    itself.
//! 3. The worker job validates the message, resolves the handler by type
//!    tag, and invokes `execute`. A failed handler is logged; no retry or
//!    rerouting is performed.
//!
//! ## Ordering
//!
//! The queue is FIFO, so each producer's own submissions stay in order up
//! to the point of dequeue. Once dequeued, jobs run concurrently: two
//! messages with the same type tag may complete in either order. Modules
//! that need in-order handling of their own stream must serialize
//! internally.
//!
//! ## Shutdown
//!
//! `shutdown` stops the intake loop, releases every still-queued message
//! without executing it, and waits for in-flight worker jobs to finish.
//! In-flight `execute` calls are never cancelled.

use crate::broadcast::BroadcastSelector;
use crate::config::DispatchConfig;
use crate::metrics::DispatchMetrics;
use crate::registry::HandlerRegistry;
use parking_lot::Mutex;
use shared_types::{MessageError, MessageOffset, PeerEndpoint, RawMessage};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Routes inbound messages to protocol modules via a bounded queue and a
/// worker pool.
pub struct MessageDispatcher {
    inbound_tx: mpsc::Sender<RawMessage>,
    selector: BroadcastSelector,
    metrics: Arc<DispatchMetrics>,
    workers: Arc<Semaphore>,
    worker_count: usize,
    shutdown_tx: watch::Sender<bool>,
    intake: Mutex<Option<JoinHandle<()>>>,
}

impl MessageDispatcher {
    /// Start the dispatcher: creates the bounded queue and spawns the
    /// intake loop. Must be called from within a tokio runtime.
    pub fn start(registry: Arc<HandlerRegistry>, config: DispatchConfig) -> Self {
        let config = config.sanitized();
        let (inbound_tx, inbound_rx) = mpsc::channel(config.queue_capacity);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let metrics = Arc::new(DispatchMetrics::default());
        let workers = Arc::new(Semaphore::new(config.worker_count));

        let intake = tokio::spawn(intake_loop(
            inbound_rx,
            shutdown_rx,
            Arc::clone(&registry),
            Arc::clone(&metrics),
            Arc::clone(&workers),
        ));

        info!(
            queue_capacity = config.queue_capacity,
            worker_count = config.worker_count,
            handlers = registry.len(),
            "[Dispatcher] Started"
        );

        Self {
            inbound_tx,
            selector: BroadcastSelector::new(registry),
            metrics,
            workers,
            worker_count: config.worker_count,
            shutdown_tx,
            intake: Mutex::new(Some(intake)),
        }
    }

    /// Enqueue a message, taking ownership. Blocks (awaits capacity) while
    /// the queue is full; there is no upper bound on the wait — stalling
    /// ingestion is preferred over dropping a well-formed message.
    pub async fn dispatch(&self, msg: RawMessage) {
        match self.inbound_tx.send(msg).await {
            Ok(()) => {
                self.metrics.enqueued.fetch_add(1, Ordering::Relaxed);
            }
            Err(mpsc::error::SendError(msg)) => {
                // Intake already gone: the message is released here, unexecuted.
                self.metrics
                    .discarded_at_shutdown
                    .fetch_add(1, Ordering::Relaxed);
                warn!(
                    from = %msg.from(),
                    "[Dispatcher] Inbound queue closed; releasing message unprocessed"
                );
            }
        }
    }

    /// Same as [`dispatch`](Self::dispatch) for producers that are plain
    /// threads rather than tasks. Must NOT be called from async context.
    pub fn blocking_dispatch(&self, msg: RawMessage) {
        match self.inbound_tx.blocking_send(msg) {
            Ok(()) => {
                self.metrics.enqueued.fetch_add(1, Ordering::Relaxed);
            }
            Err(mpsc::error::SendError(msg)) => {
                self.metrics
                    .discarded_at_shutdown
                    .fetch_add(1, Ordering::Relaxed);
                warn!(
                    from = %msg.from(),
                    "[Dispatcher] Inbound queue closed; releasing message unprocessed"
                );
            }
        }
    }

    /// Gossip fan-out targets for a message kind, resolved through the same
    /// tag → handler table as dispatch. Out-of-range tags yield an empty
    /// list with a warning.
    pub fn broadcast_list(
        &self,
        type_tag: u8,
        instruction_tag: u8,
        from: &PeerEndpoint,
    ) -> Vec<PeerEndpoint> {
        self.selector.select(type_tag, instruction_tag, from)
    }

    /// The dispatcher's message accounting.
    pub fn metrics(&self) -> &DispatchMetrics {
        &self.metrics
    }

    /// Stop the intake loop, release still-queued messages unexecuted, and
    /// wait for in-flight worker jobs to complete.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);

        let intake = self.intake.lock().take();
        if let Some(handle) = intake {
            if let Err(e) = handle.await {
                warn!("[Dispatcher] Intake loop ended abnormally: {e}");
            }
        }

        // Every worker job holds one permit; owning all of them means the
        // pool is idle.
        match Arc::clone(&self.workers)
            .acquire_many_owned(self.worker_count as u32)
            .await
        {
            Ok(_permits) => {}
            Err(_) => warn!("[Dispatcher] Worker pool closed before drain completed"),
        }

        let snapshot = self.metrics.snapshot();
        info!(
            executed = snapshot.executed,
            discarded_at_shutdown = snapshot.discarded_at_shutdown,
            "[Dispatcher] Shut down"
        );
    }
}

/// The dedicated intake loop: dequeues messages and off-loads each one to
/// the worker pool. Runs until shutdown is signalled or all producers have
/// gone away.
async fn intake_loop(
    mut inbound_rx: mpsc::Receiver<RawMessage>,
    mut shutdown_rx: watch::Receiver<bool>,
    registry: Arc<HandlerRegistry>,
    metrics: Arc<DispatchMetrics>,
    workers: Arc<Semaphore>,
) {
    loop {
        tokio::select! {
            biased;

            _ = shutdown_rx.changed() => {
                drain_unexecuted(&mut inbound_rx, &metrics);
                break;
            }

            maybe_msg = inbound_rx.recv() => {
                let Some(msg) = maybe_msg else {
                    debug!("[Dispatcher] All producers dropped; intake loop exiting");
                    break;
                };

                // Throttle: wait for a worker slot before spawning the job.
                let permit = match Arc::clone(&workers).acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => break,
                };

                let registry = Arc::clone(&registry);
                let metrics = Arc::clone(&metrics);
                tokio::spawn(async move {
                    process_message(&registry, &metrics, msg).await;
                    drop(permit);
                });
            }
        }
    }
}

/// Release every message still resident in the queue without executing it.
fn drain_unexecuted(inbound_rx: &mut mpsc::Receiver<RawMessage>, metrics: &DispatchMetrics) {
    inbound_rx.close();
    let mut drained = 0u64;
    while let Ok(msg) = inbound_rx.try_recv() {
        drop(msg);
        drained += 1;
    }
    if drained > 0 {
        metrics
            .discarded_at_shutdown
            .fetch_add(drained, Ordering::Relaxed);
        info!(drained, "[Dispatcher] Released queued messages unexecuted");
    }
}

/// Validate and route one message inside a worker job. Consumes the
/// message; by the time this returns the message has been released.
async fn process_message(
    registry: &HandlerRegistry,
    metrics: &DispatchMetrics,
    msg: RawMessage,
) {
    if !msg.is_dispatchable() {
        metrics.discarded_malformed.fetch_add(1, Ordering::Relaxed);
        let err = MessageError::TooShort {
            len: msg.len(),
            minimum: MessageOffset::BODY,
        };
        warn!(from = %msg.from(), "[Dispatcher] Discarding: {err}");
        return;
    }

    let tag = msg.bytes()[MessageOffset::TYPE];
    let Some(handler) = registry.handler(tag) else {
        metrics
            .discarded_unknown_type
            .fetch_add(1, Ordering::Relaxed);
        let err = MessageError::UnknownType { tag };
        warn!(from = %msg.from(), "[Dispatcher] Discarding: {err}");
        return;
    };

    let succeeded = handler
        .execute(msg.bytes(), MessageOffset::INST, msg.from())
        .await;

    metrics.executed.fetch_add(1, Ordering::Relaxed);
    if !succeeded {
        // Failures are terminal to the message: no retry, no rerouting.
        metrics.execution_failures.fetch_add(1, Ordering::Relaxed);
        warn!(
            module = %handler.kind(),
            from = %msg.from(),
            "[Dispatcher] Handler reported failure"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shared_types::{Broadcastable, Executable, ModuleKind, ProtocolModule};
    use std::sync::atomic::AtomicU64;
    use std::time::Duration;

    /// Module that records executions and answers with a fixed result.
    struct RecordingModule {
        kind: ModuleKind,
        executions: AtomicU64,
        result: bool,
        delay: Duration,
        /// (producer port, sequence number) in processing order.
        seen: Mutex<Vec<(u16, u32)>>,
        peers: Vec<PeerEndpoint>,
    }

    impl RecordingModule {
        fn new(kind: ModuleKind) -> Arc<Self> {
            Arc::new(Self {
                kind,
                executions: AtomicU64::new(0),
                result: true,
                delay: Duration::ZERO,
                seen: Mutex::new(Vec::new()),
                peers: Vec::new(),
            })
        }

        fn failing(kind: ModuleKind) -> Arc<Self> {
            Arc::new(Self {
                result: false,
                ..Self::unwrapped(kind)
            })
        }

        fn slow(kind: ModuleKind, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                delay,
                ..Self::unwrapped(kind)
            })
        }

        fn with_peers(kind: ModuleKind, peers: Vec<PeerEndpoint>) -> Arc<Self> {
            Arc::new(Self {
                peers,
                ..Self::unwrapped(kind)
            })
        }

        fn unwrapped(kind: ModuleKind) -> Self {
            Self {
                kind,
                executions: AtomicU64::new(0),
                result: true,
                delay: Duration::ZERO,
                seen: Mutex::new(Vec::new()),
                peers: Vec::new(),
            }
        }

        fn executions(&self) -> u64 {
            self.executions.load(Ordering::Relaxed)
        }
    }

    #[async_trait]
    impl Executable for RecordingModule {
        async fn execute(&self, message: &[u8], offset: usize, from: &PeerEndpoint) -> bool {
            if self.delay > Duration::ZERO {
                tokio::time::sleep(self.delay).await;
            }
            // Sequence number, when the payload carries one.
            if message.len() >= offset + 1 + 4 {
                let mut seq = [0u8; 4];
                seq.copy_from_slice(&message[offset + 1..offset + 5]);
                self.seen
                    .lock()
                    .push((from.listen_port, u32::from_le_bytes(seq)));
            }
            self.executions.fetch_add(1, Ordering::Relaxed);
            self.result
        }
    }

    impl Broadcastable for RecordingModule {
        fn get_broadcast_list(
            &self,
            _instruction_tag: u8,
            from: &PeerEndpoint,
        ) -> Vec<PeerEndpoint> {
            self.peers.iter().filter(|p| *p != from).copied().collect()
        }
    }

    impl ProtocolModule for RecordingModule {
        fn kind(&self) -> ModuleKind {
            self.kind
        }
    }

    fn registry_of(modules: &[Arc<RecordingModule>]) -> Arc<HandlerRegistry> {
        Arc::new(HandlerRegistry::new(
            modules
                .iter()
                .map(|m| Arc::clone(m) as Arc<dyn ProtocolModule>)
                .collect(),
        ))
    }

    fn default_modules() -> Vec<Arc<RecordingModule>> {
        ModuleKind::ALL.into_iter().map(RecordingModule::new).collect()
    }

    fn peer(port: u16) -> PeerEndpoint {
        PeerEndpoint::loopback(port)
    }

    fn message(tag: u8, inst: u8, seq: u32, from: u16) -> RawMessage {
        let mut bytes = vec![tag, inst];
        bytes.extend_from_slice(&seq.to_le_bytes());
        RawMessage::new(bytes, peer(from))
    }

    async fn wait_for_processed(metrics: &DispatchMetrics, expected: u64) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while metrics.processed() < expected {
            assert!(
                tokio::time::Instant::now() < deadline,
                "timed out waiting for {expected} processed messages, got {}",
                metrics.processed()
            );
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test]
    async fn test_short_message_discarded_without_handler_invocation() {
        let modules = default_modules();
        let dispatcher = MessageDispatcher::start(registry_of(&modules), DispatchConfig::default());

        dispatcher
            .dispatch(RawMessage::new(vec![0x02], peer(1000)))
            .await;
        dispatcher.dispatch(RawMessage::new(vec![], peer(1000))).await;

        wait_for_processed(dispatcher.metrics(), 2).await;
        let snapshot = dispatcher.metrics().snapshot();
        assert_eq!(snapshot.discarded_malformed, 2);
        assert_eq!(snapshot.executed, 0);
        for module in &modules {
            assert_eq!(module.executions(), 0);
        }

        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_unknown_type_tag_discarded() {
        let modules = default_modules();
        let dispatcher = MessageDispatcher::start(registry_of(&modules), DispatchConfig::default());

        dispatcher.dispatch(message(0x09, 0, 0, 1000)).await;
        dispatcher.dispatch(message(0xFF, 0, 0, 1000)).await;

        wait_for_processed(dispatcher.metrics(), 2).await;
        let snapshot = dispatcher.metrics().snapshot();
        assert_eq!(snapshot.discarded_unknown_type, 2);
        assert_eq!(snapshot.executed, 0);
        for module in &modules {
            assert_eq!(module.executions(), 0);
        }

        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_valid_message_routed_to_matching_module() {
        let modules = default_modules();
        let dispatcher = MessageDispatcher::start(registry_of(&modules), DispatchConfig::default());

        for kind in ModuleKind::ALL {
            dispatcher.dispatch(message(kind.as_tag(), 0, 0, 1000)).await;
        }

        wait_for_processed(dispatcher.metrics(), 5).await;
        for module in &modules {
            assert_eq!(module.executions(), 1, "module {}", module.kind());
        }

        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_drain_conservation_mixed_traffic() {
        // Valid, short, and unknown-tag messages: all N accounted for,
        // none double-processed, none leaked.
        let modules = default_modules();
        let dispatcher = MessageDispatcher::start(
            registry_of(&modules),
            DispatchConfig {
                queue_capacity: 8, // force backpressure along the way
                worker_count: 4,
            },
        );

        let mut sent = 0u64;
        for i in 0..60u32 {
            let msg = match i % 3 {
                0 => message(2, 1, i, 1000),
                1 => RawMessage::new(vec![0x01], peer(1000)),
                _ => message(0x40, 1, i, 1000),
            };
            dispatcher.dispatch(msg).await;
            sent += 1;
        }

        wait_for_processed(dispatcher.metrics(), sent).await;
        let snapshot = dispatcher.metrics().snapshot();
        assert_eq!(snapshot.enqueued, sent);
        assert_eq!(
            snapshot.executed + snapshot.discarded_malformed + snapshot.discarded_unknown_type,
            sent
        );
        assert_eq!(snapshot.executed, 20);
        assert_eq!(snapshot.discarded_malformed, 20);
        assert_eq!(snapshot.discarded_unknown_type, 20);

        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_failed_handler_not_retried() {
        let mut modules = default_modules();
        modules[2] = RecordingModule::failing(ModuleKind::Ledger);
        let dispatcher = MessageDispatcher::start(registry_of(&modules), DispatchConfig::default());

        dispatcher.dispatch(message(2, 0, 0, 1000)).await;

        wait_for_processed(dispatcher.metrics(), 1).await;
        // Give a would-be retry a chance to show up.
        tokio::time::sleep(Duration::from_millis(50)).await;

        let snapshot = dispatcher.metrics().snapshot();
        assert_eq!(modules[2].executions(), 1);
        assert_eq!(snapshot.executed, 1);
        assert_eq!(snapshot.execution_failures, 1);

        dispatcher.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_producers_keep_own_fifo_order() {
        // A single worker makes processing order equal to dequeue order,
        // exposing the queue's per-producer FIFO property.
        let modules = default_modules();
        let dispatcher = Arc::new(MessageDispatcher::start(
            registry_of(&modules),
            DispatchConfig {
                queue_capacity: 4,
                worker_count: 1,
            },
        ));

        const PER_PRODUCER: u32 = 100;
        let producers = [2000u16, 2001, 2002];

        let mut handles = Vec::new();
        for port in producers {
            let dispatcher = Arc::clone(&dispatcher);
            handles.push(tokio::spawn(async move {
                for seq in 0..PER_PRODUCER {
                    dispatcher.dispatch(message(2, 0, seq, port)).await;
                }
            }));
        }
        for handle in handles {
            handle.await.expect("producer task");
        }

        wait_for_processed(
            dispatcher.metrics(),
            producers.len() as u64 * PER_PRODUCER as u64,
        )
        .await;

        let seen = modules[2].seen.lock().clone();
        for port in producers {
            let sequence: Vec<u32> = seen
                .iter()
                .filter(|(p, _)| *p == port)
                .map(|(_, s)| *s)
                .collect();
            let expected: Vec<u32> = (0..PER_PRODUCER).collect();
            assert_eq!(sequence, expected, "producer {port} order violated");
        }

        dispatcher.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_blocking_dispatch_from_plain_thread() {
        let modules = default_modules();
        let dispatcher = Arc::new(MessageDispatcher::start(
            registry_of(&modules),
            DispatchConfig {
                queue_capacity: 2,
                worker_count: 2,
            },
        ));

        let producer = Arc::clone(&dispatcher);
        let thread = std::thread::spawn(move || {
            for seq in 0..20u32 {
                producer.blocking_dispatch(message(2, 0, seq, 3000));
            }
        });
        tokio::task::spawn_blocking(move || thread.join().expect("producer thread"))
            .await
            .expect("join task");

        wait_for_processed(dispatcher.metrics(), 20).await;
        assert_eq!(modules[2].executions(), 20);

        dispatcher.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_shutdown_releases_queued_messages_unexecuted() {
        let mut modules = default_modules();
        modules[2] = RecordingModule::slow(ModuleKind::Ledger, Duration::from_millis(300));
        let dispatcher = MessageDispatcher::start(
            registry_of(&modules),
            DispatchConfig {
                queue_capacity: 16,
                worker_count: 1,
            },
        );

        const SENT: u64 = 6;
        for i in 0..SENT as u32 {
            dispatcher.dispatch(message(2, 0, i, 1000)).await;
        }

        dispatcher.shutdown().await;

        let snapshot = dispatcher.metrics().snapshot();
        assert_eq!(snapshot.executed + snapshot.discarded_at_shutdown, SENT);
        assert!(
            snapshot.discarded_at_shutdown >= 1,
            "expected at least one queued message released unexecuted: {snapshot:?}"
        );
    }

    #[tokio::test]
    async fn test_broadcast_list_for_registered_tag() {
        let mut modules = default_modules();
        let fanout = vec![peer(7000), peer(7001), peer(7002)];
        modules[1] = RecordingModule::with_peers(ModuleKind::DirectoryService, fanout.clone());
        let dispatcher = MessageDispatcher::start(registry_of(&modules), DispatchConfig::default());

        // Originating peer is excluded from its own fan-out.
        let list = dispatcher.broadcast_list(1, 0, &peer(7001));
        assert_eq!(list, vec![peer(7000), peer(7002)]);

        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_broadcast_list_unknown_tag_empty() {
        let modules = default_modules();
        let dispatcher = MessageDispatcher::start(registry_of(&modules), DispatchConfig::default());

        assert!(dispatcher.broadcast_list(9, 0, &peer(1000)).is_empty());
        assert!(dispatcher.broadcast_list(0xFF, 3, &peer(1000)).is_empty());

        dispatcher.shutdown().await;
    }
}
