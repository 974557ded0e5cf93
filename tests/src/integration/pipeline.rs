//! # Ingestion Pipeline Integration
//!
//! Drives a real `Node` end-to-end: concurrent producers, mixed
//! well-formed/malformed traffic, gossip fan-out after peer announcements,
//! and drain accounting across shutdown.

#[cfg(test)]
mod tests {
    use node_runtime::node::NodeParams;
    use node_runtime::{InProcessTransport, Node, NodeConfig};
    use shared_crypto::NodeKeyPair;
    use shared_types::{NodeRole, PeerEndpoint, RawMessage, SyncMode};
    use std::sync::Arc;
    use std::time::Duration;

    fn test_config() -> NodeConfig {
        let mut config = NodeConfig::default();
        config.network.api_port = 0;
        config.dispatch.queue_capacity = 16; // keep backpressure in play
        config.dispatch.worker_count = 4;
        config
    }

    fn test_params() -> NodeParams {
        NodeParams {
            key_pair: NodeKeyPair::from_seed([3u8; 32]),
            self_peer: PeerEndpoint::loopback(30303),
            load_peer_config: false,
            sync_mode: SyncMode::NoSync,
            retrieve_history: false,
            role: NodeRole::OrdinaryNode,
        }
    }

    async fn start_node() -> (Node, InProcessTransport) {
        let transport = InProcessTransport::new();
        let node = Node::start(test_params(), &test_config(), &transport).await;
        (node, transport)
    }

    async fn wait_for_processed(node: &Node, expected: u64) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
        while node.dispatch_metrics().processed() < expected {
            assert!(
                tokio::time::Instant::now() < deadline,
                "timed out waiting for {expected} processed messages, got {}",
                node.dispatch_metrics().processed()
            );
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    /// Every dispatched message ends up executed or discarded, exactly once.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_conservation_under_concurrent_producers() {
        let (node, _transport) = start_node().await;
        let node = Arc::new(node);

        const PRODUCERS: usize = 4;
        const PER_PRODUCER: u32 = 48; // divisible by the 4 traffic buckets

        let mut handles = Vec::new();
        for producer in 0..PRODUCERS {
            let node = Arc::clone(&node);
            handles.push(tokio::spawn(async move {
                let from = PeerEndpoint::loopback(42000 + producer as u16);
                for i in 0..PER_PRODUCER {
                    let msg = match i % 4 {
                        // Ledger transaction traffic
                        0 => RawMessage::new(vec![0x02, 0x01, i as u8], from),
                        // Consensus round traffic
                        1 => RawMessage::new(vec![0x03, 0x01], from),
                        // Too short to carry a header
                        2 => RawMessage::new(vec![0x02], from),
                        // Out-of-range type tag
                        _ => RawMessage::new(vec![0x20, 0x00], from),
                    };
                    node.dispatch(msg).await;
                }
            }));
        }
        for handle in handles {
            handle.await.expect("producer task");
        }

        let total = (PRODUCERS as u64) * (PER_PRODUCER as u64);
        wait_for_processed(&node, total).await;

        let snapshot = node.dispatch_metrics().snapshot();
        assert_eq!(snapshot.enqueued, total);
        assert_eq!(
            snapshot.executed + snapshot.discarded_malformed + snapshot.discarded_unknown_type,
            total
        );
        // Quarter of each producer's traffic per bucket; execute covers two.
        assert_eq!(snapshot.executed, total / 2);
        assert_eq!(snapshot.discarded_malformed, total / 4);
        assert_eq!(snapshot.discarded_unknown_type, total / 4);
        assert_eq!(snapshot.execution_failures, 0);

        node.shutdown().await;
    }

    /// Announced peers become gossip targets; the originator never gets
    /// its own message back; consensus traffic is never gossiped.
    #[tokio::test]
    async fn test_gossip_fanout_follows_announcements() {
        let (node, _transport) = start_node().await;

        let peer_a = PeerEndpoint::loopback(42001);
        let peer_b = PeerEndpoint::loopback(42002);
        node.dispatch(RawMessage::new(vec![0x00, 0x00], peer_a)).await;
        node.dispatch(RawMessage::new(vec![0x00, 0x00], peer_b)).await;
        wait_for_processed(&node, 2).await;

        // Ledger gossip reaches everyone but the sender.
        assert_eq!(node.broadcast_list(0x02, 0x00, &peer_a), vec![peer_b]);
        assert_eq!(node.broadcast_list(0x02, 0x00, &peer_b), vec![peer_a]);

        // Repeating the query yields the same answer.
        assert_eq!(node.broadcast_list(0x02, 0x00, &peer_a), vec![peer_b]);

        // Consensus traffic is point-to-point.
        assert!(node.broadcast_list(0x03, 0x00, &peer_a).is_empty());

        // Out-of-range tags answer empty instead of crashing.
        assert!(node.broadcast_list(0x10, 0x00, &peer_a).is_empty());

        node.shutdown().await;
    }

    /// A handler that rejects its payload is not retried, and the failure
    /// never escapes the worker.
    #[tokio::test]
    async fn test_rejected_payload_is_terminal() {
        let (node, _transport) = start_node().await;
        let from = PeerEndpoint::loopback(42003);

        // 0x7F is not a peer-manager instruction.
        node.dispatch(RawMessage::new(vec![0x00, 0x7F], from)).await;
        wait_for_processed(&node, 1).await;
        tokio::time::sleep(Duration::from_millis(30)).await;

        let snapshot = node.dispatch_metrics().snapshot();
        assert_eq!(snapshot.executed, 1);
        assert_eq!(snapshot.execution_failures, 1);

        node.shutdown().await;
    }

    /// The queue applies backpressure instead of dropping: a burst far
    /// beyond queue capacity is fully accounted for.
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_burst_beyond_queue_capacity_is_not_dropped() {
        let (node, _transport) = start_node().await;
        let from = PeerEndpoint::loopback(42004);

        const BURST: u64 = 500; // queue capacity is 16
        for i in 0..BURST {
            node.dispatch(RawMessage::new(vec![0x02, 0x01, i as u8], from))
                .await;
        }

        wait_for_processed(&node, BURST).await;
        let snapshot = node.dispatch_metrics().snapshot();
        assert_eq!(snapshot.enqueued, BURST);
        assert_eq!(snapshot.executed, BURST);

        node.shutdown().await;
    }
}
