//! # Startup Scenario Integration
//!
//! The role × sync-mode decision matrix exercised through a real `Node`:
//! which collaborator gets engaged, what the lookup module records, and how
//! invalid combinations degrade.

#[cfg(test)]
mod tests {
    use node_runtime::node::NodeParams;
    use node_runtime::{InProcessTransport, Node, NodeConfig};
    use node_core::SyncDecision;
    use shared_crypto::NodeKeyPair;
    use shared_types::{ModuleKind, NodeRole, PeerEndpoint, SyncMode};

    fn test_config() -> NodeConfig {
        let mut config = NodeConfig::default();
        config.network.api_port = 0;
        config.network.allow_list = vec![PeerEndpoint::loopback(30304)];
        config
    }

    async fn start(role: NodeRole, mode: SyncMode, retrieve_history: bool) -> Node {
        let params = NodeParams {
            key_pair: NodeKeyPair::from_seed([5u8; 32]),
            self_peer: PeerEndpoint::loopback(30303),
            load_peer_config: false,
            sync_mode: mode,
            retrieve_history,
            role,
        };
        let transport = InProcessTransport::new();
        Node::start(params, &test_config(), &transport).await
    }

    #[tokio::test]
    async fn test_no_sync_initializes_allow_list() {
        let node = start(NodeRole::OrdinaryNode, SyncMode::NoSync, false).await;

        assert_eq!(node.sync_decision(), SyncDecision::AllowListOnly);
        assert_eq!(node.allow_list().len(), 1);
        assert!(node.allow_list().is_admitted(&PeerEndpoint::loopback(30304)));
        assert!(!node.allow_list().is_admitted(&PeerEndpoint::loopback(50000)));

        node.shutdown().await;
    }

    #[tokio::test]
    async fn test_ordinary_roles_engage_expected_modules() {
        let cases = [
            (SyncMode::NewNodeSync, ModuleKind::Ledger),
            (SyncMode::NormalSync, ModuleKind::Ledger),
            (SyncMode::DirectoryServiceSync, ModuleKind::DirectoryService),
        ];

        for (mode, module) in cases {
            let node = start(NodeRole::OrdinaryNode, mode, false).await;
            assert_eq!(
                node.sync_decision(),
                SyncDecision::Engaged { module, mode },
                "mode {mode}"
            );
            assert_eq!(node.sync_mode(), Some(mode), "mode {mode}");
            node.shutdown().await;
        }
    }

    #[tokio::test]
    async fn test_lookup_role_engages_lookup_module() {
        let node = start(NodeRole::LookupNode, SyncMode::LookupSync, false).await;

        assert_eq!(
            node.sync_decision(),
            SyncDecision::Engaged {
                module: ModuleKind::Lookup,
                mode: SyncMode::LookupSync
            }
        );
        assert_eq!(node.sync_mode(), Some(SyncMode::LookupSync));

        node.shutdown().await;
    }

    #[tokio::test]
    async fn test_new_node_with_history_retrieval_stays_unsynchronized() {
        let node = start(NodeRole::OrdinaryNode, SyncMode::NewNodeSync, true).await;

        assert_eq!(node.sync_decision(), SyncDecision::HistoryConflict);
        assert_eq!(node.sync_mode(), None);

        node.shutdown().await;
    }

    #[tokio::test]
    async fn test_role_mode_mismatches_keep_node_alive() {
        let mismatches = [
            (NodeRole::OrdinaryNode, SyncMode::LookupSync),
            (NodeRole::LookupNode, SyncMode::NewNodeSync),
            (NodeRole::LookupNode, SyncMode::NormalSync),
            (NodeRole::LookupNode, SyncMode::DirectoryServiceSync),
        ];

        for (role, mode) in mismatches {
            let node = start(role, mode, false).await;
            assert_eq!(
                node.sync_decision(),
                SyncDecision::InvalidConfiguration { role, mode },
                "role {role}, mode {mode}"
            );
            assert_eq!(node.sync_mode(), None);

            // Still live: the dispatch path works unsynchronized.
            let peer = PeerEndpoint::loopback(45000);
            node.dispatch(shared_types::RawMessage::new(vec![0x00, 0x02], peer))
                .await;
            node.shutdown().await;

            assert_eq!(
                node.dispatch_metrics().settled(),
                1,
                "role {role}, mode {mode}"
            );
        }
    }

    #[tokio::test]
    async fn test_identity_is_stable_across_restarts() {
        let first = start(NodeRole::OrdinaryNode, SyncMode::NoSync, false).await;
        let address = first.address();
        first.shutdown().await;

        let second = start(NodeRole::OrdinaryNode, SyncMode::NoSync, false).await;
        assert_eq!(second.address(), address);
        second.shutdown().await;
    }
}
