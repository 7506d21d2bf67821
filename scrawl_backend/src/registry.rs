use nanoid::nanoid;
use std::collections::HashMap;
use tokio::sync::{Mutex, mpsc};

/// Capacity of each connection's outbound queue. A peer that falls this far
/// behind starts losing events rather than stalling delivery to others.
pub const OUTBOUND_QUEUE: usize = 100;

pub type ConnectionId = String;

/// One registered peer: its id and the sending half of its outbound queue.
/// The queue is drained in order by the connection's writer task, so frames
/// queued here reach the peer in queueing order.
#[derive(Clone, Debug)]
pub struct PeerHandle {
    pub id: ConnectionId,
    pub tx: mpsc::Sender<String>,
}

/// Tracks the currently connected peers.
///
/// Membership is the only mutation: connections are added on transport
/// accept and removed on transport close. State lives for the process
/// lifetime only.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    peers: Mutex<HashMap<ConnectionId, PeerHandle>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly accepted connection and return its id.
    pub async fn add(&self, tx: mpsc::Sender<String>) -> ConnectionId {
        let id = nanoid!(10);
        let handle = PeerHandle {
            id: id.clone(),
            tx,
        };
        self.peers.lock().await.insert(id.clone(), handle);
        id
    }

    /// Remove a connection. Idempotent: returns false if it was already
    /// gone (e.g. a duplicate disconnect signal).
    pub async fn remove(&self, id: &str) -> bool {
        self.peers.lock().await.remove(id).is_some()
    }

    /// Snapshot of every registered peer except `exclude`.
    ///
    /// The clone is taken under the lock, so a broadcast iterating the
    /// result sees either pre- or post-mutation membership, never a
    /// partially updated one, and concurrent add/remove cannot corrupt an
    /// in-flight fan-out.
    pub async fn enumerate_except(&self, exclude: &str) -> Vec<PeerHandle> {
        self.peers
            .lock()
            .await
            .values()
            .filter(|peer| peer.id != exclude)
            .cloned()
            .collect()
    }

    /// Number of connected peers, for logs and the stats endpoint.
    pub async fn len(&self) -> usize {
        self.peers.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle_channel() -> mpsc::Sender<String> {
        mpsc::channel(OUTBOUND_QUEUE).0
    }

    #[tokio::test]
    async fn add_and_remove_track_membership() {
        let registry = ConnectionRegistry::new();
        let a = registry.add(handle_channel()).await;
        let b = registry.add(handle_channel()).await;
        assert_ne!(a, b);
        assert_eq!(registry.len().await, 2);

        assert!(registry.remove(&a).await);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let id = registry.add(handle_channel()).await;
        assert!(registry.remove(&id).await);
        assert!(!registry.remove(&id).await);
        assert!(!registry.remove("never-existed").await);
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn enumerate_excludes_only_the_sender() {
        let registry = ConnectionRegistry::new();
        let a = registry.add(handle_channel()).await;
        let b = registry.add(handle_channel()).await;
        let c = registry.add(handle_channel()).await;

        let others = registry.enumerate_except(&a).await;
        let ids: Vec<_> = others.iter().map(|p| p.id.clone()).collect();
        assert_eq!(others.len(), 2);
        assert!(ids.contains(&b) && ids.contains(&c));
        assert!(!ids.contains(&a));
    }

    #[tokio::test]
    async fn enumerate_with_unknown_id_returns_everyone() {
        let registry = ConnectionRegistry::new();
        registry.add(handle_channel()).await;
        registry.add(handle_channel()).await;
        assert_eq!(registry.enumerate_except("nobody").await.len(), 2);
    }
}
