use crate::registry::ConnectionRegistry;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

/// Fans one peer's events out to every other connected peer.
///
/// The relay never inspects or transforms the frame; it is handed the
/// already-encoded broadcast event and forwards it as-is. Delivery is
/// at-most-once per currently connected peer: sends are non-blocking, and
/// a peer whose queue is full or already closed is skipped without
/// affecting the rest of the fan-out.
#[derive(Debug)]
pub struct EventRelay {
    registry: Arc<ConnectionRegistry>,
}

impl EventRelay {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Forward `frame` to every registered peer except `sender_id`.
    /// Returns the number of peers the frame was queued for.
    pub async fn broadcast_from(&self, sender_id: &str, frame: &str) -> usize {
        let peers = self.registry.enumerate_except(sender_id).await;
        let mut delivered = 0;

        for peer in peers {
            match peer.tx.try_send(frame.to_owned()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!("outbound queue full for {}, dropping event", peer.id);
                }
                Err(TrySendError::Closed(_)) => {
                    // Peer is mid-disconnect; the registry entry goes next.
                    debug!("{} is gone, skipping", peer.id);
                }
            }
        }

        debug!("relayed event from {sender_id} to {delivered} peers");
        delivered
    }
}
