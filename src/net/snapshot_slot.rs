//! Latest-snapshot slot between the transport and the render loop
//!
//! Holds at most one unconsumed snapshot. Publishing overwrites whatever
//! is pending; the render tick takes and clears it in one step. Only the
//! newest state matters to a real-time renderer, so there is no queue and
//! no backpressure.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::protocol::{decode_snapshot, DecodeError, WorldSnapshot};

#[derive(Debug, Default)]
struct SlotInner {
    pending: Mutex<Option<WorldSnapshot>>,
    published: AtomicU64,
    overwritten: AtomicU64,
}

/// Reader side, owned by the game world
#[derive(Debug, Default)]
pub struct SnapshotSlot {
    inner: Arc<SlotInner>,
}

impl SnapshotSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer handle for a transport
    pub fn sink(&self) -> SnapshotSink {
        SnapshotSink {
            inner: self.inner.clone(),
        }
    }

    /// Take the pending snapshot, clearing the dirty state
    pub fn take(&self) -> Option<WorldSnapshot> {
        self.inner.pending.lock().take()
    }

    pub fn has_pending(&self) -> bool {
        self.inner.pending.lock().is_some()
    }

    /// Total snapshots published
    pub fn published_count(&self) -> u64 {
        self.inner.published.load(Ordering::Relaxed)
    }

    /// Snapshots replaced before the render loop consumed them
    pub fn overwritten_count(&self) -> u64 {
        self.inner.overwritten.load(Ordering::Relaxed)
    }
}

/// Clonable writer handle given to the transport
#[derive(Debug, Clone)]
pub struct SnapshotSink {
    inner: Arc<SlotInner>,
}

impl SnapshotSink {
    /// Store `snapshot` as the latest, replacing any unconsumed one
    pub fn publish(&self, snapshot: WorldSnapshot) {
        let previous = self.inner.pending.lock().replace(snapshot);
        self.inner.published.fetch_add(1, Ordering::Relaxed);
        if previous.is_some() {
            self.inner.overwritten.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Decode a JSON snapshot and publish it
    pub fn publish_json(&self, json: &str) -> Result<(), DecodeError> {
        self.publish(decode_snapshot(json)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(tick: u64) -> WorldSnapshot {
        WorldSnapshot {
            tick,
            ..Default::default()
        }
    }

    #[test]
    fn test_take_clears() {
        let slot = SnapshotSlot::new();
        slot.sink().publish(snapshot(1));
        assert!(slot.has_pending());
        assert_eq!(slot.take().map(|s| s.tick), Some(1));
        assert!(slot.take().is_none());
    }

    #[test]
    fn test_newest_overwrites_pending() {
        let slot = SnapshotSlot::new();
        let sink = slot.sink();
        sink.publish(snapshot(1));
        sink.publish(snapshot(2));
        sink.clone().publish(snapshot(3));
        assert_eq!(slot.take().map(|s| s.tick), Some(3));
        assert_eq!(slot.published_count(), 3);
        assert_eq!(slot.overwritten_count(), 2);
    }

    #[test]
    fn test_publish_json() {
        let slot = SnapshotSlot::new();
        let sink = slot.sink();
        sink.publish_json(r#"{"tick": 9}"#).unwrap();
        assert!(sink.publish_json("not json").is_err());
        assert_eq!(slot.take().map(|s| s.tick), Some(9));
    }

    #[test]
    fn test_sink_from_other_thread() {
        let slot = SnapshotSlot::new();
        let sink = slot.sink();
        std::thread::spawn(move || sink.publish(snapshot(5)))
            .join()
            .unwrap();
        assert_eq!(slot.take().map(|s| s.tick), Some(5));
    }
}
