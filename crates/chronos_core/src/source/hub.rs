//! In-process snapshot fan-out keyed by owner.

use crate::model::record::OwnerId;
use crate::source::subscription::{Subscription, SubscriptionId};
use log::debug;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

type Registry<T> = BTreeMap<OwnerId, Vec<(SubscriptionId, Sender<Vec<T>>)>>;

pub(crate) struct HubInner<T> {
    channel: &'static str,
    next_id: AtomicU64,
    subscribers: Mutex<Registry<T>>,
}

impl<T> HubInner<T> {
    fn registry(&self) -> MutexGuard<'_, Registry<T>> {
        // A poisoned registry only means a publisher panicked mid-send; the
        // map itself is still consistent.
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn remove(&self, owner: &OwnerId, id: SubscriptionId) {
        let mut registry = self.registry();
        if let Some(senders) = registry.get_mut(owner) {
            senders.retain(|(existing, _)| *existing != id);
            if senders.is_empty() {
                registry.remove(owner);
            }
        }
        debug!(
            "event=unsubscribe module=source channel={} subscription_id={}",
            self.channel, id
        );
    }
}

/// Fan-out registry for one snapshot channel (tasks or events).
///
/// Cloning yields another handle to the same registry.
pub struct SnapshotHub<T> {
    inner: Arc<HubInner<T>>,
}

impl<T> Clone for SnapshotHub<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone> SnapshotHub<T> {
    pub fn new(channel: &'static str) -> Self {
        Self {
            inner: Arc::new(HubInner {
                channel,
                next_id: AtomicU64::new(1),
                subscribers: Mutex::new(BTreeMap::new()),
            }),
        }
    }

    /// Registers a subscriber and seeds it with `initial`.
    pub fn subscribe(&self, owner: &OwnerId, initial: Vec<T>) -> Subscription<T> {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let (sender, receiver) = mpsc::channel();
        // Receiver is alive here, so the seed send cannot fail.
        let _ = sender.send(initial);
        self.inner
            .registry()
            .entry(owner.clone())
            .or_default()
            .push((id, sender));
        debug!(
            "event=subscribe module=source channel={} subscription_id={}",
            self.inner.channel, id
        );

        Subscription::new(id, owner.clone(), receiver, Arc::downgrade(&self.inner))
    }

    /// Sends `snapshot` to every live subscriber of `owner`.
    ///
    /// Returns the number of subscribers reached. Subscribers whose receiver
    /// was dropped are pruned.
    pub fn publish(&self, owner: &OwnerId, snapshot: &[T]) -> usize {
        let mut registry = self.inner.registry();
        let Some(senders) = registry.get_mut(owner) else {
            return 0;
        };

        senders.retain(|(_, sender)| sender.send(snapshot.to_vec()).is_ok());
        let delivered = senders.len();
        if senders.is_empty() {
            registry.remove(owner);
        }
        debug!(
            "event=publish module=source channel={} delivered={} records={}",
            self.inner.channel,
            delivered,
            snapshot.len()
        );
        delivered
    }

    /// Number of live subscriptions for `owner`.
    pub fn subscriber_count(&self, owner: &OwnerId) -> usize {
        self.inner.registry().get(owner).map_or(0, Vec::len)
    }
}

pub(crate) type WeakHub<T> = Weak<HubInner<T>>;
