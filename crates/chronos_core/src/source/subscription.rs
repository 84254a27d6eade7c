//! Subscription handle: snapshot receiver plus unsubscribe.

use crate::model::record::OwnerId;
use crate::source::hub::WeakHub;
use log::warn;
use std::cell::Cell;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);

impl Display for SubscriptionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Receiving end of a live collection.
///
/// Dropping the subscription unsubscribes it. When the hub behind it is
/// dropped the channel hangs up and [`Subscription::is_closed`] turns true
/// once the remaining snapshots are drained.
pub struct Subscription<T> {
    id: SubscriptionId,
    owner: OwnerId,
    receiver: Receiver<Vec<T>>,
    hub: WeakHub<T>,
    closed: Cell<bool>,
}

impl<T> Subscription<T> {
    pub(crate) fn new(
        id: SubscriptionId,
        owner: OwnerId,
        receiver: Receiver<Vec<T>>,
        hub: WeakHub<T>,
    ) -> Self {
        Self {
            id,
            owner,
            receiver,
            hub,
            closed: Cell::new(false),
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    /// Drains every pending snapshot and returns the newest one.
    ///
    /// Returns `None` when nothing arrived since the last call. Check
    /// [`Subscription::is_closed`] to tell a quiet source from a gone one.
    pub fn try_latest(&self) -> Option<Vec<T>> {
        let mut latest = None;
        loop {
            match self.receiver.try_recv() {
                Ok(snapshot) => latest = Some(snapshot),
                Err(TryRecvError::Empty) => return latest,
                Err(TryRecvError::Disconnected) => {
                    self.mark_closed();
                    return latest;
                }
            }
        }
    }

    /// Blocks up to `timeout` for the next snapshot.
    ///
    /// Returns `None` on timeout or when the source hung up.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Vec<T>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(snapshot) => Some(snapshot),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                self.mark_closed();
                None
            }
        }
    }

    /// True once a receive observed that the source was dropped. No further
    /// snapshots will arrive.
    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    fn mark_closed(&self) {
        if !self.closed.replace(true) {
            warn!(
                "event=subscription_closed module=source status=error subscription_id={} error_code=source_dropped",
                self.id
            );
        }
    }

    /// Stops delivery. Equivalent to dropping the subscription.
    pub fn unsubscribe(self) {}
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.remove(&self.owner, self.id);
        }
    }
}
