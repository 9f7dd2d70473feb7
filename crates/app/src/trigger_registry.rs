//! In-process trigger registry backed by a tokio watch channel.

use tokio::sync::watch;

use crate::ports::{TriggerRecord, TriggerRegistry};

/// Trigger registry using a tokio [`watch`] channel.
///
/// Holds one value: the most recent [`TriggerRecord`]. Recording succeeds
/// even when nobody is subscribed.
pub struct WatchTriggerRegistry {
    sender: watch::Sender<Option<TriggerRecord>>,
}

impl Default for WatchTriggerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchTriggerRegistry {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }

    /// Observe firings.
    ///
    /// The receiver sees the current value immediately and is notified on
    /// every later write.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<TriggerRecord>> {
        self.sender.subscribe()
    }

    /// Forget the last firing (e.g. when the foreground app changes).
    pub fn clear(&self) {
        self.sender.send_replace(None);
    }
}

impl TriggerRegistry for WatchTriggerRegistry {
    fn record(&self, record: TriggerRecord) {
        self.sender.send_replace(Some(record));
    }

    fn last_triggered(&self) -> Option<TriggerRecord> {
        *self.sender.borrow()
    }
}
