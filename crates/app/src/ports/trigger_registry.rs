//! Trigger registry port — the single "most recently triggered rule" slot.

use autotap_domain::id::RuleId;
use autotap_domain::time::Millis;

/// Which rule fired last, and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerRecord {
    pub rule_id: RuleId,
    pub at: Millis,
}

/// Shared, last-writer-wins record of the most recent firing.
///
/// Written only when a rule is marked triggered; read by pre-rule checks.
/// Implementations provide no ordering guarantees between concurrent
/// evaluation passes; callers serialize passes.
pub trait TriggerRegistry {
    /// Publish `record`, replacing whatever was there.
    fn record(&self, record: TriggerRecord);

    /// The most recent firing, if any rule fired yet.
    fn last_triggered(&self) -> Option<TriggerRecord>;
}

impl<T: TriggerRegistry> TriggerRegistry for std::sync::Arc<T> {
    fn record(&self, record: TriggerRecord) {
        (**self).record(record);
    }

    fn last_triggered(&self) -> Option<TriggerRecord> {
        (**self).last_triggered()
    }
}
