//! Clock port — the engine's only source of "now".

use autotap_domain::time::{self, Millis};

/// Supplies the current time in epoch milliseconds.
pub trait Clock {
    fn now_millis(&self) -> Millis;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> Millis {
        time::now_millis()
    }
}

impl<T: Clock> Clock for std::sync::Arc<T> {
    fn now_millis(&self) -> Millis {
        (**self).now_millis()
    }
}
