//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the rule core and the automation host.
//! They are defined here (in `app`) so that both the engine and the adapter
//! layer can depend on them without creating circular dependencies.

pub mod clock;
pub mod host;
pub mod node;
pub mod trigger_registry;

pub use clock::{Clock, SystemClock};
pub use host::AutomationHost;
pub use node::UiNode;
pub use trigger_registry::{TriggerRecord, TriggerRegistry};
