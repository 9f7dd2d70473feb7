//! # autotap-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that host adapters must implement:
//!   - `AutomationHost` — window root, screen metrics, launcher, gestures
//!   - `UiNode` — clickability, bounds and node-level clicks
//!   - `Clock` — wall-clock milliseconds
//!   - `TriggerRegistry` — the most recently fired rule
//! - Provide the **action primitives** (`clickNode`, `clickCenter`, auto-click)
//! - Drive evaluation through the `RuleEngine`, one pass per snapshot
//! - Provide **in-process infrastructure** (watch-based trigger registry)
//!
//! ## Dependency rule
//! Depends on `autotap-domain` only (plus `tokio::sync` for the registry).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod actions;
pub mod ports;
pub mod rule_engine;
pub mod services;
pub mod trigger_registry;

#[cfg(test)]
mod testing;
