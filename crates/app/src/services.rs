//! Application services — use-case implementations.
//!
//! Services take their collaborators as arguments or generic parameters,
//! keeping this layer decoupled from concrete adapters.

pub mod rule_loader;
