//! Building blocks of the `autotapd` daemon, split from `main.rs` so the
//! replay loop can be driven from integration tests.

pub mod config;
pub mod replay;
pub mod scenario;
