//! # autotap-domain
//!
//! Pure domain model for the autotap UI-automation rule core.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps, geometry
//! - Define **Rules** (selector chains, activity scope, cooldown/delay, action kind)
//! - Define **Gate state** (firing history, the temporal state machine)
//! - Define the **Rule set** arena that owns rules and resolves cross-references
//! - Define **Actions** (action kinds, dispatch results, click requests)
//! - Define the raw **subscription records** rules are assembled from
//! - Define the **selector capability** consumed by rule matching
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! Host capabilities (node actions, gestures, clocks) are traits in the `app`
//! crate (ports). Selector evaluation is a pure tree query and is declared
//! here so rules can run their match chains.

pub mod error;
pub mod id;
pub mod time;

pub mod action;
pub mod geometry;
pub mod rule;
pub mod selector;
pub mod subscription;
