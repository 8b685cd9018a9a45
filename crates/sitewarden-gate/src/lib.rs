//! Pre-publication quality gate.
//!
//! Validates one content item against configurable thresholds and heuristic
//! rule tables before the publishing pipeline commits it. A failed blocker
//! check stops publication; warnings are advisory. Everything is
//! deterministic given the same inputs and thresholds.
//!
//! # Main types
//!
//! - [`PublicationGate`] — Runs the ordered check list.
//! - [`GateResult`] — `allowed` is false iff any blocker fired.
//! - [`GateThresholds`] — The single typed home of every tunable value.
//! - [`RuleTable`] — Compiled `{pattern, weight}` heuristic tables.

/// Text and markup analysis.
pub mod analysis;
/// The gate runner and its check list.
pub mod gate;
/// Heuristic rule tables.
pub mod rules;
/// Typed threshold configuration.
pub mod thresholds;

pub use gate::{GateCheck, GateInput, GateOptions, GateResult, PublicationGate};
pub use rules::{RulePattern, RuleTable};
pub use thresholds::{ContentTypeThresholds, GateThresholds, LengthBand};
