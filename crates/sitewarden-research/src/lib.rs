//! Weekly industry research.
//!
//! Fetches trusted external sources, extracts and scores article findings,
//! and proposes update directives for the other background agents. Safe
//! configuration-level updates are auto-applied as directive records; the
//! rest wait for a human.
//!
//! # Main types
//!
//! - [`ResearchAgent`] — Fetch, score, classify, persist, derive directives.
//! - [`ResearchFinding`] / [`AgentUpdate`] — Run output.
//! - [`FindingCategory`] — The fixed 11-slot taxonomy.

/// The research agent itself.
pub mod agent;
/// Relevance scoring, categorization, insight extraction.
pub mod classify;
/// Feed and heading extraction.
pub mod extract;
/// The trusted source registry.
pub mod sources;

pub use agent::{AgentUpdate, ResearchAgent, ResearchFinding, ResearchRun, DEFAULT_CADENCE};
pub use classify::{FindingCategory, UpdateKind, UpdatePriority};
pub use extract::ArticleEntry;
pub use sources::{default_sources, ResearchSource};
