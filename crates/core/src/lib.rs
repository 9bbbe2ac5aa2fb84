//! Accord domain types -- scenarios, reusable patterns, strategy templates.
//!
//! This crate holds the pure data model of the decision synthesis engine:
//! the `Scenario` input descriptor, the `PatternCatalog` with its keyword
//! relevance lookup, the `TemplateRegistry` that is the single authority for
//! per-kind strategy narratives, and the `Strategy` value type produced once
//! per mode per decision cycle. No I/O, no clocks, no randomness.

pub mod pattern;
pub mod scenario;
pub mod strategy;
pub mod template;

pub use pattern::{Pattern, PatternCatalog};
pub use scenario::{Scenario, ScenarioKind};
pub use strategy::{Mode, Strategy};
pub use template::{KindTemplate, ModeTemplate, RiskClass, TemplateError, TemplateRegistry};
