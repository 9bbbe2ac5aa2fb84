//! Reusable pattern catalog with relevance lookup and usage bookkeeping.
//!
//! A `Pattern` is a ranked, reusable solution fragment. The catalog owns all
//! patterns; callers mutate them only through `record_usage` (usage count)
//! and `apply_outcome` (success-rate feedback). The catalog is read-mostly
//! during a decision cycle, so the whole map sits behind one mutex and every
//! write funnels through it. That keeps `record_usage` atomic when multiple
//! decisions run concurrently against the same catalog instance.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::scenario::Scenario;

/// Fixed relevance vocabulary. A pattern is relevant to a scenario iff at
/// least one of these keywords appears (case-insensitive substring) in both
/// the scenario blob and the pattern blob.
pub const RELEVANCE_VOCABULARY: [&str; 6] = [
    "api",
    "service",
    "integration",
    "singleton",
    "architecture",
    "database",
];

/// A reusable solution fragment with success and usage statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pattern {
    pub id: String,
    pub name: String,
    /// Where the pattern was originally observed.
    pub source_context: String,
    pub pattern_type: String,
    /// Historical success rate in percent, 0..=100.
    pub success_rate: f64,
    pub usage_count: u64,
    /// Confidence in the pattern itself, 0..=1.
    pub confidence: f64,
    /// Structured payload; opaque to the catalog apart from relevance
    /// matching against its serialized form.
    pub data: serde_json::Value,
    /// RFC 3339 timestamp of the last recorded usage.
    #[serde(default)]
    pub last_used: Option<String>,
}

impl Pattern {
    /// The pattern-side text blob used for relevance matching:
    /// `name + pattern_type + serialized data`, lowercased.
    pub fn relevance_blob(&self) -> String {
        let data = self.data.to_string();
        let mut blob =
            String::with_capacity(self.name.len() + self.pattern_type.len() + data.len() + 2);
        blob.push_str(&self.name);
        blob.push(' ');
        blob.push_str(&self.pattern_type);
        blob.push(' ');
        blob.push_str(&data);
        blob.to_lowercase()
    }
}

/// Keyed store of reusable patterns.
///
/// `relevant` makes no ordering guarantee; callers that need ranking use
/// `ranked_relevant`, which sorts by success rate descending.
#[derive(Debug, Default)]
pub struct PatternCatalog {
    patterns: Mutex<BTreeMap<String, Pattern>>,
}

impl PatternCatalog {
    pub fn new() -> Self {
        PatternCatalog {
            patterns: Mutex::new(BTreeMap::new()),
        }
    }

    /// Seed a catalog from a pattern feed.
    pub fn from_patterns(patterns: impl IntoIterator<Item = Pattern>) -> Self {
        let catalog = PatternCatalog::new();
        for p in patterns {
            catalog.add(p);
        }
        catalog
    }

    /// Insert or overwrite a pattern by id. This is also the seam a pattern
    /// feed collaborator uses to populate the catalog.
    pub fn add(&self, pattern: Pattern) {
        let mut map = self.patterns.lock().expect("pattern catalog poisoned");
        map.insert(pattern.id.clone(), pattern);
    }

    pub fn len(&self) -> usize {
        self.patterns.lock().expect("pattern catalog poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &str) -> Option<Pattern> {
        self.patterns
            .lock()
            .expect("pattern catalog poisoned")
            .get(id)
            .cloned()
    }

    /// Patterns relevant to the scenario under the fixed vocabulary rule.
    /// Returned in catalog (id) order; no relevance ranking is implied.
    pub fn relevant(&self, scenario: &Scenario) -> Vec<Pattern> {
        let scenario_blob = scenario.relevance_blob();
        let map = self.patterns.lock().expect("pattern catalog poisoned");
        map.values()
            .filter(|p| {
                let pattern_blob = p.relevance_blob();
                RELEVANCE_VOCABULARY
                    .iter()
                    .any(|kw| scenario_blob.contains(kw) && pattern_blob.contains(kw))
            })
            .cloned()
            .collect()
    }

    /// Relevant patterns sorted by success rate descending.
    pub fn ranked_relevant(&self, scenario: &Scenario) -> Vec<Pattern> {
        let mut hits = self.relevant(scenario);
        hits.sort_by(|a, b| {
            b.success_rate
                .partial_cmp(&a.success_rate)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits
    }

    /// Increment a pattern's usage count and stamp `last_used`.
    ///
    /// Unknown ids are a no-op returning `false`: instrumentation calls
    /// favor availability over strictness, so the caller may surface a
    /// warning but must not treat this as fatal.
    pub fn record_usage(&self, id: &str, now: &str) -> bool {
        let mut map = self.patterns.lock().expect("pattern catalog poisoned");
        match map.get_mut(id) {
            Some(p) => {
                p.usage_count += 1;
                p.last_used = Some(now.to_string());
                true
            }
            None => false,
        }
    }

    /// Outcome-feedback mutation point.
    ///
    /// Nudges the success rate toward the observed outcome using a running
    /// average over recorded usages. Outcome collection itself lives outside
    /// the engine core; this is the documented hook it calls into.
    pub fn apply_outcome(&self, id: &str, success: bool) -> bool {
        let mut map = self.patterns.lock().expect("pattern catalog poisoned");
        match map.get_mut(id) {
            Some(p) => {
                let observed = if success { 100.0 } else { 0.0 };
                let n = p.usage_count.max(1) as f64;
                p.success_rate = ((p.success_rate * n) + observed) / (n + 1.0);
                p.success_rate = p.success_rate.clamp(0.0, 100.0);
                true
            }
            None => false,
        }
    }

    /// A point-in-time copy of every pattern, in id order.
    pub fn snapshot(&self) -> Vec<Pattern> {
        self.patterns
            .lock()
            .expect("pattern catalog poisoned")
            .values()
            .cloned()
            .collect()
    }
}
