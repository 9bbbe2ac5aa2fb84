//! Mode-specific candidate strategies.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Execution mode a strategy is generated for.
///
/// Connected mode assumes live environment access; local mode assumes
/// offline or sandboxed access. A mode expresses differing certainty, which
/// is why each carries its own confidence baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Connected,
    Local,
}

impl Mode {
    /// Default confidence for strategies generated in this mode. A template
    /// may override it per scenario kind.
    pub fn baseline(self) -> f64 {
        match self {
            Mode::Connected => 0.92,
            Mode::Local => 0.78,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Connected => "connected",
            Mode::Local => "local",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One mode-specific candidate plan. Produced once per mode per decision
/// cycle and never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Strategy {
    pub mode: Mode,
    /// Confidence in this candidate, 0..=1.
    pub confidence: f64,
    /// Ordered execution steps.
    pub steps: Vec<String>,
    pub reasoning: Vec<String>,
    pub advantages: Vec<String>,
    pub limitations: Vec<String>,
    /// Ids of catalog patterns this strategy draws on.
    pub patterns_applied: BTreeSet<String>,
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baselines_match_observed_modes() {
        assert_eq!(Mode::Connected.baseline(), 0.92);
        assert_eq!(Mode::Local.baseline(), 0.78);
    }

    #[test]
    fn mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Mode::Connected).unwrap(), "\"connected\"");
        assert_eq!(serde_json::to_string(&Mode::Local).unwrap(), "\"local\"");
    }
}
