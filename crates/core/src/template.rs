//! Strategy template registry.
//!
//! The registry is the single source of truth for per-kind strategy content:
//! steps, reasoning, advantages, limitations and the optional per-mode
//! confidence override, plus the risk classification the assessor keys off.
//! An unregistered scenario kind is a hard generation failure -- the engine
//! never falls back to an empty template.
//!
//! Templates ship as code (`TemplateRegistry::builtin`) and can be replaced
//! wholesale from an external JSON document (`from_json`). Whichever
//! registry instance the caller passes in is the authority.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::scenario::ScenarioKind;
use crate::strategy::Mode;

/// Errors raised while loading a template registry from JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// The document did not deserialize into a registry.
    Parse { message: String },
    /// A template entry carried an out-of-range confidence override.
    InvalidConfidence { kind: String, value: String },
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::Parse { message } => {
                write!(f, "template registry parse error: {}", message)
            }
            TemplateError::InvalidConfidence { kind, value } => {
                write!(
                    f,
                    "template for kind '{}' has confidence override {} outside [0,1]",
                    kind, value
                )
            }
        }
    }
}

impl std::error::Error for TemplateError {}

/// Risk classification for a scenario kind. Consumed by the risk assessor;
/// the registry owns it so kind classification has exactly one home.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskClass {
    /// Kinds that create or restructure repositories score an extra risk term.
    #[serde(default)]
    pub repository_class: bool,
    /// High-sensitivity kinds force the approval gate regardless of score.
    #[serde(default)]
    pub high_sensitivity: bool,
}

/// Per-mode narrative content for one scenario kind. All of this is data,
/// not generated prose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeTemplate {
    pub steps: Vec<String>,
    pub reasoning: Vec<String>,
    pub advantages: Vec<String>,
    pub limitations: Vec<String>,
    pub summary: String,
    /// Overrides the mode's confidence baseline for this kind when set.
    #[serde(default)]
    pub confidence_override: Option<f64>,
}

/// Everything the registry knows about one scenario kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KindTemplate {
    #[serde(default)]
    pub risk: RiskClass,
    pub connected: ModeTemplate,
    pub local: ModeTemplate,
}

impl KindTemplate {
    pub fn for_mode(&self, mode: Mode) -> &ModeTemplate {
        match mode {
            Mode::Connected => &self.connected,
            Mode::Local => &self.local,
        }
    }
}

/// Tagged lookup table from scenario kind to template content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateRegistry {
    templates: BTreeMap<ScenarioKind, KindTemplate>,
}

impl TemplateRegistry {
    pub fn empty() -> Self {
        TemplateRegistry::default()
    }

    /// Register (or replace) the template for a kind.
    pub fn register(&mut self, kind: ScenarioKind, template: KindTemplate) {
        self.templates.insert(kind, template);
    }

    /// Resolve the template for a kind. `None` means the kind is unknown,
    /// which callers must treat as a hard generation failure.
    pub fn resolve(&self, kind: &ScenarioKind) -> Option<&KindTemplate> {
        self.templates.get(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &ScenarioKind> {
        self.templates.keys()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Load a registry from an external JSON document: an object mapping
    /// kind tags to template entries. Confidence overrides are range-checked
    /// here so a bad config fails at load time, not mid-cycle.
    pub fn from_json(doc: &serde_json::Value) -> Result<Self, TemplateError> {
        let registry: TemplateRegistry =
            serde_json::from_value(doc.clone()).map_err(|e| TemplateError::Parse {
                message: e.to_string(),
            })?;
        for (kind, template) in &registry.templates {
            for mode_template in [&template.connected, &template.local] {
                if let Some(c) = mode_template.confidence_override {
                    if !(0.0..=1.0).contains(&c) {
                        return Err(TemplateError::InvalidConfidence {
                            kind: kind.to_string(),
                            value: c.to_string(),
                        });
                    }
                }
            }
        }
        Ok(registry)
    }

    /// The shipped registry: the scenario kinds the engine understands out
    /// of the box.
    pub fn builtin() -> Self {
        let mut registry = TemplateRegistry::empty();
        registry.register(
            ScenarioKind::from("repository-creation"),
            repository_creation(),
        );
        registry.register(ScenarioKind::from("api-integration"), api_integration());
        registry.register(
            ScenarioKind::from("service-deployment"),
            service_deployment(),
        );
        registry.register(
            ScenarioKind::from("database-migration"),
            database_migration(),
        );
        registry
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn repository_creation() -> KindTemplate {
    KindTemplate {
        risk: RiskClass {
            repository_class: true,
            high_sensitivity: false,
        },
        connected: ModeTemplate {
            steps: strings(&[
                "Authenticate against the hosting provider",
                "Create the repository with organization defaults",
                "Push the scaffold and enable branch protection",
                "Wire continuous integration and verify the first run",
            ]),
            reasoning: strings(&[
                "Live provider access lets every setting be verified immediately",
                "Branch protection and CI are confirmed working before handoff",
            ]),
            advantages: strings(&[
                "Immediate feedback from the provider API",
                "No drift between intended and actual repository settings",
            ]),
            limitations: strings(&[
                "Requires provider credentials with admin scope",
                "Mistakes are visible to the whole organization instantly",
            ]),
            summary: "Create and verify the repository directly against the provider"
                .to_string(),
            confidence_override: None,
        },
        local: ModeTemplate {
            steps: strings(&[
                "Initialize the repository locally from the scaffold",
                "Commit the baseline layout and CI definitions",
                "Record the intended provider settings as config files",
                "Hand off a push-ready bundle for later publication",
            ]),
            reasoning: strings(&[
                "Everything is rehearsed offline, so nothing irreversible happens",
                "Provider settings are captured as reviewable config",
            ]),
            advantages: strings(&[
                "Zero provider credentials needed during preparation",
                "The whole setup is reviewable before anything goes live",
            ]),
            limitations: strings(&[
                "Provider-side settings cannot be verified until publication",
                "A second, connected pass is still required",
            ]),
            summary: "Prepare a push-ready repository offline for later publication"
                .to_string(),
            confidence_override: None,
        },
    }
}

fn api_integration() -> KindTemplate {
    KindTemplate {
        risk: RiskClass::default(),
        connected: ModeTemplate {
            steps: strings(&[
                "Probe the live API with read-only calls",
                "Implement the client against observed responses",
                "Run the contract tests against the sandbox tenant",
                "Promote the integration behind a feature flag",
            ]),
            reasoning: strings(&[
                "Real responses beat documentation for edge cases",
                "Sandbox contract tests catch drift before promotion",
            ]),
            advantages: strings(&[
                "Client shaped by actual API behavior",
                "Feature flag keeps rollout reversible",
            ]),
            limitations: strings(&[
                "Depends on sandbox availability and rate limits",
                "Needs API credentials from the start",
            ]),
            summary: "Build the integration against the live API sandbox".to_string(),
            confidence_override: None,
        },
        local: ModeTemplate {
            steps: strings(&[
                "Model the API from its published schema",
                "Implement the client against recorded fixtures",
                "Cover failure modes with fixture-driven tests",
                "Schedule a connected validation pass",
            ]),
            reasoning: strings(&[
                "Fixtures make failure modes cheap to reproduce",
                "Schema-first keeps the client honest about contracts",
            ]),
            advantages: strings(&[
                "Fully testable without external availability",
                "Deterministic test suite from day one",
            ]),
            limitations: strings(&[
                "Fixtures can lag behind the real API",
                "Undocumented behavior stays invisible until validation",
            ]),
            summary: "Build the integration from schema and fixtures, validate later"
                .to_string(),
            confidence_override: None,
        },
    }
}

fn service_deployment() -> KindTemplate {
    KindTemplate {
        risk: RiskClass {
            repository_class: false,
            high_sensitivity: true,
        },
        connected: ModeTemplate {
            steps: strings(&[
                "Verify environment health and current version",
                "Deploy to the preview environment",
                "Run smoke checks against preview",
                "Promote to production with staged rollout",
            ]),
            reasoning: strings(&[
                "Preview promotion mirrors the production path exactly",
                "Staged rollout bounds the blast radius",
            ]),
            advantages: strings(&[
                "Direct observation of the deployed artifact",
                "Rollback path exercised as part of the plan",
            ]),
            limitations: strings(&[
                "Touches shared environments",
                "Requires deploy credentials and a maintenance window",
            ]),
            summary: "Deploy through preview with a staged production rollout".to_string(),
            confidence_override: None,
        },
        local: ModeTemplate {
            steps: strings(&[
                "Build and package the service artifact",
                "Run the full suite in a production-like container",
                "Generate the deployment manifest and rollback notes",
                "Queue the release for a connected operator",
            ]),
            reasoning: strings(&[
                "Everything short of the deploy itself is rehearsed",
                "A connected operator executes from a prepared manifest",
            ]),
            advantages: strings(&[
                "No shared environment is touched during preparation",
                "Release content is fully reviewable",
            ]),
            limitations: strings(&[
                "The actual deploy still needs connected access",
                "Environment drift can invalidate the rehearsal",
            ]),
            summary: "Rehearse the release offline and queue it for execution".to_string(),
            confidence_override: None,
        },
    }
}

fn database_migration() -> KindTemplate {
    KindTemplate {
        risk: RiskClass {
            repository_class: false,
            high_sensitivity: true,
        },
        connected: ModeTemplate {
            steps: strings(&[
                "Snapshot the live schema and take a backup",
                "Apply the migration inside a transaction on a replica",
                "Diff replica results against expectations",
                "Apply to primary during the agreed window",
            ]),
            reasoning: strings(&[
                "Replica dry-run surfaces data-shape surprises safely",
                "Backup-first makes the worst case a restore, not a loss",
            ]),
            advantages: strings(&[
                "Validated against real data volume and shape",
                "Tight feedback on lock times and duration",
            ]),
            limitations: strings(&[
                "Needs privileged database credentials",
                "Window coordination with live traffic",
            ]),
            summary: "Rehearse on a replica, then migrate the primary in a window"
                .to_string(),
            confidence_override: Some(0.88),
        },
        local: ModeTemplate {
            steps: strings(&[
                "Reconstruct the schema from committed migrations",
                "Apply the new migration to a seeded local database",
                "Assert invariants over the migrated seed data",
                "Produce forward and rollback scripts for review",
            ]),
            reasoning: strings(&[
                "Seeded local runs catch structural errors early",
                "Paired rollback scripts keep the change reversible",
            ]),
            advantages: strings(&[
                "No production data is at risk during development",
                "Scripts are reviewable artifacts",
            ]),
            limitations: strings(&[
                "Seed data rarely matches production scale",
                "Lock behavior under load stays unknown",
            ]),
            summary: "Develop and verify the migration against a seeded local database"
                .to_string(),
            confidence_override: None,
        },
    }
}
