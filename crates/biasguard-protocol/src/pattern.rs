//! Dark pattern annotation records.

use crate::{PatternId, StepId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity assigned to a dark pattern record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// All severities, lowest first.
    pub const ALL: [Severity; 3] = [Severity::Low, Severity::Medium, Severity::High];

    /// Return the severity as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    /// Parse a severity name, ignoring case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalogued category of manipulative or boundary-violating behavior.
///
/// Serialized as its display label; labels outside the catalog round-trip as
/// `Custom`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum PatternType {
    PromptChaining,
    RoutingOpacity,
    MemoryLeakage,
    RagSourceFalsification,
    MultiAgentConfusion,
    ReflectionFalsification,
    HumanInLoopFacade,
    MissingClarification,
    CapabilityBoundaryViolation,
    /// Reviewer-supplied label.
    Custom(String),
}

impl PatternType {
    /// Built-in catalog in display order.
    pub fn catalog() -> Vec<PatternType> {
        vec![
            PatternType::PromptChaining,
            PatternType::RoutingOpacity,
            PatternType::MemoryLeakage,
            PatternType::RagSourceFalsification,
            PatternType::MultiAgentConfusion,
            PatternType::ReflectionFalsification,
            PatternType::HumanInLoopFacade,
            PatternType::MissingClarification,
            PatternType::CapabilityBoundaryViolation,
        ]
    }

    /// Human-readable label.
    pub fn label(&self) -> &str {
        match self {
            PatternType::PromptChaining => "Prompt Chaining",
            PatternType::RoutingOpacity => "Routing Opacity",
            PatternType::MemoryLeakage => "Memory Leakage",
            PatternType::RagSourceFalsification => "RAG Source Falsification",
            PatternType::MultiAgentConfusion => "Multi-Agent Confusion",
            PatternType::ReflectionFalsification => "Reflection Falsification",
            PatternType::HumanInLoopFacade => "Human-in-Loop Facade",
            PatternType::MissingClarification => "Missing Clarification",
            PatternType::CapabilityBoundaryViolation => "Capability Boundary Violation",
            PatternType::Custom(label) => label.as_str(),
        }
    }

    /// Resolve a label to a catalog entry, falling back to `Custom`.
    pub fn parse(label: &str) -> Self {
        let trimmed = label.trim();
        Self::catalog()
            .into_iter()
            .find(|known| known.label().eq_ignore_ascii_case(trimmed))
            .unwrap_or_else(|| PatternType::Custom(trimmed.to_string()))
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, PatternType::Custom(_))
    }
}

impl From<String> for PatternType {
    fn from(value: String) -> Self {
        PatternType::parse(&value)
    }
}

impl From<PatternType> for String {
    fn from(value: PatternType) -> Self {
        match value {
            PatternType::Custom(label) => label,
            other => other.label().to_string(),
        }
    }
}

impl std::fmt::Display for PatternType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Where in the step sequence a record is anchored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum StepLocation {
    /// A single step.
    Step { step_id: StepId },
    /// An ordered pair of steps, `from` before `to`.
    Span { from: StepId, to: StepId },
}

impl StepLocation {
    pub fn step(step_id: impl Into<StepId>) -> Self {
        StepLocation::Step {
            step_id: step_id.into(),
        }
    }

    pub fn span(from: impl Into<StepId>, to: impl Into<StepId>) -> Self {
        StepLocation::Span {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Step ids referenced by this location, in order.
    pub fn step_ids(&self) -> Vec<&str> {
        match self {
            StepLocation::Step { step_id } => vec![step_id.as_str()],
            StepLocation::Span { from, to } => vec![from.as_str(), to.as_str()],
        }
    }

    /// True when the location references the given step id.
    pub fn touches(&self, step_id: &str) -> bool {
        self.step_ids().contains(&step_id)
    }

    /// Flat id form used by tabular exports.
    pub fn to_id_string(&self) -> String {
        match self {
            StepLocation::Step { step_id } => step_id.clone(),
            StepLocation::Span { from, to } => format!("{from}->{to}"),
        }
    }
}

/// One reviewer or detector annotation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DarkPatternRecord {
    /// Record identifier.
    pub id: PatternId,
    /// Catalog entry or custom label.
    pub pattern_type: PatternType,
    pub severity: Severity,
    pub description: String,
    /// Anchor in the step sequence.
    pub location: StepLocation,
    /// Reviewer notes; the only field mutated after creation.
    #[serde(default)]
    pub note: String,
}

impl DarkPatternRecord {
    /// Create a record with a fresh id and an empty note.
    pub fn new(
        pattern_type: PatternType,
        severity: Severity,
        description: impl Into<String>,
        location: StepLocation,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            pattern_type,
            severity,
            description: description.into(),
            location,
            note: String::new(),
        }
    }
}
