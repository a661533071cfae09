//! Data model shared by the BiasGuard review engine, its config and its
//! export payloads.
//!
//! Conversation steps arrive from the ingestion layer already indexed; dark
//! pattern records are produced by reviewers (or an automated detector
//! feeding the same shape) and leave through the export document.

mod export;
mod pattern;

pub use export::{
    ANNOTATION_EXPORT_FORMAT, ANNOTATION_EXPORT_VERSION, AnnotationExport, ExportMetadata,
};
pub use pattern::{DarkPatternRecord, PatternType, Severity, StepLocation};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a conversation step, assigned by ingestion.
pub type StepId = String;
/// Unique identifier for a dark pattern record.
pub type PatternId = Uuid;

/// Speaker role for a conversation step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Human-authored step.
    User,
    /// AI-authored step.
    Assistant,
}

impl Role {
    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One utterance in the audited conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationStep {
    /// Stable step identifier.
    pub id: StepId,
    /// 1-based position in the full sequence.
    pub step_index: usize,
    /// 1-based turn this step belongs to.
    pub turn_index: usize,
    /// Speaker of the step.
    pub role: Role,
    /// Short heading shown above the step.
    #[serde(default)]
    pub title: String,
    /// Utterance content.
    pub text: String,
    /// Why the step occurred; empty for plain transcripts.
    #[serde(default)]
    pub rationale: String,
    /// Certainty percentage in `[0, 100]`.
    pub confidence: f64,
    /// Wall-clock time of the step.
    pub timestamp: DateTime<Utc>,
    /// Prior context items the assistant claims to use. Ignored on user
    /// steps; `Some(vec![])` means the assistant consulted nothing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_references: Option<Vec<String>>,
    /// Share of relevant prior context that informed an assistant step.
    /// Ingestion may score user steps too; metrics ignore those.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attention_score: Option<f64>,
}

impl ConversationStep {
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }

    /// True for assistant steps that reference no prior context.
    pub fn has_memory_gap(&self) -> bool {
        self.is_assistant()
            && self
                .memory_references
                .as_ref()
                .is_none_or(|refs| refs.is_empty())
    }
}

/// Discrete degradation risk for a whole conversation.
///
/// `Low` is reserved for future policies; the baseline classifier never
/// produces it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display tier for any percentage shown to the reviewer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ScoreTier {
    Danger,
    Warning,
    Success,
}

impl ScoreTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreTier::Danger => "danger",
            ScoreTier::Warning => "warning",
            ScoreTier::Success => "success",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConversationStep, Role};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn assistant(memory_references: Option<Vec<String>>) -> ConversationStep {
        ConversationStep {
            id: "a1".to_string(),
            step_index: 2,
            turn_index: 1,
            role: Role::Assistant,
            title: String::new(),
            text: "reply".to_string(),
            rationale: String::new(),
            confidence: 90.0,
            timestamp: Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap(),
            memory_references,
            attention_score: Some(80.0),
        }
    }

    #[test]
    fn memory_gap_covers_empty_and_absent_references() {
        assert!(assistant(None).has_memory_gap());
        assert!(assistant(Some(Vec::new())).has_memory_gap());
        assert!(!assistant(Some(vec!["headache".to_string()])).has_memory_gap());
    }

    #[test]
    fn user_steps_never_count_as_memory_gaps() {
        let mut step = assistant(None);
        step.role = Role::User;
        step.attention_score = None;
        assert!(!step.has_memory_gap());
    }

    #[test]
    fn empty_references_survive_serialization() {
        let step = assistant(Some(Vec::new()));
        let value = serde_json::to_value(&step).expect("serialize");
        assert_eq!(value["memory_references"], json!([]));
        assert_eq!(value["role"], json!("assistant"));

        let user = ConversationStep {
            role: Role::User,
            memory_references: None,
            attention_score: None,
            ..step
        };
        let value = serde_json::to_value(&user).expect("serialize");
        assert!(value.get("memory_references").is_none());
    }
}
