//! Self-describing annotation export document.

use crate::{ConversationStep, DarkPatternRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Format marker written into every export document.
pub const ANNOTATION_EXPORT_FORMAT: &str = "biasguard.annotations";
/// Current export document version.
pub const ANNOTATION_EXPORT_VERSION: u32 = 1;

/// Metadata kept apart from record data so the payload stays deterministic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ExportMetadata {
    /// Generation time, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

/// Exported annotation set, optionally carrying the step sequence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnnotationExport {
    pub format: String,
    pub version: u32,
    #[serde(default)]
    pub metadata: ExportMetadata,
    pub patterns: Vec<DarkPatternRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<ConversationStep>>,
}

impl AnnotationExport {
    /// Build a document at the current format version.
    pub fn new(
        patterns: Vec<DarkPatternRecord>,
        steps: Option<Vec<ConversationStep>>,
        generated_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            format: ANNOTATION_EXPORT_FORMAT.to_string(),
            version: ANNOTATION_EXPORT_VERSION,
            metadata: ExportMetadata { generated_at },
            patterns,
            steps,
        }
    }
}
