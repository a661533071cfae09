//! Review session: one conversation under review and its reviewer state.

use crate::analysis::{self, AnalysisResult};
use crate::annotations::{AnnotationStore, SeveritySummary};
use crate::error::ReviewError;
use crate::export::Exporter;
use crate::steps::StepStore;
use crate::view::{ViewController, ViewState};
use biasguard_config::BiasGuardConfig;
use biasguard_protocol::{ConversationStep, DarkPatternRecord, PatternId};
use chrono::{DateTime, Utc};
use log::{debug, info};
use uuid::Uuid;

/// Owns the step store, annotations and view state for one conversation.
///
/// Analysis is derived on demand and never cached.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    config: BiasGuardConfig,
    steps: StepStore,
    annotations: AnnotationStore,
    view: ViewController,
}

impl ReviewSession {
    /// Start a session over an ingested step sequence.
    pub fn new(steps: Vec<ConversationStep>, config: BiasGuardConfig) -> Result<Self, ReviewError> {
        let steps = StepStore::new(steps)?;
        let session = Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            annotations: AnnotationStore::new(config.catalog),
            config,
            steps,
            view: ViewController::new(),
        };
        info!(
            "created review session (session_id={}, steps={}, turns={})",
            session.id,
            session.steps.len(),
            session.steps.total_turns()
        );
        Ok(session)
    }

    /// Rebuild a session from an export document that carries steps.
    pub fn from_export(json: &str, config: BiasGuardConfig) -> Result<Self, ReviewError> {
        let document = Exporter::parse_document(json)?;
        let Some(steps) = document.steps else {
            return Err(ReviewError::MalformedSequence(
                "export document carries no steps".to_string(),
            ));
        };
        let mut session = Self::new(steps, config)?;
        session.annotations.extend(document.patterns, &session.steps)?;
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn config(&self) -> &BiasGuardConfig {
        &self.config
    }

    pub fn steps(&self) -> &StepStore {
        &self.steps
    }

    pub fn annotations(&self) -> &AnnotationStore {
        &self.annotations
    }

    /// Append a step delivered by ingestion.
    pub fn append_step(&mut self, step: ConversationStep) -> Result<(), ReviewError> {
        self.steps.append(step)
    }

    /// Analyze the whole conversation, regardless of the current view.
    pub fn analyze(&self) -> Result<AnalysisResult, ReviewError> {
        analysis::analyze(&self.steps, &self.config)
    }

    pub fn add_pattern(&mut self, record: DarkPatternRecord) -> Result<PatternId, ReviewError> {
        self.annotations.add(record, &self.steps)
    }

    pub fn update_note(&mut self, id: PatternId, note: impl Into<String>) -> Result<(), ReviewError> {
        self.annotations.update_note(id, note)
    }

    pub fn remove_pattern(&mut self, id: PatternId) -> Result<DarkPatternRecord, ReviewError> {
        self.annotations.remove(id)
    }

    pub fn select_pattern(&mut self, id: PatternId) -> Result<(), ReviewError> {
        self.annotations.select(id)
    }

    pub fn severity_summary(&self) -> SeveritySummary {
        self.annotations.summary_by_severity()
    }

    pub fn view(&self) -> ViewState {
        self.view.state()
    }

    pub fn select_all(&mut self) {
        self.view.select_all();
    }

    pub fn select_turn(&mut self, turn: usize) -> Result<(), ReviewError> {
        self.view.select_turn(turn, self.steps.total_turns())?;
        debug!("focused turn (session_id={}, turn={})", self.id, turn);
        Ok(())
    }

    pub fn visible_steps(&self) -> Vec<&ConversationStep> {
        self.view.visible_steps(&self.steps)
    }

    /// JSON export; steps are embedded when `export.include_steps` is set.
    pub fn export_json(&self) -> Result<String, ReviewError> {
        self.exporter().to_json(&self.annotations, Some(&self.steps))
    }

    pub fn export_csv(&self) -> Result<String, ReviewError> {
        self.exporter().to_csv(&self.annotations)
    }

    /// Merge records from a JSON export, validating them against this
    /// conversation. Nothing is imported if any record is rejected.
    pub fn import_annotations(&mut self, json: &str) -> Result<usize, ReviewError> {
        let document = Exporter::parse_document(json)?;
        let added = self.annotations.extend(document.patterns, &self.steps)?;
        info!(
            "imported annotations (session_id={}, patterns={})",
            self.id, added
        );
        Ok(added)
    }

    fn exporter(&self) -> Exporter {
        Exporter::new(self.config.export)
    }
}

#[cfg(test)]
mod tests {
    use super::ReviewSession;
    use crate::error::ReviewError;
    use biasguard_config::BiasGuardConfig;
    use biasguard_test_utils::headache_conversation;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_conversations_are_rejected() {
        let err = ReviewSession::new(Vec::new(), BiasGuardConfig::default()).unwrap_err();
        assert!(matches!(err, ReviewError::MalformedSequence(_)));
    }

    #[test]
    fn export_without_steps_cannot_seed_a_session() {
        let session =
            ReviewSession::new(headache_conversation(), BiasGuardConfig::default()).expect("session");
        let json = session.export_json().expect("json");
        let err = ReviewSession::from_export(&json, BiasGuardConfig::default()).unwrap_err();
        assert!(format!("{err}").contains("no steps"));
    }

    #[test]
    fn invalid_turn_keeps_previous_view() {
        let mut session =
            ReviewSession::new(headache_conversation(), BiasGuardConfig::default()).expect("session");
        session.select_turn(1).expect("turn 1");
        assert!(session.select_turn(7).is_err());
        assert_eq!(session.visible_steps().len(), 2);
    }
}
