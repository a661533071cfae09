//! Step Store: the validated, append-only step sequence of one conversation.

use crate::error::ReviewError;
use crate::turns::{self, TurnGrouping};
use biasguard_protocol::{ConversationStep, Role};
use log::debug;
use std::collections::HashSet;

/// Ordered conversation steps that satisfy the sequence invariants.
#[derive(Debug, Clone, PartialEq)]
pub struct StepStore {
    steps: Vec<ConversationStep>,
}

impl StepStore {
    /// Validate and take ownership of an ingested step sequence.
    ///
    /// An empty sequence is rejected rather than replaced with sample data.
    pub fn new(steps: Vec<ConversationStep>) -> Result<Self, ReviewError> {
        if steps.is_empty() {
            return Err(ReviewError::MalformedSequence(
                "conversation has no steps".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for (position, step) in steps.iter().enumerate() {
            check_step_fields(step)?;
            if step.step_index != position + 1 {
                return Err(ReviewError::MalformedSequence(format!(
                    "step {} has step_index {}, expected {}",
                    step.id,
                    step.step_index,
                    position + 1
                )));
            }
            if !seen.insert(step.id.as_str()) {
                return Err(ReviewError::MalformedSequence(format!(
                    "duplicate step id {}",
                    step.id
                )));
            }
        }
        for pair in steps.windows(2) {
            check_timestamps(&pair[0], &pair[1])?;
        }
        turns::group(&steps)?;
        debug!("validated step sequence (steps={})", steps.len());
        Ok(Self { steps })
    }

    /// Append the next step delivered by ingestion.
    ///
    /// The step must continue the current turn with an assistant step or open
    /// the next turn with a user step. The store is unchanged on error.
    pub fn append(&mut self, step: ConversationStep) -> Result<(), ReviewError> {
        check_step_fields(&step)?;
        let Some(last) = self.steps.last() else {
            return Err(ReviewError::MalformedSequence(
                "cannot append to an empty store".to_string(),
            ));
        };
        let expected_index = self.steps.len() + 1;
        if step.step_index != expected_index {
            return Err(ReviewError::MalformedSequence(format!(
                "step {} has step_index {}, expected {}",
                step.id, step.step_index, expected_index
            )));
        }
        if self.get(&step.id).is_some() {
            return Err(ReviewError::MalformedSequence(format!(
                "duplicate step id {}",
                step.id
            )));
        }
        check_timestamps(last, &step)?;
        if step.turn_index == last.turn_index {
            if step.role != Role::Assistant {
                return Err(ReviewError::MalformedSequence(format!(
                    "turn {} already has a leading user step",
                    step.turn_index
                )));
            }
        } else if step.turn_index == last.turn_index + 1 {
            if step.role != Role::User {
                return Err(ReviewError::MalformedSequence(format!(
                    "turn {} must start with a user step",
                    step.turn_index
                )));
            }
        } else {
            return Err(ReviewError::MalformedSequence(format!(
                "step {} jumps from turn {} to turn {}",
                step.id, last.turn_index, step.turn_index
            )));
        }
        debug!(
            "appending step (id={}, step_index={}, turn_index={}, role={})",
            step.id, step.step_index, step.turn_index, step.role
        );
        self.steps.push(step);
        Ok(())
    }

    /// All steps in sequence order.
    pub fn steps(&self) -> &[ConversationStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false for a constructed store.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Look up a step by id.
    pub fn get(&self, step_id: &str) -> Option<&ConversationStep> {
        self.steps.iter().find(|step| step.id == step_id)
    }

    /// Look up a step by its 1-based index.
    pub fn by_index(&self, step_index: usize) -> Option<&ConversationStep> {
        step_index
            .checked_sub(1)
            .and_then(|position| self.steps.get(position))
    }

    /// Assistant steps in sequence order.
    pub fn assistant_steps(&self) -> impl Iterator<Item = &ConversationStep> {
        self.steps.iter().filter(|step| step.is_assistant())
    }

    /// Group the steps into turns.
    pub fn turns(&self) -> Result<TurnGrouping<'_>, ReviewError> {
        turns::group(&self.steps)
    }

    /// Highest turn number in the conversation.
    pub fn total_turns(&self) -> usize {
        self.steps.last().map_or(0, |step| step.turn_index)
    }
}

/// Per-step checks that do not depend on neighbours.
fn check_step_fields(step: &ConversationStep) -> Result<(), ReviewError> {
    if step.id.trim().is_empty() {
        return Err(ReviewError::MalformedSequence(format!(
            "step {} has an empty id",
            step.step_index
        )));
    }
    check_percentage(step, "confidence", step.confidence)?;
    if let Some(score) = step.attention_score {
        check_percentage(step, "attention_score", score)?;
    }
    // Metrics read assistant steps only; these fields stay as ingested.
    if step.role == Role::User
        && (step.memory_references.is_some() || step.attention_score.is_some())
    {
        debug!("ignoring assistant-only fields on user step (id={})", step.id);
    }
    Ok(())
}

fn check_percentage(step: &ConversationStep, field: &str, value: f64) -> Result<(), ReviewError> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(ReviewError::MalformedSequence(format!(
            "step {} has {field} {value} outside 0..=100",
            step.id
        )))
    }
}

fn check_timestamps(prev: &ConversationStep, next: &ConversationStep) -> Result<(), ReviewError> {
    if next.timestamp < prev.timestamp {
        return Err(ReviewError::MalformedSequence(format!(
            "step {} is timestamped before step {}",
            next.id, prev.id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::StepStore;
    use crate::error::ReviewError;
    use biasguard_test_utils::{assistant_step, headache_conversation, user_step};
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn expect_malformed(result: Result<StepStore, ReviewError>) -> String {
        match result {
            Err(ReviewError::MalformedSequence(message)) => message,
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn accepts_the_reference_conversation() {
        let store = StepStore::new(headache_conversation()).expect("store");
        assert_eq!(store.len(), 6);
        assert_eq!(store.total_turns(), 3);
        assert_eq!(store.assistant_steps().count(), 3);
        assert_eq!(store.by_index(4).map(|step| step.id.as_str()), Some("4"));
        assert_eq!(store.by_index(0), None);
    }

    #[test]
    fn rejects_empty_sequences() {
        let message = expect_malformed(StepStore::new(Vec::new()));
        assert!(message.contains("no steps"));
    }

    #[test]
    fn rejects_gaps_in_step_index() {
        let mut steps = headache_conversation();
        steps.remove(2);
        expect_malformed(StepStore::new(steps));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut steps = headache_conversation();
        steps[3].id = "1".to_string();
        let message = expect_malformed(StepStore::new(steps));
        assert!(message.contains("duplicate"));
    }

    #[test]
    fn rejects_time_travel() {
        let mut steps = headache_conversation();
        steps[4].timestamp = steps[3].timestamp - Duration::seconds(1);
        let message = expect_malformed(StepStore::new(steps));
        assert!(message.contains("timestamped before"));
    }

    #[test]
    fn rejects_out_of_range_scores() {
        let mut steps = headache_conversation();
        steps[1].attention_score = Some(101.0);
        expect_malformed(StepStore::new(steps));

        let mut steps = headache_conversation();
        steps[0].confidence = -1.0;
        expect_malformed(StepStore::new(steps));
    }

    #[test]
    fn assistant_fields_on_user_steps_are_accepted() {
        let steps = headache_conversation();
        assert_eq!(steps[0].attention_score, Some(100.0));

        let mut steps = steps;
        steps[2].memory_references = Some(vec!["headache".to_string()]);
        let store = StepStore::new(steps).expect("store");
        assert!(store.steps().iter().all(|step| !step.is_user() || !step.has_memory_gap()));

        let mut store = store;
        let mut next = user_step("7", 7, 4);
        next.attention_score = Some(100.0);
        store.append(next).expect("append user step with score");
        assert_eq!(store.len(), 7);
    }

    #[test]
    fn out_of_range_user_scores_are_still_rejected() {
        let mut steps = headache_conversation();
        steps[0].attention_score = Some(140.0);
        expect_malformed(StepStore::new(steps));
    }

    #[test]
    fn append_extends_current_or_next_turn() {
        let mut store = StepStore::new(headache_conversation()).expect("store");
        store
            .append(assistant_step("7", 7, 3, 70.0, vec!["CT scan"]))
            .expect("same turn");
        store.append(user_step("8", 8, 4)).expect("next turn");
        assert_eq!(store.total_turns(), 4);
        assert_eq!(store.len(), 8);
    }

    #[test]
    fn append_rejects_invalid_steps_without_mutation() {
        let mut store = StepStore::new(headache_conversation()).expect("store");
        let before = store.clone();

        let err = store.append(user_step("7", 7, 3)).unwrap_err();
        assert!(matches!(err, ReviewError::MalformedSequence(_)));
        let err = store
            .append(assistant_step("7", 7, 4, 50.0, Vec::new()))
            .unwrap_err();
        assert!(matches!(err, ReviewError::MalformedSequence(_)));
        let err = store.append(user_step("7", 9, 4)).unwrap_err();
        assert!(matches!(err, ReviewError::MalformedSequence(_)));
        let err = store.append(user_step("7", 7, 5)).unwrap_err();
        assert!(matches!(err, ReviewError::MalformedSequence(_)));

        assert_eq!(store, before);
    }
}
