//! Degradation Metrics Calculator.
//!
//! All values are recomputed from the turn grouping on every call.

use crate::turns::{Turn, TurnGrouping};
use biasguard_config::DegradationConfig;
use biasguard_protocol::ConversationStep;
use serde::Serialize;

/// Attention change between two consecutive turns that both have assistant
/// steps.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct TurnDelta {
    pub from_turn: usize,
    pub to_turn: usize,
    /// Assistant attention in `from_turn`.
    pub from_attention: f64,
    /// Assistant attention in `to_turn`.
    pub to_attention: f64,
    /// `to_attention - from_attention`.
    pub delta: f64,
    /// Delta at or below the sharp drop threshold.
    pub sharp: bool,
}

/// Whole-conversation degradation signals.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DegradationMetrics {
    /// Mean assistant attention; 0 when there are no assistant steps.
    pub average_attention: f64,
    /// Assistant steps with no memory references.
    pub memory_gap_count: usize,
    /// Mean confidence over every step, unrounded.
    pub average_confidence: f64,
    /// Deltas for every consecutive turn pair with assistant steps.
    pub turn_deltas: Vec<TurnDelta>,
}

impl DegradationMetrics {
    /// Compute metrics over the entire conversation.
    pub fn compute(grouping: &TurnGrouping<'_>, config: &DegradationConfig) -> Self {
        let steps: Vec<&ConversationStep> = grouping
            .turns()
            .iter()
            .flat_map(|turn| turn.steps.iter().copied())
            .collect();
        let assistant: Vec<&ConversationStep> = steps
            .iter()
            .copied()
            .filter(|step| step.is_assistant())
            .collect();

        let average_attention = mean(assistant.iter().map(|step| attention_of(step)));
        let memory_gap_count = assistant.iter().filter(|step| step.has_memory_gap()).count();
        let average_confidence = mean(steps.iter().map(|step| step.confidence));
        let turn_deltas = turn_deltas(grouping.turns(), config.sharp_drop_delta);

        Self {
            average_attention,
            memory_gap_count,
            average_confidence,
            turn_deltas,
        }
    }

    /// Average attention rounded for display.
    pub fn average_attention_display(&self) -> u32 {
        round_percent(self.average_attention)
    }

    /// Average confidence rounded for display.
    pub fn average_confidence_display(&self) -> u32 {
        round_percent(self.average_confidence)
    }

    /// Deltas flagged as sharp drops.
    pub fn sharp_drops(&self) -> impl Iterator<Item = &TurnDelta> {
        self.turn_deltas.iter().filter(|delta| delta.sharp)
    }
}

/// Mean assistant attention for one turn, if it has assistant steps.
pub fn turn_attention(turn: &Turn<'_>) -> Option<f64> {
    if !turn.has_assistant_step() {
        return None;
    }
    Some(mean(turn.assistant_steps().map(attention_of)))
}

/// Round a percentage half away from zero.
pub fn round_percent(value: f64) -> u32 {
    value.round().clamp(0.0, 100.0) as u32
}

fn turn_deltas(turns: &[Turn<'_>], sharp_drop_delta: f64) -> Vec<TurnDelta> {
    turns
        .windows(2)
        .filter_map(|pair| {
            let from_attention = turn_attention(&pair[0])?;
            let to_attention = turn_attention(&pair[1])?;
            let delta = to_attention - from_attention;
            Some(TurnDelta {
                from_turn: pair[0].number,
                to_turn: pair[1].number,
                from_attention,
                to_attention,
                delta,
                sharp: delta <= sharp_drop_delta,
            })
        })
        .collect()
}

/// Missing attention on an assistant step counts as zero.
fn attention_of(step: &ConversationStep) -> f64 {
    step.attention_score.unwrap_or(0.0)
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

#[cfg(test)]
mod tests {
    use super::{DegradationMetrics, round_percent};
    use crate::turns::group;
    use biasguard_config::DegradationConfig;
    use biasguard_test_utils::{assistant_step, headache_conversation, user_step};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn compute(steps: &[biasguard_protocol::ConversationStep]) -> DegradationMetrics {
        let grouping = group(steps).expect("group");
        DegradationMetrics::compute(&grouping, &DegradationConfig::default())
    }

    #[test]
    fn reference_conversation_metrics() {
        let metrics = compute(&headache_conversation());
        assert!((metrics.average_attention - 190.0 / 3.0).abs() < 1e-9);
        assert_eq!(metrics.average_attention_display(), 63);
        assert_eq!(metrics.memory_gap_count, 1);
        assert_eq!(metrics.average_confidence, 92.5);
        assert_eq!(metrics.average_confidence_display(), 93);

        let deltas: Vec<(usize, usize, f64, bool)> = metrics
            .turn_deltas
            .iter()
            .map(|delta| (delta.from_turn, delta.to_turn, delta.delta, delta.sharp))
            .collect();
        assert_eq!(deltas, vec![(1, 2, -30.0, false), (2, 3, -35.0, false)]);
        assert_eq!(metrics.sharp_drops().count(), 0);
    }

    #[test]
    fn drop_of_exactly_forty_is_sharp() {
        let steps = vec![
            user_step("u1", 1, 1),
            assistant_step("a1", 2, 1, 90.0, vec!["x"]),
            user_step("u2", 3, 2),
            assistant_step("a2", 4, 2, 50.0, vec!["y"]),
            user_step("u3", 5, 3),
            assistant_step("a3", 6, 3, 15.0, vec!["z"]),
        ];
        let metrics = compute(&steps);
        let sharp: Vec<(usize, usize, f64)> = metrics
            .sharp_drops()
            .map(|delta| (delta.from_turn, delta.to_turn, delta.delta))
            .collect();
        assert_eq!(sharp, vec![(1, 2, -40.0)]);
        assert_eq!(metrics.turn_deltas[1].delta, -35.0);
        assert!(!metrics.turn_deltas[1].sharp);
    }

    #[test]
    fn no_assistant_steps_is_vacuous() {
        let steps = vec![user_step("u1", 1, 1), user_step("u2", 2, 2)];
        let metrics = compute(&steps);
        assert_eq!(metrics.average_attention, 0.0);
        assert_eq!(metrics.memory_gap_count, 0);
        assert!(metrics.turn_deltas.is_empty());
        assert_eq!(metrics.average_confidence, 100.0);
    }

    #[test]
    fn turns_without_assistant_break_the_pair_chain() {
        let steps = vec![
            user_step("u1", 1, 1),
            assistant_step("a1", 2, 1, 90.0, vec!["x"]),
            user_step("u2", 3, 2),
            user_step("u3", 4, 3),
            assistant_step("a3", 5, 3, 10.0, vec!["z"]),
        ];
        let metrics = compute(&steps);
        assert!(metrics.turn_deltas.is_empty());
    }

    #[test]
    fn missing_scores_and_references_count_against_the_assistant() {
        let mut silent = assistant_step("a1", 2, 1, 0.0, Vec::new());
        silent.attention_score = None;
        silent.memory_references = None;
        let steps = vec![
            user_step("u1", 1, 1),
            silent,
            assistant_step("a2", 3, 1, 80.0, vec!["x"]),
        ];
        let metrics = compute(&steps);
        assert_eq!(metrics.average_attention, 40.0);
        assert_eq!(metrics.memory_gap_count, 1);
    }

    #[test]
    fn multi_assistant_turns_use_their_mean_attention() {
        let steps = vec![
            user_step("u1", 1, 1),
            assistant_step("a1", 2, 1, 100.0, vec!["x"]),
            assistant_step("a2", 3, 1, 80.0, vec!["x"]),
            user_step("u2", 4, 2),
            assistant_step("a3", 5, 2, 50.0, vec!["x"]),
        ];
        let metrics = compute(&steps);
        assert_eq!(metrics.turn_deltas[0].from_attention, 90.0);
        assert_eq!(metrics.turn_deltas[0].delta, -40.0);
        assert!(metrics.turn_deltas[0].sharp);
    }

    #[test]
    fn rounding_is_half_up_for_percentages() {
        assert_eq!(round_percent(92.5), 93);
        assert_eq!(round_percent(63.33), 63);
        assert_eq!(round_percent(0.0), 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn prop_average_attention_stays_in_range(
            scores in proptest::collection::vec(0.0f64..=100.0, 1..12),
        ) {
            let mut steps = Vec::new();
            for (turn, score) in scores.iter().enumerate() {
                let number = turn + 1;
                steps.push(user_step(&format!("u{number}"), steps.len() + 1, number));
                steps.push(assistant_step(
                    &format!("a{number}"),
                    steps.len() + 1,
                    number,
                    *score,
                    vec!["ctx"],
                ));
            }
            let metrics = compute(&steps);
            prop_assert!(metrics.average_attention >= 0.0);
            prop_assert!(metrics.average_attention <= 100.0);
            prop_assert_eq!(metrics.memory_gap_count, 0);
            prop_assert_eq!(metrics.turn_deltas.len(), scores.len() - 1);
        }
    }
}
