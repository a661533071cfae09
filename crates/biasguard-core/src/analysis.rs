//! Whole-conversation analysis: turn layout, metrics, risk and findings.

use crate::error::ReviewError;
use crate::metrics::{DegradationMetrics, TurnDelta, round_percent};
use crate::risk::RiskClassifier;
use crate::steps::StepStore;
use biasguard_config::BiasGuardConfig;
use biasguard_protocol::{ConversationStep, RiskLevel, ScoreTier, StepId};
use log::{debug, warn};
use serde::Serialize;

/// One step as the reviewer sees it.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StepSnapshot {
    pub step: ConversationStep,
    /// True when a turn boundary is drawn before this step.
    pub turn_start: bool,
    pub confidence_tier: ScoreTier,
    /// Present on assistant steps only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attention_tier: Option<ScoreTier>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TurnSnapshot {
    pub turn: usize,
    pub steps: Vec<StepSnapshot>,
}

/// Detected degradation signal.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DegradationFinding {
    /// Assistant step that referenced no prior context.
    MemoryGap { turn: usize, step_id: StepId },
    /// Turn-to-turn attention fell by at least the configured delta.
    SharpDrop {
        from_turn: usize,
        to_turn: usize,
        delta: f64,
    },
    /// Assistant attention in the danger tier.
    LowAttention {
        turn: usize,
        step_id: StepId,
        score: f64,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConversationSummary {
    pub total_steps: usize,
    pub total_turns: usize,
    pub average_confidence_display: u32,
    pub average_attention_display: u32,
    pub risk: RiskLevel,
}

/// Everything the review surface renders for one conversation.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnalysisResult {
    pub turns: Vec<TurnSnapshot>,
    pub average_attention: f64,
    pub memory_gap_count: usize,
    pub average_confidence: f64,
    pub risk: RiskLevel,
    pub attention_tier: ScoreTier,
    pub memory_gap_tier: ScoreTier,
    pub turn_deltas: Vec<TurnDelta>,
    pub sharp_drops: Vec<TurnDelta>,
    pub findings: Vec<DegradationFinding>,
    pub summary: ConversationSummary,
}

impl AnalysisResult {
    pub fn average_attention_display(&self) -> u32 {
        round_percent(self.average_attention)
    }
}

/// Run the full pipeline over the step store.
pub fn analyze(steps: &StepStore, config: &BiasGuardConfig) -> Result<AnalysisResult, ReviewError> {
    let grouping = steps.turns()?;
    let metrics = DegradationMetrics::compute(&grouping, &config.degradation);
    let classifier = RiskClassifier::from_config(config);
    let risk = classifier.classify(metrics.average_attention, metrics.memory_gap_count);

    let turns: Vec<TurnSnapshot> = grouping
        .turns()
        .iter()
        .map(|turn| TurnSnapshot {
            turn: turn.number,
            steps: turn
                .steps
                .iter()
                .enumerate()
                .map(|(position, step)| StepSnapshot {
                    step: (*step).clone(),
                    turn_start: position == 0,
                    confidence_tier: classifier.tier(step.confidence),
                    attention_tier: step
                        .is_assistant()
                        .then(|| classifier.tier(step.attention_score.unwrap_or(0.0))),
                })
                .collect(),
        })
        .collect();

    let sharp_drops: Vec<TurnDelta> = metrics.sharp_drops().copied().collect();
    let findings = findings(steps, &sharp_drops, &classifier);

    let summary = ConversationSummary {
        total_steps: steps.len(),
        total_turns: grouping.total_turns(),
        average_confidence_display: metrics.average_confidence_display(),
        average_attention_display: metrics.average_attention_display(),
        risk,
    };

    if risk == RiskLevel::High {
        warn!(
            "conversation classified high risk (average_attention={}, memory_gaps={})",
            summary.average_attention_display, metrics.memory_gap_count
        );
    }
    debug!(
        "analyzed conversation (steps={}, turns={}, findings={})",
        summary.total_steps,
        summary.total_turns,
        findings.len()
    );

    Ok(AnalysisResult {
        turns,
        average_attention: metrics.average_attention,
        memory_gap_count: metrics.memory_gap_count,
        average_confidence: metrics.average_confidence,
        risk,
        attention_tier: classifier.tier(metrics.average_attention),
        memory_gap_tier: classifier.memory_gap_tier(metrics.memory_gap_count),
        turn_deltas: metrics.turn_deltas,
        sharp_drops,
        findings,
        summary,
    })
}

/// Step-level findings in sequence order, then sharp drops in turn order.
fn findings(
    steps: &StepStore,
    sharp_drops: &[TurnDelta],
    classifier: &RiskClassifier,
) -> Vec<DegradationFinding> {
    let mut findings = Vec::new();
    for step in steps.assistant_steps() {
        if step.has_memory_gap() {
            findings.push(DegradationFinding::MemoryGap {
                turn: step.turn_index,
                step_id: step.id.clone(),
            });
        }
        let score = step.attention_score.unwrap_or(0.0);
        if classifier.tier(score) == ScoreTier::Danger {
            findings.push(DegradationFinding::LowAttention {
                turn: step.turn_index,
                step_id: step.id.clone(),
                score,
            });
        }
    }
    findings.extend(sharp_drops.iter().map(|drop| DegradationFinding::SharpDrop {
        from_turn: drop.from_turn,
        to_turn: drop.to_turn,
        delta: drop.delta,
    }));
    findings
}

#[cfg(test)]
mod tests {
    use super::{DegradationFinding, analyze};
    use crate::steps::StepStore;
    use biasguard_config::{BiasGuardConfig, DegradationConfig};
    use biasguard_protocol::{RiskLevel, ScoreTier};
    use biasguard_test_utils::headache_conversation;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn reference_conversation_analysis() {
        let steps = StepStore::new(headache_conversation()).expect("store");
        let result = analyze(&steps, &BiasGuardConfig::default()).expect("analyze");

        assert_eq!(result.average_attention_display(), 63);
        assert_eq!(result.memory_gap_count, 1);
        assert_eq!(result.risk, RiskLevel::Medium);
        assert_eq!(result.attention_tier, ScoreTier::Warning);
        assert_eq!(result.memory_gap_tier, ScoreTier::Warning);
        assert!(result.sharp_drops.is_empty());
        assert_eq!(result.summary.total_turns, 3);
        assert_eq!(result.summary.average_confidence_display, 93);

        let starts: Vec<bool> = result
            .turns
            .iter()
            .flat_map(|turn| turn.steps.iter().map(|snapshot| snapshot.turn_start))
            .collect();
        assert_eq!(starts, vec![true, false, true, false, true, false]);
        assert_eq!(
            result.turns[2].steps[1].attention_tier,
            Some(ScoreTier::Danger)
        );
        assert_eq!(result.turns[0].steps[0].attention_tier, None);

        assert_eq!(
            result.findings,
            vec![
                DegradationFinding::MemoryGap {
                    turn: 3,
                    step_id: "6".to_string()
                },
                DegradationFinding::LowAttention {
                    turn: 3,
                    step_id: "6".to_string(),
                    score: 30.0
                },
            ]
        );
    }

    #[test]
    fn stricter_drop_threshold_surfaces_sharp_drops() {
        let steps = StepStore::new(headache_conversation()).expect("store");
        let config = BiasGuardConfig::builder()
            .degradation(DegradationConfig {
                sharp_drop_delta: -30.0,
            })
            .build();
        let result = analyze(&steps, &config).expect("analyze");
        assert_eq!(result.sharp_drops.len(), 2);
        assert!(result.findings.contains(&DegradationFinding::SharpDrop {
            from_turn: 2,
            to_turn: 3,
            delta: -35.0
        }));
    }

    #[test]
    fn findings_serialize_with_type_tag() {
        let finding = DegradationFinding::MemoryGap {
            turn: 3,
            step_id: "6".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&finding).expect("serialize"),
            json!({ "type": "memory_gap", "turn": 3, "step_id": "6" })
        );
    }
}
