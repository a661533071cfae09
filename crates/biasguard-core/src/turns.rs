//! Turn Grouper: partitions steps into turns led by a single user step.

use crate::error::ReviewError;
use biasguard_protocol::{ConversationStep, Role};

/// One user step and the assistant steps answering it.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn<'a> {
    /// 1-based turn number.
    pub number: usize,
    /// Steps in original order; the first is always the user step.
    pub steps: Vec<&'a ConversationStep>,
}

impl<'a> Turn<'a> {
    /// The leading user step.
    pub fn user_step(&self) -> &'a ConversationStep {
        self.steps[0]
    }

    /// Assistant steps of this turn, in order.
    pub fn assistant_steps(&self) -> impl Iterator<Item = &'a ConversationStep> + '_ {
        self.steps.iter().copied().filter(|step| step.is_assistant())
    }

    pub fn has_assistant_step(&self) -> bool {
        self.steps.iter().any(|step| step.is_assistant())
    }
}

/// Turn-indexed view over a step sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnGrouping<'a> {
    turns: Vec<Turn<'a>>,
}

impl<'a> TurnGrouping<'a> {
    /// Total turn count, equal to the highest `turn_index`.
    pub fn total_turns(&self) -> usize {
        self.turns.len()
    }

    pub fn turns(&self) -> &[Turn<'a>] {
        &self.turns
    }

    /// Turn by 1-based number.
    pub fn turn(&self, number: usize) -> Option<&Turn<'a>> {
        number
            .checked_sub(1)
            .and_then(|position| self.turns.get(position))
    }

    /// True when the step opens its turn (where a turn boundary is drawn).
    pub fn is_turn_start(&self, step: &ConversationStep) -> bool {
        self.turn(step.turn_index)
            .is_some_and(|turn| turn.user_step().id == step.id)
    }

    /// All steps in order, each paired with its turn-start flag.
    pub fn boundaries(&self) -> Vec<(&'a ConversationStep, bool)> {
        self.turns
            .iter()
            .flat_map(|turn| {
                turn.steps
                    .iter()
                    .enumerate()
                    .map(|(position, step)| (*step, position == 0))
            })
            .collect()
    }
}

/// Group an ordered step sequence into turns.
///
/// Fails when the sequence is empty, when `turn_index` does not start at 1 and
/// advance by at most one per step, or when a turn does not consist of exactly
/// one leading user step followed by assistant steps.
pub fn group(steps: &[ConversationStep]) -> Result<TurnGrouping<'_>, ReviewError> {
    if steps.is_empty() {
        return Err(ReviewError::MalformedSequence(
            "cannot group an empty step sequence".to_string(),
        ));
    }

    let mut turns: Vec<Turn<'_>> = Vec::new();
    for step in steps {
        let current = turns.last().map_or(0, |turn| turn.number);
        if step.turn_index == current + 1 {
            if step.role != Role::User {
                return Err(ReviewError::MalformedSequence(format!(
                    "turn {} lacks a leading user step (starts with {})",
                    step.turn_index, step.id
                )));
            }
            turns.push(Turn {
                number: step.turn_index,
                steps: vec![step],
            });
        } else if step.turn_index == current && current > 0 {
            if step.role == Role::User {
                return Err(ReviewError::MalformedSequence(format!(
                    "turn {} has a second user step ({})",
                    step.turn_index, step.id
                )));
            }
            if let Some(turn) = turns.last_mut() {
                turn.steps.push(step);
            }
        } else {
            return Err(ReviewError::MalformedSequence(format!(
                "step {} has turn_index {} after turn {}",
                step.id, step.turn_index, current
            )));
        }
    }

    Ok(TurnGrouping { turns })
}
