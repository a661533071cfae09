//! View Controller: which turns the reviewer is looking at.
//!
//! The view only filters steps; metrics always cover the whole conversation.

use crate::error::ReviewError;
use crate::steps::StepStore;
use biasguard_protocol::ConversationStep;
use serde::{Deserialize, Serialize};

/// Current step filter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case", tag = "mode", content = "turn")]
pub enum ViewState {
    #[default]
    AllTurns,
    /// 1-based turn number.
    SingleTurn(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewController {
    state: ViewState,
}

impl ViewController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn select_all(&mut self) {
        self.state = ViewState::AllTurns;
    }

    /// Focus a single turn; rejected turns leave the state untouched.
    pub fn select_turn(&mut self, turn: usize, total_turns: usize) -> Result<(), ReviewError> {
        if turn == 0 || turn > total_turns {
            return Err(ReviewError::InvalidTurn {
                turn,
                total: total_turns,
            });
        }
        self.state = ViewState::SingleTurn(turn);
        Ok(())
    }

    /// Steps visible under the current state, in original order.
    pub fn visible_steps<'a>(&self, steps: &'a StepStore) -> Vec<&'a ConversationStep> {
        match self.state {
            ViewState::AllTurns => steps.steps().iter().collect(),
            ViewState::SingleTurn(turn) => steps
                .steps()
                .iter()
                .filter(|step| step.turn_index == turn)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ViewController, ViewState};
    use crate::error::ReviewError;
    use crate::steps::StepStore;
    use biasguard_test_utils::headache_conversation;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_turn_filters_steps() {
        let steps = StepStore::new(headache_conversation()).expect("store");
        let mut view = ViewController::new();
        assert_eq!(view.visible_steps(&steps).len(), 6);

        view.select_turn(2, steps.total_turns()).expect("turn 2");
        assert_eq!(view.state(), ViewState::SingleTurn(2));
        let ids: Vec<&str> = view
            .visible_steps(&steps)
            .iter()
            .map(|step| step.id.as_str())
            .collect();
        assert_eq!(ids, vec!["3", "4"]);

        view.select_all();
        assert_eq!(view.state(), ViewState::AllTurns);
    }

    #[test]
    fn out_of_range_turns_are_rejected() {
        let mut view = ViewController::new();
        view.select_turn(3, 3).expect("turn 3");
        for turn in [0, 4] {
            match view.select_turn(turn, 3).unwrap_err() {
                ReviewError::InvalidTurn { turn: got, total } => {
                    assert_eq!((got, total), (turn, 3));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
        assert_eq!(view.state(), ViewState::SingleTurn(3));
    }
}
