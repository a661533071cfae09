//! Location validation and display-string conversion.

use crate::error::ReviewError;
use crate::steps::StepStore;
use biasguard_protocol::StepLocation;
use regex::Regex;
use std::sync::LazyLock;

/// Accepts `Step 2`, `Step 3 → Step 4` and `Step 3 -> Step 4`.
static DISPLAY_LOCATION: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*step\s+(\d+)\s*(?:(?:→|->)\s*step\s+(\d+))?\s*$")
});

/// Check that a location references existing steps in order.
pub(crate) fn validate_location(
    location: &StepLocation,
    steps: &StepStore,
) -> Result<(), ReviewError> {
    match location {
        StepLocation::Step { step_id } => {
            resolve(step_id, steps)?;
        }
        StepLocation::Span { from, to } => {
            let from_index = resolve(from, steps)?;
            let to_index = resolve(to, steps)?;
            if from_index >= to_index {
                return Err(ReviewError::InvalidLocation(format!(
                    "span {from} -> {to} is not in sequence order"
                )));
            }
        }
    }
    Ok(())
}

/// Resolve a display string such as `Step 3 → Step 4` into step ids.
pub fn parse_display_location(text: &str, steps: &StepStore) -> Result<StepLocation, ReviewError> {
    let regex = DISPLAY_LOCATION
        .as_ref()
        .map_err(|err| ReviewError::InvalidLocation(err.to_string()))?;
    let Some(captures) = regex.captures(text) else {
        return Err(ReviewError::InvalidLocation(format!(
            "unrecognized location: {text:?}"
        )));
    };
    let from = step_id_at(captures.get(1).map(|m| m.as_str()), steps)?;
    let location = match captures.get(2) {
        Some(to) => StepLocation::Span {
            from,
            to: step_id_at(Some(to.as_str()), steps)?,
        },
        None => StepLocation::Step { step_id: from },
    };
    validate_location(&location, steps)?;
    Ok(location)
}

/// Render a location the way reviewers read it, e.g. `Step 3 → Step 4`.
///
/// Unknown ids are rendered verbatim.
pub fn display_location(location: &StepLocation, steps: &StepStore) -> String {
    let label = |step_id: &str| match steps.get(step_id) {
        Some(step) => format!("Step {}", step.step_index),
        None => step_id.to_string(),
    };
    match location {
        StepLocation::Step { step_id } => label(step_id),
        StepLocation::Span { from, to } => format!("{} → {}", label(from), label(to)),
    }
}

fn resolve(step_id: &str, steps: &StepStore) -> Result<usize, ReviewError> {
    steps
        .get(step_id)
        .map(|step| step.step_index)
        .ok_or_else(|| ReviewError::InvalidLocation(format!("unknown step id {step_id}")))
}

fn step_id_at(index: Option<&str>, steps: &StepStore) -> Result<String, ReviewError> {
    let index = index
        .and_then(|raw| raw.parse::<usize>().ok())
        .ok_or_else(|| ReviewError::InvalidLocation("missing step number".to_string()))?;
    steps
        .by_index(index)
        .map(|step| step.id.clone())
        .ok_or_else(|| ReviewError::InvalidLocation(format!("no step {index} in conversation")))
}

#[cfg(test)]
mod tests {
    use super::{display_location, parse_display_location, validate_location};
    use crate::error::ReviewError;
    use crate::steps::StepStore;
    use biasguard_protocol::StepLocation;
    use biasguard_test_utils::headache_conversation;
    use pretty_assertions::assert_eq;

    fn store() -> StepStore {
        StepStore::new(headache_conversation()).expect("store")
    }

    #[test]
    fn parses_legacy_display_strings() {
        let steps = store();
        assert_eq!(
            parse_display_location("Step 3 → Step 4", &steps).expect("span"),
            StepLocation::span("3", "4")
        );
        assert_eq!(
            parse_display_location("step 3 -> step 5", &steps).expect("ascii span"),
            StepLocation::span("3", "5")
        );
        assert_eq!(
            parse_display_location(" Step 2 ", &steps).expect("single"),
            StepLocation::step("2")
        );
    }

    #[test]
    fn rejects_unresolvable_display_strings() {
        let steps = store();
        for text in ["Step 9", "Step 4 → Step 3", "turn 2", ""] {
            let err = parse_display_location(text, &steps).unwrap_err();
            assert!(matches!(err, ReviewError::InvalidLocation(_)), "{text}");
        }
    }

    #[test]
    fn repeated_parses_share_the_compiled_pattern() {
        let steps = store();
        for _ in 0..3 {
            assert_eq!(
                parse_display_location("STEP 1 -> STEP 2", &steps).expect("span"),
                StepLocation::span("1", "2")
            );
        }
        assert!(super::DISPLAY_LOCATION.is_ok());
    }

    #[test]
    fn renders_locations_with_step_numbers() {
        let steps = store();
        assert_eq!(
            display_location(&StepLocation::span("3", "4"), &steps),
            "Step 3 → Step 4"
        );
        assert_eq!(display_location(&StepLocation::step("2"), &steps), "Step 2");
        assert_eq!(display_location(&StepLocation::step("zz"), &steps), "zz");
    }

    #[test]
    fn spans_must_move_forward() {
        let steps = store();
        assert!(validate_location(&StepLocation::span("2", "2"), &steps).is_err());
        assert!(validate_location(&StepLocation::span("1", "6"), &steps).is_ok());
        assert!(validate_location(&StepLocation::step("missing"), &steps).is_err());
    }
}
