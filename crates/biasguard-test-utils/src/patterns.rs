use biasguard_protocol::{DarkPatternRecord, PatternType, Severity, StepLocation};

/// Three records anchored to the headache conversation (steps 3→4, 2 and 4).
pub fn sample_patterns() -> Vec<DarkPatternRecord> {
    vec![
        DarkPatternRecord::new(
            PatternType::PromptChaining,
            Severity::Medium,
            "Gradual scope escalation without explicit consent",
            StepLocation::span("3", "4"),
        ),
        DarkPatternRecord::new(
            PatternType::MissingClarification,
            Severity::High,
            "No questions asked about symptom details or medical history",
            StepLocation::step("2"),
        ),
        DarkPatternRecord::new(
            PatternType::CapabilityBoundaryViolation,
            Severity::High,
            "AI provides diagnostic recommendation without disclaimer",
            StepLocation::step("4"),
        ),
    ]
}
