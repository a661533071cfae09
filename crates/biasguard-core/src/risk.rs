//! Risk Classifier and the shared percentage display tiers.

use biasguard_config::{BiasGuardConfig, RiskConfig, ThresholdsConfig};
use biasguard_protocol::{RiskLevel, ScoreTier};

/// Maps degradation signals to risk levels and display tiers.
///
/// Every percentage shown to a reviewer goes through `tier`, so the cut
/// points live here and nowhere else.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskClassifier {
    risk: RiskConfig,
    thresholds: ThresholdsConfig,
}

impl Default for RiskClassifier {
    fn default() -> Self {
        Self::new(RiskConfig::default(), ThresholdsConfig::default())
    }
}

impl RiskClassifier {
    pub fn new(risk: RiskConfig, thresholds: ThresholdsConfig) -> Self {
        Self { risk, thresholds }
    }

    pub fn from_config(config: &BiasGuardConfig) -> Self {
        Self::new(config.risk, config.thresholds)
    }

    /// `High` when attention is below the floor or gaps exceed the limit,
    /// otherwise `Medium`. Never `Low` under the baseline policy.
    pub fn classify(&self, average_attention: f64, memory_gap_count: usize) -> RiskLevel {
        if average_attention < self.risk.attention_floor
            || memory_gap_count > self.risk.max_memory_gaps
        {
            RiskLevel::High
        } else {
            RiskLevel::Medium
        }
    }

    /// Display tier for an attention score, confidence or average.
    pub fn tier(&self, value: f64) -> ScoreTier {
        if value < self.thresholds.danger_below {
            ScoreTier::Danger
        } else if value < self.thresholds.warning_below {
            ScoreTier::Warning
        } else {
            ScoreTier::Success
        }
    }

    /// Display tier for the memory gap counter.
    pub fn memory_gap_tier(&self, memory_gap_count: usize) -> ScoreTier {
        if memory_gap_count > self.risk.max_memory_gaps {
            ScoreTier::Danger
        } else if memory_gap_count > 0 {
            ScoreTier::Warning
        } else {
            ScoreTier::Success
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RiskClassifier;
    use biasguard_config::{RiskConfig, ThresholdsConfig};
    use biasguard_protocol::{RiskLevel, ScoreTier};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn classify_matches_baseline_policy() {
        let classifier = RiskClassifier::default();
        assert_eq!(classifier.classify(63.3, 1), RiskLevel::Medium);
        assert_eq!(classifier.classify(49.9, 0), RiskLevel::High);
        assert_eq!(classifier.classify(50.0, 1), RiskLevel::Medium);
        assert_eq!(classifier.classify(95.0, 2), RiskLevel::High);
        assert_eq!(classifier.classify(0.0, 0), RiskLevel::High);
    }

    #[test]
    fn tiers_use_strict_lower_bounds() {
        let classifier = RiskClassifier::default();
        assert_eq!(classifier.tier(49.99), ScoreTier::Danger);
        assert_eq!(classifier.tier(50.0), ScoreTier::Warning);
        assert_eq!(classifier.tier(74.99), ScoreTier::Warning);
        assert_eq!(classifier.tier(75.0), ScoreTier::Success);
        assert_eq!(classifier.tier(100.0), ScoreTier::Success);
    }

    #[test]
    fn memory_gap_tier_escalates() {
        let classifier = RiskClassifier::default();
        assert_eq!(classifier.memory_gap_tier(0), ScoreTier::Success);
        assert_eq!(classifier.memory_gap_tier(1), ScoreTier::Warning);
        assert_eq!(classifier.memory_gap_tier(2), ScoreTier::Danger);
    }

    #[test]
    fn custom_policy_moves_the_cut_points() {
        let classifier = RiskClassifier::new(
            RiskConfig {
                attention_floor: 70.0,
                max_memory_gaps: 0,
            },
            ThresholdsConfig {
                danger_below: 40.0,
                warning_below: 90.0,
            },
        );
        assert_eq!(classifier.classify(69.0, 0), RiskLevel::High);
        assert_eq!(classifier.classify(80.0, 1), RiskLevel::High);
        assert_eq!(classifier.tier(45.0), ScoreTier::Warning);
        assert_eq!(classifier.memory_gap_tier(1), ScoreTier::Danger);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn prop_high_iff_low_attention_or_many_gaps(
            attention in 0.0f64..=100.0,
            gaps in 0usize..10,
        ) {
            let level = RiskClassifier::default().classify(attention, gaps);
            let expected_high = attention < 50.0 || gaps > 1;
            prop_assert_eq!(level == RiskLevel::High, expected_high);
            prop_assert_ne!(level, RiskLevel::Low);
        }
    }
}
