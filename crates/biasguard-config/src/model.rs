//! Configuration schema for BiasGuard.

use serde::{Deserialize, Serialize};

/// Root config for a BiasGuard review engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BiasGuardConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub thresholds: ThresholdsConfig,
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub degradation: DegradationConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl BiasGuardConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> BiasGuardConfigBuilder {
        BiasGuardConfigBuilder::new()
    }
}

/// Builder for assembling a `BiasGuardConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct BiasGuardConfigBuilder {
    config: BiasGuardConfig,
}

impl BiasGuardConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: BiasGuardConfig::default(),
        }
    }

    /// Replace the display tier thresholds.
    pub fn thresholds(mut self, thresholds: ThresholdsConfig) -> Self {
        self.config.thresholds = thresholds;
        self
    }

    /// Replace the risk classification policy.
    pub fn risk(mut self, risk: RiskConfig) -> Self {
        self.config.risk = risk;
        self
    }

    /// Replace the degradation detection settings.
    pub fn degradation(mut self, degradation: DegradationConfig) -> Self {
        self.config.degradation = degradation;
        self
    }

    /// Replace the export settings.
    pub fn export(mut self, export: ExportConfig) -> Self {
        self.config.export = export;
        self
    }

    /// Replace the pattern catalog settings.
    pub fn catalog(mut self, catalog: CatalogConfig) -> Self {
        self.config.catalog = catalog;
        self
    }

    /// Finalize and return the built `BiasGuardConfig`.
    pub fn build(self) -> BiasGuardConfig {
        self.config
    }
}

/// Cut points for the danger/warning/success display tiers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ThresholdsConfig {
    /// Values strictly below this are `danger`.
    #[serde(default = "default_danger_below")]
    pub danger_below: f64,
    /// Values strictly below this (and not danger) are `warning`.
    #[serde(default = "default_warning_below")]
    pub warning_below: f64,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            danger_below: default_danger_below(),
            warning_below: default_warning_below(),
        }
    }
}

fn default_danger_below() -> f64 {
    50.0
}

fn default_warning_below() -> f64 {
    75.0
}

/// Whole-conversation risk policy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RiskConfig {
    /// Average attention below this is high risk.
    #[serde(default = "default_attention_floor")]
    pub attention_floor: f64,
    /// More memory gaps than this is high risk.
    #[serde(default = "default_max_memory_gaps")]
    pub max_memory_gaps: usize,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            attention_floor: default_attention_floor(),
            max_memory_gaps: default_max_memory_gaps(),
        }
    }
}

fn default_attention_floor() -> f64 {
    50.0
}

fn default_max_memory_gaps() -> usize {
    1
}

/// Inter-turn degradation detection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DegradationConfig {
    /// A turn-to-turn attention delta at or below this is a sharp drop.
    #[serde(default = "default_sharp_drop_delta")]
    pub sharp_drop_delta: f64,
}

impl Default for DegradationConfig {
    fn default() -> Self {
        Self {
            sharp_drop_delta: default_sharp_drop_delta(),
        }
    }
}

fn default_sharp_drop_delta() -> f64 {
    -40.0
}

/// Export payload settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ExportConfig {
    /// Embed the step sequence in JSON exports.
    #[serde(default)]
    pub include_steps: bool,
    /// Stamp JSON exports with a generation time in the metadata block.
    #[serde(default = "default_true")]
    pub include_generated_at: bool,
    /// Pretty-print JSON exports.
    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            include_steps: false,
            include_generated_at: true,
            pretty: true,
        }
    }
}

/// Dark pattern catalog settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CatalogConfig {
    /// Accept labels outside the built-in catalog.
    #[serde(default = "default_true")]
    pub allow_custom: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { allow_custom: true }
    }
}

fn default_true() -> bool {
    true
}
