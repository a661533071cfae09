//! JSON5 config loading, single-file and layered.
//!
//! Every layer is schema-checked on its own so errors name the file that
//! caused them; the merged result is checked again and then validated.

mod discovery;
mod merge;
mod read;
mod schema;


use crate::{BiasGuardConfig, ConfigError};
use log::{debug, info};
use read::Presence;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Config filename looked up in every file layer.
const DEFAULT_CONFIG_FILE: &str = "biasguard.json5";
/// Directory holding the config under the home and project roots.
const DEFAULT_CONFIG_DIR: &str = ".biasguard";
/// Entries that mark a project root.
const DEFAULT_PROJECT_ROOT_MARKERS: &[&str] = &[".git"];

/// Machine-wide config file, where the platform has one.
const SYSTEM_CONFIG_PATH: Option<&str> = if cfg!(unix) {
    Some("/etc/biasguard/biasguard.json5")
} else if cfg!(windows) {
    Some("C:\\ProgramData\\biasguard\\biasguard.json5")
} else {
    None
};

/// Effective config plus the layers that produced it.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// The merged, validated config.
    pub config: BiasGuardConfig,
    /// Contributing layers, lowest precedence first.
    pub layers: Vec<ConfigLayer>,
}

/// Origin of a config layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayerSource {
    System,
    User,
    /// `.biasguard/biasguard.json5` under the project root.
    Project,
    /// `biasguard.json5` in the working directory.
    Cwd,
    /// Explicit override files; highest precedence, must exist.
    Runtime,
}

impl ConfigLayerSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigLayerSource::System => "system",
            ConfigLayerSource::User => "user",
            ConfigLayerSource::Project => "project",
            ConfigLayerSource::Cwd => "cwd",
            ConfigLayerSource::Runtime => "runtime",
        }
    }

    /// Label used in error paths, e.g. `cwd(/work/biasguard.json5)`.
    pub(crate) fn label(&self, path: &Path) -> String {
        format!("{}({})", self.as_str(), path.display())
    }
}

/// A loaded config layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigLayer {
    pub source: ConfigLayerSource,
    pub path: PathBuf,
}

/// Layer locations for `load_layered_with_options`.
#[derive(Debug, Clone)]
pub struct LayeredConfigOptions {
    /// Directory the review runs from.
    pub cwd: PathBuf,
    /// System layer path; `None` skips the layer.
    pub system_config_path: Option<PathBuf>,
    /// User layer path; `None` skips the layer.
    pub user_config_path: Option<PathBuf>,
    /// Override files applied last, in order.
    pub runtime_paths: Vec<PathBuf>,
    /// Entries that mark the project root.
    pub project_root_markers: Vec<String>,
}

impl LayeredConfigOptions {
    /// Default layer locations around `cwd`.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            system_config_path: discovery::system_config_path(),
            user_config_path: discovery::user_config_path(),
            runtime_paths: Vec::new(),
            project_root_markers: DEFAULT_PROJECT_ROOT_MARKERS
                .iter()
                .map(|marker| marker.to_string())
                .collect(),
        }
    }

    /// Append a runtime override file.
    pub fn with_runtime_path(mut self, path: impl AsRef<Path>) -> Self {
        self.runtime_paths.push(path.as_ref().to_path_buf());
        self
    }
}

impl BiasGuardConfig {
    /// Load one config file without layering.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("loading config (path={})", path.display());
        let contents = fs::read_to_string(path).map_err(|err| ConfigError::read(path, err))?;
        let origin = path.display().to_string();
        let value: Value =
            json5::from_str(&contents).map_err(|err| ConfigError::parse(origin.clone(), err))?;
        config_from_value(value, &origin)
    }

    /// Load config from JSON5 text without layering.
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading config from text (len={})", contents.len());
        let value: Value =
            json5::from_str(contents).map_err(|err| ConfigError::parse("inline", err))?;
        config_from_value(value, "config")
    }

    /// Load the layered config with default locations around `cwd`.
    pub fn load_layered(cwd: impl AsRef<Path>) -> Result<LayeredConfig, ConfigError> {
        Self::load_layered_with_options(LayeredConfigOptions::new(cwd))
    }

    /// Load and merge layers: system < user < project < cwd < runtime.
    ///
    /// Missing file layers are skipped; missing runtime files are errors. A
    /// file reached through two layers counts once, at its first position.
    pub fn load_layered_with_options(
        options: LayeredConfigOptions,
    ) -> Result<LayeredConfig, ConfigError> {
        let cwd = discovery::resolve_cwd(&options.cwd)?;
        info!("loading layered config (cwd={})", cwd.display());

        let mut layers = Vec::new();
        let mut merged = Value::Object(serde_json::Map::new());
        let mut seen = HashSet::new();

        let candidates = discovery::file_candidates(&options, &cwd)
            .into_iter()
            .map(|(source, path)| (source, path, Presence::Optional))
            .chain(
                options
                    .runtime_paths
                    .iter()
                    .map(|path| (ConfigLayerSource::Runtime, path.clone(), Presence::Required)),
            );
        for (source, path, presence) in candidates {
            let Some(layer) = read::read_layer(source, &path, presence)? else {
                continue;
            };
            if !seen.insert(discovery::dedupe_key(&path)) {
                debug!("skipping repeated layer ({})", source.label(&path));
                continue;
            }
            merge::merge_json_values(&mut merged, &layer.value);
            layers.push(layer.meta);
        }

        let config = config_from_value(merged, "effective")?;
        info!("layered config loaded (layers={})", layers.len());
        Ok(LayeredConfig { config, layers })
    }

    /// Validate configuration invariants that cannot be expressed in serde.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let thresholds = &self.thresholds;
        if !(0.0..=100.0).contains(&thresholds.danger_below)
            || !(0.0..=100.0).contains(&thresholds.warning_below)
        {
            return Err(ConfigError::Invalid(
                "thresholds must lie within 0..=100".to_string(),
            ));
        }
        if thresholds.danger_below > thresholds.warning_below {
            return Err(ConfigError::Invalid(
                "thresholds.danger_below must not exceed thresholds.warning_below".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&self.risk.attention_floor) {
            return Err(ConfigError::Invalid(
                "risk.attention_floor must lie within 0..=100".to_string(),
            ));
        }
        let delta = self.degradation.sharp_drop_delta;
        if !(-100.0..0.0).contains(&delta) {
            return Err(ConfigError::Invalid(
                "degradation.sharp_drop_delta must be negative and at least -100".to_string(),
            ));
        }
        Ok(())
    }
}

fn config_from_value(value: Value, label: &str) -> Result<BiasGuardConfig, ConfigError> {
    schema::validate_layer_schema(&value, label)?;
    let config: BiasGuardConfig = serde_json::from_value(value)?;
    config.validate()?;
    Ok(config)
}
