//! Reading and schema-checking individual layer files.

use super::{ConfigLayer, ConfigLayerSource, schema};
use crate::ConfigError;
use log::debug;
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// A layer file parsed into JSON, not yet merged.
#[derive(Debug, Clone)]
pub(super) struct LayerFile {
    pub(super) meta: ConfigLayer,
    pub(super) value: Value,
}

/// Whether a missing file is skipped or reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Presence {
    Optional,
    Required,
}

/// Read one layer; `Ok(None)` only for a missing optional file.
pub(super) fn read_layer(
    source: ConfigLayerSource,
    path: &Path,
    presence: Presence,
) -> Result<Option<LayerFile>, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound && presence == Presence::Optional => {
            debug!(
                "config layer absent (source={}, path={})",
                source.as_str(),
                path.display()
            );
            return Ok(None);
        }
        Err(err) => return Err(ConfigError::read(path, err)),
    };

    let label = source.label(path);
    let value: Value =
        json5::from_str(&contents).map_err(|err| ConfigError::parse(label.clone(), err))?;
    schema::validate_layer_schema(&value, &label)?;
    debug!("read config layer ({label})");
    Ok(Some(LayerFile {
        meta: ConfigLayer {
            source,
            path: path.to_path_buf(),
        },
        value,
    }))
}
