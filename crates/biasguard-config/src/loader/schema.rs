//! Schema validation helpers for BiasGuard JSON5 configuration.

use crate::ConfigError;
use serde_json::{Map, Value};

/// Check keys and value types of a layer or the merged config.
pub(super) fn validate_layer_schema(value: &Value, layer: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, "")?;
    let allowed = [
        "$schema",
        "thresholds",
        "risk",
        "degradation",
        "export",
        "catalog",
    ];
    ensure_allowed_keys(map, &allowed, layer, "")?;

    if let Some(value) = map.get("$schema") {
        expect_string(value, layer, "$schema")?;
    }
    if let Some(value) = map.get("thresholds") {
        validate_thresholds(value, layer, "thresholds")?;
    }
    if let Some(value) = map.get("risk") {
        validate_risk(value, layer, "risk")?;
    }
    if let Some(value) = map.get("degradation") {
        validate_degradation(value, layer, "degradation")?;
    }
    if let Some(value) = map.get("export") {
        validate_export(value, layer, "export")?;
    }
    if let Some(value) = map.get("catalog") {
        validate_catalog(value, layer, "catalog")?;
    }

    Ok(())
}

/// Validate the "thresholds" block.
fn validate_thresholds(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["danger_below", "warning_below"], layer, path)?;
    for key in ["danger_below", "warning_below"] {
        if let Some(value) = map.get(key) {
            expect_percentage(value, layer, &join_path(path, key))?;
        }
    }
    Ok(())
}

/// Validate the "risk" block.
fn validate_risk(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["attention_floor", "max_memory_gaps"], layer, path)?;
    if let Some(value) = map.get("attention_floor") {
        expect_percentage(value, layer, &join_path(path, "attention_floor"))?;
    }
    if let Some(value) = map.get("max_memory_gaps") {
        expect_u64(value, layer, &join_path(path, "max_memory_gaps"))?;
    }
    Ok(())
}

/// Validate the "degradation" block.
fn validate_degradation(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["sharp_drop_delta"], layer, path)?;
    if let Some(value) = map.get("sharp_drop_delta") {
        expect_f64(value, layer, &join_path(path, "sharp_drop_delta"))?;
    }
    Ok(())
}

/// Validate the "export" block.
fn validate_export(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    let allowed = ["include_steps", "include_generated_at", "pretty"];
    ensure_allowed_keys(map, &allowed, layer, path)?;
    for key in allowed {
        if let Some(value) = map.get(key) {
            expect_bool(value, layer, &join_path(path, key))?;
        }
    }
    Ok(())
}

/// Validate the "catalog" block.
fn validate_catalog(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["allow_custom"], layer, path)?;
    if let Some(value) = map.get("allow_custom") {
        expect_bool(value, layer, &join_path(path, "allow_custom"))?;
    }
    Ok(())
}

/// Expect a JSON object or return a typed error.
fn expect_object<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid_field(layer, path, "expected object")),
    }
}

/// Expect a JSON string or return a typed error.
fn expect_string(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.as_str().is_some() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected string"))
    }
}

/// Expect a JSON boolean or return a typed error.
fn expect_bool(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if matches!(value, Value::Bool(_)) {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected bool"))
    }
}

/// Expect a non-negative JSON integer or return a typed error.
fn expect_u64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_u64() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected non-negative integer"))
    }
}

/// Expect a JSON number or return a typed error.
fn expect_f64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_number() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected number"))
    }
}

/// Expect a JSON number within `0..=100`.
fn expect_percentage(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    match value.as_f64() {
        Some(number) if (0.0..=100.0).contains(&number) => Ok(()),
        Some(_) => Err(invalid_field(layer, path, "expected percentage in 0..=100")),
        None => Err(invalid_field(layer, path, "expected number")),
    }
}

/// Ensure an object contains only allowed keys.
fn ensure_allowed_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    for key in map.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(invalid_field(layer, &join_path(path, key), "unknown key"));
        }
    }
    Ok(())
}

/// Join nested paths for better error messages.
fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Build a structured invalid-field error.
fn invalid_field(layer: &str, path: &str, message: &str) -> ConfigError {
    let normalized_path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{layer}:{normalized_path}"),
        message: message.to_string(),
    }
}
