//! JSON -> varbind conversion

use crate::OidValue;

use super::CliError;

/// Reads trap varbinds from JSON.
///
/// Accepts either a list of `{"oid": ..., "value": ...}` objects or a single
/// object mapping OIDs to values. Numbers and booleans are kept in their
/// textual form.
pub fn parse_oids(json: &str) -> Result<Vec<OidValue>, CliError> {
    let value: serde_json::Value = serde_json::from_str(json)?;

    match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::Object(mut obj) => {
                    let oid = obj.remove("oid").and_then(|v| scalar_text(&v));
                    let value = obj.remove("value").and_then(|v| scalar_text(&v));
                    match (oid, value) {
                        (Some(oid), Some(value)) => Ok(OidValue { oid, value }),
                        _ => Err(CliError::Varbinds(
                            "each entry needs scalar 'oid' and 'value' fields".to_string(),
                        )),
                    }
                }
                other => Err(CliError::Varbinds(format!(
                    "expected an object, got {}",
                    other
                ))),
            })
            .collect(),
        serde_json::Value::Object(obj) => obj
            .into_iter()
            .map(|(oid, v)| {
                scalar_text(&v)
                    .map(|value| OidValue { oid: oid.clone(), value })
                    .ok_or_else(|| CliError::Varbinds(format!("value of {} is not a scalar", oid)))
            })
            .collect(),
        serde_json::Value::Null => Ok(vec![]),
        other => Err(CliError::Varbinds(format!(
            "expected a list or an object, got {}",
            other
        ))),
    }
}

fn scalar_text(v: &serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
