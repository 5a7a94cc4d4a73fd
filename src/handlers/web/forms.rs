//! Admin form fields to API payloads and back.
//!
//! Text inputs arrive as strings; this module turns them into the JSON shape
//! the typed create/update payloads expect, using each resource's field list.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::models::{FieldKind, FieldSpec, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    /// Empty required inputs keep the stored value; optional inputs sent
    /// empty clear it.
    Update,
}

const DATETIME_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Last value per field name; checkboxes appear only when ticked.
pub fn field_map(fields: &[(String, String)]) -> HashMap<String, String> {
    fields.iter().cloned().collect()
}

fn parse_datetime_input(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, DATETIME_INPUT_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .map(|dt| dt.and_utc())
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.with_timezone(&Utc)))
}

fn convert(field: &FieldSpec, raw: &str) -> Result<Value, String> {
    match field.kind {
        FieldKind::Number => raw
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| format!("El campo «{}» debe ser un número entero", field.label)),
        FieldKind::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(|d| Value::String(d.to_string()))
            .map_err(|_| format!("El campo «{}» no es una fecha válida", field.label)),
        FieldKind::DateTime => parse_datetime_input(raw)
            .map(|dt| Value::String(dt.to_rfc3339()))
            .ok_or_else(|| format!("El campo «{}» no es una fecha y hora válida", field.label)),
        _ => Ok(Value::String(raw.to_string())),
    }
}

/// Build the JSON payload for `resource` from submitted text fields.
///
/// File fields are skipped; the caller fills them after storing uploads.
pub fn form_to_json(
    resource: Resource,
    values: &HashMap<String, String>,
    mode: FormMode,
) -> Result<Map<String, Value>, String> {
    let mut payload = Map::new();

    for field in resource.fields() {
        if matches!(field.kind, FieldKind::File(_)) {
            continue;
        }

        if field.kind == FieldKind::Checkbox {
            payload.insert(field.key.to_string(), Value::Bool(values.contains_key(field.key)));
            continue;
        }

        let submitted = values.get(field.key);
        let raw = submitted.map(|v| v.trim()).unwrap_or_default();
        if raw.is_empty() {
            match (mode, field.required) {
                (FormMode::Create, true) => {
                    return Err(format!("El campo «{}» es obligatorio", field.label));
                }
                (FormMode::Update, false) if submitted.is_some() => {
                    payload.insert(field.key.to_string(), Value::Null);
                }
                _ => {}
            }
            continue;
        }

        payload.insert(field.key.to_string(), convert(field, raw)?);
    }

    Ok(payload)
}

/// Value to pre-fill an input with, from a stored record.
pub fn input_value(field: &FieldSpec, record: &Value) -> String {
    match record.get(field.key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) if field.kind == FieldKind::DateTime => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc).format(DATETIME_INPUT_FORMAT).to_string())
            .unwrap_or_else(|_| s.clone()),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => if *b { "on".to_string() } else { String::new() },
        Some(other) => other.to_string(),
    }
}

/// Input values for a stored record, keyed like a submitted form.
pub fn record_values(resource: Resource, record: &Value) -> HashMap<String, String> {
    resource
        .fields()
        .iter()
        .map(|f| (f.key.to_string(), input_value(f, record)))
        .filter(|(_, v)| !v.is_empty())
        .collect()
}
