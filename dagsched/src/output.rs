/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structural validation of output documents.
//!
//! Checks an arbitrary JSON value against the published output shape:
//!
//! ```text
//! {
//!   "name": string,
//!   "schedule": [
//!     { "task_id": id, "start_time": number, "end_time": number, "node_id"?: id }
//!   ]
//! }
//! ```
//!
//! where `id` is a non-negative integer or a string.  No other keys are
//! allowed at either level.  The shape lives in the `static` tables below and
//! is shared read-only by every caller; the scheduling core never reads it.

use serde_json::{Map, Value};
use thiserror::Error;

/// A document that does not match the output shape.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("output document invalid at {path}: {reason}")]
pub struct OutputSchemaError {
    /// JSON-pointer-like location, e.g. `/schedule/3/end_time`.
    pub path: String,
    pub reason: String,
}

impl OutputSchemaError {
    fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

// ── Shape tables ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Kind {
    String,
    Array,
    /// Non-negative integer or string.
    Id,
    /// Non-negative number.
    Time,
}

struct Field {
    key: &'static str,
    kind: Kind,
    required: bool,
}

const DOCUMENT_FIELDS: &[Field] = &[
    Field { key: "name", kind: Kind::String, required: true },
    Field { key: "schedule", kind: Kind::Array, required: true },
];

const ENTRY_FIELDS: &[Field] = &[
    Field { key: "task_id", kind: Kind::Id, required: true },
    Field { key: "start_time", kind: Kind::Time, required: true },
    Field { key: "end_time", kind: Kind::Time, required: true },
    Field { key: "node_id", kind: Kind::Id, required: false },
];

// ── Public API ────────────────────────────────────────────────────────────────

/// Validate `doc` against the output shape.  Returns the first problem found.
pub fn validate_document(doc: &Value) -> Result<(), OutputSchemaError> {
    let top = check_object(doc, "", DOCUMENT_FIELDS)?;

    let entries = top
        .get("schedule")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for (i, entry) in entries.iter().enumerate() {
        let path = format!("/schedule/{i}");
        let fields = check_object(entry, &path, ENTRY_FIELDS)?;

        let start = fields.get("start_time").and_then(Value::as_f64);
        let end = fields.get("end_time").and_then(Value::as_f64);
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                return Err(OutputSchemaError::new(
                    format!("{path}/end_time"),
                    format!("end_time {end} precedes start_time {start}"),
                ));
            }
        }
    }
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn check_object<'a>(
    value: &'a Value,
    path: &str,
    fields: &[Field],
) -> Result<&'a Map<String, Value>, OutputSchemaError> {
    let object = value
        .as_object()
        .ok_or_else(|| OutputSchemaError::new(or_root(path), "expected an object"))?;

    if let Some(extra) = object.keys().find(|k| !fields.iter().any(|f| f.key == k.as_str())) {
        return Err(OutputSchemaError::new(
            format!("{path}/{extra}"),
            "unexpected property",
        ));
    }

    for field in fields {
        let field_path = format!("{path}/{}", field.key);
        match object.get(field.key) {
            None if field.required => {
                return Err(OutputSchemaError::new(field_path, "missing required property"))
            }
            None => {}
            Some(v) => check_kind(v, field.kind, &field_path)?,
        }
    }
    Ok(object)
}

fn check_kind(value: &Value, kind: Kind, path: &str) -> Result<(), OutputSchemaError> {
    let ok = match kind {
        Kind::String => value.is_string(),
        Kind::Array => value.is_array(),
        Kind::Id => value.is_string() || value.is_u64(),
        Kind::Time => value.as_f64().is_some_and(|t| t >= 0.0),
    };
    if ok {
        Ok(())
    } else {
        let expected = match kind {
            Kind::String => "a string",
            Kind::Array => "an array",
            Kind::Id => "a non-negative integer or a string",
            Kind::Time => "a non-negative number",
        };
        Err(OutputSchemaError::new(
            path,
            format!("expected {expected}, found {value}"),
        ))
    }
}

fn or_root(path: &str) -> &str {
    if path.is_empty() {
        "/"
    } else {
        path
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
