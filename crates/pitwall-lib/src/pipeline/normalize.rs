//! Raw record normalization
//!
//! Converts raw telemetry columns, whose names arrive in upstream casing
//! (`LapNumber`, `TrackStatus`, ...), into the canonical lower_snake_case
//! tabular form the rest of the pipeline works on. Also applies the
//! defaulting coercions: track status codes stored as text become numeric
//! (0 on failure), tyre freshness becomes {0,1}, and the lap-time target
//! becomes numeric-or-null.

use crate::frame::{self, Frame};
use serde_json::Value;

/// Canonical column name: a boundary is inserted between a lowercase
/// letter and a following uppercase letter, then the whole name is
/// lower-cased. Already-canonical names pass through unchanged.
pub fn canonical_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for ch in name.chars() {
        if ch.is_ascii_uppercase() && prev_lower {
            out.push('_');
        }
        prev_lower = ch.is_ascii_lowercase();
        out.push(ch.to_ascii_lowercase());
    }
    out
}

/// Normalize a frame of raw records in place: canonical column names,
/// then the field-level coercions. The caller's source data is never
/// touched; orchestrators hand in their own copy.
pub fn normalize(frame: &mut Frame) {
    let names: Vec<String> = frame
        .column_names()
        .into_iter()
        .map(|n| n.to_string())
        .collect();
    for name in names {
        let canonical = canonical_name(&name);
        if canonical != name {
            frame.rename_column(&name, &canonical);
        }
    }

    // The target stays null when unparseable so training can filter it;
    // every other numeric field defaults to 0.
    frame.map_column("lap_time_seconds", |v| match frame::as_f64(v) {
        Some(t) => frame::num(t),
        None => Value::Null,
    });

    frame.map_column("fresh_tyre", coerce_flag);

    if frame.has_column("track_status") {
        frame.map_column("track_status", |v| frame::num(frame::coerce_f64(v)));
        frame.rename_column("track_status", "track_status_numeric");
    }

    frame.rename_column("humidity", "humidity_percent");
}

/// Boolean-like cell to {0,1}; unrecognized values default to 0.
fn coerce_flag(value: &Value) -> Value {
    let flag = match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("true") || s == "1"
        }
        _ => false,
    };
    frame::num(if flag { 1.0 } else { 0.0 })
}
