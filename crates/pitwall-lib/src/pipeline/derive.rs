//! Derived feature generation
//!
//! Training-only features that depend on grouping and ordering: rolling
//! lap-time averages, delta to that average, the in-stint lap index, and
//! the track-temperature delta against the session mean. Grouping is by
//! (driver, stint); rows within a group are ordered by ascending lap
//! number with ties keeping original row order.

use crate::frame::{self, Frame};
use serde_json::Value;
use std::collections::HashMap;

/// Trailing rolling window: the current lap and up to two preceding laps.
const ROLLING_WINDOW: usize = 3;

/// Append the derived feature columns to a normalized training frame.
pub fn add_derived_features(frame: &mut Frame) {
    let rows = frame.num_rows();

    let drivers: Vec<String> = cells_as_string(frame.column("driver"), rows);
    let stints: Vec<i64> = cells_as_i64(frame.column("stint"), rows);
    let lap_numbers: Vec<f64> = (0..rows)
        .map(|i| cell_f64(frame.column("lap_number"), i).unwrap_or(0.0))
        .collect();
    let lap_times: Vec<Option<f64>> = (0..rows)
        .map(|i| cell_f64(frame.column("lap_time_seconds"), i))
        .collect();

    let mut rolling = vec![Value::Null; rows];
    let mut delta = vec![Value::Null; rows];
    let mut lap_in_stint = vec![Value::Null; rows];

    for group in stint_groups(&drivers, &stints) {
        let ordered = order_by_lap(&group, &lap_numbers);
        for (pos, &row) in ordered.iter().enumerate() {
            let start = pos.saturating_sub(ROLLING_WINDOW - 1);
            let window: Vec<f64> = ordered[start..=pos]
                .iter()
                .filter_map(|&r| lap_times[r])
                .collect();
            if !window.is_empty() {
                let avg = window.iter().sum::<f64>() / window.len() as f64;
                rolling[row] = frame::num(avg);
                if let Some(t) = lap_times[row] {
                    delta[row] = frame::num(t - avg);
                }
            }
            lap_in_stint[row] = frame::num((pos + 1) as f64);
        }
    }

    frame.set_column("rolling_avg_lap_time", rolling);
    frame.set_column("delta_to_rolling_avg", delta);
    frame.set_column("lap_number_in_stint", lap_in_stint);
    frame.set_column("track_temp_delta_avg", track_temp_delta(frame, rows));
}

/// Track temp minus the whole-set mean; a null column when track
/// temperature is entirely absent.
fn track_temp_delta(frame: &Frame, rows: usize) -> Vec<Value> {
    let temps: Vec<Option<f64>> = (0..rows)
        .map(|i| cell_f64(frame.column("track_temp"), i))
        .collect();
    let known: Vec<f64> = temps.iter().flatten().copied().collect();
    if known.is_empty() {
        return vec![Value::Null; rows];
    }
    let mean = known.iter().sum::<f64>() / known.len() as f64;
    temps
        .into_iter()
        .map(|t| t.map(|t| frame::num(t - mean)).unwrap_or(Value::Null))
        .collect()
}

/// Row indices partitioned by (driver, stint), groups in first-appearance
/// order, rows within each group in original order.
fn stint_groups(drivers: &[String], stints: &[i64]) -> Vec<Vec<usize>> {
    let mut order: Vec<Vec<usize>> = Vec::new();
    let mut index: HashMap<(String, i64), usize> = HashMap::new();
    for row in 0..drivers.len() {
        let key = (drivers[row].clone(), stints[row]);
        match index.get(&key) {
            Some(&g) => order[g].push(row),
            None => {
                index.insert(key, order.len());
                order.push(vec![row]);
            }
        }
    }
    order
}

/// Ascending lap number; sort_by is stable so ties keep row order.
fn order_by_lap(group: &[usize], lap_numbers: &[f64]) -> Vec<usize> {
    let mut ordered = group.to_vec();
    ordered.sort_by(|&a, &b| {
        lap_numbers[a]
            .partial_cmp(&lap_numbers[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ordered
}

fn cell_f64(column: Option<&[Value]>, row: usize) -> Option<f64> {
    column.and_then(|col| frame::as_f64(&col[row]))
}

fn cells_as_string(column: Option<&[Value]>, rows: usize) -> Vec<String> {
    (0..rows)
        .map(|i| {
            column
                .and_then(|col| frame::as_str(&col[i]))
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}

fn cells_as_i64(column: Option<&[Value]>, rows: usize) -> Vec<i64> {
    (0..rows)
        .map(|i| cell_f64(column, i).map(|f| f as i64).unwrap_or(0))
        .collect()
}
