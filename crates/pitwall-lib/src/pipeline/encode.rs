//! Categorical indicator encoding
//!
//! Expands the categorical fields into one indicator column per value of a
//! closed vocabulary. The produced column set and order depend only on the
//! vocabulary, never on which values happen to appear in the batch, so the
//! training-time and inference-time schemas cannot drift. A value outside
//! the vocabulary yields all-zero indicators for its field; that is the
//! agreed policy for unknown categories, not an error.

use crate::frame::{self, Frame};
use serde_json::Value;

/// Closed set of tyre compounds. Matching is case-insensitive.
pub const COMPOUNDS: [&str; 3] = ["HARD", "MEDIUM", "SOFT"];

/// Closed set of constructor names. Matching is exact; the indicator
/// column name has internal spaces removed.
pub const TEAMS: [&str; 9] = [
    "AlphaTauri",
    "Alpine",
    "Aston Martin",
    "Ferrari",
    "Haas F1 Team",
    "McLaren",
    "Mercedes",
    "Red Bull Racing",
    "Williams",
];

/// Expand `compound` and `team` into indicator columns and drop the
/// originals. Works identically on a many-row training frame and a
/// single-row inference frame.
pub fn encode_categoricals(frame: &mut Frame) {
    let rows = frame.num_rows();

    let compound = frame.drop_column("compound");
    for value in COMPOUNDS {
        let cells = indicator_cells(rows, compound.as_deref(), |cell| {
            frame::as_str(cell)
                .map(|s| s.trim().eq_ignore_ascii_case(value))
                .unwrap_or(false)
        });
        frame.set_column(format!("compound_{value}"), cells);
    }

    let team = frame.drop_column("team");
    for value in TEAMS {
        let cells = indicator_cells(rows, team.as_deref(), |cell| {
            frame::as_str(cell).map(|s| s == value).unwrap_or(false)
        });
        frame.set_column(team_column_name(value), cells);
    }
}

/// Indicator column name for a team, spaces removed.
pub fn team_column_name(team: &str) -> String {
    format!("team_{}", team.replace(' ', ""))
}

fn indicator_cells<F>(rows: usize, source: Option<&[Value]>, matches: F) -> Vec<Value>
where
    F: Fn(&Value) -> bool,
{
    (0..rows)
        .map(|i| {
            let hit = source.map(|col| matches(&col[i])).unwrap_or(false);
            frame::num(if hit { 1.0 } else { 0.0 })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn one(frame: &Frame, name: &str) -> f64 {
        frame::coerce_f64(&frame.column(name).unwrap()[0])
    }

    #[test]
    fn test_known_compound_sets_exactly_one_indicator() {
        let mut frame = Frame::from_columns(vec![(
            "compound".to_string(),
            vec![json!("soft")], // case-insensitive
        )]);
        encode_categoricals(&mut frame);

        assert_eq!(one(&frame, "compound_SOFT"), 1.0);
        assert_eq!(one(&frame, "compound_MEDIUM"), 0.0);
        assert_eq!(one(&frame, "compound_HARD"), 0.0);
        assert!(!frame.has_column("compound"));
    }

    #[test]
    fn test_unknown_compound_yields_all_zero_indicators() {
        let mut frame =
            Frame::from_columns(vec![("compound".to_string(), vec![json!("INTERMEDIATE")])]);
        encode_categoricals(&mut frame);

        for compound in COMPOUNDS {
            assert_eq!(one(&frame, &format!("compound_{compound}")), 0.0);
        }
        // Never a new column for the unknown value.
        assert!(!frame.has_column("compound_INTERMEDIATE"));
    }

    #[test]
    fn test_team_matching_is_exact() {
        let mut frame = Frame::from_columns(vec![(
            "team".to_string(),
            vec![json!("Ferrari"), json!("ferrari"), json!("Red Bull Racing")],
        )]);
        encode_categoricals(&mut frame);

        let ferrari = frame.column("team_Ferrari").unwrap();
        assert_eq!(frame::coerce_f64(&ferrari[0]), 1.0);
        assert_eq!(frame::coerce_f64(&ferrari[1]), 0.0); // wrong case is unknown

        let red_bull = frame.column("team_RedBullRacing").unwrap();
        assert_eq!(frame::coerce_f64(&red_bull[2]), 1.0);
    }

    #[test]
    fn test_indicator_set_is_independent_of_batch_contents() {
        let mut sparse = Frame::from_columns(vec![
            ("compound".to_string(), vec![json!("HARD")]),
            ("team".to_string(), vec![json!("Williams")]),
        ]);
        let mut full = Frame::from_columns(vec![
            (
                "compound".to_string(),
                vec![json!("HARD"), json!("MEDIUM"), json!("SOFT")],
            ),
            (
                "team".to_string(),
                vec![json!("Williams"), json!("Ferrari"), json!("McLaren")],
            ),
        ]);
        encode_categoricals(&mut sparse);
        encode_categoricals(&mut full);
        assert_eq!(sparse.column_names(), full.column_names());
    }

    #[test]
    fn test_missing_categorical_column_still_emits_vocabulary() {
        let mut frame = Frame::from_columns(vec![("tyre_life".to_string(), vec![json!(5)])]);
        encode_categoricals(&mut frame);
        assert!(frame.has_column("compound_HARD"));
        assert!(frame.has_column("team_Mercedes"));
        assert_eq!(one(&frame, "compound_HARD"), 0.0);
    }
}
