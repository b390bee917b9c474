//! Schema reconciliation
//!
//! Conforms an arbitrary feature table to the authoritative ordered
//! feature-name list captured at training time: exactly those columns, in
//! that order, every cell numeric. Columns absent from the input are
//! filled with the neutral default 0; cells that fail numeric coercion
//! become 0. The single hard failure is an empty feature-name list, which
//! means no trained schema exists at all.

use crate::error::PitwallError;
use crate::frame::{self, Frame};
use ndarray::Array2;

/// Conform a frame to the authoritative feature list. Idempotent: a frame
/// already in conformant shape comes back unchanged.
pub fn conform_frame(input: &Frame, feature_names: &[String]) -> Result<Frame, PitwallError> {
    if feature_names.is_empty() {
        return Err(PitwallError::SchemaUnavailable(
            "feature-name list is empty; train a model first".to_string(),
        ));
    }

    let rows = input.num_rows();
    let mut out = Frame::new();
    for name in feature_names {
        let cells = match input.column(name) {
            Some(col) => col.iter().map(|v| frame::num(frame::coerce_f64(v))).collect(),
            None => vec![frame::num(0.0); rows],
        };
        out.set_column(name.clone(), cells);
    }
    Ok(out)
}

/// Dense numeric matrix from a conformant frame, rows x features.
pub fn to_matrix(conformant: &Frame) -> Array2<f64> {
    let rows = conformant.num_rows();
    let names = conformant.column_names();
    let mut matrix = Array2::<f64>::zeros((rows, names.len()));
    for (j, name) in names.iter().enumerate() {
        if let Some(col) = conformant.column(name) {
            for (i, cell) in col.iter().enumerate() {
                matrix[(i, j)] = frame::coerce_f64(cell);
            }
        }
    }
    matrix
}

/// Reconcile and densify in one step.
pub fn conform(input: &Frame, feature_names: &[String]) -> Result<Array2<f64>, PitwallError> {
    Ok(to_matrix(&conform_frame(input, feature_names)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_output_matches_schema_order_exactly() {
        let input = Frame::from_columns(vec![
            ("b".to_string(), vec![json!(2.0)]),
            ("a".to_string(), vec![json!(1.0)]),
            ("extra".to_string(), vec![json!(9.0)]),
        ]);
        let schema = names(&["a", "b", "c"]);
        let out = conform_frame(&input, &schema).unwrap();

        assert_eq!(out.column_names(), vec!["a", "b", "c"]);
        let matrix = to_matrix(&out);
        assert_eq!(matrix[(0, 0)], 1.0);
        assert_eq!(matrix[(0, 1)], 2.0);
        assert_eq!(matrix[(0, 2)], 0.0); // missing column filled with 0
    }

    #[test]
    fn test_missing_column_filled_for_every_row() {
        let input = Frame::from_columns(vec![(
            "present".to_string(),
            vec![json!(1.0), json!(2.0), json!(3.0)],
        )]);
        let out = conform_frame(&input, &names(&["present", "absent"])).unwrap();
        let absent = out.column("absent").unwrap();
        assert_eq!(absent.len(), 3);
        assert!(absent.iter().all(|v| frame::coerce_f64(v) == 0.0));
    }

    #[test]
    fn test_reconciliation_is_idempotent() {
        let schema = names(&["x", "y"]);
        let input = Frame::from_columns(vec![
            ("x".to_string(), vec![json!("5"), Value::Null]),
            ("y".to_string(), vec![json!(1.5), json!(true)]),
        ]);
        let once = conform_frame(&input, &schema).unwrap();
        let twice = conform_frame(&once, &schema).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_coercion_failures_become_zero() {
        let input = Frame::from_columns(vec![(
            "x".to_string(),
            vec![json!("not numeric"), Value::Null, json!("3.5")],
        )]);
        let matrix = conform(&input, &names(&["x"])).unwrap();
        assert_eq!(matrix[(0, 0)], 0.0);
        assert_eq!(matrix[(1, 0)], 0.0);
        assert_eq!(matrix[(2, 0)], 3.5);
    }

    #[test]
    fn test_empty_schema_is_the_hard_failure() {
        let input = Frame::from_columns(vec![("x".to_string(), vec![json!(1.0)])]);
        let err = conform_frame(&input, &[]).unwrap_err();
        assert!(matches!(err, PitwallError::SchemaUnavailable(_)));
    }

    #[test]
    fn test_empty_input_produces_zero_row_matrix() {
        let matrix = conform(&Frame::new(), &names(&["a", "b"])).unwrap();
        assert_eq!(matrix.dim(), (0, 2));
    }
}
