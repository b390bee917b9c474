//! Feature schema reconciliation pipeline
//!
//! The four stages that turn raw lap records into the fixed-width numeric
//! matrix the regressor consumes. Training runs normalize -> encode ->
//! derive and captures the schema; inference runs normalize -> encode ->
//! reconcile against the persisted schema, so the two paths can never
//! drift apart.

pub mod derive;
pub mod encode;
pub mod normalize;
pub mod reconcile;

pub use encode::{team_column_name, COMPOUNDS, TEAMS};
