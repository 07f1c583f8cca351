//! Output serialization for mediation results.
//!
//! The core defines the column schema only; persistence belongs to an
//! external writer. This module renders the final table (and individual
//! records) as JSON for such writers.

mod json;

pub use json::{to_json, to_json_pretty};
