//! Row-to-feature transform.
//!
//! Converts upstream table rows into point and line features. Bad cell
//! data never fails the pipeline; it only drops the affected feature.

pub mod coordinates;
pub mod transform;

pub use coordinates::{coordinates_from_value, parse_coordinates};
pub use transform::{parse_decimal, transform_row, Transformed};
