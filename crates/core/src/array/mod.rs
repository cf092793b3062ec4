//! Host containers: labeled arrays and their raw operators

pub mod labeled;
pub mod operators;

pub use labeled::{ArithOp, AttrValue, Attrs, LabeledArray, Payload, UNITS_KEY};
pub use operators::{HostOperators, RawOperator};
