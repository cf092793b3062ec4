//! Default (unit-unaware) operator implementations of the host array
//!
//! [`HostOperators`] is a table of the raw arithmetic functions, keyed by
//! [`ArithOp`]. The unit layer captures a copy when it is activated and
//! delegates the numeric work of every operator through it.

use super::labeled::{ArithOp, LabeledArray, Payload};
use crate::error::ArrayResult;
use std::fmt;

/// Raw elementwise operator: `lhs <op> rhs`, optionally keeping `lhs` attrs.
pub type RawOperator = fn(&LabeledArray, Payload<'_>, bool) -> ArrayResult<LabeledArray>;

#[derive(Clone, Copy)]
pub struct HostOperators {
    add: RawOperator,
    sub: RawOperator,
    mul: RawOperator,
    div: RawOperator,
}

impl HostOperators {
    /// The host array's own arithmetic
    pub fn defaults() -> Self {
        HostOperators {
            add: raw_add,
            sub: raw_sub,
            mul: raw_mul,
            div: raw_div,
        }
    }

    pub fn get(&self, op: ArithOp) -> RawOperator {
        match op {
            ArithOp::Add => self.add,
            ArithOp::Sub => self.sub,
            ArithOp::Mul => self.mul,
            ArithOp::Div => self.div,
        }
    }

    pub fn apply(
        &self,
        op: ArithOp,
        lhs: &LabeledArray,
        rhs: Payload<'_>,
        keep_attrs: bool,
    ) -> ArrayResult<LabeledArray> {
        (self.get(op))(lhs, rhs, keep_attrs)
    }
}

impl Default for HostOperators {
    fn default() -> Self {
        Self::defaults()
    }
}

impl fmt::Debug for HostOperators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostOperators").finish_non_exhaustive()
    }
}

fn raw_add(lhs: &LabeledArray, rhs: Payload<'_>, keep_attrs: bool) -> ArrayResult<LabeledArray> {
    lhs.binary(rhs, ArithOp::Add, keep_attrs)
}

fn raw_sub(lhs: &LabeledArray, rhs: Payload<'_>, keep_attrs: bool) -> ArrayResult<LabeledArray> {
    lhs.binary(rhs, ArithOp::Sub, keep_attrs)
}

fn raw_mul(lhs: &LabeledArray, rhs: Payload<'_>, keep_attrs: bool) -> ArrayResult<LabeledArray> {
    lhs.binary(rhs, ArithOp::Mul, keep_attrs)
}

fn raw_div(lhs: &LabeledArray, rhs: Payload<'_>, keep_attrs: bool) -> ArrayResult<LabeledArray> {
    lhs.binary(rhs, ArithOp::Div, keep_attrs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_dispatches_each_operator() {
        let ops = HostOperators::defaults();
        let a = LabeledArray::from_vec("x", vec![6.0, 8.0]);
        let expected = [[8.0, 10.0], [4.0, 6.0], [12.0, 16.0], [3.0, 4.0]];
        for (op, want) in ArithOp::ALL.into_iter().zip(expected) {
            let r = ops.apply(op, &a, Payload::Scalar(2.0), false).unwrap();
            assert_eq!(r.values(), want.to_vec(), "operator {}", op.symbol());
        }
    }
}
