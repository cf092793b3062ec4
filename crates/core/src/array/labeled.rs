//! Labeled N-dimensional arrays
//!
//! [`LabeledArray`] is the host container the unit layer works on: named
//! dimensions, an `f64` buffer and a string-keyed attribute map. It knows
//! nothing about units. Arithmetic broadcasts by dimension *name*: the result
//! has the left operand's dimensions followed by any dimensions only the right
//! operand has.

use crate::error::{ArrayError, ArrayResult};
use ndarray::{Array1, ArrayD, ArrayViewD, Axis, Zip};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Attribute key that carries the unit string.
pub const UNITS_KEY: &str = "units";

/// Metadata value stored in an array's attribute map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Str(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Str(s)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Float(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Bool(v) => write!(f, "{v}"),
            AttrValue::Int(v) => write!(f, "{v}"),
            AttrValue::Float(v) => write!(f, "{v}"),
            AttrValue::Str(v) => write!(f, "{v}"),
        }
    }
}

pub type Attrs = FxHashMap<String, AttrValue>;

/// Elementwise arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    pub const ALL: [ArithOp; 4] = [ArithOp::Add, ArithOp::Sub, ArithOp::Mul, ArithOp::Div];

    #[inline]
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            ArithOp::Add => a + b,
            ArithOp::Sub => a - b,
            ArithOp::Mul => a * b,
            ArithOp::Div => a / b,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            ArithOp::Add => '+',
            ArithOp::Sub => '-',
            ArithOp::Mul => '*',
            ArithOp::Div => '/',
        }
    }
}

/// Right-hand side of a raw arithmetic operation: the bare numeric payload.
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a> {
    Array(&'a LabeledArray),
    Scalar(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledArray {
    dims: Vec<String>,
    data: ArrayD<f64>,
    attrs: Attrs,
}

impl LabeledArray {
    /// Wrap `data`, naming each of its axes.
    pub fn new(dims: &[&str], data: ArrayD<f64>) -> ArrayResult<Self> {
        if dims.len() != data.ndim() {
            return Err(ArrayError::DimensionCountMismatch {
                ndim: data.ndim(),
                names: dims.len(),
            });
        }
        for (i, d) in dims.iter().enumerate() {
            if dims[..i].contains(d) {
                return Err(ArrayError::DuplicateDimension((*d).to_string()));
            }
        }
        Ok(LabeledArray {
            dims: dims.iter().map(|d| (*d).to_string()).collect(),
            data,
            attrs: Attrs::default(),
        })
    }

    /// One-dimensional array along `dim`
    pub fn from_vec(dim: &str, values: Vec<f64>) -> Self {
        LabeledArray {
            dims: vec![dim.to_string()],
            data: Array1::from(values).into_dyn(),
            attrs: Attrs::default(),
        }
    }

    /// Zero-dimensional array
    pub fn scalar(value: f64) -> Self {
        LabeledArray {
            dims: Vec::new(),
            data: ArrayD::from_elem(Vec::<usize>::new(), value),
            attrs: Attrs::default(),
        }
    }

    #[must_use]
    pub fn with_attr(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key.to_string(), value.into());
        self
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    /// Values in logical (row-major) order
    pub fn values(&self) -> Vec<f64> {
        self.data.iter().copied().collect()
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn attrs_mut(&mut self) -> &mut Attrs {
        &mut self.attrs
    }

    pub fn set_attr(&mut self, key: &str, value: impl Into<AttrValue>) {
        self.attrs.insert(key.to_string(), value.into());
    }

    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).and_then(AttrValue::as_str)
    }

    fn axis_of(&self, dim: &str) -> Option<usize> {
        self.dims.iter().position(|d| d == dim)
    }

    /// Size of the named dimension
    pub fn size(&self, dim: &str) -> Option<usize> {
        self.axis_of(dim).map(|i| self.data.len_of(Axis(i)))
    }

    /// Same dimensions and attributes with every value multiplied by `factor`
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        LabeledArray {
            dims: self.dims.clone(),
            data: self.data.mapv(|v| v * factor),
            attrs: self.attrs.clone(),
        }
    }

    /// Mean along `dim`. An empty dimension yields NaN.
    pub fn mean(&self, dim: &str, keep_attrs: bool) -> ArrayResult<Self> {
        let axis = self
            .axis_of(dim)
            .ok_or_else(|| ArrayError::UnknownDimension(dim.to_string()))?;
        let data = self.data.mean_axis(Axis(axis)).unwrap_or_else(|| {
            let mut shape = self.data.shape().to_vec();
            shape.remove(axis);
            ArrayD::from_elem(shape, f64::NAN)
        });
        let mut dims = self.dims.clone();
        dims.remove(axis);
        Ok(LabeledArray {
            dims,
            data,
            attrs: self.kept_attrs(keep_attrs),
        })
    }

    /// Elementwise `self <op> rhs`, broadcasting by dimension name.
    ///
    /// With `keep_attrs` the result carries this array's attributes, otherwise
    /// it has none.
    pub fn binary(&self, rhs: Payload<'_>, op: ArithOp, keep_attrs: bool) -> ArrayResult<Self> {
        match rhs {
            Payload::Scalar(s) => Ok(LabeledArray {
                dims: self.dims.clone(),
                data: self.data.mapv(|v| op.apply(v, s)),
                attrs: self.kept_attrs(keep_attrs),
            }),
            Payload::Array(other) => {
                let (dims, shape) = self.broadcast_shape(other)?;
                let left = self.aligned(&dims);
                let right = other.aligned(&dims);
                let (Some(left), Some(right)) = (
                    left.broadcast(shape.clone()),
                    right.broadcast(shape.clone()),
                ) else {
                    return Err(ArrayError::SizeMismatch {
                        dim: dims.join(", "),
                        left: self.data.len(),
                        right: other.data.len(),
                    });
                };
                let data = Zip::from(left)
                    .and(right)
                    .map_collect(|&a, &b| op.apply(a, b));
                Ok(LabeledArray {
                    dims,
                    data,
                    attrs: self.kept_attrs(keep_attrs),
                })
            }
        }
    }

    fn kept_attrs(&self, keep_attrs: bool) -> Attrs {
        if keep_attrs {
            self.attrs.clone()
        } else {
            Attrs::default()
        }
    }

    /// Result dimension names and sizes for `self <op> other`
    fn broadcast_shape(&self, other: &LabeledArray) -> ArrayResult<(Vec<String>, Vec<usize>)> {
        let mut dims = self.dims.clone();
        dims.extend(
            other
                .dims
                .iter()
                .filter(|d| self.axis_of(d).is_none())
                .cloned(),
        );
        let mut shape = Vec::with_capacity(dims.len());
        for d in &dims {
            let size = match (self.size(d), other.size(d)) {
                (Some(left), Some(right)) if left != right => {
                    return Err(ArrayError::SizeMismatch {
                        dim: d.clone(),
                        left,
                        right,
                    });
                }
                (Some(size), _) | (None, Some(size)) => size,
                (None, None) => 1,
            };
            shape.push(size);
        }
        Ok((dims, shape))
    }

    /// View with axes permuted into `dims` order and length-1 axes inserted
    /// for dimensions this array lacks.
    fn aligned(&self, dims: &[String]) -> ArrayViewD<'_, f64> {
        let perm: Vec<usize> = dims.iter().filter_map(|d| self.axis_of(d)).collect();
        let mut view = self.data.view().permuted_axes(perm);
        for (i, d) in dims.iter().enumerate() {
            if self.axis_of(d).is_none() {
                view = view.insert_axis(Axis(i));
            }
        }
        view
    }
}
