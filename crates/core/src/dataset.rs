//! Collections of unit-aware variables
//!
//! A [`Dataset`] holds named [`UnitfulArray`]s sharing dimension names and
//! applies arithmetic variable by variable. Against another dataset,
//! variables are paired by name and those present on only one side are
//! dropped; against a single operand, every variable takes part.

use crate::array::ArithOp;
use crate::error::{ArrayError, UnitResult};
use crate::ops::{AsOperand, Operand, UnitfulArray};
use std::collections::BTreeMap;
use std::ops::Index;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    variables: BTreeMap<String, UnitfulArray>,
}

/// Right-hand side of dataset arithmetic
pub trait DatasetOperand {
    /// Operand to pair with the variable called `name`; `None` drops it.
    fn for_variable(&self, name: &str) -> Option<Operand<'_>>;
}

impl<T: AsOperand + ?Sized> DatasetOperand for T {
    fn for_variable(&self, _name: &str) -> Option<Operand<'_>> {
        Some(self.as_operand())
    }
}

impl DatasetOperand for Dataset {
    fn for_variable(&self, name: &str) -> Option<Operand<'_>> {
        self.variables.get(name).map(AsOperand::as_operand)
    }
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_variable(mut self, name: &str, variable: UnitfulArray) -> Self {
        self.insert(name, variable);
        self
    }

    pub fn insert(&mut self, name: &str, variable: UnitfulArray) {
        self.variables.insert(name.to_string(), variable);
    }

    pub fn get(&self, name: &str) -> Option<&UnitfulArray> {
        self.variables.get(name)
    }

    pub fn variable(&self, name: &str) -> UnitResult<&UnitfulArray> {
        self.get(name)
            .ok_or_else(|| ArrayError::MissingVariable(name.to_string()).into())
    }

    /// Variable names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// A dataset with only the named variables
    pub fn select(&self, names: &[&str]) -> UnitResult<Dataset> {
        let mut selected = Dataset::new();
        for name in names {
            selected.insert(name, self.variable(name)?.clone());
        }
        Ok(selected)
    }

    /// Mean along `dim` for every variable that has it; others are kept as-is.
    pub fn mean(&self, dim: &str) -> UnitResult<Dataset> {
        let mut reduced = Dataset::new();
        for (name, variable) in &self.variables {
            let value = if variable.dims().iter().any(|d| d == dim) {
                variable.mean(dim)?
            } else {
                variable.clone()
            };
            reduced.insert(name, value);
        }
        Ok(reduced)
    }

    pub fn add<R: DatasetOperand + ?Sized>(&self, rhs: &R) -> UnitResult<Dataset> {
        self.apply(ArithOp::Add, rhs)
    }

    pub fn sub<R: DatasetOperand + ?Sized>(&self, rhs: &R) -> UnitResult<Dataset> {
        self.apply(ArithOp::Sub, rhs)
    }

    pub fn mul<R: DatasetOperand + ?Sized>(&self, rhs: &R) -> UnitResult<Dataset> {
        self.apply(ArithOp::Mul, rhs)
    }

    pub fn div<R: DatasetOperand + ?Sized>(&self, rhs: &R) -> UnitResult<Dataset> {
        self.apply(ArithOp::Div, rhs)
    }

    fn apply<R: DatasetOperand + ?Sized>(&self, op: ArithOp, rhs: &R) -> UnitResult<Dataset> {
        let mut result = Dataset::new();
        for (name, variable) in &self.variables {
            if let Some(operand) = rhs.for_variable(name) {
                result.insert(name, variable.apply(op, operand)?);
            }
        }
        Ok(result)
    }
}

impl Index<&str> for Dataset {
    type Output = UnitfulArray;

    fn index(&self, name: &str) -> &UnitfulArray {
        match self.variables.get(name) {
            Some(variable) => variable,
            None => panic!("dataset has no variable '{name}'"),
        }
    }
}
