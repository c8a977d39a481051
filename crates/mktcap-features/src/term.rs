//! Arithmetic over statement columns.
//!
//! Ratio numerators and denominators are small expressions over column
//! values. Arithmetic follows floating-point rules: a null operand makes
//! the result null, and division by zero yields an infinity or NaN that the
//! pipeline cleans up at the end.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Nullable column values keyed by column name.
pub type InputColumns = HashMap<String, Vec<Option<f64>>>;

/// An expression over the columns of one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Term {
    /// The value of a column.
    Field(String),
    /// Absolute value of a term.
    Abs(Box<Term>),
    /// A constant.
    Constant(f64),
    /// Sum of terms.
    Sum(Vec<Term>),
    /// First term minus second term.
    Difference(Box<Term>, Box<Term>),
}

impl Term {
    /// A column reference.
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }

    /// Absolute value of a column.
    pub fn abs_field(name: impl Into<String>) -> Self {
        Self::Abs(Box::new(Self::field(name)))
    }

    /// Sum of the given columns.
    pub fn sum_of(names: &[&str]) -> Self {
        Self::Sum(names.iter().map(|n| Self::field(*n)).collect())
    }

    /// `left - right`.
    pub fn difference(left: Self, right: Self) -> Self {
        Self::Difference(Box::new(left), Box::new(right))
    }

    /// Column names this term reads, in first-use order without repeats.
    pub fn fields(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields(&self, out: &mut Vec<String>) {
        match self {
            Self::Field(name) => {
                if !out.contains(name) {
                    out.push(name.clone());
                }
            }
            Self::Abs(inner) => inner.collect_fields(out),
            Self::Constant(_) => {}
            Self::Sum(terms) => terms.iter().for_each(|t| t.collect_fields(out)),
            Self::Difference(left, right) => {
                left.collect_fields(out);
                right.collect_fields(out);
            }
        }
    }

    /// Evaluates the term at `row`. Columns absent from `columns` read as null.
    pub fn value_at(&self, columns: &InputColumns, row: usize) -> Option<f64> {
        match self {
            Self::Field(name) => columns.get(name).and_then(|c| c.get(row).copied().flatten()),
            Self::Abs(inner) => inner.value_at(columns, row).map(f64::abs),
            Self::Constant(value) => Some(*value),
            Self::Sum(terms) => terms
                .iter()
                .map(|t| t.value_at(columns, row))
                .sum::<Option<f64>>(),
            Self::Difference(left, right) => {
                Some(left.value_at(columns, row)? - right.value_at(columns, row)?)
            }
        }
    }

    /// Evaluates the term for `rows` rows.
    pub fn evaluate(&self, columns: &InputColumns, rows: usize) -> Vec<Option<f64>> {
        (0..rows).map(|row| self.value_at(columns, row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> InputColumns {
        let mut columns = InputColumns::new();
        columns.insert("a".to_string(), vec![Some(1.0), Some(-2.0), None]);
        columns.insert("b".to_string(), vec![Some(10.0), Some(20.0), Some(30.0)]);
        columns
    }

    #[test]
    fn test_field_and_abs() {
        let cols = columns();
        assert_eq!(Term::field("a").evaluate(&cols, 3), vec![Some(1.0), Some(-2.0), None]);
        assert_eq!(Term::abs_field("a").value_at(&cols, 1), Some(2.0));
    }

    #[test]
    fn test_sum_propagates_null() {
        let cols = columns();
        let sum = Term::sum_of(&["a", "b"]);
        assert_eq!(sum.evaluate(&cols, 3), vec![Some(11.0), Some(18.0), None]);
    }

    #[test]
    fn test_difference_with_constant() {
        let cols = columns();
        let term = Term::difference(
            Term::Sum(vec![Term::field("b"), Term::Constant(0.5)]),
            Term::field("a"),
        );
        assert_eq!(term.value_at(&cols, 0), Some(9.5));
        assert_eq!(term.value_at(&cols, 2), None);
    }

    #[test]
    fn test_unknown_field_is_null() {
        let cols = columns();
        assert_eq!(Term::field("missing").value_at(&cols, 0), None);
    }

    #[test]
    fn test_fields_deduplicated() {
        let term = Term::difference(Term::sum_of(&["a", "b"]), Term::abs_field("a"));
        assert_eq!(term.fields(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_serde_shape() {
        let term = Term::difference(Term::field("x"), Term::Constant(1.0));
        let json = serde_json::to_string(&term).unwrap();
        assert_eq!(json, r#"{"difference":[{"field":"x"},{"constant":1.0}]}"#);
    }
}
