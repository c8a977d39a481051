//! Nearest-period classification.

use crate::{circular::CircularScale, reference::PeriodReferenceTable};
use mktcap_traits::{
    Result,
    types::{f64_column, str_column},
};
use polars::prelude::*;
use tracing::debug;

/// Assigns observations to the reference period with the closest
/// representative day.
///
/// Labels are visited in table order and a label replaces the current best
/// only when strictly closer, so the first label wins exact ties.
#[derive(Debug, Clone, Copy)]
pub struct PeriodInferer<'a> {
    table: &'a PeriodReferenceTable,
    scale: CircularScale,
}

impl<'a> PeriodInferer<'a> {
    /// Creates an inferer measuring distances on `scale`.
    pub const fn new(table: &'a PeriodReferenceTable, scale: CircularScale) -> Self {
        Self { table, scale }
    }

    /// Creates an inferer using the scale the table was built on.
    pub const fn for_table(table: &'a PeriodReferenceTable) -> Self {
        Self::new(table, table.scale())
    }

    /// Infers the period label for an observation of `entity` at `observed`.
    ///
    /// Returns `None` when the entity is not in the table (or has no
    /// periods); callers decide how to treat unknown entities.
    pub fn infer(&self, entity: &str, observed: f64) -> Option<String> {
        self.infer_with_distance(entity, observed)
            .map(|(label, _)| label.to_string())
    }

    /// Like [`infer`](Self::infer), also returning the winning distance.
    pub fn infer_with_distance(&self, entity: &str, observed: f64) -> Option<(&'a str, f64)> {
        let Some(periods) = self.table.periods(entity) else {
            debug!(entity, "unknown entity in period reference table");
            return None;
        };

        let mut best: Option<(&'a str, f64)> = None;
        let mut best_distance = f64::INFINITY;
        for (label, reference) in periods {
            let distance = self.scale.distance(observed, *reference);
            if distance < best_distance {
                best_distance = distance;
                best = Some((label.as_str(), distance));
            }
        }
        best
    }

    /// Infers a label for every row of `df` and appends it as `output_column`.
    ///
    /// Rows with a null entity or value, or an unknown entity, get a null
    /// label.
    ///
    /// # Errors
    ///
    /// Returns an error if either input column is missing.
    pub fn infer_column(
        &self,
        df: &DataFrame,
        entity_column: &str,
        value_column: &str,
        output_column: &str,
    ) -> Result<DataFrame> {
        let entities = str_column(df, entity_column)?;
        let values = f64_column(df, value_column)?;

        let labels: Vec<Option<String>> = entities
            .iter()
            .zip(&values)
            .map(|(entity, value)| match (entity, value) {
                (Some(entity), Some(value)) => self.infer(entity, *value),
                _ => None,
            })
            .collect();

        let unresolved = labels.iter().filter(|l| l.is_none()).count();
        debug!(rows = labels.len(), unresolved, "inferred reporting periods");

        let mut out = df.clone();
        out.with_column(Series::new(output_column.into(), labels))?;
        Ok(out)
    }
}
