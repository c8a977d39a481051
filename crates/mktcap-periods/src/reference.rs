//! Per-entity reference days for each reporting period.

use crate::circular::CircularScale;
use mktcap_traits::{
    MktcapError, Result,
    types::{f64_column, str_column},
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::Path};
use tracing::{debug, info};

/// Separator between entity levels when more than one column forms the key.
pub const ENTITY_KEY_SEPARATOR: &str = "/";

/// Entity → period label → representative (circular-mean) position.
///
/// Labels iterate in ascending order, which fixes the tie-break order used
/// by [`PeriodInferer`](crate::PeriodInferer). The table is immutable once
/// built; share it behind an `Arc` or a
/// [`ReferenceTableHandle`](crate::ReferenceTableHandle).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodReferenceTable {
    scale: CircularScale,
    entries: BTreeMap<String, BTreeMap<String, f64>>,
}

impl PeriodReferenceTable {
    /// Creates a table from already computed reference values.
    pub const fn from_entries(
        scale: CircularScale,
        entries: BTreeMap<String, BTreeMap<String, f64>>,
    ) -> Self {
        Self { scale, entries }
    }

    /// The scale the reference values live on.
    pub const fn scale(&self) -> CircularScale {
        self.scale
    }

    /// Reference values for one entity, keyed by period label.
    pub fn periods(&self, entity: &str) -> Option<&BTreeMap<String, f64>> {
        self.entries.get(entity)
    }

    /// Reference value for one entity and period.
    pub fn reference(&self, entity: &str, label: &str) -> Option<f64> {
        self.entries.get(entity)?.get(label).copied()
    }

    /// Known entities in ascending order.
    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entities.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serializes the table to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a table from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Writes the table as JSON to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error on serialization or I/O failure.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Reads a table from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure or malformed JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

/// Builds a [`PeriodReferenceTable`] from historical observations.
///
/// # Example
///
/// ```ignore
/// use mktcap_periods::PeriodReferenceBuilder;
///
/// let builder = PeriodReferenceBuilder::new(0.0, 365.0)?;
/// let table = builder.build(&filings, "fillingDate_yday", &["symbol", "period"])?;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PeriodReferenceBuilder {
    scale: CircularScale,
}

impl PeriodReferenceBuilder {
    /// Creates a builder for values on the cycle `[low, high)`.
    ///
    /// # Errors
    ///
    /// Returns [`MktcapError::DegenerateRange`] when `low >= high`.
    pub fn new(low: f64, high: f64) -> Result<Self> {
        Ok(Self {
            scale: CircularScale::new(low, high)?,
        })
    }

    /// Creates a builder for an existing scale.
    pub const fn with_scale(scale: CircularScale) -> Self {
        Self { scale }
    }

    /// The scale used for circular means.
    pub const fn scale(&self) -> CircularScale {
        self.scale
    }

    /// Groups `df` by `group_levels` and takes the circular mean of
    /// `periodic_column` within each group.
    ///
    /// The last level is the period label; the preceding levels form the
    /// entity key, joined with [`ENTITY_KEY_SEPARATOR`] when there are
    /// several. Rows with a null key are skipped, as are null values. A
    /// group with no usable value produces no entry.
    ///
    /// # Errors
    ///
    /// Returns [`MktcapError::InvalidData`] for fewer than two levels and
    /// [`MktcapError::MissingColumn`] for absent columns.
    pub fn build(
        &self,
        df: &DataFrame,
        periodic_column: &str,
        group_levels: &[&str],
    ) -> Result<PeriodReferenceTable> {
        let Some((label_level, entity_levels)) = group_levels.split_last() else {
            return Err(MktcapError::InvalidData(
                "group levels must not be empty".to_string(),
            ));
        };
        if entity_levels.is_empty() {
            return Err(MktcapError::InvalidData(format!(
                "group levels need an entity column before the period label {label_level}"
            )));
        }

        let values = f64_column(df, periodic_column)?;
        let labels = str_column(df, label_level)?;
        let entity_columns = entity_levels
            .iter()
            .map(|level| str_column(df, level))
            .collect::<Result<Vec<_>>>()?;

        let mut groups: BTreeMap<(String, String), Vec<f64>> = BTreeMap::new();
        for (row, value) in values.iter().enumerate() {
            let Some(label) = labels[row].as_ref() else {
                continue;
            };
            let Some(entity) = entity_key(&entity_columns, row) else {
                continue;
            };
            let group = groups.entry((entity, label.clone())).or_default();
            if let Some(v) = value {
                group.push(*v);
            }
        }

        Ok(self.build_from_groups(groups))
    }

    /// Builds a table from `(entity, label, value)` records.
    pub fn build_from_records<I, E, L>(&self, records: I) -> PeriodReferenceTable
    where
        I: IntoIterator<Item = (E, L, f64)>,
        E: Into<String>,
        L: Into<String>,
    {
        let mut groups: BTreeMap<(String, String), Vec<f64>> = BTreeMap::new();
        for (entity, label, value) in records {
            groups
                .entry((entity.into(), label.into()))
                .or_default()
                .push(value);
        }
        self.build_from_groups(groups)
    }

    fn build_from_groups(
        &self,
        groups: BTreeMap<(String, String), Vec<f64>>,
    ) -> PeriodReferenceTable {
        let mut entries: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
        let mut skipped = 0usize;
        for ((entity, label), values) in groups {
            match self.scale.mean(&values) {
                Some(mean) => {
                    entries.entry(entity).or_default().insert(label, mean);
                }
                None => {
                    debug!(entity = %entity, label = %label, "no usable values for period group");
                    skipped += 1;
                }
            }
        }

        info!(
            entities = entries.len(),
            skipped_groups = skipped,
            "built period reference table"
        );
        PeriodReferenceTable::from_entries(self.scale, entries)
    }
}

fn entity_key(columns: &[Vec<Option<String>>], row: usize) -> Option<String> {
    let parts = columns
        .iter()
        .map(|column| column[row].as_deref())
        .collect::<Option<Vec<&str>>>()?;
    Some(parts.join(ENTITY_KEY_SEPARATOR))
}
