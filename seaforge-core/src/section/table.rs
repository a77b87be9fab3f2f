use seaforge_schemas::{parameter::Parameter, region::RegionKey, time::TimeKey};
use serde::Serialize;
use std::collections::BTreeMap;

/// Name of the event-aligned month column in exported tables.
pub const MONTHS_SINCE_EVENT_COLUMN: &str = "months_since_war";

/// Raw, factor and growth columns of one region, indexed by time.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionTable {
    region: RegionKey,
    index: Vec<TimeKey>,
    months_since_event: Option<Vec<i64>>,
    columns: BTreeMap<Parameter, Vec<f64>>,
}

impl SectionTable {
    pub(crate) fn new(
        region: RegionKey,
        index: Vec<TimeKey>,
        months_since_event: Option<Vec<i64>>,
        columns: BTreeMap<Parameter, Vec<f64>>,
    ) -> Self {
        debug_assert!(columns.values().all(|c| c.len() == index.len()));
        Self {
            region,
            index,
            months_since_event,
            columns,
        }
    }

    pub fn region(&self) -> RegionKey {
        self.region
    }

    pub fn index(&self) -> &[TimeKey] {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn months_since_event(&self) -> Option<&[i64]> {
        self.months_since_event.as_deref()
    }

    /// Column names in export order.
    pub fn parameters(&self) -> impl Iterator<Item = Parameter> + '_ {
        self.columns.keys().copied()
    }

    pub fn column(&self, parameter: Parameter) -> Option<&[f64]> {
        self.columns.get(&parameter).map(Vec::as_slice)
    }

    pub fn position(&self, key: &TimeKey) -> Option<usize> {
        self.index.iter().position(|k| k == key)
    }

    pub fn position_by_months(&self, months: i64) -> Option<usize> {
        self.months_since_event.as_ref()?.iter().position(|&m| m == months)
    }

    /// The row at `position`, `None` past the end of the table.
    pub fn row_at(&self, position: usize) -> Option<SectionRow> {
        let time = *self.index.get(position)?;
        let values = self
            .columns
            .iter()
            .map(|(parameter, values)| Some((*parameter, *values.get(position)?)))
            .collect::<Option<_>>()?;
        Some(SectionRow {
            time,
            months_since_event: self
                .months_since_event
                .as_ref()
                .and_then(|m| m.get(position).copied()),
            values,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = SectionRow> + '_ {
        (0..self.len()).filter_map(|i| self.row_at(i))
    }
}

/// One timestep of a [`SectionTable`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionRow {
    pub time: TimeKey,
    pub months_since_event: Option<i64>,
    pub values: BTreeMap<Parameter, f64>,
}

impl SectionRow {
    pub fn get(&self, parameter: Parameter) -> Option<f64> {
        self.values.get(&parameter).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seaforge_schemas::region::LmeId;

    #[test]
    fn rows_past_the_end_are_none() {
        let region = RegionKey::lme(LmeId::new(3).unwrap());
        let columns = [(Parameter::SeaweedGrowthRate, vec![0.25, 0.5])]
            .into_iter()
            .collect();
        let table = SectionTable::new(
            region,
            vec![TimeKey::Month(0), TimeKey::Month(1)],
            Some(vec![-4, -3]),
            columns,
        );

        let row = table.row_at(1).unwrap();
        assert_eq!(row.time, TimeKey::Month(1));
        assert_eq!(row.months_since_event, Some(-3));
        assert_eq!(row.get(Parameter::SeaweedGrowthRate), Some(0.5));
        assert!(table.row_at(2).is_none());
        assert_eq!(table.rows().count(), 2);
    }
}
