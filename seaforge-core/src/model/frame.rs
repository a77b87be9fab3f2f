use crate::section::SectionRow;
use seaforge_schemas::{parameter::Parameter, region::RegionKey, time::TimeKey};
use std::collections::{BTreeMap, BTreeSet};

/// Every section's row for one point in time; rows are regions.
#[derive(Debug, Clone, PartialEq)]
pub struct DateFrame {
    /// Human-readable description of the selected time point.
    pub selector: String,
    pub rows: BTreeMap<RegionKey, SectionRow>,
}

impl DateFrame {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Union of the parameters present in any row, in column order.
    pub fn parameters(&self) -> Vec<Parameter> {
        self.rows
            .values()
            .flat_map(|row| row.values.keys().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn n_columns(&self) -> usize {
        self.parameters().len()
    }

    pub fn get(&self, region: &RegionKey, parameter: Parameter) -> Option<f64> {
        self.rows.get(region)?.get(parameter)
    }
}

/// One parameter's complete time series for every section; rows are
/// timesteps, columns are regions. This is what clustering consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterFrame {
    pub parameter: Parameter,
    pub index: Vec<TimeKey>,
    pub columns: BTreeMap<RegionKey, Vec<f64>>,
}

impl ParameterFrame {
    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, region: &RegionKey) -> Option<&[f64]> {
        self.columns.get(region).map(Vec::as_slice)
    }

    /// Values of every region at timestep `position`, in region order;
    /// `None` past the last timestep.
    pub fn row(&self, position: usize) -> Option<Vec<f64>> {
        self.columns
            .values()
            .map(|values| values.get(position).copied())
            .collect()
    }

    pub fn regions(&self) -> impl Iterator<Item = &RegionKey> {
        self.columns.keys()
    }
}
