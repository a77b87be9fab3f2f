//! The seaweed model: a collection of ocean sections computed in lockstep.

pub mod frame;
pub mod source;

pub use frame::{DateFrame, ParameterFrame};
pub use source::{GridSource, LmeSource};

use crate::error::{SeaweedError, SeaweedResult};
use crate::section::{OceanSection, SectionRow, MONTHS_SINCE_EVENT_COLUMN};
use rayon::prelude::*;
use seaforge_schemas::{
    growth::GrowthConfig,
    parameter::Parameter,
    region::{IngestionMode, LmeId, RegionKey},
    time::TimeKey,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Wraps every ocean section of one run behind a small interface.
///
/// A model is filled exactly once, either by LME or by grid cell. Sections
/// are independent of each other, so the per-section stages are dispatched
/// in parallel.
#[derive(Debug, Default)]
pub struct SeaweedModel {
    sections: BTreeMap<RegionKey, OceanSection>,
    mode: Option<IngestionMode>,
    config: GrowthConfig,
}

impl SeaweedModel {
    /// Creates an empty model with the default constants.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: GrowthConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &GrowthConfig {
        &self.config
    }

    pub fn mode(&self) -> Option<IngestionMode> {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn sections(&self) -> &BTreeMap<RegionKey, OceanSection> {
        &self.sections
    }

    pub fn section(&self, key: &RegionKey) -> SeaweedResult<&OceanSection> {
        self.sections
            .get(key)
            .ok_or(SeaweedError::RegionNotFound(*key))
    }

    fn ensure_empty(&self) -> SeaweedResult<()> {
        match self.mode {
            Some(mode) => Err(SeaweedError::AlreadyIngested(mode)),
            None => Ok(()),
        }
    }

    fn ingest(&mut self, mode: IngestionMode, sections: Vec<OceanSection>) {
        info!(%mode, sections = sections.len(), "Ingested ocean sections");
        self.sections = sections.into_iter().map(|s| (s.key(), s)).collect();
        self.mode = Some(mode);
    }

    /// Adds one section per LME in `lme_ids`.
    ///
    /// Nothing is added if any LME fails to load.
    pub fn add_data_by_lme<S>(&mut self, lme_ids: &[LmeId], source: &S) -> SeaweedResult<()>
    where
        S: LmeSource + ?Sized,
    {
        self.ensure_empty()?;
        let sections = lme_ids
            .iter()
            .map(|&lme| {
                let series = source.provide_data_lme(lme)?;
                Ok(OceanSection::new(RegionKey::lme(lme), series, &self.config))
            })
            .collect::<SeaweedResult<Vec<_>>>()?;
        self.ingest(IngestionMode::Lme, sections);
        Ok(())
    }

    /// Adds one section per grid cell the source holds.
    pub fn add_data_by_grid<S>(&mut self, source: &S) -> SeaweedResult<()>
    where
        S: GridSource + ?Sized,
    {
        self.ensure_empty()?;
        let sections = source
            .grid_cells()
            .into_iter()
            .map(|cell| {
                let series = source.provide_data_grid(cell)?;
                Ok(OceanSection::new(RegionKey::Grid { cell }, series, &self.config))
            })
            .collect::<SeaweedResult<Vec<_>>>()?;
        self.ingest(IngestionMode::Grid, sections);
        Ok(())
    }

    fn broadcast<F>(&mut self, step: &str, f: F) -> SeaweedResult<()>
    where
        F: Fn(&mut OceanSection) -> SeaweedResult<()> + Sync + Send,
    {
        info!(sections = self.sections.len(), "Running {}", step);
        self.sections
            .par_iter_mut()
            .try_for_each(|(_, section)| f(section))
    }

    pub fn calculate_factors(&mut self) -> SeaweedResult<()> {
        self.broadcast("calculate_factors", OceanSection::calculate_factors)
    }

    pub fn calculate_growth_rate(&mut self) -> SeaweedResult<()> {
        self.broadcast("calculate_growth_rate", OceanSection::calculate_growth_rate)
    }

    pub fn create_section_dfs(&mut self) -> SeaweedResult<()> {
        self.broadcast("create_section_dfs", OceanSection::create_section_df)
    }

    /// Runs all three stages on every section.
    pub fn run(&mut self) -> SeaweedResult<()> {
        self.calculate_factors()?;
        self.calculate_growth_rate()?;
        self.create_section_dfs()
    }

    fn collect_rows<F>(&self, selector: String, select: F) -> SeaweedResult<DateFrame>
    where
        F: Fn(&OceanSection) -> SeaweedResult<SectionRow>,
    {
        let rows = self
            .sections
            .iter()
            .map(|(key, section)| Ok((*key, select(section)?)))
            .collect::<SeaweedResult<BTreeMap<_, _>>>()?;
        Ok(DateFrame { selector, rows })
    }

    /// Every section's row at `key`.
    pub fn construct_df_from_sections_for_date(&self, key: &TimeKey) -> SeaweedResult<DateFrame> {
        self.collect_rows(key.to_string(), |section| section.select_section_df_date(key))
    }

    /// Every section's row at a months-since-event offset.
    pub fn construct_df_from_sections_for_months(&self, months: i64) -> SeaweedResult<DateFrame> {
        self.collect_rows(format!("{} = {}", MONTHS_SINCE_EVENT_COLUMN, months), |section| {
            section.select_section_df_months(months)
        })
    }

    /// Full time series of the column called `name` for every section.
    pub fn construct_df_for_parameter(&self, name: &str) -> SeaweedResult<ParameterFrame> {
        let parameter = name
            .parse::<Parameter>()
            .map_err(|_| SeaweedError::UnknownParameter(name.to_string()))?;
        self.parameter_frame(parameter)
    }

    /// One column per section. Sections that lack some timestep of the
    /// union index get `nan` there.
    pub fn parameter_frame(&self, parameter: Parameter) -> SeaweedResult<ParameterFrame> {
        let mut tables = Vec::with_capacity(self.sections.len());
        for (key, section) in &self.sections {
            let table = section.section_df()?;
            let values = table
                .column(parameter)
                .ok_or_else(|| SeaweedError::ColumnNotFound {
                    region: *key,
                    column: parameter.to_string(),
                })?;
            tables.push((*key, table.index(), values));
        }
        if tables.is_empty() {
            return Err(SeaweedError::EmptyModel);
        }

        let index: Vec<TimeKey> = tables
            .iter()
            .flat_map(|(_, keys, _)| keys.iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let columns = tables
            .into_iter()
            .map(|(key, keys, values)| {
                if keys == index.as_slice() {
                    return (key, values.to_vec());
                }
                debug!(region = %key, missing = index.len() - keys.len(), "Filling absent timesteps with nan");
                let by_time: BTreeMap<TimeKey, f64> =
                    keys.iter().copied().zip(values.iter().copied()).collect();
                let filled = index
                    .iter()
                    .map(|time| by_time.get(time).copied().unwrap_or(f64::NAN))
                    .collect();
                (key, filled)
            })
            .collect();

        Ok(ParameterFrame {
            parameter,
            index,
            columns,
        })
    }

    /// Mean growth rate of each section, missing months skipped.
    pub fn mean_growth_rates(&self) -> SeaweedResult<BTreeMap<RegionKey, f64>> {
        self.sections
            .iter()
            .map(|(key, section)| Ok((*key, section.calculate_mean_growth_rate()?)))
            .collect()
    }
}
