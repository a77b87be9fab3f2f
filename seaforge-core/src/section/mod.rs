//! A single ocean section: one LME or one grid cell.

pub mod stage;
pub mod table;

pub use stage::{FactorSeries, SectionStage};
pub use table::{SectionRow, SectionTable, MONTHS_SINCE_EVENT_COLUMN};

use crate::error::{SeaweedError, SeaweedResult};
use crate::growth::FormulaConstants;
use crate::series::EnvironmentalSeries;
use seaforge_schemas::{growth::GrowthConfig, parameter::Parameter, region::RegionKey, time::TimeKey};
use std::collections::BTreeMap;
use tracing::debug;

/// Owns one region's environmental series and everything derived from it.
///
/// The stages must run in order: [`calculate_factors`](Self::calculate_factors),
/// [`calculate_growth_rate`](Self::calculate_growth_rate),
/// [`create_section_df`](Self::create_section_df). Skipping ahead fails with
/// [`SeaweedError::Precondition`]; repeating a finished stage is a no-op.
#[derive(Debug, Clone)]
pub struct OceanSection {
    key: RegionKey,
    series: EnvironmentalSeries,
    constants: FormulaConstants,
    months_since_event_start: Option<i64>,
    stage: SectionStage,
}

impl OceanSection {
    pub fn new(key: RegionKey, series: EnvironmentalSeries, config: &GrowthConfig) -> Self {
        Self {
            key,
            series,
            constants: FormulaConstants::for_version(config.formula_version),
            months_since_event_start: config.months_since_event_start,
            stage: SectionStage::Created,
        }
    }

    pub fn key(&self) -> RegionKey {
        self.key
    }

    pub fn series(&self) -> &EnvironmentalSeries {
        &self.series
    }

    pub fn stage(&self) -> &SectionStage {
        &self.stage
    }

    /// Any column computed so far, raw inputs included.
    pub fn column(&self, parameter: Parameter) -> Option<&[f64]> {
        self.series
            .column(parameter)
            .or_else(|| self.stage.column(parameter))
    }

    pub fn growth_rate(&self) -> Option<&[f64]> {
        self.stage.column(Parameter::SeaweedGrowthRate)
    }

    fn precondition(&self, required: &'static str) -> SeaweedError {
        SeaweedError::Precondition {
            region: self.key,
            required,
            actual: self.stage.name(),
        }
    }

    fn already_done(&self, step: &str) {
        debug!(region = %self.key, stage = self.stage.name(), "{} already done", step);
    }

    pub fn calculate_factors(&mut self) -> SeaweedResult<()> {
        if self.stage.rank() > 0 {
            self.already_done("calculate_factors");
            return Ok(());
        }
        let factors = FactorSeries::from_environment(&self.series, &self.constants)?;
        self.stage = SectionStage::FactorsComputed { factors };
        Ok(())
    }

    pub fn calculate_growth_rate(&mut self) -> SeaweedResult<()> {
        let growth_rate = match &self.stage {
            SectionStage::Created => return Err(self.precondition("FactorsComputed")),
            SectionStage::FactorsComputed { factors } => factors.growth_rate()?,
            SectionStage::GrowthComputed { .. } | SectionStage::TableBuilt { .. } => {
                self.already_done("calculate_growth_rate");
                return Ok(());
            }
        };

        self.stage = match std::mem::take(&mut self.stage) {
            SectionStage::FactorsComputed { factors } => SectionStage::GrowthComputed {
                factors,
                growth_rate,
            },
            other => other,
        };
        Ok(())
    }

    /// Joins raw inputs, factors and growth rate into one table.
    pub fn create_section_df(&mut self) -> SeaweedResult<()> {
        match &self.stage {
            SectionStage::Created | SectionStage::FactorsComputed { .. } => {
                return Err(self.precondition("GrowthComputed"))
            }
            SectionStage::TableBuilt { .. } => {
                self.already_done("create_section_df");
                return Ok(());
            }
            SectionStage::GrowthComputed { .. } => {}
        }

        if let SectionStage::GrowthComputed {
            factors,
            growth_rate,
        } = std::mem::take(&mut self.stage)
        {
            let table = self.build_table(factors, growth_rate);
            self.stage = SectionStage::TableBuilt { table };
        }
        Ok(())
    }

    fn build_table(&self, factors: FactorSeries, growth_rate: Vec<f64>) -> SectionTable {
        let mut columns = BTreeMap::new();
        for parameter in Parameter::ALL.into_iter().filter(|p| p.is_raw()) {
            if let Some(values) = self.series.column(parameter) {
                columns.insert(parameter, values.to_vec());
            }
        }

        let FactorSeries {
            illumination,
            temperature,
            salinity,
            nutrient,
            self_shading,
        } = factors;
        columns.insert(Parameter::IlluminationFactor, illumination);
        columns.insert(Parameter::TempFactor, temperature);
        columns.insert(Parameter::SalinityFactor, salinity);
        columns.insert(Parameter::NutrientFactor, nutrient.nutrient);
        columns.insert(Parameter::NitrateSubfactor, nutrient.nitrate);
        columns.insert(Parameter::AmmoniumSubfactor, nutrient.ammonium);
        columns.insert(Parameter::PhosphateSubfactor, nutrient.phosphate);
        if let Some(self_shading) = self_shading {
            columns.insert(Parameter::SelfShadingFactor, self_shading);
        }
        columns.insert(Parameter::SeaweedGrowthRate, growth_rate);

        let months_since_event = self
            .months_since_event_start
            .map(|start| (start..).take(self.series.len()).collect());

        SectionTable::new(
            self.key,
            self.series.index().to_vec(),
            months_since_event,
            columns,
        )
    }

    /// The section table; fails until [`create_section_df`](Self::create_section_df) ran.
    pub fn section_df(&self) -> SeaweedResult<&SectionTable> {
        match &self.stage {
            SectionStage::TableBuilt { table } => Ok(table),
            _ => Err(self.precondition("TableBuilt")),
        }
    }

    pub fn select_section_df_date(&self, key: &TimeKey) -> SeaweedResult<SectionRow> {
        let table = self.section_df()?;
        table
            .position(key)
            .and_then(|position| table.row_at(position))
            .ok_or_else(|| SeaweedError::TimeKeyNotFound {
                region: self.key,
                key: key.to_string(),
            })
    }

    /// Row lookup by the months-since-event column.
    pub fn select_section_df_months(&self, months: i64) -> SeaweedResult<SectionRow> {
        let table = self.section_df()?;
        if table.months_since_event().is_none() {
            return Err(SeaweedError::ColumnNotFound {
                region: self.key,
                column: MONTHS_SINCE_EVENT_COLUMN.to_string(),
            });
        }
        table
            .position_by_months(months)
            .and_then(|position| table.row_at(position))
            .ok_or_else(|| SeaweedError::TimeKeyNotFound {
                region: self.key,
                key: format!("{} = {}", MONTHS_SINCE_EVENT_COLUMN, months),
            })
    }

    /// Mean growth rate over the whole series, skipping missing months.
    /// `nan` when no month has data.
    pub fn calculate_mean_growth_rate(&self) -> SeaweedResult<f64> {
        let table = self.section_df()?;
        let growth_rate = table
            .column(Parameter::SeaweedGrowthRate)
            .ok_or_else(|| SeaweedError::ColumnNotFound {
                region: self.key,
                column: Parameter::SeaweedGrowthRate.to_string(),
            })?;
        Ok(nan_mean(growth_rate))
    }
}

/// Arithmetic mean of the non-`nan` values.
pub fn nan_mean(values: &[f64]) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}
