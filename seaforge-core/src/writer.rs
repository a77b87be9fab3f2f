//! CSV and JSON outputs of a model run.
//!
//! Missing values are written as empty cells, which is also how the
//! readers expect them.

use crate::error::{SeaweedError, SeaweedResult};
use crate::model::{DateFrame, ParameterFrame, SeaweedModel};
use crate::section::{SectionTable, MONTHS_SINCE_EVENT_COLUMN};
use csv::Writer;
use seaforge_schemas::{
    growth::FormulaVersion,
    parameter::Parameter,
    region::{IngestionMode, RegionKey},
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

fn cell(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

/// A CSV file written one record at a time.
pub struct FrameWriter {
    writer: Writer<fs::File>,
    path: PathBuf,
}

impl FrameWriter {
    pub fn new(path: impl AsRef<Path>) -> SeaweedResult<Self> {
        let path = path.as_ref().to_path_buf();
        let writer = Writer::from_path(&path)
            .map_err(|e| SeaweedError::CsvError(path.display().to_string(), e))?;
        Ok(Self { writer, path })
    }

    fn csv_error(&self, e: csv::Error) -> SeaweedError {
        SeaweedError::CsvError(self.path.display().to_string(), e)
    }

    fn record<I, T>(&mut self, fields: I) -> SeaweedResult<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.writer.write_record(fields).map_err(|e| self.csv_error(e))
    }

    fn finish(mut self) -> SeaweedResult<()> {
        self.writer
            .flush()
            .map_err(|e| SeaweedError::FileIO(self.path.display().to_string(), e))
    }

    /// One row per timestep: `time`, optionally `months_since_war`, then
    /// every column of the table.
    pub fn write_section_table(mut self, table: &SectionTable) -> SeaweedResult<()> {
        let parameters: Vec<Parameter> = table.parameters().collect();
        let months = table.months_since_event();

        let mut header = vec!["time".to_string()];
        if months.is_some() {
            header.push(MONTHS_SINCE_EVENT_COLUMN.to_string());
        }
        header.extend(parameters.iter().map(|p| p.as_str().to_string()));
        self.record(&header)?;

        for row in table.rows() {
            let mut fields = vec![row.time.to_string()];
            if let Some(months) = row.months_since_event {
                fields.push(months.to_string());
            }
            fields.extend(
                parameters
                    .iter()
                    .map(|p| row.get(*p).map_or_else(String::new, cell)),
            );
            self.record(&fields)?;
        }
        self.finish()
    }

    /// Timesteps as rows, regions as columns.
    pub fn write_parameter_frame(mut self, frame: &ParameterFrame) -> SeaweedResult<()> {
        let mut header = vec!["time".to_string()];
        header.extend(frame.regions().map(RegionKey::to_string));
        self.record(&header)?;

        for (position, time) in frame.index.iter().enumerate() {
            let mut fields = vec![time.to_string()];
            fields.extend(frame.row(position).into_iter().flatten().map(cell));
            self.record(&fields)?;
        }
        self.finish()
    }

    /// Regions as rows, the selected timestep's columns as columns.
    pub fn write_date_frame(mut self, frame: &DateFrame) -> SeaweedResult<()> {
        let parameters = frame.parameters();
        let with_months = frame.rows.values().any(|r| r.months_since_event.is_some());

        let mut header = vec!["region".to_string(), "time".to_string()];
        if with_months {
            header.push(MONTHS_SINCE_EVENT_COLUMN.to_string());
        }
        header.extend(parameters.iter().map(|p| p.as_str().to_string()));
        self.record(&header)?;

        for (region, row) in &frame.rows {
            let mut fields = vec![region.to_string(), row.time.to_string()];
            if with_months {
                fields.push(row.months_since_event.map_or_else(String::new, |m| m.to_string()));
            }
            fields.extend(
                parameters
                    .iter()
                    .map(|p| row.get(*p).map_or_else(String::new, cell)),
            );
            self.record(&fields)?;
        }
        self.finish()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionSummary {
    pub region: RegionKey,
    pub months: usize,
    /// `None` when the section has no month with data.
    pub mean_growth_rate: Option<f64>,
}

/// Machine-readable overview of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub mode: Option<IngestionMode>,
    pub formula_version: FormulaVersion,
    pub sections: Vec<SectionSummary>,
}

impl RunSummary {
    pub fn from_model(model: &SeaweedModel) -> SeaweedResult<Self> {
        let means = model.mean_growth_rates()?;
        let sections = model
            .sections()
            .iter()
            .map(|(region, section)| SectionSummary {
                region: *region,
                months: section.series().len(),
                mean_growth_rate: means.get(region).copied().filter(|m| !m.is_nan()),
            })
            .collect();
        Ok(Self {
            mode: model.mode(),
            formula_version: model.config().formula_version,
            sections,
        })
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> SeaweedResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| SeaweedError::FileIO(path.display().to_string(), e))
    }
}
