use crate::error::{SeaweedError, SeaweedResult};
use seaforge_schemas::{
    environment::{clamp_non_negative, EnvironmentalRecord},
    parameter::Parameter,
    time::TimeKey,
};
use std::collections::HashSet;

/// Raw environmental observations of one region, aligned on a shared index.
///
/// Nitrate, ammonium and phosphate are floored at zero on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentalSeries {
    index: Vec<TimeKey>,
    illumination: Vec<f64>,
    temperature: Vec<f64>,
    salinity: Vec<f64>,
    nitrate: Vec<f64>,
    ammonium: Vec<f64>,
    phosphate: Vec<f64>,
    density: Option<Vec<f64>>,
}

impl EnvironmentalSeries {
    /// Builds a series from one record per timestep.
    ///
    /// Density is kept only when every record carries it.
    pub fn from_records<I>(records: I) -> SeaweedResult<Self>
    where
        I: IntoIterator<Item = (TimeKey, EnvironmentalRecord)>,
    {
        let mut series = Self {
            index: Vec::new(),
            illumination: Vec::new(),
            temperature: Vec::new(),
            salinity: Vec::new(),
            nitrate: Vec::new(),
            ammonium: Vec::new(),
            phosphate: Vec::new(),
            density: Some(Vec::new()),
        };

        for (key, record) in records {
            let record = record.with_clamped_nutrients();
            series.index.push(key);
            series.illumination.push(record.illumination);
            series.temperature.push(record.temperature);
            series.salinity.push(record.salinity);
            series.nitrate.push(record.nitrate);
            series.ammonium.push(record.ammonium);
            series.phosphate.push(record.phosphate);
            series.density = match (series.density.take(), record.density) {
                (Some(mut density), Some(value)) => {
                    density.push(value);
                    Some(density)
                }
                _ => None,
            };
        }
        if series.index.is_empty() {
            series.density = None;
        }

        check_unique(&series.index)?;
        Ok(series)
    }

    /// Builds a series from ready-made columns.
    #[allow(clippy::too_many_arguments)]
    pub fn from_columns(
        index: Vec<TimeKey>,
        illumination: Vec<f64>,
        temperature: Vec<f64>,
        salinity: Vec<f64>,
        nitrate: Vec<f64>,
        ammonium: Vec<f64>,
        phosphate: Vec<f64>,
    ) -> SeaweedResult<Self> {
        let expected = index.len();
        let columns: [(&'static str, &Vec<f64>); 6] = [
            ("illumination", &illumination),
            ("temperature", &temperature),
            ("salinity", &salinity),
            ("nitrate", &nitrate),
            ("ammonium", &ammonium),
            ("phosphate", &phosphate),
        ];
        for (column, values) in columns {
            check_length(column, expected, values.len())?;
        }
        check_unique(&index)?;

        Ok(Self {
            index,
            illumination,
            temperature,
            salinity,
            nitrate: nitrate.into_iter().map(clamp_non_negative).collect(),
            ammonium: ammonium.into_iter().map(clamp_non_negative).collect(),
            phosphate: phosphate.into_iter().map(clamp_non_negative).collect(),
            density: None,
        })
    }

    /// Attaches a standing-density column, enabling the self-shading factor.
    pub fn with_density(mut self, density: Vec<f64>) -> SeaweedResult<Self> {
        check_length("density", self.len(), density.len())?;
        self.density = Some(density);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &[TimeKey] {
        &self.index
    }

    pub fn illumination(&self) -> &[f64] {
        &self.illumination
    }

    pub fn temperature(&self) -> &[f64] {
        &self.temperature
    }

    pub fn salinity(&self) -> &[f64] {
        &self.salinity
    }

    pub fn nitrate(&self) -> &[f64] {
        &self.nitrate
    }

    pub fn ammonium(&self) -> &[f64] {
        &self.ammonium
    }

    pub fn phosphate(&self) -> &[f64] {
        &self.phosphate
    }

    pub fn density(&self) -> Option<&[f64]> {
        self.density.as_deref()
    }

    /// The raw column for `parameter`, `None` for derived parameters or an
    /// absent density column.
    pub fn column(&self, parameter: Parameter) -> Option<&[f64]> {
        match parameter {
            Parameter::Illumination => Some(&self.illumination),
            Parameter::Temperature => Some(&self.temperature),
            Parameter::Salinity => Some(&self.salinity),
            Parameter::Nitrate => Some(&self.nitrate),
            Parameter::Ammonium => Some(&self.ammonium),
            Parameter::Phosphate => Some(&self.phosphate),
            Parameter::Density => self.density(),
            _ => None,
        }
    }
}

fn check_length(column: &'static str, expected: usize, found: usize) -> SeaweedResult<()> {
    if expected == found {
        Ok(())
    } else {
        Err(SeaweedError::MisalignedSeries {
            column,
            expected,
            found,
        })
    }
}

fn check_unique(index: &[TimeKey]) -> SeaweedResult<()> {
    let mut seen = HashSet::with_capacity(index.len());
    for key in index {
        if !seen.insert(key) {
            return Err(SeaweedError::DuplicateTimeKey(*key));
        }
    }
    Ok(())
}
