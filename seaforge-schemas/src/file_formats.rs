use crate::environment::EnvironmentalRecord;
use chrono::NaiveDate;
use serde::Deserialize;

/// One row of the LME environment CSV.
///
/// Empty cells mean missing data and deserialize to `None`.
#[derive(Debug, Deserialize)]
pub struct LmeRow {
    #[serde(rename = "LME_number")]
    pub lme_number: u8,
    pub dates: NaiveDate,
    pub temperature: Option<f64>,
    pub salinity: Option<f64>,
    pub nitrate: Option<f64>,
    pub illumination: Option<f64>,
    pub phosphate: Option<f64>,
    pub ammonium: Option<f64>,
}

impl LmeRow {
    pub fn record(&self) -> EnvironmentalRecord {
        EnvironmentalRecord {
            illumination: self.illumination.unwrap_or(f64::NAN),
            temperature: self.temperature.unwrap_or(f64::NAN),
            salinity: self.salinity.unwrap_or(f64::NAN),
            nitrate: self.nitrate.unwrap_or(f64::NAN),
            ammonium: self.ammonium.unwrap_or(f64::NAN),
            phosphate: self.phosphate.unwrap_or(f64::NAN),
            density: None,
        }
    }
}

/// One row of the gridded environment CSV.
#[derive(Debug, Deserialize)]
pub struct GridRow {
    pub lat: f64,
    pub lon: f64,
    pub time: i64,
    pub temperature: Option<f64>,
    pub salinity: Option<f64>,
    pub nitrate: Option<f64>,
    pub illumination: Option<f64>,
    pub phosphate: Option<f64>,
    pub ammonium: Option<f64>,
    #[serde(default)]
    pub density: Option<f64>,
}

impl GridRow {
    pub fn record(&self) -> EnvironmentalRecord {
        EnvironmentalRecord {
            illumination: self.illumination.unwrap_or(f64::NAN),
            temperature: self.temperature.unwrap_or(f64::NAN),
            salinity: self.salinity.unwrap_or(f64::NAN),
            nitrate: self.nitrate.unwrap_or(f64::NAN),
            ammonium: self.ammonium.unwrap_or(f64::NAN),
            phosphate: self.phosphate.unwrap_or(f64::NAN),
            density: self.density,
        }
    }
}

/// One row of the LME metadata CSV.
#[derive(Debug, Deserialize)]
pub struct LmeMetadataRow {
    #[serde(rename = "LME_NUMBER")]
    pub lme_number: u8,
    #[serde(rename = "LME_NAME")]
    pub lme_name: String,
}
