use serde::{Deserialize, Serialize};

/// Revision of the empirical constants.
///
/// | version | illumination            | Kt2   | salinity range |
/// |---------|-------------------------|-------|----------------|
/// | v1      | linear, breakpoint 100  | 0.06  | 0..=50         |
/// | v2      | linear, breakpoint 109.5| 0.064 | 0..=100        |
/// | v3      | Steele, breakpoint 109.5| 0.064 | 0..=100        |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FormulaVersion {
    #[serde(rename = "v1")]
    V1,
    #[default]
    #[serde(rename = "v2")]
    V2,
    #[serde(rename = "v3")]
    V3,
}

/// Settings applied to every ocean section of a model.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GrowthConfig {
    #[serde(default)]
    pub formula_version: FormulaVersion,
    /// First value of the `months_since_war` column. Gridded nuclear-war
    /// runs start four months before the event, so this is usually -4.
    /// The column is omitted when unset.
    #[serde(default)]
    pub months_since_event_start: Option<i64>,
}
