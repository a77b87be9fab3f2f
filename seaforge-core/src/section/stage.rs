use super::table::SectionTable;
use crate::error::SeaweedResult;
use crate::growth::{
    calculate_illumination_factor, calculate_nutrient_factor, calculate_salinity_factor,
    calculate_self_shading_factor, calculate_temperature_factor, growth_factor_combination,
    FormulaConstants, NutrientFactorSeries,
};
use crate::series::EnvironmentalSeries;
use seaforge_schemas::parameter::Parameter;

/// Every factor series derived from one region's environment.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorSeries {
    pub illumination: Vec<f64>,
    pub temperature: Vec<f64>,
    pub salinity: Vec<f64>,
    pub nutrient: NutrientFactorSeries,
    pub self_shading: Option<Vec<f64>>,
}

impl FactorSeries {
    pub fn from_environment(
        series: &EnvironmentalSeries,
        constants: &FormulaConstants,
    ) -> SeaweedResult<Self> {
        let self_shading = series
            .density()
            .map(|density| calculate_self_shading_factor(density, constants))
            .transpose()?;

        Ok(Self {
            illumination: calculate_illumination_factor(series.illumination(), constants)?,
            temperature: calculate_temperature_factor(series.temperature(), constants)?,
            salinity: calculate_salinity_factor(series.salinity(), constants)?,
            nutrient: calculate_nutrient_factor(
                series.nitrate(),
                series.ammonium(),
                series.phosphate(),
                constants,
            )?,
            self_shading,
        })
    }

    /// Combined growth rate for every timestep.
    pub fn growth_rate(&self) -> SeaweedResult<Vec<f64>> {
        growth_factor_combination(
            &self.illumination,
            &self.temperature,
            &self.nutrient.nutrient,
            &self.salinity,
            self.self_shading.as_deref(),
        )
    }

    pub fn column(&self, parameter: Parameter) -> Option<&[f64]> {
        match parameter {
            Parameter::IlluminationFactor => Some(&self.illumination),
            Parameter::TempFactor => Some(&self.temperature),
            Parameter::SalinityFactor => Some(&self.salinity),
            Parameter::NutrientFactor => Some(&self.nutrient.nutrient),
            Parameter::NitrateSubfactor => Some(&self.nutrient.nitrate),
            Parameter::AmmoniumSubfactor => Some(&self.nutrient.ammonium),
            Parameter::PhosphateSubfactor => Some(&self.nutrient.phosphate),
            Parameter::SelfShadingFactor => self.self_shading.as_deref(),
            _ => None,
        }
    }
}

/// Lifecycle of an ocean section. Each stage holds only what is valid in it.
#[derive(Debug, Clone, Default)]
pub enum SectionStage {
    #[default]
    Created,
    FactorsComputed {
        factors: FactorSeries,
    },
    GrowthComputed {
        factors: FactorSeries,
        growth_rate: Vec<f64>,
    },
    TableBuilt {
        table: SectionTable,
    },
}

impl SectionStage {
    pub fn name(&self) -> &'static str {
        match self {
            SectionStage::Created => "Created",
            SectionStage::FactorsComputed { .. } => "FactorsComputed",
            SectionStage::GrowthComputed { .. } => "GrowthComputed",
            SectionStage::TableBuilt { .. } => "TableBuilt",
        }
    }

    /// Position in the lifecycle, `Created` being 0.
    pub fn rank(&self) -> u8 {
        match self {
            SectionStage::Created => 0,
            SectionStage::FactorsComputed { .. } => 1,
            SectionStage::GrowthComputed { .. } => 2,
            SectionStage::TableBuilt { .. } => 3,
        }
    }

    /// A derived column, if this stage has computed it.
    pub fn column(&self, parameter: Parameter) -> Option<&[f64]> {
        match self {
            SectionStage::Created => None,
            SectionStage::FactorsComputed { factors } => factors.column(parameter),
            SectionStage::GrowthComputed {
                factors,
                growth_rate,
            } => match parameter {
                Parameter::SeaweedGrowthRate => Some(growth_rate),
                _ => factors.column(parameter),
            },
            SectionStage::TableBuilt { table } => table.column(parameter),
        }
    }
}
