use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A column of a section table.
///
/// The declaration order is the column order of every exported table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    Salinity,
    Temperature,
    Nitrate,
    Ammonium,
    Phosphate,
    Illumination,
    Density,
    SalinityFactor,
    NutrientFactor,
    NitrateSubfactor,
    AmmoniumSubfactor,
    PhosphateSubfactor,
    IlluminationFactor,
    #[serde(rename = "temp_factor")]
    TempFactor,
    SelfShadingFactor,
    SeaweedGrowthRate,
}

impl Parameter {
    pub const ALL: [Parameter; 16] = [
        Parameter::Salinity,
        Parameter::Temperature,
        Parameter::Nitrate,
        Parameter::Ammonium,
        Parameter::Phosphate,
        Parameter::Illumination,
        Parameter::Density,
        Parameter::SalinityFactor,
        Parameter::NutrientFactor,
        Parameter::NitrateSubfactor,
        Parameter::AmmoniumSubfactor,
        Parameter::PhosphateSubfactor,
        Parameter::IlluminationFactor,
        Parameter::TempFactor,
        Parameter::SelfShadingFactor,
        Parameter::SeaweedGrowthRate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Parameter::Salinity => "salinity",
            Parameter::Temperature => "temperature",
            Parameter::Nitrate => "nitrate",
            Parameter::Ammonium => "ammonium",
            Parameter::Phosphate => "phosphate",
            Parameter::Illumination => "illumination",
            Parameter::Density => "density",
            Parameter::SalinityFactor => "salinity_factor",
            Parameter::NutrientFactor => "nutrient_factor",
            Parameter::NitrateSubfactor => "nitrate_subfactor",
            Parameter::AmmoniumSubfactor => "ammonium_subfactor",
            Parameter::PhosphateSubfactor => "phosphate_subfactor",
            Parameter::IlluminationFactor => "illumination_factor",
            Parameter::TempFactor => "temp_factor",
            Parameter::SelfShadingFactor => "self_shading_factor",
            Parameter::SeaweedGrowthRate => "seaweed_growth_rate",
        }
    }

    /// Physical unit of raw inputs, `None` for dimensionless factors.
    pub fn unit(self) -> Option<&'static str> {
        match self {
            Parameter::Salinity => Some("ppt"),
            Parameter::Temperature => Some("°C"),
            Parameter::Nitrate | Parameter::Ammonium | Parameter::Phosphate => Some("mmol/m³"),
            Parameter::Illumination => Some("W/m²"),
            Parameter::Density => Some("kg/m²"),
            _ => None,
        }
    }

    /// True for the columns read from the environment rather than derived.
    pub fn is_raw(self) -> bool {
        self.unit().is_some()
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Parameter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parameter::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown parameter '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_back() {
        for parameter in Parameter::ALL {
            assert_eq!(parameter.as_str().parse::<Parameter>(), Ok(parameter));
        }
        assert!("growth".parse::<Parameter>().is_err());
    }

    #[test]
    fn factors_are_not_raw() {
        assert!(Parameter::Nitrate.is_raw());
        assert!(!Parameter::NutrientFactor.is_raw());
        assert!(!Parameter::SeaweedGrowthRate.is_raw());
    }
}
