use seaforge_schemas::growth::FormulaVersion;

/// Shape of the illumination factor below the optimal band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LowLightResponse {
    /// `I / I_s`
    Linear,
    /// Steele's photosynthesis curve, `(I / I_s) * exp(1 - I / I_s)`.
    Steele,
}

/// Empirical constants of one formula revision.
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaConstants {
    pub version: FormulaVersion,

    pub low_light_response: LowLightResponse,
    /// Lower edge of the optimal illumination band, W/m².
    pub illumination_saturation: f64,
    /// Upper edge of the optimal illumination band, W/m².
    pub illumination_inhibition: f64,
    /// Solar constant; anything brighter is a unit error upstream.
    pub illumination_max: f64,

    pub temperature_min: f64,
    pub temperature_max: f64,
    pub temperature_optimum: (f64, f64),
    /// °C⁻², below the optimum. Fitted so that g(15 °C) ≈ 0.25.
    pub kt1: f64,
    /// °C⁻², above the optimum. Fitted so that g(36 °C) ≈ 0.1.
    pub kt2: f64,

    pub salinity_max: f64,
    pub salinity_optimum: (f64, f64),
    /// ppt⁻²
    pub ks1: f64,
    /// ppt⁻²
    pub ks2: f64,

    /// Half-saturation constants, μM (Lapointe 1987).
    pub k_nitrate: f64,
    pub k_ammonium: f64,
    pub k_phosphate: f64,
    /// Upper bound on nutrient concentrations, only enforced by v1.
    pub nutrient_max: Option<f64>,

    /// Density below which seaweed does not shade itself, kg/m².
    pub self_shading_threshold: f64,
    /// Light attenuation per kg/m² above the threshold.
    pub self_shading_attenuation: f64,
}

impl FormulaConstants {
    pub fn for_version(version: FormulaVersion) -> Self {
        let current = Self {
            version,
            low_light_response: LowLightResponse::Linear,
            illumination_saturation: 21.9,
            illumination_inhibition: 109.5,
            illumination_max: 1361.0,
            temperature_min: -20.0,
            temperature_max: 50.0,
            temperature_optimum: (24.0, 30.0),
            kt1: 0.017,
            kt2: 0.064,
            salinity_max: 100.0,
            salinity_optimum: (24.0, 36.0),
            ks1: 0.007,
            ks2: 0.063,
            k_nitrate: 0.4,
            k_ammonium: 0.3,
            k_phosphate: 0.1,
            nutrient_max: None,
            self_shading_threshold: 0.4,
            self_shading_attenuation: 0.513,
        };

        match version {
            FormulaVersion::V1 => Self {
                illumination_inhibition: 100.0,
                kt2: 0.06,
                salinity_max: 50.0,
                nutrient_max: Some(50.0),
                ..current
            },
            FormulaVersion::V2 => current,
            FormulaVersion::V3 => Self {
                low_light_response: LowLightResponse::Steele,
                ..current
            },
        }
    }
}

impl Default for FormulaConstants {
    fn default() -> Self {
        Self::for_version(FormulaVersion::default())
    }
}

impl From<FormulaVersion> for FormulaConstants {
    fn from(version: FormulaVersion) -> Self {
        Self::for_version(version)
    }
}
