use crate::error::{SeaweedError, SeaweedResult};

/// The limiting factors for one timestep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthFactors {
    pub illumination: f64,
    pub temperature: f64,
    pub nutrient: f64,
    pub salinity: f64,
    /// Treated as 1 when no density data is available.
    pub self_shading: Option<f64>,
}

impl GrowthFactors {
    pub fn new(illumination: f64, temperature: f64, nutrient: f64, salinity: f64) -> Self {
        Self {
            illumination,
            temperature,
            nutrient,
            salinity,
            self_shading: None,
        }
    }

    pub fn with_self_shading(mut self, self_shading: f64) -> Self {
        self.self_shading = Some(self_shading);
        self
    }

    fn named(&self) -> [(&'static str, f64); 5] {
        [
            ("illumination_factor", self.illumination),
            ("temp_factor", self.temperature),
            ("nutrient_factor", self.nutrient),
            ("salinity_factor", self.salinity),
            ("self_shading_factor", self.self_shading.unwrap_or(1.0)),
        ]
    }
}

/// Fraction of the optimal production rate reachable under `factors`.
///
/// Each factor is an independent limiting mechanism, so they multiply: one
/// zero factor stops growth entirely. Missing data (`nan`) short-circuits to
/// `nan` before any range check.
pub fn growth_factor_combination_single_value(factors: &GrowthFactors) -> SeaweedResult<f64> {
    let named = factors.named();
    if named.iter().any(|(_, value)| value.is_nan()) {
        return Ok(f64::NAN);
    }
    for (name, value) in named {
        if !(0.0..=1.0).contains(&value) {
            return Err(SeaweedError::FactorOutOfRange { name, value });
        }
    }
    Ok(named.iter().map(|(_, value)| value).product())
}

/// Elementwise [`growth_factor_combination_single_value`] over aligned factor series.
pub fn growth_factor_combination(
    illumination: &[f64],
    temperature: &[f64],
    nutrient: &[f64],
    salinity: &[f64],
    self_shading: Option<&[f64]>,
) -> SeaweedResult<Vec<f64>> {
    let expected = illumination.len();
    let columns = [
        ("temp_factor", Some(temperature)),
        ("nutrient_factor", Some(nutrient)),
        ("salinity_factor", Some(salinity)),
        ("self_shading_factor", self_shading),
    ];
    for (column, values) in columns {
        if let Some(values) = values {
            if values.len() != expected {
                return Err(SeaweedError::MisalignedSeries {
                    column,
                    expected,
                    found: values.len(),
                });
            }
        }
    }

    (0..expected)
        .map(|i| {
            let mut factors =
                GrowthFactors::new(illumination[i], temperature[i], nutrient[i], salinity[i]);
            if let Some(shading) = self_shading {
                factors = factors.with_self_shading(shading[i]);
            }
            growth_factor_combination_single_value(&factors)
        })
        .collect()
}
