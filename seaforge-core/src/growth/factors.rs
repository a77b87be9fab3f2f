//! Single-value factor curves and their elementwise series versions.
//!
//! Every factor maps a physical quantity into `[0, 1]`. A `nan` input means
//! "no data" and comes back as `nan` without tripping the range checks.
//! Values outside the physically plausible range are rejected, never clamped:
//! they almost always mean mixed-up units upstream.

use super::constants::{FormulaConstants, LowLightResponse};
use crate::error::{SeaweedError, SeaweedResult};

fn check_range(quantity: &'static str, value: f64, min: f64, max: f64) -> SeaweedResult<()> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(SeaweedError::OutOfRange {
            quantity,
            value,
            min,
            max,
        })
    }
}

/// Gaussian penalty outside `optimum`, 1 inside it.
fn gaussian_band(value: f64, optimum: (f64, f64), k_low: f64, k_high: f64) -> f64 {
    let (low, high) = optimum;
    if value < low {
        (-k_low * (low - value).powi(2)).exp()
    } else if value > high {
        (-k_high * (value - high).powi(2)).exp()
    } else {
        1.0
    }
}

/// Illumination factor for a single value in W/m².
pub fn illumination_single_value(illumination: f64, c: &FormulaConstants) -> SeaweedResult<f64> {
    if illumination.is_nan() {
        return Ok(f64::NAN);
    }
    check_range("illumination", illumination, 0.0, c.illumination_max)?;

    let factor = if illumination < c.illumination_saturation {
        let ratio = illumination / c.illumination_saturation;
        match c.low_light_response {
            LowLightResponse::Linear => ratio,
            LowLightResponse::Steele => ratio * (1.0 - ratio).exp(),
        }
    } else if illumination > c.illumination_inhibition {
        c.illumination_inhibition / illumination
    } else {
        1.0
    };
    Ok(factor)
}

/// Temperature factor for a single value in °C.
pub fn temperature_single_value(temperature: f64, c: &FormulaConstants) -> SeaweedResult<f64> {
    if temperature.is_nan() {
        return Ok(f64::NAN);
    }
    check_range("temperature", temperature, c.temperature_min, c.temperature_max)?;
    Ok(gaussian_band(temperature, c.temperature_optimum, c.kt1, c.kt2))
}

/// Salinity factor for a single value in ppt.
pub fn salinity_single_value(salinity: f64, c: &FormulaConstants) -> SeaweedResult<f64> {
    if salinity.is_nan() {
        return Ok(f64::NAN);
    }
    check_range("salinity", salinity, 0.0, c.salinity_max)?;
    Ok(gaussian_band(salinity, c.salinity_optimum, c.ks1, c.ks2))
}

fn saturating(
    quantity: &'static str,
    concentration: f64,
    half_saturation: f64,
    c: &FormulaConstants,
) -> SeaweedResult<f64> {
    if concentration.is_nan() {
        return Ok(f64::NAN);
    }
    check_range(quantity, concentration, 0.0, c.nutrient_max.unwrap_or(f64::INFINITY))?;
    Ok(concentration / (half_saturation + concentration))
}

pub fn nitrate_subfactor(nitrate: f64, c: &FormulaConstants) -> SeaweedResult<f64> {
    saturating("nitrate", nitrate, c.k_nitrate, c)
}

pub fn ammonium_subfactor(ammonium: f64, c: &FormulaConstants) -> SeaweedResult<f64> {
    saturating("ammonium", ammonium, c.k_ammonium, c)
}

pub fn phosphate_subfactor(phosphate: f64, c: &FormulaConstants) -> SeaweedResult<f64> {
    saturating("phosphate", phosphate, c.k_phosphate, c)
}

/// The nutrient factor together with the subfactors it was taken from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NutrientFactors {
    pub nutrient: f64,
    pub nitrate: f64,
    pub ammonium: f64,
    pub phosphate: f64,
}

/// Growth is capped by the scarcest nutrient (Liebig's law of the minimum).
pub fn nutrient_single_value(
    nitrate: f64,
    ammonium: f64,
    phosphate: f64,
    c: &FormulaConstants,
) -> SeaweedResult<NutrientFactors> {
    let nitrate = nitrate_subfactor(nitrate, c)?;
    let ammonium = ammonium_subfactor(ammonium, c)?;
    let phosphate = phosphate_subfactor(phosphate, c)?;

    // f64::min drops nan, which would hide missing data
    let nutrient = if nitrate.is_nan() || ammonium.is_nan() || phosphate.is_nan() {
        f64::NAN
    } else {
        nitrate.min(ammonium).min(phosphate)
    };

    Ok(NutrientFactors {
        nutrient,
        nitrate,
        ammonium,
        phosphate,
    })
}

/// Light attenuation caused by the seaweed's own standing density in kg/m².
pub fn self_shading_single_value(density: f64, c: &FormulaConstants) -> SeaweedResult<f64> {
    if density.is_nan() {
        return Ok(f64::NAN);
    }
    check_range("density", density, 0.0, f64::INFINITY)?;
    if density < c.self_shading_threshold {
        Ok(1.0)
    } else {
        Ok((-c.self_shading_attenuation * (density - c.self_shading_threshold)).exp())
    }
}

pub fn calculate_illumination_factor(
    illumination: &[f64],
    c: &FormulaConstants,
) -> SeaweedResult<Vec<f64>> {
    illumination
        .iter()
        .map(|&value| illumination_single_value(value, c))
        .collect()
}

pub fn calculate_temperature_factor(
    temperature: &[f64],
    c: &FormulaConstants,
) -> SeaweedResult<Vec<f64>> {
    temperature
        .iter()
        .map(|&value| temperature_single_value(value, c))
        .collect()
}

pub fn calculate_salinity_factor(salinity: &[f64], c: &FormulaConstants) -> SeaweedResult<Vec<f64>> {
    salinity
        .iter()
        .map(|&value| salinity_single_value(value, c))
        .collect()
}

pub fn calculate_self_shading_factor(
    density: &[f64],
    c: &FormulaConstants,
) -> SeaweedResult<Vec<f64>> {
    density
        .iter()
        .map(|&value| self_shading_single_value(value, c))
        .collect()
}

/// Column form of [`NutrientFactors`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NutrientFactorSeries {
    pub nutrient: Vec<f64>,
    pub nitrate: Vec<f64>,
    pub ammonium: Vec<f64>,
    pub phosphate: Vec<f64>,
}

pub fn calculate_nutrient_factor(
    nitrate: &[f64],
    ammonium: &[f64],
    phosphate: &[f64],
    c: &FormulaConstants,
) -> SeaweedResult<NutrientFactorSeries> {
    let expected = nitrate.len();
    for (column, values) in [("ammonium", ammonium), ("phosphate", phosphate)] {
        if values.len() != expected {
            return Err(SeaweedError::MisalignedSeries {
                column,
                expected,
                found: values.len(),
            });
        }
    }

    let mut series = NutrientFactorSeries::default();
    for ((&n, &a), &p) in nitrate.iter().zip(ammonium).zip(phosphate) {
        let factors = nutrient_single_value(n, a, p, c)?;
        series.nutrient.push(factors.nutrient);
        series.nitrate.push(factors.nitrate);
        series.ammonium.push(factors.ammonium);
        series.phosphate.push(factors.phosphate);
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use seaforge_schemas::growth::FormulaVersion;

    fn sweep(min: f64, max: f64, steps: usize) -> impl Iterator<Item = f64> {
        (0..=steps).map(move |i| min + (max - min) * i as f64 / steps as f64)
    }

    fn all_versions() -> Vec<FormulaConstants> {
        [FormulaVersion::V1, FormulaVersion::V2, FormulaVersion::V3]
            .into_iter()
            .map(FormulaConstants::for_version)
            .collect()
    }

    #[test]
    fn factors_stay_in_unit_interval_over_valid_domain() {
        for c in all_versions() {
            for value in sweep(0.0, c.illumination_max, 5000) {
                let factor = illumination_single_value(value, &c).unwrap();
                assert!((0.0..=1.0).contains(&factor), "illumination {} -> {}", value, factor);
            }
            for value in sweep(c.temperature_min, c.temperature_max, 2000) {
                let factor = temperature_single_value(value, &c).unwrap();
                assert!((0.0..=1.0).contains(&factor), "temperature {} -> {}", value, factor);
            }
            for value in sweep(0.0, c.salinity_max, 2000) {
                let factor = salinity_single_value(value, &c).unwrap();
                assert!((0.0..=1.0).contains(&factor), "salinity {} -> {}", value, factor);
            }
            for value in sweep(0.0, 50.0, 2000) {
                let factors = nutrient_single_value(value, value, value, &c).unwrap();
                assert!((0.0..=1.0).contains(&factors.nutrient));
            }
        }
    }

    #[test]
    fn factors_are_one_in_the_optimal_band() {
        let c = FormulaConstants::default();
        let illumination = [21.9, 109.5].into_iter().chain((22..=109).map(f64::from));
        for value in illumination {
            assert_eq!(illumination_single_value(value, &c).unwrap(), 1.0);
        }
        for value in (0..=12).map(|i| 24.0 + 0.5 * i as f64) {
            assert_eq!(temperature_single_value(value, &c).unwrap(), 1.0);
        }
        for value in (0..=24).map(|i| 24.0 + 0.5 * i as f64) {
            assert_eq!(salinity_single_value(value, &c).unwrap(), 1.0);
        }
    }

    #[test]
    fn nan_passes_through_every_factor() {
        let c = FormulaConstants::default();
        assert!(illumination_single_value(f64::NAN, &c).unwrap().is_nan());
        assert!(temperature_single_value(f64::NAN, &c).unwrap().is_nan());
        assert!(salinity_single_value(f64::NAN, &c).unwrap().is_nan());
        assert!(self_shading_single_value(f64::NAN, &c).unwrap().is_nan());

        let factors = nutrient_single_value(1.0, f64::NAN, 1.0, &c).unwrap();
        assert!(factors.nutrient.is_nan());
        assert!(factors.ammonium.is_nan());
        assert_relative_eq!(factors.nitrate, 1.0 / 1.4);
    }

    #[test]
    fn illumination_curve() {
        let c = FormulaConstants::default();
        assert_eq!(illumination_single_value(25.0, &c).unwrap(), 1.0);
        assert_relative_eq!(illumination_single_value(500.0, &c).unwrap(), 0.219);
        assert_relative_eq!(illumination_single_value(5.0, &c).unwrap(), 5.0 / 21.9);
        assert_eq!(illumination_single_value(0.0, &c).unwrap(), 0.0);

        let steele = FormulaConstants::for_version(FormulaVersion::V3);
        assert_relative_eq!(
            illumination_single_value(5.0, &steele).unwrap(),
            0.4939,
            epsilon = 1e-3
        );

        let v1 = FormulaConstants::for_version(FormulaVersion::V1);
        assert_relative_eq!(illumination_single_value(500.0, &v1).unwrap(), 0.2);
    }

    #[test]
    fn illumination_is_continuous_at_breakpoints() {
        for c in all_versions() {
            let below = illumination_single_value(c.illumination_saturation - 1e-9, &c).unwrap();
            let above = illumination_single_value(c.illumination_inhibition + 1e-9, &c).unwrap();
            assert_relative_eq!(below, 1.0, epsilon = 1e-6);
            assert_relative_eq!(above, 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn out_of_range_inputs_are_rejected() {
        let c = FormulaConstants::default();
        assert!(illumination_single_value(-1.0, &c).is_err());
        assert!(illumination_single_value(500_000_000.0, &c).is_err());
        assert!(illumination_single_value(f64::INFINITY, &c).is_err());
        assert!(temperature_single_value(5_000_000_000.0, &c).is_err());
        assert!(temperature_single_value(-21.0, &c).is_err());
        assert!(salinity_single_value(5000.0, &c).is_err());
        assert!(salinity_single_value(-1.0, &c).is_err());
        assert!(nutrient_single_value(-1.0, 1.0, 1.0, &c).is_err());
        assert!(self_shading_single_value(-0.1, &c).is_err());

        let v1 = FormulaConstants::for_version(FormulaVersion::V1);
        assert!(salinity_single_value(75.0, &v1).is_err());
        assert!(salinity_single_value(75.0, &c).is_ok());
        assert!(nutrient_single_value(60.0, 1.0, 1.0, &v1).is_err());
    }

    #[test]
    fn infinite_inputs_are_rejected() {
        let c = FormulaConstants::default();
        assert!(matches!(
            nutrient_single_value(f64::INFINITY, 1.0, 1.0, &c),
            Err(SeaweedError::OutOfRange { quantity: "nitrate", .. })
        ));
        assert!(ammonium_subfactor(f64::INFINITY, &c).is_err());
        assert!(phosphate_subfactor(f64::INFINITY, &c).is_err());
        assert!(self_shading_single_value(f64::INFINITY, &c).is_err());
        assert!(temperature_single_value(f64::NEG_INFINITY, &c).is_err());
    }

    #[test]
    fn temperature_matches_calibration_points() {
        let c = FormulaConstants::default();
        assert_relative_eq!(temperature_single_value(15.0, &c).unwrap(), 0.25, epsilon = 0.01);
        assert_relative_eq!(temperature_single_value(36.0, &c).unwrap(), 0.1, epsilon = 0.001);
    }

    #[test]
    fn scarcest_nutrient_limits_growth() {
        let c = FormulaConstants::default();
        let factors = nutrient_single_value(10.0, 10.0, 0.1, &c).unwrap();
        assert_relative_eq!(factors.phosphate, 0.5);
        assert_relative_eq!(factors.nutrient, factors.phosphate);
        assert_relative_eq!(factors.nitrate, 10.0 / 10.4);
        assert!(factors.nutrient < factors.nitrate);

        let equal = nutrient_single_value(2.0, 2.0, 2.0, &c).unwrap();
        assert_relative_eq!(
            equal.nutrient,
            equal.nitrate.min(equal.ammonium).min(equal.phosphate)
        );
        assert_relative_eq!(equal.nutrient, equal.nitrate);
    }

    #[test]
    fn self_shading_kicks_in_above_threshold() {
        let c = FormulaConstants::default();
        assert_eq!(self_shading_single_value(0.2, &c).unwrap(), 1.0);
        assert_eq!(self_shading_single_value(0.4, &c).unwrap(), 1.0);
        assert_relative_eq!(
            self_shading_single_value(1.4, &c).unwrap(),
            (-0.513f64).exp(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn series_versions_apply_elementwise() {
        let c = FormulaConstants::default();
        let factors = calculate_temperature_factor(&[15.0, 25.0, f64::NAN], &c).unwrap();
        assert_eq!(factors.len(), 3);
        assert_eq!(factors[1], 1.0);
        assert!(factors[2].is_nan());

        assert!(calculate_illumination_factor(&[25.0, 500.0, 5.0, 500_000_000.0], &c).is_err());

        let nutrients = calculate_nutrient_factor(&[5.0, 0.0], &[5.0, 0.0], &[5.0, 0.0], &c).unwrap();
        assert_eq!(nutrients.nutrient.len(), 2);
        assert_eq!(nutrients.nutrient[1], 0.0);

        assert!(matches!(
            calculate_nutrient_factor(&[1.0, 2.0], &[1.0], &[1.0, 2.0], &c),
            Err(SeaweedError::MisalignedSeries { column: "ammonium", .. })
        ));
    }
}
