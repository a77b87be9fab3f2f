use serde::{Deserialize, Serialize};

/// Environmental conditions of one region at one timestep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalRecord {
    /// Photosynthetically active radiation, W/m².
    pub illumination: f64,
    /// Sea surface temperature, °C.
    pub temperature: f64,
    /// ppt
    pub salinity: f64,
    /// mmol/m³
    pub nitrate: f64,
    /// mmol/m³
    pub ammonium: f64,
    /// mmol/m³
    pub phosphate: f64,
    /// Standing seaweed density in kg/m², rarely available.
    #[serde(default)]
    pub density: Option<f64>,
}

impl EnvironmentalRecord {
    /// A record with every concentration floored at zero. Climate-model
    /// output occasionally dips slightly below zero for the nutrients.
    pub fn with_clamped_nutrients(self) -> Self {
        Self {
            nitrate: clamp_non_negative(self.nitrate),
            ammonium: clamp_non_negative(self.ammonium),
            phosphate: clamp_non_negative(self.phosphate),
            ..self
        }
    }
}

/// Floors `value` at zero and leaves `nan` untouched.
pub fn clamp_non_negative(value: f64) -> f64 {
    if value < 0.0 {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamping_keeps_nan() {
        assert_eq!(clamp_non_negative(-0.01), 0.0);
        assert_eq!(clamp_non_negative(2.5), 2.5);
        assert!(clamp_non_negative(f64::NAN).is_nan());
    }
}
