//! Empirical sub-models turning environmental conditions into growth factors.

pub mod combination;
pub mod constants;
pub mod factors;

pub use combination::{growth_factor_combination, growth_factor_combination_single_value, GrowthFactors};
pub use constants::{FormulaConstants, LowLightResponse};
pub use factors::*;
