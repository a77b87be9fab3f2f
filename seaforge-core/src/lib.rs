//! Growth-factor engine and per-region aggregation for the seaweed model.
//!
//! Factors follow the empirical model of James, S.C. and Boriah, V. (2010),
//! *Modeling algae growth in an open-channel raceway*, Journal of
//! Computational Biology 17(7), 895–906.

pub mod error;
pub mod growth;
pub mod model;
pub mod reader;
pub mod section;
pub mod series;
pub mod writer;

pub use error::{SeaweedError, SeaweedResult};
pub use model::SeaweedModel;
pub use section::OceanSection;
pub use series::EnvironmentalSeries;
