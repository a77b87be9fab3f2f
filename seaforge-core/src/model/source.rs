use crate::error::{SeaweedError, SeaweedResult};
use crate::series::EnvironmentalSeries;
use seaforge_schemas::region::{GridCell, LmeId, RegionKey};
use std::collections::{BTreeMap, HashMap};

/// Supplies environmental series per Large Marine Ecosystem.
pub trait LmeSource {
    fn provide_data_lme(&self, lme: LmeId) -> SeaweedResult<EnvironmentalSeries>;
}

/// Supplies environmental series per grid cell.
pub trait GridSource {
    /// Every cell this source holds data for.
    fn grid_cells(&self) -> Vec<GridCell>;

    fn provide_data_grid(&self, cell: GridCell) -> SeaweedResult<EnvironmentalSeries>;
}

impl LmeSource for HashMap<LmeId, EnvironmentalSeries> {
    fn provide_data_lme(&self, lme: LmeId) -> SeaweedResult<EnvironmentalSeries> {
        self.get(&lme)
            .cloned()
            .ok_or(SeaweedError::RegionNotFound(RegionKey::lme(lme)))
    }
}

impl LmeSource for BTreeMap<LmeId, EnvironmentalSeries> {
    fn provide_data_lme(&self, lme: LmeId) -> SeaweedResult<EnvironmentalSeries> {
        self.get(&lme)
            .cloned()
            .ok_or(SeaweedError::RegionNotFound(RegionKey::lme(lme)))
    }
}

impl GridSource for BTreeMap<GridCell, EnvironmentalSeries> {
    fn grid_cells(&self) -> Vec<GridCell> {
        self.keys().copied().collect()
    }

    fn provide_data_grid(&self, cell: GridCell) -> SeaweedResult<EnvironmentalSeries> {
        self.get(&cell)
            .cloned()
            .ok_or(SeaweedError::RegionNotFound(RegionKey::Grid { cell }))
    }
}
