use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of Large Marine Ecosystems in the LME dataset.
pub const LME_COUNT: u8 = 66;

/// Identifier of a Large Marine Ecosystem, always in `1..=66`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct LmeId(u8);

impl LmeId {
    /// Returns `None` when `number` is outside `1..=66`.
    pub fn new(number: u8) -> Option<Self> {
        (1..=LME_COUNT).contains(&number).then_some(Self(number))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Every LME id in ascending order.
    pub fn all() -> impl Iterator<Item = LmeId> {
        (1..=LME_COUNT).map(LmeId)
    }
}

impl TryFrom<u8> for LmeId {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        LmeId::new(value).ok_or_else(|| format!("LME number {} is outside 1..={}", value, LME_COUNT))
    }
}

impl From<LmeId> for u8 {
    fn from(id: LmeId) -> u8 {
        id.0
    }
}

impl fmt::Display for LmeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Centre of a grid cell in degrees. Longitudes are kept as delivered by the
/// climate model (0..360); see [`GridCell::longitude_180`] for plotting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub lat: OrderedFloat<f64>,
    pub lon: OrderedFloat<f64>,
}

impl GridCell {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat: OrderedFloat(lat),
            lon: OrderedFloat(lon),
        }
    }

    /// Longitude folded into -180..180.
    pub fn longitude_180(&self) -> f64 {
        let lon = self.lon.into_inner();
        if lon > 180.0 {
            lon - 360.0
        } else {
            lon
        }
    }
}

/// Key of an ocean section: either a whole LME or a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegionKey {
    Lme { id: LmeId },
    Grid { cell: GridCell },
}

impl RegionKey {
    pub fn lme(id: LmeId) -> Self {
        RegionKey::Lme { id }
    }

    pub fn grid(lat: f64, lon: f64) -> Self {
        RegionKey::Grid {
            cell: GridCell::new(lat, lon),
        }
    }

    pub fn mode(&self) -> IngestionMode {
        match self {
            RegionKey::Lme { .. } => IngestionMode::Lme,
            RegionKey::Grid { .. } => IngestionMode::Grid,
        }
    }
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionKey::Lme { id } => write!(f, "LME {}", id),
            RegionKey::Grid { cell } => write!(f, "({}, {})", cell.lat, cell.lon),
        }
    }
}

/// How a model was populated. Fixed by the first ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestionMode {
    Lme,
    Grid,
}

impl fmt::Display for IngestionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestionMode::Lme => write!(f, "lme"),
            IngestionMode::Grid => write!(f, "grid"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lme_id_rejects_out_of_range() {
        assert!(LmeId::new(0).is_none());
        assert!(LmeId::new(67).is_none());
        assert_eq!(LmeId::new(66).map(LmeId::get), Some(66));
        assert_eq!(LmeId::all().count(), 66);
    }

    #[test]
    fn grid_longitude_is_folded() {
        assert_eq!(GridCell::new(10.0, 270.0).longitude_180(), -90.0);
        assert_eq!(GridCell::new(10.0, 90.0).longitude_180(), 90.0);
    }

    #[test]
    fn region_keys_order_lme_before_grid() {
        let lme = RegionKey::lme(LmeId::new(3).unwrap());
        let grid = RegionKey::grid(-10.0, 5.0);
        assert!(lme < grid);
        assert_eq!(lme.mode(), IngestionMode::Lme);
        assert_eq!(grid.mode(), IngestionMode::Grid);
    }
}
