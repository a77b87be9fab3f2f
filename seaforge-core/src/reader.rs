//! CSV inputs: environment per LME, environment per grid cell, LME names.

use crate::error::{SeaweedError, SeaweedResult};
use crate::model::{GridSource, LmeSource};
use crate::series::EnvironmentalSeries;
use seaforge_schemas::{
    environment::EnvironmentalRecord,
    file_formats::{GridRow, LmeMetadataRow, LmeRow},
    region::{GridCell, LmeId},
    time::TimeKey,
};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use tracing::info;

fn open(path: &Path) -> SeaweedResult<csv::Reader<std::fs::File>> {
    csv::Reader::from_path(path).map_err(|e| SeaweedError::CsvError(path.display().to_string(), e))
}

fn read_rows<T, R>(reader: &mut csv::Reader<R>, origin: &str) -> SeaweedResult<Vec<T>>
where
    T: DeserializeOwned,
    R: io::Read,
{
    reader
        .deserialize()
        .map(|result| result.map_err(|e| SeaweedError::CsvError(origin.to_string(), e)))
        .collect()
}

fn lme_id(number: u8, origin: &str) -> SeaweedResult<LmeId> {
    LmeId::try_from(number).map_err(|reason| SeaweedError::InvalidData {
        path: origin.to_string(),
        reason,
    })
}

/// Builds one series per key, each sorted by time.
fn group<K: Ord>(
    entries: impl IntoIterator<Item = (K, TimeKey, EnvironmentalRecord)>,
) -> SeaweedResult<BTreeMap<K, EnvironmentalSeries>> {
    let mut grouped: BTreeMap<K, Vec<(TimeKey, EnvironmentalRecord)>> = BTreeMap::new();
    for (key, time, record) in entries {
        grouped.entry(key).or_default().push((time, record));
    }
    grouped
        .into_iter()
        .map(|(key, mut records)| {
            records.sort_by_key(|(time, _)| *time);
            Ok((key, EnvironmentalSeries::from_records(records)?))
        })
        .collect()
}

/// Monthly environment per Large Marine Ecosystem, indexed by date.
#[derive(Debug, Clone, Default)]
pub struct DataLme {
    series: BTreeMap<LmeId, EnvironmentalSeries>,
}

impl DataLme {
    pub fn from_path(path: impl AsRef<Path>) -> SeaweedResult<Self> {
        let path = path.as_ref();
        let data = Self::from_csv(&mut open(path)?, &path.display().to_string())?;
        info!(path = %path.display(), lmes = data.series.len(), "Loaded LME environment");
        Ok(data)
    }

    /// Reads from any CSV reader; `origin` names the input in errors.
    pub fn from_csv<R: io::Read>(reader: &mut csv::Reader<R>, origin: &str) -> SeaweedResult<Self> {
        let entries = read_rows::<LmeRow, _>(reader, origin)?
            .into_iter()
            .map(|row| Ok((lme_id(row.lme_number, origin)?, TimeKey::Date(row.dates), row.record())))
            .collect::<SeaweedResult<Vec<_>>>()?;
        Ok(Self {
            series: group(entries)?,
        })
    }

    pub fn lme_ids(&self) -> Vec<LmeId> {
        self.series.keys().copied().collect()
    }

    pub fn get(&self, lme: LmeId) -> Option<&EnvironmentalSeries> {
        self.series.get(&lme)
    }
}

impl LmeSource for DataLme {
    fn provide_data_lme(&self, lme: LmeId) -> SeaweedResult<EnvironmentalSeries> {
        self.series.provide_data_lme(lme)
    }
}

/// Monthly environment per grid cell, indexed by month number.
#[derive(Debug, Clone, Default)]
pub struct DataGrid {
    series: BTreeMap<GridCell, EnvironmentalSeries>,
}

impl DataGrid {
    pub fn from_path(path: impl AsRef<Path>) -> SeaweedResult<Self> {
        let path = path.as_ref();
        let data = Self::from_csv(&mut open(path)?, &path.display().to_string())?;
        info!(path = %path.display(), cells = data.series.len(), "Loaded gridded environment");
        Ok(data)
    }

    pub fn from_csv<R: io::Read>(reader: &mut csv::Reader<R>, origin: &str) -> SeaweedResult<Self> {
        let entries = read_rows::<GridRow, _>(reader, origin)?
            .into_iter()
            .map(|row| (GridCell::new(row.lat, row.lon), TimeKey::Month(row.time), row.record()));
        Ok(Self {
            series: group(entries)?,
        })
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl GridSource for DataGrid {
    fn grid_cells(&self) -> Vec<GridCell> {
        self.series.grid_cells()
    }

    fn provide_data_grid(&self, cell: GridCell) -> SeaweedResult<EnvironmentalSeries> {
        self.series.provide_data_grid(cell)
    }
}

/// Reads the `LME_NUMBER,LME_NAME` lookup table.
pub fn read_lme_names(path: impl AsRef<Path>) -> SeaweedResult<BTreeMap<LmeId, String>> {
    let path = path.as_ref();
    let origin = path.display().to_string();
    read_rows::<LmeMetadataRow, _>(&mut open(path)?, &origin)?
        .into_iter()
        .map(|row| Ok((lme_id(row.lme_number, &origin)?, row.lme_name)))
        .collect()
}
