//! A twenty-year, three-LME run from CSV input to written outputs.

use chrono::{Datelike, NaiveDate};
use seaforge_core::{
    reader::DataLme,
    writer::{FrameWriter, RunSummary},
    SeaweedError, SeaweedModel,
};
use seaforge_schemas::{
    growth::GrowthConfig,
    parameter::Parameter,
    region::{IngestionMode, LmeId, RegionKey},
    time::TimeKey,
};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const MONTHS: i32 = 240;

fn month_end(month: i32) -> NaiveDate {
    let year = 2001 + month / 12;
    let next = (month % 12) as u32 + 2;
    let first_of_next = if next == 13 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, next, 1)
    };
    first_of_next.and_then(|d| d.pred_opt()).unwrap()
}

/// Seasonal cycles with a cooling dip in year three.
fn write_environment(path: &Path) {
    let mut csv = String::from(
        "LME_number,dates,temperature,salinity,nitrate,illumination,phosphate,ammonium\n",
    );
    for lme in 1..=3 {
        for month in 0..MONTHS {
            let season = (month as f64 / 12.0 * std::f64::consts::TAU).sin();
            let dip = if (24..36).contains(&month) { 8.0 } else { 0.0 };
            writeln!(
                csv,
                "{},{},{},{},{},{},{},{}",
                lme,
                month_end(month),
                18.0 + 5.0 * season - dip + lme as f64,
                33.0 + lme as f64,
                2.0 + season,
                80.0 + 40.0 * season - 3.0 * dip,
                0.4,
                0.5 + 0.1 * lme as f64,
            )
            .unwrap();
        }
    }
    fs::write(path, csv).unwrap();
}

fn lme_ids() -> Vec<LmeId> {
    (1..=3).map(|n| LmeId::new(n).unwrap()).collect()
}

fn computed_model(dir: &Path) -> SeaweedModel {
    let input = dir.join("environment.csv");
    write_environment(&input);
    let data = DataLme::from_path(&input).unwrap();
    assert_eq!(data.lme_ids(), lme_ids());

    let mut model = SeaweedModel::with_config(GrowthConfig {
        months_since_event_start: Some(-4),
        ..GrowthConfig::default()
    });
    model.add_data_by_lme(&lme_ids(), &data).unwrap();
    model.calculate_factors().unwrap();
    model.calculate_growth_rate().unwrap();
    model.create_section_dfs().unwrap();
    model
}

#[test]
fn lme_ingestion_creates_one_section_each() {
    let dir = tempdir().unwrap();
    let model = computed_model(dir.path());
    assert_eq!(model.len(), 3);
    assert_eq!(model.mode(), Some(IngestionMode::Lme));
    for id in lme_ids() {
        let section = model.section(&RegionKey::lme(id)).unwrap();
        assert_eq!(section.series().len(), MONTHS as usize);
        assert!(section.growth_rate().is_some());
    }
}

#[test]
fn growth_rate_frame_spans_every_month_and_lme() {
    let dir = tempdir().unwrap();
    let model = computed_model(dir.path());

    let frame = model.construct_df_for_parameter("seaweed_growth_rate").unwrap();
    assert_eq!(frame.n_rows(), MONTHS as usize);
    assert_eq!(frame.n_columns(), 3);
    assert_eq!(frame.index[0], TimeKey::Date(month_end(0)));
    assert!(frame
        .columns
        .values()
        .flatten()
        .all(|g| (0.0..=1.0).contains(g)));
}

#[test]
fn date_frame_selects_one_row_per_lme() {
    let dir = tempdir().unwrap();
    let model = computed_model(dir.path());

    let date: TimeKey = "2001-01-31".parse().unwrap();
    let frame = model.construct_df_from_sections_for_date(&date).unwrap();
    assert_eq!(frame.n_rows(), 3);
    // six raw inputs, seven factor columns, growth rate
    assert_eq!(frame.n_columns(), 14);

    let by_months = model.construct_df_from_sections_for_months(-4).unwrap();
    assert_eq!(by_months.rows, frame.rows);
    let later = model.construct_df_from_sections_for_months(20).unwrap();
    let row = &later.rows[&RegionKey::lme(lme_ids()[0])];
    assert_eq!(row.time, TimeKey::Date(month_end(24)));
    assert_eq!(row.time.to_string().len(), 10);
    if let TimeKey::Date(d) = row.time {
        assert_eq!((d.year(), d.month(), d.day()), (2003, 1, 31));
    }
}

#[test]
fn cooling_dip_lowers_mean_growth() {
    let dir = tempdir().unwrap();
    let model = computed_model(dir.path());
    let frame = model.parameter_frame(Parameter::TempFactor).unwrap();
    let lme = RegionKey::lme(lme_ids()[0]);
    let column = frame.column(&lme).unwrap();
    let normal: f64 = column[12..24].iter().sum();
    let dip: f64 = column[24..36].iter().sum();
    assert!(dip < normal);

    let means = model.mean_growth_rates().unwrap();
    assert_eq!(means.len(), 3);
    assert!(means.values().all(|m| m.is_finite()));
}

#[test]
fn model_accepts_a_single_ingestion() {
    let dir = tempdir().unwrap();
    let mut model = computed_model(dir.path());
    let data = DataLme::from_path(dir.path().join("environment.csv")).unwrap();
    assert!(matches!(
        model.add_data_by_lme(&lme_ids(), &data),
        Err(SeaweedError::AlreadyIngested(IngestionMode::Lme))
    ));
    assert_eq!(model.len(), 3);
}

#[test]
fn outputs_are_written() {
    let dir = tempdir().unwrap();
    let model = computed_model(dir.path());

    for (region, section) in model.sections() {
        let path = dir.path().join(format!("{}.csv", region).replace(' ', "_"));
        FrameWriter::new(&path)
            .unwrap()
            .write_section_table(section.section_df().unwrap())
            .unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), MONTHS as usize + 1);
    }

    let summary_path = dir.path().join("summary.json");
    RunSummary::from_model(&model)
        .unwrap()
        .write_json(&summary_path)
        .unwrap();
    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&summary_path).unwrap()).unwrap();
    assert_eq!(summary["sections"].as_array().map(Vec::len), Some(3));
}
