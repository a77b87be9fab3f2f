//! End-to-end behaviour of a single ocean section.

use approx::assert_relative_eq;
use seaforge_core::{EnvironmentalSeries, OceanSection, SeaweedError};
use seaforge_schemas::{
    growth::GrowthConfig, parameter::Parameter, region::RegionKey, time::TimeKey,
};

fn seven_month_section() -> OceanSection {
    let series = EnvironmentalSeries::from_columns(
        (0..7).map(TimeKey::Month).collect(),
        vec![50.0, 55.0, 65.0, 70.0, 0.0, 10.0, 5.0],
        vec![5.0, 15.0, 5.0, 10.0, 0.25, -1.0, 2.0],
        vec![25.0, 45.0, 5.0, 0.0, 30.0, 10.0, 20.0],
        vec![5.0, 15.0, 5.0, 10.0, 0.0, 1.0, 2.0],
        vec![5.0, 15.0, 5.0, 10.0, 0.0, 1.0, 2.0],
        vec![5.0, 15.0, 5.0, 10.0, 0.0, 1.0, 2.0],
    )
    .unwrap();
    OceanSection::new(RegionKey::grid(-12.5, 130.0), series, &GrowthConfig::default())
}

#[test]
fn full_pipeline_builds_a_complete_table() {
    let mut section = seven_month_section();
    section.calculate_factors().unwrap();
    section.calculate_growth_rate().unwrap();
    section.create_section_df().unwrap();

    let table = section.section_df().unwrap();
    assert_eq!(table.len(), 7);
    // six raw inputs, four factors, three nutrient subfactors, growth rate
    assert_eq!(
        table.parameters().collect::<Vec<_>>(),
        vec![
            Parameter::Salinity,
            Parameter::Temperature,
            Parameter::Nitrate,
            Parameter::Ammonium,
            Parameter::Phosphate,
            Parameter::Illumination,
            Parameter::SalinityFactor,
            Parameter::NutrientFactor,
            Parameter::NitrateSubfactor,
            Parameter::AmmoniumSubfactor,
            Parameter::PhosphateSubfactor,
            Parameter::IlluminationFactor,
            Parameter::TempFactor,
            Parameter::SeaweedGrowthRate,
        ]
    );
    assert!(table.months_since_event().is_none());

    let growth = table.column(Parameter::SeaweedGrowthRate).unwrap();
    assert!(growth.iter().all(|g| (0.0..=1.0).contains(g)));
    // zero light and zero nutrients
    assert_eq!(growth[4], 0.0);
}

#[test]
fn growth_is_the_product_of_its_factors() {
    let mut section = seven_month_section();
    section.calculate_factors().unwrap();
    section.calculate_growth_rate().unwrap();
    section.create_section_df().unwrap();

    let row = section.select_section_df_date(&TimeKey::Month(0)).unwrap();
    let product = row.get(Parameter::IlluminationFactor).unwrap()
        * row.get(Parameter::TempFactor).unwrap()
        * row.get(Parameter::NutrientFactor).unwrap()
        * row.get(Parameter::SalinityFactor).unwrap();
    assert_relative_eq!(row.get(Parameter::SeaweedGrowthRate).unwrap(), product);
    assert_eq!(row.get(Parameter::Illumination), Some(50.0));
    assert_eq!(row.months_since_event, None);
}

#[test]
fn stages_cannot_be_skipped() {
    let mut section = seven_month_section();
    assert!(matches!(
        section.create_section_df(),
        Err(SeaweedError::Precondition { .. })
    ));
    assert!(matches!(
        section.select_section_df_date(&TimeKey::Month(0)),
        Err(SeaweedError::Precondition { .. })
    ));
    assert!(matches!(
        section.calculate_mean_growth_rate(),
        Err(SeaweedError::Precondition { .. })
    ));

    section.calculate_factors().unwrap();
    assert!(matches!(
        section.create_section_df(),
        Err(SeaweedError::Precondition { required: "GrowthComputed", .. })
    ));
}

#[test]
fn unknown_date_is_reported() {
    let mut section = seven_month_section();
    section.calculate_factors().unwrap();
    section.calculate_growth_rate().unwrap();
    section.create_section_df().unwrap();
    assert!(matches!(
        section.select_section_df_date(&TimeKey::Month(7)),
        Err(SeaweedError::TimeKeyNotFound { .. })
    ));
}

#[test]
fn density_adds_self_shading_column() {
    let series = EnvironmentalSeries::from_columns(
        vec![TimeKey::Month(0), TimeKey::Month(1)],
        vec![50.0, 50.0],
        vec![25.0, 25.0],
        vec![30.0, 30.0],
        vec![20.0, 20.0],
        vec![20.0, 20.0],
        vec![20.0, 20.0],
    )
    .unwrap()
    .with_density(vec![0.1, 1.4])
    .unwrap();
    let mut section = OceanSection::new(RegionKey::grid(0.0, 0.0), series, &GrowthConfig::default());
    section.calculate_factors().unwrap();
    section.calculate_growth_rate().unwrap();
    section.create_section_df().unwrap();

    let table = section.section_df().unwrap();
    assert_eq!(table.parameters().count(), 16);
    let shading = table.column(Parameter::SelfShadingFactor).unwrap();
    assert_eq!(shading[0], 1.0);
    assert_relative_eq!(shading[1], (-0.513_f64).exp(), epsilon = 1e-12);

    let growth = table.column(Parameter::SeaweedGrowthRate).unwrap();
    assert_relative_eq!(growth[1], growth[0] * shading[1], epsilon = 1e-12);
}
