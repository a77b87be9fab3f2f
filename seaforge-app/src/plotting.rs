//! Charts for a finished run: factor response curves, per-region series and clusters.

use crate::clustering::{KMeansFit, ScaledSeries};
use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use seaforge_core::growth::{
    ammonium_subfactor, illumination_single_value, nitrate_subfactor, phosphate_subfactor,
    salinity_single_value, temperature_single_value, FormulaConstants,
};
use seaforge_core::model::ParameterFrame;
use seaforge_core::SeaweedResult;
use seaforge_schemas::region::RegionKey;
use std::collections::BTreeMap;
use std::ops::Range;
use std::path::Path;
use tracing::{info, warn};

type Panel<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

const CURVE_STEPS: usize = 400;

/// Samples `factor` at evenly spaced points of `range`.
fn sample<F>(range: &Range<f64>, factor: F) -> SeaweedResult<Vec<(f64, f64)>>
where
    F: Fn(f64) -> SeaweedResult<f64>,
{
    (0..=CURVE_STEPS)
        .map(|i| {
            let x = range.start + (range.end - range.start) * i as f64 / CURVE_STEPS as f64;
            Ok((x, factor(x)?))
        })
        .collect()
}

fn draw_curve_panel(
    panel: &Panel,
    caption: &str,
    x_desc: &str,
    x_range: Range<f64>,
    curves: &[(&str, Vec<(f64, f64)>, RGBColor)],
) -> Result<()> {
    let mut chart = ChartBuilder::on(panel)
        .caption(caption, ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(45)
        .build_cartesian_2d(x_range, 0f64..1.05f64)?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc("Factor")
        .draw()?;

    for (label, points, color) in curves {
        let color = *color;
        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?
            .label(*label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.filled()));
    }

    if curves.len() > 1 {
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }
    Ok(())
}

/// How each factor responds to its driver under the given constants.
pub fn plot_factor_curves(output_dir: &Path, c: &FormulaConstants) -> Result<()> {
    let path = output_dir.join("factor_curves.png");
    let root = BitMapBackend::new(&path, (1280, 960)).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((2, 2));

    let illumination = 0.0..400.0;
    let temperature = -5.0..40.0;
    let salinity = 0.0..50.0;
    let nutrient = 0.0..5.0;

    draw_curve_panel(
        &panels[0],
        "Illumination",
        "Illumination (W/m²)",
        illumination.clone(),
        &[("illumination", sample(&illumination, |x| illumination_single_value(x, c))?, RED)],
    )?;
    draw_curve_panel(
        &panels[1],
        "Temperature",
        "Temperature (°C)",
        temperature.clone(),
        &[("temperature", sample(&temperature, |x| temperature_single_value(x, c))?, BLUE)],
    )?;
    draw_curve_panel(
        &panels[2],
        "Salinity",
        "Salinity (ppt)",
        salinity.clone(),
        &[("salinity", sample(&salinity, |x| salinity_single_value(x, c))?, GREEN)],
    )?;
    draw_curve_panel(
        &panels[3],
        "Nutrients",
        "Concentration (mmol/m³)",
        nutrient.clone(),
        &[
            ("nitrate", sample(&nutrient, |x| nitrate_subfactor(x, c))?, RED),
            ("ammonium", sample(&nutrient, |x| ammonium_subfactor(x, c))?, BLUE),
            ("phosphate", sample(&nutrient, |x| phosphate_subfactor(x, c))?, MAGENTA),
        ],
    )?;

    root.present()?;
    Ok(())
}

fn region_label(region: &RegionKey, names: &BTreeMap<RegionKey, String>) -> String {
    names
        .get(region)
        .map_or_else(|| region.to_string(), |name| format!("{} ({})", name, region))
}

/// One line per region over the run's timesteps. Missing months are left out.
pub fn plot_parameter_series(
    output_dir: &Path,
    frame: &ParameterFrame,
    names: &BTreeMap<RegionKey, String>,
) -> Result<()> {
    let max_value = frame
        .columns
        .values()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    if !max_value.is_finite() || frame.n_rows() == 0 {
        warn!(parameter = %frame.parameter, "No data to plot");
        return Ok(());
    }
    let min_value = frame
        .columns
        .values()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0, f64::min);

    let path = output_dir.join(format!("{}_series.png", frame.parameter));
    let root = BitMapBackend::new(&path, (1280, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let y_desc = match frame.parameter.unit() {
        Some(unit) => format!("{} ({})", frame.parameter, unit),
        None => frame.parameter.to_string(),
    };
    let top = if max_value > 0.0 { max_value * 1.1 } else { 1.0 };

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{} by region", frame.parameter), ("sans-serif", 40).into_font())
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(60)
        .build_cartesian_2d(0usize..frame.n_rows(), min_value..top)?;

    let first = frame.index.first().map(ToString::to_string).unwrap_or_default();
    chart
        .configure_mesh()
        .x_desc(format!("Months since {}", first))
        .y_desc(y_desc)
        .draw()?;

    let with_legend = frame.n_columns() <= 12;
    for (i, (region, values)) in frame.columns.iter().enumerate() {
        let color = Palette99::pick(i).to_rgba();
        let points = values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(x, v)| (x, *v));
        let series = chart.draw_series(LineSeries::new(points, color.stroke_width(2)))?;
        if with_legend {
            series
                .label(region_label(region, names))
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.filled()));
        }
    }

    if with_legend {
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }
    root.present()?;
    info!(path = %path.display(), "Saved series plot");
    Ok(())
}

/// One panel per cluster: members faint, centroid bold.
pub fn plot_clusters(
    output_dir: &Path,
    parameter: &str,
    series: &ScaledSeries,
    fit: &KMeansFit,
) -> Result<()> {
    let k = fit.centroids.len();
    let length = fit.centroids.first().map_or(0, Vec::len);
    if k == 0 || length == 0 {
        warn!("No clusters to plot");
        return Ok(());
    }

    let path = output_dir.join(format!("{}_clusters.png", parameter));
    let root = BitMapBackend::new(&path, (400 * k as u32, 400)).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((1, k));

    for (cluster, (panel, centroid)) in panels.iter().zip(&fit.centroids).enumerate() {
        let members = fit.labels.iter().filter(|&&l| l == cluster).count();
        let color = Palette99::pick(cluster).to_rgba();

        let mut chart = ChartBuilder::on(panel)
            .caption(
                format!("Cluster {} ({} regions)", cluster, members),
                ("sans-serif", 20).into_font(),
            )
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(40)
            .build_cartesian_2d(0usize..length, 0f64..1f64)?;
        chart.configure_mesh().y_desc("Scaled value").draw()?;

        for (points, _) in series
            .points
            .iter()
            .zip(&fit.labels)
            .filter(|&(_, &l)| l == cluster)
        {
            chart.draw_series(LineSeries::new(
                points.iter().copied().enumerate(),
                color.mix(0.2).stroke_width(1),
            ))?;
        }
        chart.draw_series(LineSeries::new(
            centroid.iter().copied().enumerate(),
            BLACK.stroke_width(3),
        ))?;
    }

    root.present()?;
    info!(path = %path.display(), "Saved cluster plot");
    Ok(())
}

/// Inertia against k, to pick k by eye.
pub fn plot_elbow(output_dir: &Path, curve: &[(usize, f64)]) -> Result<()> {
    let Some(&(max_k, _)) = curve.last() else {
        return Ok(());
    };
    let max_inertia = curve.iter().map(|(_, i)| *i).fold(0.0, f64::max);

    let path = output_dir.join("elbow.png");
    let root = BitMapBackend::new(&path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("k-means elbow", ("sans-serif", 36).into_font())
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(60)
        .build_cartesian_2d(1usize..max_k + 1, 0f64..max_inertia.max(f64::EPSILON) * 1.1)?;

    chart
        .configure_mesh()
        .x_desc("Clusters")
        .y_desc("Inertia")
        .draw()?;
    chart.draw_series(LineSeries::new(curve.iter().copied(), BLUE.stroke_width(2)))?;
    chart.draw_series(curve.iter().map(|&(k, i)| Circle::new((k, i), 4, BLUE.filled())))?;

    root.present()?;
    Ok(())
}
