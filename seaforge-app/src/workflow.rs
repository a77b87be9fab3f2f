use crate::clustering::{self, KMeans, KMeansFit, ScaledSeries};
use crate::config::{ClusteringConfig, InputConfig, RunConfig};
use crate::plotting;
use anyhow::{Context, Result};
use seaforge_core::{
    growth::{self, FormulaConstants},
    reader::{read_lme_names, DataGrid, DataLme},
    writer::{FrameWriter, RunSummary},
    SeaweedError, SeaweedModel,
};
use seaforge_schemas::{growth::FormulaVersion, parameter::Parameter, region::RegionKey};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

/// Display names of regions, empty unless an LME lookup was configured.
pub type RegionNames = BTreeMap<RegionKey, String>;

/// Reads the configured input and runs every section through all stages.
pub fn build_model(config: &RunConfig) -> Result<(SeaweedModel, RegionNames)> {
    println!("\n--- [Workflow] Loading Environmental Data ---");
    let mut model = SeaweedModel::with_config(config.growth.clone());
    let mut names = RegionNames::new();

    match &config.input {
        InputConfig::Lme {
            path,
            names: names_path,
            ..
        } => {
            let data = DataLme::from_path(path)
                .with_context(|| format!("Failed to load LME data from {:?}", path))?;
            let lme_ids = config.lme_ids().unwrap_or_else(|| data.lme_ids());
            model.add_data_by_lme(&lme_ids, &data)?;

            if let Some(names_path) = names_path {
                let lme_names = read_lme_names(names_path)
                    .with_context(|| format!("Failed to load LME names from {:?}", names_path))?;
                names.extend(
                    lme_names
                        .into_iter()
                        .map(|(id, name)| (RegionKey::lme(id), name)),
                );
            }
        }
        InputConfig::Grid { path } => {
            let data = DataGrid::from_path(path)
                .with_context(|| format!("Failed to load grid data from {:?}", path))?;
            model.add_data_by_grid(&data)?;
        }
    }
    println!("Loaded {} ocean sections.", model.len());

    println!("\n--- [Workflow] Computing Growth ---");
    model.calculate_factors().context("Failed to calculate growth factors")?;
    model.calculate_growth_rate().context("Failed to calculate growth rates")?;
    model.create_section_dfs().context("Failed to build section tables")?;

    Ok((model, names))
}

fn section_file_name(region: &RegionKey) -> String {
    match region {
        RegionKey::Lme { id } => format!("lme_{}.csv", id),
        RegionKey::Grid { cell } => format!("grid_{}_{}.csv", cell.lat, cell.lon),
    }
}

/// Section tables, parameter frames, report rows and the JSON summary.
pub fn write_outputs(model: &SeaweedModel, config: &RunConfig, output_dir: &Path) -> Result<RunSummary> {
    println!("\n--- [Workflow] Writing Outputs ---");
    let sections_dir = output_dir.join("sections");
    fs::create_dir_all(&sections_dir)
        .with_context(|| format!("Failed to create directory: {:?}", sections_dir))?;

    for (region, section) in model.sections() {
        FrameWriter::new(sections_dir.join(section_file_name(region)))?
            .write_section_table(section.section_df()?)?;
    }

    for &parameter in &config.export_parameters {
        match model.parameter_frame(parameter) {
            Ok(frame) => FrameWriter::new(output_dir.join(format!("{}.csv", parameter)))?
                .write_parameter_frame(&frame)?,
            Err(SeaweedError::ColumnNotFound { region, .. }) => {
                warn!(%parameter, %region, "Parameter not computed for this run, skipping export");
            }
            Err(e) => return Err(e.into()),
        }
    }

    if let Some(key) = config.report_time_key()? {
        let frame = model.construct_df_from_sections_for_date(&key)?;
        FrameWriter::new(output_dir.join(format!("date_{}.csv", key)))?.write_date_frame(&frame)?;
    }
    if let Some(months) = config.report_months_since_event {
        let frame = model.construct_df_from_sections_for_months(months)?;
        FrameWriter::new(output_dir.join(format!("months_since_war_{}.csv", months)))?
            .write_date_frame(&frame)?;
    }

    let summary = RunSummary::from_model(model)?;
    summary.write_json(output_dir.join("summary.json"))?;
    Ok(summary)
}

/// Clusters of one parameter's scaled series, plus the elbow curve if asked for.
pub struct ClusterOutput {
    pub series: ScaledSeries,
    pub fit: KMeansFit,
    pub elbow: Option<Vec<(usize, f64)>>,
}

pub fn run_clustering(
    model: &SeaweedModel,
    settings: &ClusteringConfig,
    output_dir: &Path,
) -> Result<Option<ClusterOutput>> {
    println!("\n--- [Workflow] Clustering {} ---", settings.parameter);
    let frame = model.parameter_frame(settings.parameter)?;
    let series = ScaledSeries::from_frame(&frame);
    if series.len() < settings.k {
        warn!(
            regions = series.len(),
            k = settings.k,
            "Too few complete series for clustering, skipping"
        );
        return Ok(None);
    }

    let fit = KMeans::new(settings.k, settings.seed)
        .with_max_iterations(settings.max_iterations)
        .fit(&series.points)?;
    info!(k = settings.k, iterations = fit.iterations, inertia = fit.inertia, "Clustered regions");

    let path = output_dir.join("clusters.csv");
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("Failed to create {:?}", path))?;
    writer.write_record(["region", "cluster"])?;
    for (region, cluster) in clustering::assignments(&series, &fit) {
        writer.write_record([region.to_string(), cluster.to_string()])?;
    }
    writer.flush()?;

    let elbow = settings
        .elbow_max_k
        .map(|max_k| clustering::elbow(&series.points, max_k, settings.seed, settings.max_iterations))
        .transpose()?;

    Ok(Some(ClusterOutput { series, fit, elbow }))
}

/// Response of every factor to its driver over its plotting range.
pub fn write_factor_table(output_dir: &Path, version: FormulaVersion) -> Result<()> {
    let c = FormulaConstants::for_version(version);
    let path = output_dir.join("factor_curves.csv");
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("Failed to create {:?}", path))?;
    writer.write_record(["quantity", "value", "factor"])?;

    let curves: [(&str, f64, f64, fn(f64, &FormulaConstants) -> seaforge_core::SeaweedResult<f64>); 6] = [
        ("illumination", 0.0, 400.0, growth::illumination_single_value),
        ("temperature", -5.0, 40.0, growth::temperature_single_value),
        ("salinity", 0.0, 50.0, growth::salinity_single_value),
        ("nitrate", 0.0, 5.0, growth::nitrate_subfactor),
        ("ammonium", 0.0, 5.0, growth::ammonium_subfactor),
        ("phosphate", 0.0, 5.0, growth::phosphate_subfactor),
    ];
    for (quantity, min, max, factor) in curves {
        for i in 0..=100 {
            let value = min + (max - min) * i as f64 / 100.0;
            writer.write_record([quantity.to_string(), value.to_string(), factor(value, &c)?.to_string()])?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Runs the configured study end to end and returns its output directory.
pub fn run(config: &RunConfig, config_path: Option<&Path>) -> Result<PathBuf> {
    let output_dir = config.output_root.join(format!(
        "{}_{}",
        config.name,
        chrono::Utc::now().format("%Y%m%d_%H%M%S")
    ));
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    // the run directory carries its own config
    if let Some(config_path) = config_path {
        fs::copy(config_path, output_dir.join("run.yaml"))
            .with_context(|| format!("Failed to copy {:?}", config_path))?;
    }

    let (model, names) = build_model(config)?;
    let summary = write_outputs(&model, config, &output_dir)?;

    let clusters = match &config.clustering {
        Some(settings) => run_clustering(&model, settings, &output_dir)?,
        None => None,
    };

    let plots = &config.plots;
    if plots.factor_curves || plots.growth_series || plots.clusters {
        println!("\n--- [Workflow] Plotting ---");
    }
    if plots.factor_curves {
        plotting::plot_factor_curves(&output_dir, &FormulaConstants::for_version(config.growth.formula_version))?;
    }
    if plots.growth_series {
        let frame = model.parameter_frame(Parameter::SeaweedGrowthRate)?;
        plotting::plot_parameter_series(&output_dir, &frame, &names)?;
    }
    if let (true, Some(clusters), Some(settings)) = (plots.clusters, &clusters, &config.clustering) {
        plotting::plot_clusters(&output_dir, settings.parameter.as_str(), &clusters.series, &clusters.fit)?;
        if let Some(curve) = &clusters.elbow {
            plotting::plot_elbow(&output_dir, curve)?;
        }
    }

    print_report(&summary, &names, clusters.as_ref(), &output_dir);
    Ok(output_dir)
}

fn print_report(
    summary: &RunSummary,
    names: &RegionNames,
    clusters: Option<&ClusterOutput>,
    output_dir: &Path,
) {
    println!("\n\n--- [Seaweed Growth Report] ---");
    println!("========================================");
    if let Some(mode) = summary.mode {
        println!("Ingestion: {}", mode);
    }
    println!("Formula version: {:?}", summary.formula_version);
    println!("Sections: {}", summary.sections.len());
    println!("----------------------------------------");

    let mut ranked: Vec<_> = summary
        .sections
        .iter()
        .filter_map(|s| s.mean_growth_rate.map(|m| (s, m)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    println!("\nMean growth rate (best first):");
    for (section, mean) in ranked.iter().take(10) {
        let label = names
            .get(&section.region)
            .map_or_else(|| section.region.to_string(), |n| format!("{} ({})", n, section.region));
        println!("  - {}: {:.4}", label, mean);
    }
    let without_data = summary.sections.len() - ranked.len();
    if without_data > 0 {
        println!("  - {} sections without any data", without_data);
    }

    if let Some(clusters) = clusters {
        println!("\nClusters:");
        for cluster in 0..clusters.fit.centroids.len() {
            let members = clusters.fit.labels.iter().filter(|&&l| l == cluster).count();
            println!("  - Cluster {}: {} regions", cluster, members);
        }
    }
    println!("========================================");
    println!("\nResults are in '{}'", output_dir.display());
}
