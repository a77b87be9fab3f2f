use anyhow::{bail, Context, Result};
use seaforge_schemas::{
    growth::GrowthConfig,
    parameter::Parameter,
    region::{LmeId, LME_COUNT},
    time::TimeKey,
};
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf};

/// Where the environmental data of a run comes from.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputConfig {
    Lme {
        path: PathBuf,
        /// LME numbers to model; every LME in the file when empty.
        #[serde(default)]
        lme_ids: Vec<u8>,
        /// Optional `LME_NUMBER,LME_NAME` lookup for plot titles.
        #[serde(default)]
        names: Option<PathBuf>,
    },
    Grid {
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClusteringConfig {
    #[serde(default = "default_cluster_parameter")]
    pub parameter: Parameter,
    pub k: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Largest k of the elbow sweep; no sweep when unset.
    #[serde(default)]
    pub elbow_max_k: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlotConfig {
    #[serde(default = "enabled")]
    pub factor_curves: bool,
    #[serde(default = "enabled")]
    pub growth_series: bool,
    #[serde(default = "enabled")]
    pub clusters: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            factor_curves: true,
            growth_series: true,
            clusters: true,
        }
    }
}

/// Everything one `seaforge run` needs, loaded from YAML.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_name")]
    pub name: String,
    pub input: InputConfig,
    #[serde(default)]
    pub growth: GrowthConfig,
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,
    /// Parameters exported as one CSV each, regions as columns.
    #[serde(default = "default_export_parameters")]
    pub export_parameters: Vec<Parameter>,
    /// `YYYY-MM-DD` for LME data, a month number for grid data.
    #[serde(default)]
    pub report_date: Option<String>,
    #[serde(default)]
    pub report_months_since_event: Option<i64>,
    #[serde(default)]
    pub clustering: Option<ClusteringConfig>,
    #[serde(default)]
    pub plots: PlotConfig,
}

fn default_name() -> String {
    "seaweed".to_string()
}

fn default_output_root() -> PathBuf {
    PathBuf::from("./data/runs")
}

fn default_export_parameters() -> Vec<Parameter> {
    vec![Parameter::SeaweedGrowthRate]
}

fn default_cluster_parameter() -> Parameter {
    Parameter::SeaweedGrowthRate
}

fn default_seed() -> u64 {
    42
}

fn default_max_iterations() -> usize {
    300
}

fn enabled() -> bool {
    true
}

impl RunConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read run config {:?}", path))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse run config {:?}", path))?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: RunConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if let InputConfig::Lme { lme_ids, .. } = &self.input {
            if let Some(bad) = lme_ids.iter().find(|&&n| LmeId::new(n).is_none()) {
                bail!("LME number {} is outside 1..={}", bad, LME_COUNT);
            }
        }
        if let Some(clustering) = &self.clustering {
            if clustering.k == 0 {
                bail!("clustering.k must be at least 1");
            }
            if clustering.elbow_max_k == Some(0) {
                bail!("clustering.elbow_max_k must be at least 1");
            }
        }
        self.report_time_key()?;
        Ok(())
    }

    pub fn report_time_key(&self) -> Result<Option<TimeKey>> {
        self.report_date
            .as_deref()
            .map(|s| s.parse::<TimeKey>().map_err(anyhow::Error::msg))
            .transpose()
    }

    /// The configured LME ids, `None` meaning every LME in the input.
    pub fn lme_ids(&self) -> Option<Vec<LmeId>> {
        match &self.input {
            InputConfig::Lme { lme_ids, .. } if !lme_ids.is_empty() => {
                Some(lme_ids.iter().filter_map(|&n| LmeId::new(n)).collect())
            }
            _ => None,
        }
    }
}
