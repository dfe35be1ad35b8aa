//! Feed chart loading and lookup.
//!
//! A chart file is a JSON object of the shape
//! `chart name -> stage name -> nutrient name -> ml per gallon`.
//! Key order in the file is kept everywhere: the position of a nutrient within
//! its stage is the index of the doser motor that pumps it.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{DoserError, Result};

/// Environment variable naming a chart file to use instead of the bundled one
pub const CHART_FILE_ENV: &str = "NUTRIENT_DOSER_CHART_FILE";

const BUNDLED_CHART: &str = include_str!("../data/floragro_chart.json");

/// One nutrient and its concentration within a stage
#[derive(Debug, Clone, PartialEq)]
pub struct NutrientRatio {
    pub name: String,
    pub ml_per_gal: f64,
}

/// A growth stage: nutrient ratios in file order
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub name: String,
    pub nutrients: Vec<NutrientRatio>,
}

/// A named feeding program: stages in file order
#[derive(Debug, Clone, PartialEq)]
pub struct FeedChart {
    pub name: String,
    pub stages: Vec<Stage>,
}

impl FeedChart {
    pub fn stage(&self, name: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.name == name)
    }

    pub fn stage_names(&self) -> Vec<String> {
        self.stages.iter().map(|s| s.name.clone()).collect()
    }
}

/// Every chart known to this run. Built once at startup and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStore {
    charts: Vec<FeedChart>,
}

impl ChartStore {
    /// Load charts from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            DoserError::chart_load(format!("failed to read {}: {}", path.display(), e))
        })?;

        let store = Self::from_json(&content).map_err(|e| match e {
            DoserError::ChartLoad(msg) => {
                DoserError::chart_load(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;

        info!(path = %path.display(), charts = store.charts.len(), "Loaded chart file");
        Ok(store)
    }

    /// The chart compiled into the binary
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_CHART)
    }

    /// The chart file named by `NUTRIENT_DOSER_CHART_FILE`, or the bundled chart
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CHART_FILE_ENV) {
            Some(path) if !path.is_empty() => Self::load(path),
            _ => {
                debug!("Using bundled chart");
                Self::bundled()
            }
        }
    }

    /// Parse charts from JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(content)
            .map_err(|e| DoserError::chart_load(format!("invalid JSON: {e}")))?;

        let charts = as_object(&root, "chart file")?
            .iter()
            .map(|(name, stages)| parse_chart(name, stages))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { charts })
    }

    /// Chart names in file order
    pub fn chart_names(&self) -> Vec<String> {
        self.charts.iter().map(|c| c.name.clone()).collect()
    }

    pub fn chart(&self, name: &str) -> Option<&FeedChart> {
        self.charts.iter().find(|c| c.name == name)
    }

    /// Like [`ChartStore::chart`], but an unknown name is an error listing the known ones
    pub fn require_chart(&self, name: &str) -> Result<&FeedChart> {
        self.chart(name).ok_or_else(|| DoserError::InvalidChart {
            chart: name.to_string(),
            available: self.chart_names(),
        })
    }

    pub fn charts(&self) -> &[FeedChart] {
        &self.charts
    }
}

fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| DoserError::chart_load(format!("{what} must be a JSON object")))
}

fn parse_chart(name: &str, value: &Value) -> Result<FeedChart> {
    let stages = as_object(value, &format!("chart '{name}'"))?
        .iter()
        .map(|(stage, nutrients)| parse_stage(name, stage, nutrients))
        .collect::<Result<Vec<_>>>()?;

    Ok(FeedChart {
        name: name.to_string(),
        stages,
    })
}

fn parse_stage(chart: &str, name: &str, value: &Value) -> Result<Stage> {
    let mut nutrients = Vec::new();
    for (nutrient, ratio) in as_object(value, &format!("stage '{chart}.{name}'"))? {
        let ml_per_gal = ratio
            .as_f64()
            .filter(|r| r.is_finite() && *r >= 0.0)
            .ok_or_else(|| {
                DoserError::chart_load(format!(
                    "'{chart}.{name}.{nutrient}' must be a non-negative number, got {ratio}"
                ))
            })?;
        nutrients.push(NutrientRatio {
            name: nutrient.clone(),
            ml_per_gal,
        });
    }

    Ok(Stage {
        name: name.to_string(),
        nutrients,
    })
}
