//! Dose request building.
//!
//! Turns a chart, a stage name and a free-text amount into the JSON body the
//! doser's `/dose` endpoint expects, then hands it to a [`DoseTransport`].
//!
//! # Failure Modes
//!
//! - Unknown stage: `InvalidStage`, listing the chart's stages
//! - Amount not of the form `<number><unit>`: `InvalidAmount`
//! - Transport failure: whatever the transport returns
//!
//! None of these exit the process; the caller picks the exit status.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use crate::chart::{ChartStore, FeedChart, Stage};
use crate::error::{DoserError, Result};
use crate::transport::DoseTransport;
use crate::types::{DoserHost, TargetAmount, VolumeUnit};

/// Path of the dosing endpoint on the doser
pub const DOSE_ENDPOINT: &str = "dose";

/// One pump instruction within a dose payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutrientDose {
    pub motor_idx: usize,
    pub name: String,
    pub ml_per_gal: f64,
}

/// Body of `POST /dose`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DosePayload {
    pub nutrients: Vec<NutrientDose>,
    pub target_amount: f64,
    pub target_unit: VolumeUnit,
}

impl DosePayload {
    /// Assign motors by position: the n-th nutrient of the stage goes to motor n.
    pub fn for_stage(stage: &Stage, amount: TargetAmount) -> Self {
        let nutrients = stage
            .nutrients
            .iter()
            .enumerate()
            .map(|(motor_idx, n)| NutrientDose {
                motor_idx,
                name: n.name.clone(),
                ml_per_gal: n.ml_per_gal,
            })
            .collect();

        Self {
            nutrients,
            target_amount: amount.value,
            target_unit: amount.unit,
        }
    }

    pub fn target(&self) -> TargetAmount {
        TargetAmount {
            value: self.target_amount,
            unit: self.target_unit,
        }
    }
}

/// Validate the stage and amount against a chart and build the payload.
///
/// The stage is checked before the amount, so a request with both wrong
/// reports the stage.
pub fn build_payload(chart: &FeedChart, stage: &str, amount: &str) -> Result<DosePayload> {
    let resolved = chart
        .stage(stage)
        .ok_or_else(|| DoserError::InvalidStage {
            stage: stage.to_string(),
            available: chart.stage_names(),
        })?;

    let target: TargetAmount = amount.parse()?;

    Ok(DosePayload::for_stage(resolved, target))
}

/// Everything needed to dose one batch of solution
#[derive(Debug, Clone, PartialEq)]
pub struct DoseCommand {
    pub host: DoserHost,
    pub chart: String,
    pub stage: String,
    pub amount: String,
}

/// Resolve, build and send one dose request.
///
/// Returns the payload that was handed to the transport.
pub fn run<T: DoseTransport + ?Sized>(
    store: &ChartStore,
    cmd: &DoseCommand,
    transport: &T,
) -> Result<DosePayload> {
    let chart = store.require_chart(&cmd.chart)?;
    let payload = build_payload(chart, &cmd.stage, &cmd.amount)?;

    let plan = MixPlan::from_payload(&payload);
    info!(
        chart = %chart.name,
        stage = %cmd.stage,
        solution_ml = plan.solution_ml,
        nutrients = payload.nutrients.len(),
        "Dose request built"
    );
    for dose in &plan.doses {
        debug!(motor = dose.motor_idx, nutrient = %dose.name, ml = dose.ml, "Planned dose");
    }

    let url = cmd.host.endpoint(DOSE_ENDPOINT);
    transport.send(&url, &payload)?;

    Ok(payload)
}

/// How much of each nutrient the doser will pump for a payload.
///
/// Mirrors the doser's own arithmetic: the target volume is converted to
/// gallons and multiplied by each ml-per-gallon ratio.
#[derive(Debug, Clone, PartialEq)]
pub struct MixPlan {
    pub solution_ml: f64,
    pub solution_gal: f64,
    pub doses: Vec<PlannedDose>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedDose {
    pub motor_idx: usize,
    pub name: String,
    pub ml: f64,
}

impl MixPlan {
    pub fn from_payload(payload: &DosePayload) -> Self {
        let target = payload.target();
        let solution_gal = target.in_gallons();

        let doses = payload
            .nutrients
            .iter()
            .map(|n| PlannedDose {
                motor_idx: n.motor_idx,
                name: n.name.clone(),
                ml: solution_gal * n.ml_per_gal,
            })
            .collect();

        Self {
            solution_ml: target.in_ml(),
            solution_gal,
            doses,
        }
    }

    pub fn total_ml(&self) -> f64 {
        self.doses.iter().map(|d| d.ml).sum()
    }
}

impl fmt::Display for MixPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Solution: {:.2} gal ({:.0} mL)",
            self.solution_gal, self.solution_ml
        )?;
        for dose in &self.doses {
            writeln!(
                f,
                "  motor {:>2}  {:<16} {:>8.2} mL",
                dose.motor_idx, dose.name, dose.ml
            )?;
        }
        write!(f, "  total nutrients   {:>16.2} mL", self.total_ml())
    }
}
