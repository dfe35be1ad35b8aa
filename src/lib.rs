//! Nutrient doser library
//!
//! Looks up nutrient ratios in a feed chart and builds the dose request a
//! networked doser expects at `POST /dose`.

pub mod chart;
pub mod cli;
pub mod dose;
pub mod error;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use chart::{ChartStore, FeedChart, NutrientRatio, Stage};
pub use cli::Cli;
pub use dose::{DoseCommand, DosePayload, MixPlan, NutrientDose, build_payload};
pub use error::{DoserError, Result};
pub use transport::{DoseTransport, DryRunTransport, HttpTransport};
pub use types::{DoserHost, TargetAmount, VolumeUnit};
