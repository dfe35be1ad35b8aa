use clap::builder::PossibleValuesParser;
use clap::{CommandFactory, FromArgMatches, Parser};
use std::ffi::OsString;
use std::time::Duration;

use crate::chart::ChartStore;
use crate::dose::DoseCommand;
use crate::error::DoserError;
use crate::transport::{DEFAULT_TIMEOUT_SECS, MAX_TIMEOUT_SECS};
use crate::types::{DEFAULT_HOST, DoserHost};

/// Nutrient doser - mix a nutrient solution from a feed chart
#[derive(Parser, Debug)]
#[command(name = "nutrient-doser")]
#[command(about = "Mix a nutrient solution from a feed chart on a networked doser")]
#[command(version)]
pub struct Cli {
    /// Base URL of the doser to connect to (http or https)
    #[arg(long, env = "NUTRIENT_DOSER_HOST", default_value = DEFAULT_HOST, value_parser = parse_host)]
    pub host: DoserHost,

    /// Name of chart to use
    #[arg(long)]
    pub chart: String,

    /// Growth stage to reference in chart
    #[arg(long)]
    pub stage: String,

    /// Target amount of solution to mix (allowed units: ml, L, gal)
    #[arg(long)]
    pub amount: String,

    /// Seconds to wait for the doser before giving up (1-3600)
    #[arg(
        long,
        default_value_t = DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..=MAX_TIMEOUT_SECS)
    )]
    pub timeout: u64,

    /// Print the request and mix plan without contacting the doser
    #[arg(long)]
    pub dry_run: bool,
}

fn parse_host(s: &str) -> Result<DoserHost, DoserError> {
    s.parse()
}

impl Cli {
    /// The clap command with `--chart` restricted to the charts in `store`
    pub fn command_for(store: &ChartStore) -> clap::Command {
        Self::command().mut_arg("chart", |arg| {
            arg.value_parser(PossibleValuesParser::new(store.chart_names()))
        })
    }

    pub fn try_parse_with<I, T>(store: &ChartStore, args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command_for(store).try_get_matches_from(args)?;
        Self::from_arg_matches(&matches)
    }

    pub fn parse_args(store: &ChartStore) -> Self {
        Self::try_parse_with(store, std::env::args_os()).unwrap_or_else(|e| e.exit())
    }

    pub fn dose_command(&self) -> DoseCommand {
        DoseCommand {
            host: self.host.clone(),
            chart: self.chart.clone(),
            stage: self.stage.clone(),
            amount: self.amount.clone(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}
