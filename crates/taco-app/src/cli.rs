use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "tacobi", version, about = "Fetch the datasets of a TacoBI dashboard")]
pub struct Cli {
    /// Path to the JSON configuration file
    #[arg(long, default_value = "tacobi.json", env = "TACOBI_CONFIG")]
    pub config: PathBuf,

    /// Override the base URL from the configuration
    #[arg(long, env = "TACOBI_BASE_URL")]
    pub base_url: Option<String>,

    /// How long to wait for every dataset to settle, e.g. "10s"
    #[arg(long, default_value = "60s", value_parser = humantime::parse_duration)]
    pub wait: Duration,

    /// Datasets to report, in order. Defaults to every declared dataset.
    #[arg(long = "dataset", value_name = "ID")]
    pub datasets: Vec<String>,

    /// Print the rows of loaded datasets as tables
    #[arg(long)]
    pub show: bool,
}
