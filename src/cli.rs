use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::aggregate::Measure;
use crate::fetch::{Source, DEFAULT_LIMIT, DEFAULT_SOURCE_URL};

#[derive(Parser, Debug)]
#[command(
    name = "edustar",
    about = "Clean the education coverage dataset, build its star schema and report aggregates",
    version
)]
pub struct Cli {
    /// Open-data resource to fetch raw rows from
    #[arg(long, env = "EDUSTAR_SOURCE_URL", default_value = DEFAULT_SOURCE_URL)]
    pub source_url: String,

    /// Maximum rows requested from the resource
    #[arg(long, env = "EDUSTAR_LIMIT", default_value_t = DEFAULT_LIMIT)]
    pub limit: usize,

    /// Read raw rows from a local JSON array instead of fetching
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Print results as JSON instead of terminal tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Cleaning accounting, dimension sizes and per-year statistics
    Summary,

    /// Departments ranked by the mean of a measure
    Ranking {
        #[arg(long, value_enum, default_value = "enrollment-rate")]
        measure: Measure,
    },

    /// National mean of a measure per year
    National {
        #[arg(long, value_enum, default_value = "net-coverage")]
        measure: Measure,
    },

    /// Yearly mean of a measure for selected departments
    Series {
        /// Department names, any spelling (repeatable or comma separated)
        #[arg(long, value_delimiter = ',', required = true)]
        departments: Vec<String>,

        #[arg(long, value_enum, default_value = "net-coverage")]
        measure: Measure,
    },

    /// Mean of a percentage measure per two-digit department code, for one year
    Map {
        /// Year to show; defaults to the latest year available
        #[arg(long)]
        year: Option<i32>,

        #[arg(long, value_enum, default_value = "net-coverage")]
        measure: Measure,
    },

    /// First rows of the time, geographic and fact tables
    Tables {
        #[arg(long, default_value_t = 5)]
        head: usize,
    },
}

impl Cli {
    pub fn source(&self) -> Source {
        match &self.input {
            Some(path) => Source::File(path.clone()),
            None => Source::Api {
                url: self.source_url.clone(),
                limit: self.limit,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_series_with_comma_separated_departments() {
        let cli = Cli::parse_from([
            "edustar",
            "--input",
            "raw.json",
            "series",
            "--departments",
            "Bogotá,Antioquia",
            "--measure",
            "gross-coverage",
        ]);
        assert!(matches!(cli.source(), Source::File(_)));
        match cli.command {
            Command::Series {
                departments,
                measure,
            } => {
                assert_eq!(departments, vec!["Bogotá", "Antioquia"]);
                assert_eq!(measure, Measure::GrossCoverage);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn defaults_to_the_api_source() {
        let cli = Cli::parse_from(["edustar", "map"]);
        match cli.source() {
            Source::Api { url, limit } => {
                assert_eq!(url, DEFAULT_SOURCE_URL);
                assert_eq!(limit, DEFAULT_LIMIT);
            }
            other => panic!("unexpected source {:?}", other),
        }
    }
}
