// src/cli.rs

use crate::config::{self, Config};
use crate::model::Outcome;
use crate::renderer::Format;
use clap::{Args as ClapArgs, Parser, ValueEnum};
use std::path::PathBuf;

/// Collect Zuul CI results reported on Gerrit changes
#[derive(Parser, Debug)]
#[command(name = "zuul-results", author, version, about, long_about = None)]
pub struct Args {
    /// Change IDs, or files listing one change ID per line
    #[arg(short = 'i', long, num_args = 1.., value_name = "ID|FILE", required_unless_present = "input_json")]
    pub change_ids: Vec<String>,

    /// Output format (json, csv, html); inferred from --output-file if omitted
    #[arg(short, long, value_enum)]
    pub format: Option<Format>,

    /// Path of the output file; stdout if omitted
    #[arg(short, long)]
    pub output_file: Option<PathBuf>,

    /// Only report this job, whatever its outcome
    #[arg(short, long)]
    pub job_name: Option<String>,

    /// Outcomes to report [default: everything but SUCCESS]
    #[arg(short = 'r', long, value_enum, num_args = 1..)]
    pub test_results: Option<Vec<Outcome>>,

    /// Only builds from the last N hours, e.g. '24*2' for two days
    #[arg(short, long, value_name = "EXPR")]
    pub term: Option<String>,

    /// Load previously collected results instead of querying, for debugging
    #[arg(long)]
    pub input_json: Option<PathBuf>,

    #[command(flatten)]
    pub endpoints: EndpointArgs,

    /// Directory for the log file
    #[arg(long, default_value = "logs")]
    pub log_dir: PathBuf,
}

/// Download logs of failed Zuul builds for one Gerrit change
#[derive(Parser, Debug)]
#[command(name = "zuul-logs", author, version, about, long_about = None)]
pub struct LogsArgs {
    /// Change ID
    #[arg(short = 'i', long, required_unless_present = "input_json")]
    pub change_id: Option<String>,

    /// Patchset to download; the latest one found if omitted
    #[arg(short, long)]
    pub patchset: Option<u64>,

    /// Only this job, whatever its outcome
    #[arg(short, long)]
    pub job_name: Option<String>,

    /// Outcomes to download, or ALL [default: everything but SUCCESS]
    #[arg(short = 'r', long, num_args = 1.., value_parser = parse_selection)]
    pub test_results: Option<Vec<Selection>>,

    /// JSON report from zuul-results to use instead of querying
    #[arg(long)]
    pub input_json: Option<PathBuf>,

    /// Script invoked as `bash <helper> <artifact-url>` per build
    #[arg(long, default_value = "get_logs.sh")]
    pub helper: PathBuf,

    #[command(flatten)]
    pub endpoints: EndpointArgs,

    /// Directory for the log file
    #[arg(long, default_value = "logs")]
    pub log_dir: PathBuf,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct EndpointArgs {
    /// Gerrit base URL
    #[arg(long, default_value = config::REVIEW_BASE)]
    pub review_url: String,

    /// Zuul base URL
    #[arg(long, default_value = config::ZUUL_BASE)]
    pub zuul_url: String,

    /// Zuul tenant
    #[arg(long, default_value = config::TENANT)]
    pub tenant: String,

    /// Project used to expand short change IDs
    #[arg(long, default_value = config::PROJECT)]
    pub project: String,

    /// Branch used to expand short change IDs
    #[arg(long, default_value = config::BRANCH)]
    pub branch: String,
}

impl EndpointArgs {
    pub fn config(&self) -> Config {
        Config {
            review_base: self.review_url.clone(),
            zuul_base: self.zuul_url.clone(),
            tenant: self.tenant.clone(),
            project: self.project.clone(),
            branch: self.branch.clone(),
        }
    }
}

/// One `--test-results` value for zuul-logs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    All,
    Only(Outcome),
}

fn parse_selection(s: &str) -> Result<Selection, String> {
    if s == "ALL" {
        return Ok(Selection::All);
    }
    Outcome::from_str(s, false).map(Selection::Only)
}

/// Expands selections into outcomes; `None` means the default filter
pub fn outcomes(selections: Option<&[Selection]>) -> Option<Vec<Outcome>> {
    let selections = selections?;
    if selections.contains(&Selection::All) {
        return Some(Outcome::ALL.to_vec());
    }
    Some(
        selections
            .iter()
            .filter_map(|s| match s {
                Selection::Only(o) => Some(*o),
                Selection::All => None,
            })
            .collect(),
    )
}
