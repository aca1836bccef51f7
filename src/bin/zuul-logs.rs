// src/bin/zuul-logs.rs

use anyhow::{Context, Result};
use clap::Parser;
use std::collections::BTreeSet;
use std::process::ExitCode;
use tracing::{error, info};
use zuul_results::cli::{self, LogsArgs};
use zuul_results::client::OpenDevClient;
use zuul_results::extractor::ResultFilter;
use zuul_results::{collector, downloader, logging};

fn main() -> ExitCode {
    let args = LogsArgs::parse();
    logging::init(&args.log_dir, "zuul-logs");

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &LogsArgs) -> Result<()> {
    let filter = ResultFilter::new(
        args.job_name.clone(),
        cli::outcomes(args.test_results.as_deref()),
    );

    let records = match (&args.input_json, &args.change_id) {
        (Some(path), _) => collector::load_report(path)
            .with_context(|| format!("loading {}", path.display()))?,
        (None, Some(change_id)) => {
            info!("Collecting {} for change {}", filter, change_id);
            let ids = BTreeSet::from([change_id.clone()]);
            let client = OpenDevClient::new(args.endpoints.config())?;
            collector::collect(&client, &ids, &filter).context("collecting results")?
        }
        (None, None) => anyhow::bail!("either --change-id or --input-json is required"),
    };

    let change_id = args.change_id.as_deref().unwrap_or("-");
    let urls = downloader::select(&records, args.patchset, change_id)?;
    let ok = downloader::download_all(&args.helper, &urls);
    info!("{} of {} downloads succeeded", ok, urls.len());
    Ok(())
}
