// src/main.rs

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info};
use zuul_results::cli::Args;
use zuul_results::client::OpenDevClient;
use zuul_results::extractor::ResultFilter;
use zuul_results::renderer::{self, Format};
use zuul_results::{change_ids, collector, logging, window, Error};

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(&args.log_dir, "zuul-results");
    let start_time = Instant::now();

    match run(&args) {
        Ok(count) => {
            info!("Reported {} results in {:.2?}", count, start_time.elapsed());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<usize> {
    let hours = args.term.as_deref().map(window::parse_term).transpose()?;
    let filter = ResultFilter::new(args.job_name.clone(), args.test_results.clone());
    let ids = change_ids::collect(&args.change_ids)?;

    // 1. Collect, either from the APIs or from an earlier report
    let records = match &args.input_json {
        Some(path) => collector::load_report(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => {
            info!("Querying {} changes for {}", ids.len(), filter);
            let client = OpenDevClient::new(args.endpoints.config())?;
            collector::collect(&client, &ids, &filter).context("collecting results")?
        }
    };

    // 2. Drop anything outside the window
    let records = match hours {
        Some(hours) => window::within(records, hours, Local::now().naive_local())?,
        None => records,
    };

    if records.is_empty() {
        return Err(Error::NoResults {
            query: collector::describe_query(&ids, &filter, args.term.as_deref()),
        }
        .into());
    }

    // 3. Render fully before touching the output file
    let format = Format::resolve(args.format, args.output_file.as_deref());
    let report = format.render(&records)?;
    renderer::write_output(&report, args.output_file.as_deref())?;

    Ok(records.len())
}
