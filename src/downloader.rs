// src/downloader.rs

use crate::error::{Error, Result};
use crate::model::ResultRecord;
use std::path::Path;
use std::process::Command;
use tracing::{info, warn};

/// Highest patchset among the records' builds
pub fn latest_patchset(records: &[ResultRecord]) -> Result<Option<u64>> {
    let mut latest = None;
    for record in records {
        let ps = record.patchset_number()?;
        latest = latest.max(Some(ps));
    }
    Ok(latest)
}

/// Artifact URLs of the builds that ran against `patchset`, in report order
pub fn artifact_urls(records: &[ResultRecord], patchset: u64) -> Result<Vec<String>> {
    let mut urls = Vec::new();
    for record in records {
        let url = record.artifact_url()?;
        if record.patchset_number()? == patchset {
            urls.push(url.to_string());
        }
    }
    Ok(urls)
}

/// Picks the URLs to download; fails when there is nothing to fetch
pub fn select(records: &[ResultRecord], patchset: Option<u64>, change_id: &str) -> Result<Vec<String>> {
    let patchset = match patchset {
        Some(ps) => Some(ps),
        None => latest_patchset(records)?,
    };
    let urls = match patchset {
        Some(ps) => artifact_urls(records, ps)?,
        None => Vec::new(),
    };
    if urls.is_empty() {
        return Err(Error::NoLogs {
            change_id: change_id.to_string(),
            patchset: patchset.map_or_else(|| "-".to_string(), |ps| ps.to_string()),
        });
    }
    info!("{} entries matched.", urls.len());
    Ok(urls)
}

/// Runs `bash <helper> <url>` for each URL. A failing helper is logged and
/// the remaining downloads still run.
pub fn download_all(helper: &Path, urls: &[String]) -> usize {
    let mut ok = 0;
    for url in urls {
        info!("running {} {}", helper.display(), url);
        match Command::new("bash").arg(helper).arg(url).status() {
            Ok(status) if status.success() => ok += 1,
            Ok(status) => warn!("{} exited with {} for {}", helper.display(), status, url),
            Err(e) => warn!("cannot run {}: {}", helper.display(), e),
        }
    }
    ok
}
