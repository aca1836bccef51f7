// src/collector.rs

use crate::client::{parse_json, CiSource};
use crate::error::{Error, Result};
use crate::extractor::{self, ResultFilter};
use crate::model::{ChangeMessage, ResultRecord};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Finds matching status lines on every change and attaches their build
/// details. One request per change, then one per matched build.
pub fn collect<S: CiSource>(
    source: &S,
    change_ids: &BTreeSet<String>,
    filter: &ResultFilter,
) -> Result<Vec<ResultRecord>> {
    let patterns = filter.patterns()?;

    // 1. Fetch comments once per change; every pattern scans the same set
    let bar = progress(change_ids.len(), "Fetching review comments");
    let mut changes: Vec<(String, Vec<ChangeMessage>)> = Vec::with_capacity(change_ids.len());
    for change_id in change_ids {
        let messages = source.change_messages(change_id)?;
        debug!(%change_id, count = messages.len(), "fetched comments");
        changes.push((change_id.clone(), messages));
        bar.inc(1);
    }
    bar.finish_and_clear();

    // 2. Pick out status lines
    let mut records = extractor::extract(&patterns, &changes);
    info!("{} status lines matched {}", records.len(), filter);

    // 3. Look up each build
    let bar = progress(records.len(), "Fetching build details");
    for record in &mut records {
        enrich(source, record)?;
        bar.inc(1);
    }
    bar.finish_and_clear();

    Ok(records)
}

const PROGRESS_TEMPLATE: &str = "{msg} [{bar:40}] {pos}/{len}";

fn progress(len: usize, message: &'static str) -> ProgressBar {
    let style = ProgressStyle::with_template(PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    ProgressBar::new(len as u64)
        .with_style(style)
        .with_message(message)
}

/// Summarises a query for the "nothing found" report, e.g.
/// `change IDs [I1, I2], job name -, test results [FAILURE], term 24`
pub fn describe_query(change_ids: &BTreeSet<String>, filter: &ResultFilter, term: Option<&str>) -> String {
    let ids: Vec<&str> = change_ids.iter().map(String::as_str).collect();
    let (job, outcomes) = match filter {
        ResultFilter::JobName(job) => (job.clone(), "any".to_string()),
        ResultFilter::Outcomes(outcomes) => (
            "-".to_string(),
            outcomes.iter().map(|o| o.as_str()).collect::<Vec<_>>().join(", "),
        ),
    };
    format!(
        "change IDs [{}], job name {}, test results [{}], term {}",
        ids.join(", "),
        job,
        outcomes,
        term.unwrap_or("-")
    )
}

/// Attaches the build detail list for the record's build UUID
pub fn enrich<S: CiSource>(source: &S, record: &mut ResultRecord) -> Result<()> {
    let detail = source.builds(record.build_uuid())?;
    if detail.is_empty() {
        return Err(Error::EmptyBuild {
            url: record.url.clone(),
        });
    }
    record.detail = detail;
    Ok(())
}

/// Loads records previously written as a JSON report
pub fn load_report(path: &Path) -> Result<Vec<ResultRecord>> {
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_json(&text, &path.display().to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{BuildDetail, Outcome};
    use serde_json::{json, Value};
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory stand-in for the two APIs, recording every call
    #[derive(Default)]
    pub(crate) struct FakeSource {
        pub(crate) messages: HashMap<String, Vec<String>>,
        pub(crate) builds: HashMap<String, Value>,
        pub(crate) calls: RefCell<Vec<String>>,
    }

    impl CiSource for FakeSource {
        fn change_messages(&self, change_id: &str) -> Result<Vec<ChangeMessage>> {
            self.calls.borrow_mut().push(format!("messages {change_id}"));
            Ok(self
                .messages
                .get(change_id)
                .map(|texts| {
                    texts
                        .iter()
                        .map(|t| ChangeMessage { message: t.clone() })
                        .collect()
                })
                .unwrap_or_default())
        }

        fn builds(&self, uuid: &str) -> Result<Vec<BuildDetail>> {
            self.calls.borrow_mut().push(format!("builds {uuid}"));
            let body = self.builds.get(uuid).cloned().unwrap_or(json!([]));
            Ok(serde_json::from_value(body).unwrap())
        }
    }

    fn build(uuid: &str) -> Value {
        json!([{
            "uuid": uuid,
            "patchset": "3",
            "ref_url": "https://review.example/c/1",
            "log_url": format!("https://logs.example/{uuid}/"),
            "start_time": "2024-01-02T03:04:05",
            "end_time": "2024-01-02T04:04:05",
            "event_timestamp": "2024-01-02T03:00:00",
            "artifacts": [{"url": format!("https://logs.example/{uuid}/a")}],
        }])
    }

    fn ids(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn one_call_per_change_and_per_match() {
        let mut source = FakeSource::default();
        source.messages.insert(
            "I1".into(),
            vec![
                "- job-a http://z/build/u1 : FAILURE in 1m\n- job-b http://z/build/u2 : POST_FAILURE in 2m".into(),
            ],
        );
        source.messages.insert("I2".into(), vec!["Looks good to me".into()]);
        source.builds.insert("u1".into(), build("u1"));
        source.builds.insert("u2".into(), build("u2"));

        let filter = ResultFilter::new(None, Some(vec![Outcome::Failure, Outcome::PostFailure]));
        let records = collect(&source, &ids(&["I2", "I1"]), &filter).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].detail[0].get_str("uuid"), Some("u1"));
        assert_eq!(records[1].detail[0].get_str("uuid"), Some("u2"));
        assert_eq!(
            *source.calls.borrow(),
            vec!["messages I1", "messages I2", "builds u1", "builds u2"]
        );
    }

    #[test]
    fn no_matches_means_no_build_lookups() {
        let mut source = FakeSource::default();
        source.messages.insert("I1".into(), vec!["Recheck".into()]);
        let records = collect(&source, &ids(&["I1"]), &ResultFilter::new(None, None)).unwrap();
        assert!(records.is_empty());
        assert_eq!(source.calls.borrow().len(), 1);
    }

    #[test]
    fn unknown_build_is_fatal() {
        let mut source = FakeSource::default();
        source
            .messages
            .insert("I1".into(), vec!["- job http://z/build/gone : FAILURE in 1m".into()]);
        let err = collect(&source, &ids(&["I1"]), &ResultFilter::new(None, None)).unwrap_err();
        assert!(matches!(err, Error::EmptyBuild { .. }));
    }

    #[test]
    fn progress_bar_shows_its_message() {
        assert!(ProgressStyle::with_template(PROGRESS_TEMPLATE).is_ok());
        let bar = progress(3, "Fetching build details");
        assert_eq!(bar.message(), "Fetching build details");
        assert_eq!(bar.length(), Some(3));
    }

    #[test]
    fn query_description_names_every_part() {
        let filter = ResultFilter::new(None, Some(vec![Outcome::RetryLimit, Outcome::Failure]));
        assert_eq!(
            describe_query(&ids(&["I2", "I1"]), &filter, Some("24*2")),
            "change IDs [I1, I2], job name -, test results [FAILURE, RETRY_LIMIT], term 24*2"
        );

        let filter = ResultFilter::new(Some("tacker-ft".into()), None);
        assert_eq!(
            describe_query(&ids(&["I1"]), &filter, None),
            "change IDs [I1], job name tacker-ft, test results [any], term -"
        );
    }

    #[test]
    fn load_report_reads_rendered_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let mut record = ResultRecord::new("job", "http://z/build/u1", "1m");
        record.detail = serde_json::from_value(build("u1")).unwrap();
        fs::write(&path, serde_json::to_string(&vec![record.clone()]).unwrap()).unwrap();

        assert_eq!(load_report(&path).unwrap(), vec![record]);
    }
}
