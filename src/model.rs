// src/model.rs

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Result classification a CI system reports for one build
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Outcome {
    #[value(name = "SUCCESS")]
    Success,
    #[value(name = "FAILURE")]
    Failure,
    #[value(name = "RETRY_LIMIT")]
    RetryLimit,
    #[value(name = "POST_FAILURE")]
    PostFailure,
}

impl Outcome {
    pub const ALL: [Outcome; 4] = [
        Outcome::Success,
        Outcome::Failure,
        Outcome::RetryLimit,
        Outcome::PostFailure,
    ];

    /// The keyword as it appears in review comments
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "SUCCESS",
            Outcome::Failure => "FAILURE",
            Outcome::RetryLimit => "RETRY_LIMIT",
            Outcome::PostFailure => "POST_FAILURE",
        }
    }

    /// Every outcome except SUCCESS, used when no filter is given
    pub fn unsuccessful() -> Vec<Outcome> {
        Self::ALL
            .into_iter()
            .filter(|o| *o != Outcome::Success)
            .collect()
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One review comment, as returned by the review API
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeMessage {
    pub message: String,
}

/// A single build as returned by the build-results API.
///
/// Kept as the raw JSON object so that it passes through to the JSON report
/// untouched; only the handful of keys the renderers need are ever read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildDetail(pub Map<String, Value>);

impl BuildDetail {
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

/// A matched status line, later enriched with its build detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub name: String,
    pub url: String,
    pub time: String,
    #[serde(default)]
    pub detail: Vec<BuildDetail>,
}

impl ResultRecord {
    pub fn new(name: impl Into<String>, url: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            time: time.into(),
            detail: Vec::new(),
        }
    }

    /// Build UUID, the last path segment of the result URL
    pub fn build_uuid(&self) -> &str {
        self.url.rsplit('/').next().unwrap_or(&self.url)
    }

    /// The authoritative build entry (always index 0)
    pub fn primary(&self) -> Result<&BuildDetail> {
        self.detail.first().ok_or_else(|| Error::EmptyBuild {
            url: self.url.clone(),
        })
    }

    /// A string field of the primary build, which must be present
    pub fn detail_str(&self, field: &'static str) -> Result<&str> {
        self.primary()?
            .get_str(field)
            .ok_or_else(|| self.missing(field))
    }

    /// Patchset of the primary build. The API has served it both as a
    /// string and as a number.
    pub fn patchset(&self) -> Result<String> {
        match self.primary()?.0.get("patchset") {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            _ => Err(self.missing("patchset")),
        }
    }

    pub fn patchset_number(&self) -> Result<u64> {
        self.patchset()?
            .trim()
            .parse()
            .map_err(|_| self.missing("patchset"))
    }

    /// URL of the first artifact of the primary build
    pub fn artifact_url(&self) -> Result<&str> {
        self.primary()?
            .0
            .get("artifacts")
            .and_then(Value::as_array)
            .and_then(|a| a.first())
            .and_then(|a| a.get("url"))
            .and_then(Value::as_str)
            .ok_or_else(|| self.missing("artifacts"))
    }

    fn missing(&self, field: &'static str) -> Error {
        Error::MissingField {
            url: self.url.clone(),
            field,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn enriched(name: &str, uuid: &str, patchset: Value, event: &str) -> ResultRecord {
        let mut record = ResultRecord::new(
            name,
            format!("https://zuul.example/t/openstack/build/{uuid}"),
            "1h 2m",
        );
        let detail = json!({
            "uuid": uuid,
            "patchset": patchset,
            "ref_url": "https://review.example/c/1234",
            "log_url": format!("https://logs.example/{uuid}/"),
            "start_time": "2024-01-02T03:04:05",
            "end_time": "2024-01-02T04:06:05",
            "event_timestamp": event,
            "artifacts": [{"name": "Zuul Manifest", "url": format!("https://logs.example/{uuid}/zuul-manifest.json")}],
        });
        let Value::Object(map) = detail else { unreachable!() };
        record.detail.push(BuildDetail(map));
        record
    }

    #[test]
    fn unsuccessful_excludes_success() {
        let outcomes = Outcome::unsuccessful();
        assert_eq!(outcomes, vec![Outcome::Failure, Outcome::RetryLimit, Outcome::PostFailure]);
    }

    #[test]
    fn build_uuid_is_last_segment() {
        let r = ResultRecord::new("job", "http://example/build/abc123", "1m");
        assert_eq!(r.build_uuid(), "abc123");
    }

    #[test]
    fn patchset_accepts_string_or_number() {
        let r = enriched("job", "a", json!("7"), "2024-01-02T03:04:05");
        assert_eq!(r.patchset().unwrap(), "7");
        let r = enriched("job", "a", json!(12), "2024-01-02T03:04:05");
        assert_eq!(r.patchset_number().unwrap(), 12);
    }

    #[test]
    fn empty_detail_is_an_error() {
        let r = ResultRecord::new("job", "http://example/build/abc123", "1m");
        assert!(matches!(r.primary(), Err(Error::EmptyBuild { .. })));
    }

    #[test]
    fn missing_artifacts_is_an_error() {
        let mut r = enriched("job", "a", json!("1"), "2024-01-02T03:04:05");
        r.detail[0].0.remove("artifacts");
        assert!(matches!(
            r.artifact_url(),
            Err(Error::MissingField { field: "artifacts", .. })
        ));
    }

    #[test]
    fn detail_survives_json_round_trip() {
        let mut r = enriched("job", "a", json!("3"), "2024-01-02T03:04:05");
        r.detail[0].0.insert("extra".into(), json!({"nested": [1, 2]}));
        let text = serde_json::to_string(&vec![r.clone()]).unwrap();
        let back: Vec<ResultRecord> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, vec![r]);
    }
}
