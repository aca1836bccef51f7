// src/extractor.rs

use crate::error::Result;
use crate::model::{ChangeMessage, Outcome, ResultRecord};
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;

const NON_VOTING: &str = " (non-voting)";

/// Which status lines to pick out of the review comments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultFilter {
    /// Any outcome of exactly this job
    JobName(String),
    /// Any job that ended with one of these outcomes
    Outcomes(BTreeSet<Outcome>),
}

impl ResultFilter {
    /// A job name takes precedence; without either, everything but SUCCESS.
    pub fn new(job_name: Option<String>, outcomes: Option<Vec<Outcome>>) -> Self {
        match (job_name, outcomes) {
            (Some(job), _) => ResultFilter::JobName(job),
            (None, Some(outcomes)) => ResultFilter::Outcomes(outcomes.into_iter().collect()),
            (None, None) => ResultFilter::Outcomes(Outcome::unsuccessful().into_iter().collect()),
        }
    }

    /// One matcher per filter term, in a fixed order
    pub fn patterns(&self) -> Result<Vec<Regex>> {
        let sources: Vec<String> = match self {
            ResultFilter::JobName(job) => {
                vec![format!(r"^- ({}) (.*) : .* in (.*)$", regex::escape(job))]
            }
            ResultFilter::Outcomes(outcomes) => outcomes
                .iter()
                .map(|o| format!(r"^- (.*) (.*) : {} in (.*)$", o.as_str()))
                .collect(),
        };
        Ok(sources
            .iter()
            .map(|s| Regex::new(s))
            .collect::<Result<_, _>>()?)
    }
}

impl fmt::Display for ResultFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultFilter::JobName(job) => write!(f, "job name {job}"),
            ResultFilter::Outcomes(outcomes) => {
                let names: Vec<&str> = outcomes.iter().map(|o| o.as_str()).collect();
                write!(f, "test results [{}]", names.join(", "))
            }
        }
    }
}

/// Matches one status line like
/// `- tacker-functional https://zuul/.../build/abc : FAILURE in 1h 02m 03s`
pub fn match_line(pattern: &Regex, line: &str) -> Option<ResultRecord> {
    let caps = pattern.captures(line)?;
    let time = caps[3].replace(NON_VOTING, "");
    Some(ResultRecord::new(&caps[1], &caps[2], time))
}

/// Scans every comment of every change, pattern by pattern. The order of the
/// output is part of the report: pattern, then change, then comment, then line.
pub fn extract(patterns: &[Regex], changes: &[(String, Vec<ChangeMessage>)]) -> Vec<ResultRecord> {
    let mut records = Vec::new();
    for pattern in patterns {
        for (_, messages) in changes {
            for message in messages {
                records.extend(message.message.split('\n').filter_map(|line| match_line(pattern, line)));
            }
        }
    }
    records
}
