// src/renderer.rs

use crate::error::{Error, Result};
use crate::model::ResultRecord;
use std::fmt::Write as _;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::{info, warn};

pub const HEADER: [&str; 11] = [
    "No.", "Gerrit URL", "PS", "Test Name", "Job", "Testr", "Start", "End", "Time", "All Logs",
    "Artifacts",
];

pub const PAGE_TITLE: &str = "Zuul test results";

const STYLES: [&str; 2] = [
    "table,th,tr,td {border: 1px solid; text-align: center;}",
    ".title {font-size: 2em;}",
];

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Json,
    Csv,
    Html,
}

impl Format {
    /// Guesses the format from a file extension
    pub fn from_path(path: &Path) -> Option<Format> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Format::Json),
            "csv" => Some(Format::Csv),
            "html" => Some(Format::Html),
            _ => None,
        }
    }

    /// An explicit format wins; otherwise the output file decides; JSON last.
    pub fn resolve(explicit: Option<Format>, output: Option<&Path>) -> Format {
        if let Some(format) = explicit {
            return format;
        }
        match output {
            Some(path) => Format::from_path(path).unwrap_or_else(|| {
                warn!("cannot infer format from {}, using json", path.display());
                Format::Json
            }),
            None => Format::Json,
        }
    }

    pub fn render(self, records: &[ResultRecord]) -> Result<String> {
        match self {
            Format::Json => render_json(records),
            Format::Csv => render_csv(records),
            Format::Html => render_html(records),
        }
    }
}

/// Columns shared by the CSV and HTML reports, all read from `detail[0]`
struct Row<'a> {
    record: &'a ResultRecord,
    ref_url: &'a str,
    patchset: String,
    job_output: String,
    testr_results: String,
    start: String,
    end: String,
    log_url: &'a str,
    artifact: &'a str,
}

impl<'a> Row<'a> {
    fn new(record: &'a ResultRecord) -> Result<Self> {
        let log_url = record.detail_str("log_url")?;
        Ok(Self {
            record,
            ref_url: record.detail_str("ref_url")?,
            patchset: record.patchset()?,
            job_output: format!("{log_url}job-output.txt"),
            testr_results: format!("{log_url}testr_results.html"),
            start: record.detail_str("start_time")?.replace('T', " "),
            end: record.detail_str("end_time")?.replace('T', " "),
            log_url,
            artifact: record.artifact_url()?,
        })
    }
}

pub fn render_json(records: &[ResultRecord]) -> Result<String> {
    let mut out = serde_json::to_string(records).map_err(|source| Error::Json {
        origin: "report".to_string(),
        source,
    })?;
    out.push('\n');
    Ok(out)
}

pub fn render_csv(records: &[ResultRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = HEADER.to_vec();
    header.insert(4, "Zuul Link");
    writer.write_record(&header)?;

    for (i, record) in records.iter().enumerate() {
        let row = Row::new(record)?;
        let num = (i + 1).to_string();
        writer.write_record([
            num.as_str(),
            row.ref_url,
            row.patchset.as_str(),
            row.record.name.as_str(),
            row.record.url.as_str(),
            row.job_output.as_str(),
            row.testr_results.as_str(),
            row.start.as_str(),
            row.end.as_str(),
            row.record.time.as_str(),
            row.log_url,
            row.artifact,
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Csv(e.into_error().into()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn render_html(records: &[ResultRecord]) -> Result<String> {
    let mut thead = String::from("<thead><tr>");
    for h in HEADER {
        let _ = write!(thead, "<th>{}</th>", escape(h));
    }
    thead.push_str("</tr></thead>");

    let mut tbody = String::from("<tbody>");
    for (i, record) in records.iter().enumerate() {
        let row = Row::new(record)?;
        let _ = write!(
            tbody,
            "<tr>\
             <td>{num}</td>\
             <td><a href=\"{g_url}\">{g_url}</a></td>\
             <td>{ps}</td>\
             <td><a href=\"{result}\">{name}</a></td>\
             <td><a href=\"{job_output}\">x</a></td>\
             <td><a href=\"{testr}\">x</a></td>\
             <td>{start}</td>\
             <td>{end}</td>\
             <td>{time}</td>\
             <td><a href=\"{logs}\">x</a></td>\
             <td><a href=\"{art}\">download</a></td>\
             </tr>",
            num = i + 1,
            g_url = escape(row.ref_url),
            ps = escape(&row.patchset),
            result = escape(&row.record.url),
            name = escape(&row.record.name),
            job_output = escape(&row.job_output),
            testr = escape(&row.testr_results),
            start = escape(&row.start),
            end = escape(&row.end),
            time = escape(&row.record.time),
            logs = escape(row.log_url),
            art = escape(row.artifact),
        );
    }
    tbody.push_str("</tbody>");

    Ok(format!(
        "<html><head><style>{style}</style></head>\
         <body><div class='title'>{title}</div><div><table>{thead}{tbody}</table></div></body>\
         </html>\n",
        style = STYLES.join(" "),
        title = PAGE_TITLE,
    ))
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Writes a finished report to `path` (replacing it) or to stdout
pub fn write_output(report: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, report).map_err(|e| Error::io(path, e))?;
            info!("wrote report to {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(report.as_bytes())
                .and_then(|_| stdout.flush())
                .map_err(|e| Error::io("<stdout>", e))?;
        }
    }
    Ok(())
}
