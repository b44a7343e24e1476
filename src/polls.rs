use log::{debug, info, warn};

use poll_stats::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::polls::config_reader::*;
use crate::polls::io_text::*;

mod config_reader;
mod io_text;

/// The file read when neither a configuration nor an input is provided.
const DEFAULT_INPUT: &str = "polling_data.csv";

#[derive(Debug, Snafu)]
pub enum ReportError {
    #[snafu(display("Error opening file {path}"))]
    OpeningInput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening JSON file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Could not read the polls in {path}: {source}"))]
    BuildingStore { source: PollError, path: String },
    #[snafu(display("Configuration file {path} has no parent directory"))]
    MissingParentDir { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

type ReportResult<T> = Result<T, ReportError>;

/// The three aggregates of a poll file.
#[derive(PartialEq, Debug, Clone)]
struct PollReport {
    highest: HighestPoll,
    likely_voter_average: CandidatePair,
    history_change: CandidatePair,
}

impl PollReport {
    fn compute(store: &PollRecordStore, history_window: usize) -> PollReport {
        PollReport {
            highest: store.highest_poll(),
            likely_voter_average: store.likely_voter_polling_average(),
            history_change: store.polling_history_change_over(history_window),
        }
    }

    fn print(&self) {
        println!("Highest Polling Candidate: {}", self.highest);
        println!("Likely Voter Polling Average:");
        println!("  Harris: {}", percent(self.likely_voter_average.harris));
        println!("  Trump: {}", percent(self.likely_voter_average.trump));
        println!("Polling History Change:");
        println!("  Harris: {}", signed_percent(self.history_change.harris));
        println!("  Trump: {}", signed_percent(self.history_change.trump));
    }
}

fn percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

fn signed_percent(fraction: f64) -> String {
    format!("{:+.2}%", fraction * 100.0)
}

fn candidate_pair_js(pair: &CandidatePair, fmt: fn(f64) -> String) -> JSValue {
    json!({
        "Harris": fmt(pair.harris),
        "Trump": fmt(pair.trump),
    })
}

fn build_summary_js(c: &OutputConfig, report: &PollReport) -> JSValue {
    json!({
        "config": c,
        "results": {
            "highestPollingCandidate": report.highest.to_string(),
            "likelyVoterPollingAverage": candidate_pair_js(&report.likely_voter_average, percent),
            "pollingHistoryChange": candidate_pair_js(&report.history_change, signed_percent),
        }
    })
}

fn write_summary(out_path: &str, pretty_js: &str) -> ReportResult<()> {
    if out_path == "stdout" {
        println!("{}", pretty_js);
    } else {
        info!("Writing summary to {:?}", out_path);
        fs::write(out_path, pretty_js).context(WritingSummarySnafu { path: out_path })?;
    }
    Ok(())
}

fn check_reference(summary_path: &str, pretty_js_stats: &str) -> ReportResult<()> {
    let summary_ref = read_summary(summary_path)?;
    info!("summary: {:?}", summary_ref);
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        whatever!("Difference detected between calculated summary and reference summary")
    }
    Ok(())
}

/// Reads a poll file, prints its summary and optionally writes or checks it.
///
/// Arguments:
/// * `config_path` a JSON report configuration. The poll file it names is
/// resolved relative to the directory of the configuration.
/// * `input_path` a poll file, which takes precedence over the configuration.
/// * `check_summary_path` a reference summary that the computed summary must match.
/// * `out_path` where to write the JSON summary (`stdout` is accepted).
pub fn run_report(
    config_path: Option<String>,
    input_path: Option<String>,
    check_summary_path: Option<String>,
    out_path: Option<String>,
) -> ReportResult<()> {
    let config: Option<PollConfig> = match config_path.as_deref() {
        Some(p) => Some(read_config(p)?),
        None => None,
    };
    info!("config: {:?}", config);

    let data_path: PathBuf = match (input_path, &config, config_path.as_deref()) {
        (Some(p), _, _) => PathBuf::from(p),
        (None, Some(c), Some(p)) => {
            let root_p = Path::new(p)
                .parent()
                .context(MissingParentDirSnafu { path: p })?;
            root_p.join(&c.poll_file_source.file_path)
        }
        _ => PathBuf::from(DEFAULT_INPUT),
    };

    let history_window = config
        .as_ref()
        .and_then(|c| c.poll_file_source.history_window)
        .unwrap_or(HISTORY_WINDOW);

    let contents = read_poll_file(&data_path)?;
    let store = PollRecordStore::from_text(&contents).context(BuildingStoreSnafu {
        path: data_path.display().to_string(),
    })?;
    info!(
        "Read {} polls from {}",
        store.len(),
        data_path.display()
    );

    let report = PollReport::compute(&store, history_window);
    debug!("report: {:?}", report);
    report.print();

    let source = simplify_file_name(&data_path);
    let output_settings = config.as_ref().and_then(|c| c.output_settings.clone());
    let c = OutputConfig {
        report: output_settings
            .as_ref()
            .and_then(|o| o.report_name.clone())
            .unwrap_or_else(|| source.clone()),
        source,
        polls: store.len().to_string(),
        history_window: history_window.to_string(),
    };
    let result_js = build_summary_js(&c, &report);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    if let Some(out) = out_path.or_else(|| output_settings.and_then(|o| o.output_path)) {
        write_summary(&out, &pretty_js_stats)?;
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = check_summary_path {
        check_reference(&summary_p, &pretty_js_stats)?;
    }

    Ok(())
}
