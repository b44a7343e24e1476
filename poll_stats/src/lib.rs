mod config;
pub mod row;
use log::{debug, info};
use std::io::Read;

pub use crate::config::*;
use crate::row::{parse_row, poll_reader, ParsedRow};

/// The number of polls averaged at each end of the dataset by
/// [PollRecordStore::polling_history_change].
pub const HISTORY_WINDOW: usize = 30;

/// A read-only view on one record of a store.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct PollRecord<'a> {
    pub month: &'a str,
    pub date: i64,
    pub sample: u64,
    pub sample_type: SampleType,
    pub harris: f64,
    pub trump: f64,
}

/// The polls of a file, stored column by column.
///
/// Position `i` in every column describes the same poll, and the polls are kept
/// in the order of the input file. A store is built once and never modified.
///
/// ```
/// use poll_stats::PollRecordStore;
///
/// let store = PollRecordStore::build([
///     "month,date,sample,Harris result,Trump result",
///     "Oct,1,1000 LV,55,45",
///     "Oct,2,1000 RV,50,50",
///     "Oct,3,900 XX,57.0,52",
/// ])?;
///
/// assert_eq!(store.len(), 3);
/// assert_eq!(store.highest_polling_candidate(), "Harris 57.0%");
/// # Ok::<(), poll_stats::PollError>(())
/// ```
#[derive(PartialEq, Debug, Clone, Default)]
pub struct PollRecordStore {
    months: Vec<String>,
    dates: Vec<i64>,
    samples: Vec<u64>,
    sample_types: Vec<SampleType>,
    harris_results: Vec<f64>,
    trump_results: Vec<f64>,
}

impl PollRecordStore {
    /// Builds a store from all the lines of a poll file, header included.
    ///
    /// The first line is always skipped. Rows with fewer than 5 fields are
    /// dropped. The first row with a numeric field that fails to parse aborts
    /// the whole build.
    pub fn build<I, S>(lines: I) -> Result<PollRecordStore, PollError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        for line in lines {
            text.push_str(line.as_ref());
            text.push('\n');
        }
        PollRecordStore::from_reader(text.as_bytes())
    }

    /// Builds a store from the full content of a poll file.
    pub fn from_text(text: &str) -> Result<PollRecordStore, PollError> {
        PollRecordStore::from_reader(text.as_bytes())
    }

    /// Builds a store from a reader over a poll file.
    ///
    /// Rows are numbered by the line they start on, so the first line is the
    /// header even when it is blank.
    pub fn from_reader<R: Read>(rdr: R) -> Result<PollRecordStore, PollError> {
        let mut store = PollRecordStore::default();
        let mut num_records: usize = 0;
        for record_r in poll_reader(rdr).records() {
            let record = record_r.map_err(|e| PollError::Reading {
                message: e.to_string(),
            })?;
            num_records += 1;
            let ordinal = record
                .position()
                .map(|p| p.line().saturating_sub(1) as usize)
                .unwrap_or(0);
            if let Some(row) = parse_row(ordinal, &record)? {
                debug!("build: line {}: {:?}", ordinal + 1, row);
                store.push(row);
            }
        }
        info!(
            "build: read {} rows, kept {} polls",
            num_records,
            store.len()
        );
        Ok(store)
    }

    fn push(&mut self, row: ParsedRow) {
        self.months.push(row.month);
        self.dates.push(row.date);
        self.samples.push(row.sample);
        self.sample_types.push(row.sample_type);
        self.harris_results.push(row.harris);
        self.trump_results.push(row.trump);
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn months(&self) -> &[String] {
        &self.months
    }

    pub fn dates(&self) -> &[i64] {
        &self.dates
    }

    pub fn samples(&self) -> &[u64] {
        &self.samples
    }

    pub fn sample_types(&self) -> &[SampleType] {
        &self.sample_types
    }

    pub fn harris_results(&self) -> &[f64] {
        &self.harris_results
    }

    pub fn trump_results(&self) -> &[f64] {
        &self.trump_results
    }

    pub fn record(&self, idx: usize) -> Option<PollRecord<'_>> {
        if idx >= self.len() {
            return None;
        }
        Some(PollRecord {
            month: self.months[idx].as_str(),
            date: self.dates[idx],
            sample: self.samples[idx],
            sample_type: self.sample_types[idx],
            harris: self.harris_results[idx],
            trump: self.trump_results[idx],
        })
    }

    /// The candidate with the single highest result of the dataset.
    ///
    /// An empty store reports `EVEN` at 0.
    pub fn highest_poll(&self) -> HighestPoll {
        let max_harris = max_or_zero(&self.harris_results);
        let max_trump = max_or_zero(&self.trump_results);
        if max_harris > max_trump {
            HighestPoll {
                leader: Leader::Harris,
                fraction: max_harris,
            }
        } else if max_trump > max_harris {
            HighestPoll {
                leader: Leader::Trump,
                fraction: max_trump,
            }
        } else {
            HighestPoll {
                leader: Leader::Even,
                fraction: max_harris,
            }
        }
    }

    /// The label of [PollRecordStore::highest_poll], for example `Harris 57.0%`.
    pub fn highest_polling_candidate(&self) -> String {
        self.highest_poll().to_string()
    }

    /// The average result of each candidate among the polls of likely voters.
    pub fn likely_voter_polling_average(&self) -> CandidatePair {
        let mut harris_likely: Vec<f64> = Vec::new();
        let mut trump_likely: Vec<f64> = Vec::new();
        for (idx, st) in self.sample_types.iter().enumerate() {
            if st.label().eq_ignore_ascii_case(SampleType::LikelyVoters.label()) {
                harris_likely.push(self.harris_results[idx]);
                trump_likely.push(self.trump_results[idx]);
            }
        }
        debug!(
            "likely_voter_polling_average: {} of {} polls",
            harris_likely.len(),
            self.len()
        );
        CandidatePair {
            harris: mean_or_zero(&harris_likely),
            trump: mean_or_zero(&trump_likely),
        }
    }

    /// The change between the average of the earliest and the latest
    /// [HISTORY_WINDOW] polls (earliest minus latest).
    pub fn polling_history_change(&self) -> CandidatePair {
        self.polling_history_change_over(HISTORY_WINDOW)
    }

    /// Same as [PollRecordStore::polling_history_change] with a window of
    /// `window` polls at each end.
    ///
    /// With fewer than `2 * window` polls the two windows overlap and the
    /// shared polls count in both averages.
    pub fn polling_history_change_over(&self, window: usize) -> CandidatePair {
        let n = window.min(self.len());
        if n == 0 {
            return CandidatePair::default();
        }
        let first = 0..n;
        let last = (self.len() - n)..self.len();
        let change = |results: &[f64]| {
            mean_or_zero(&results[first.clone()]) - mean_or_zero(&results[last.clone()])
        };
        CandidatePair {
            harris: change(&self.harris_results),
            trump: change(&self.trump_results),
        }
    }
}

// Results are fractions in [0, 1], so 0 is a neutral start.
fn max_or_zero(xs: &[f64]) -> f64 {
    xs.iter().cloned().fold(0.0, f64::max)
}

fn mean_or_zero(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        0.0
    } else {
        xs.iter().sum::<f64>() / xs.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "month,date,sample,Harris result,Trump result";

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn store_of(rows: &[&str]) -> PollRecordStore {
        init();
        let mut lines = vec![HEADER];
        lines.extend_from_slice(rows);
        PollRecordStore::build(lines).unwrap()
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    fn check_columns(store: &PollRecordStore) {
        let n = store.len();
        assert_eq!(store.dates().len(), n);
        assert_eq!(store.samples().len(), n);
        assert_eq!(store.sample_types().len(), n);
        assert_eq!(store.harris_results().len(), n);
        assert_eq!(store.trump_results().len(), n);
        for x in store.harris_results().iter().chain(store.trump_results()) {
            assert!((0.0..=1.0).contains(x), "{}", x);
        }
    }

    #[test]
    fn three_rows() {
        let store = store_of(&[
            "Oct,1,1000 LV,55,45",
            "Oct,2,1000 RV,50,50",
            "Oct,3,900 XX,57.0,52",
        ]);
        check_columns(&store);
        assert_eq!(store.len(), 3);
        assert_eq!(
            store.sample_types(),
            &[
                SampleType::LikelyVoters,
                SampleType::RegisteredVoters,
                SampleType::Unknown
            ]
        );
        let labels: Vec<&str> = store.sample_types().iter().map(|st| st.label()).collect();
        assert_eq!(labels, vec!["likely voters", "registered voters", "unknown"]);
        assert_eq!(store.dates(), &[1, 2, 3]);
        assert_eq!(store.samples(), &[1000, 1000, 900]);
        assert_eq!(store.highest_polling_candidate(), "Harris 57.0%");
        assert_eq!(
            store.record(2),
            Some(PollRecord {
                month: "Oct",
                date: 3,
                sample: 900,
                sample_type: SampleType::Unknown,
                harris: 0.57,
                trump: 0.52,
            })
        );
        assert_eq!(store.record(3), None);
    }

    #[test]
    fn only_header() {
        let store = store_of(&[]);
        assert!(store.is_empty());
        let empty = PollRecordStore::build(Vec::<String>::new()).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.highest_polling_candidate(), "EVEN 0.0%");
        assert_eq!(empty.likely_voter_polling_average(), CandidatePair::default());
        assert_eq!(empty.polling_history_change(), CandidatePair::default());
    }

    #[test]
    fn incomplete_rows_are_absent() {
        let store = store_of(&["Oct,1,1000 LV,55,45", "Oct,2,1000 RV", "", "Oct,3,900 LV,0.5,0.4"]);
        check_columns(&store);
        assert_eq!(store.len(), 2);
        assert_eq!(store.dates(), &[1, 3]);
    }

    #[test]
    fn malformed_row_aborts_build() {
        init();
        let res = PollRecordStore::from_text(&format!(
            "{}\nOct,1,1000 LV,55,45\nOct,2,1000 RV,fifty,50\nOct,3,900 LV,50,40\n",
            HEADER
        ));
        assert_eq!(
            res,
            Err(PollError::MalformedRow {
                lineno: 3,
                column: Column::HarrisResult,
                value: "fifty".to_string(),
            })
        );
    }

    #[test]
    fn header_is_never_validated() {
        let store = PollRecordStore::from_text("Oct,xx,1000 LV,55,45\nOct,1,1000 LV,55,45").unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn blank_first_line_is_the_header() {
        init();
        let store = PollRecordStore::from_text("\nOct,1,1000 LV,55,45\n\nOct,2,1000 RV,50,50\n").unwrap();
        check_columns(&store);
        assert_eq!(store.dates(), &[1, 2]);
    }

    #[test]
    fn blank_lines_between_rows_keep_line_numbers() {
        init();
        let res = PollRecordStore::from_text(&format!(
            "{}\nOct,1,1000 LV,55,45\n\n\nOct,x,1000 RV,50,50\n",
            HEADER
        ));
        assert_eq!(
            res,
            Err(PollError::MalformedRow {
                lineno: 5,
                column: Column::Date,
                value: "x".to_string(),
            })
        );
    }

    #[test]
    fn negative_dates_are_kept() {
        let store = store_of(&["Oct,-1,1000 LV,50,45", "Oct,0,1000 RV,50,45"]);
        assert_eq!(store.dates(), &[-1, 0]);
        assert_eq!(store.record(0).map(|r| r.date), Some(-1));
    }

    #[test]
    fn read_from_reader() {
        init();
        let text = format!("{}\r\nOct,1,1000 LV,55,45\r\nOct,2,1000 RV,50,50\r\n", HEADER);
        let store = PollRecordStore::from_reader(text.as_bytes()).unwrap();
        assert_eq!(store, PollRecordStore::from_text(&text).unwrap());
        assert_eq!(store.len(), 2);
        assert_eq!(store.trump_results(), &[0.45, 0.5]);
    }

    #[test]
    fn highest_poll_leaders() {
        let store = store_of(&["Oct,1,1000 LV,40,61.3", "Oct,2,1000 RV,0.6,0.5"]);
        assert_eq!(store.highest_poll().leader, Leader::Trump);
        assert_eq!(store.highest_polling_candidate(), "Trump 61.3%");

        let store = store_of(&["Oct,1,1000 LV,48,47", "Oct,2,1000 RV,0.47,0.48"]);
        assert_eq!(store.highest_polling_candidate(), "EVEN 48.0%");
    }

    #[test]
    fn highest_poll_is_idempotent_and_matches_max() {
        let store = store_of(&[
            "Sep,2,1500 LV,48,47",
            "Sep,9,1200 RV,0.471,0.46",
            "Oct,8,1000 RV,49.6,43",
        ]);
        let first = store.highest_polling_candidate();
        assert_eq!(first, store.highest_polling_candidate());
        let max = store
            .harris_results()
            .iter()
            .chain(store.trump_results())
            .cloned()
            .fold(0.0, f64::max);
        assert_eq!(first, format!("Harris {:.1}%", max * 100.0));
        assert_eq!(first, "Harris 49.6%");
    }

    #[test]
    fn likely_voter_average() {
        let store = store_of(&[
            "Sep,2,1500 LV,48,47",
            "Sep,9,1200 RV,0.47,0.46",
            "Sep,16,800 LV,49.5,46",
            "Sep,23,950,51,45",
            "Oct,1,700 LV,50,44",
        ]);
        let (harris, trump) = store.likely_voter_polling_average().into();
        assert_close(harris, (0.48 + 0.495 + 0.50) / 3.0);
        assert_close(trump, (0.47 + 0.46 + 0.44) / 3.0);
        assert_eq!(format!("{:.2}%", harris * 100.0), "49.17%");
        assert_eq!(format!("{:.2}%", trump * 100.0), "45.67%");
    }

    #[test]
    fn likely_voter_average_without_likely_voters() {
        let store = store_of(&["Oct,1,1000 RV,55,45", "Oct,2,1000,50,50"]);
        assert_eq!(
            store.likely_voter_polling_average(),
            CandidatePair {
                harris: 0.0,
                trump: 0.0
            }
        );
    }

    #[test]
    fn history_change_with_overlapping_windows() {
        // 10 polls: both windows cover the whole dataset.
        let rows: Vec<String> = (1..=10)
            .map(|i| format!("Oct,{},1000 LV,{},{}", i, 40 + i, 50 - i))
            .collect();
        let rows: Vec<&str> = rows.iter().map(|s| s.as_str()).collect();
        let store = store_of(&rows);
        assert_eq!(store.len(), 10);
        assert_eq!(store.polling_history_change(), CandidatePair::default());

        // With a window of 6, polls 5 and 6 are shared by both windows.
        let change = store.polling_history_change_over(6);
        let early: f64 = (41..=46).map(|x| x as f64 / 100.0).sum::<f64>() / 6.0;
        let late: f64 = (45..=50).map(|x| x as f64 / 100.0).sum::<f64>() / 6.0;
        assert_close(change.harris, early - late);
        assert_close(change.harris, -0.04);
        assert_close(change.trump, 0.04);
    }

    #[test]
    fn history_change_with_disjoint_windows() {
        // 60 polls: 30 at 0.40/0.50 then 30 at 0.45/0.44.
        let mut rows: Vec<String> = Vec::new();
        for i in 0..30 {
            rows.push(format!("Sep,{},1000 LV,40,50", i + 1));
        }
        for i in 0..30 {
            rows.push(format!("Oct,{},1000 RV,45,44", i + 1));
        }
        let rows: Vec<&str> = rows.iter().map(|s| s.as_str()).collect();
        let store = store_of(&rows);
        check_columns(&store);
        let change = store.polling_history_change();
        assert_close(change.harris, -0.05);
        assert_close(change.trump, 0.06);
        assert_eq!(store.polling_history_change_over(0), CandidatePair::default());
    }

    #[test]
    fn percentages_and_fractions_are_stored_alike() {
        let a = store_of(&["Oct,1,1000 LV,55,45"]);
        let b = store_of(&["Oct,1,1000 LV,0.55,0.45"]);
        assert_eq!(a.harris_results(), &[0.55]);
        assert_eq!(a, b);
    }
}
