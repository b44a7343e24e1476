// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The population a poll was drawn from.
///
/// Raw files abbreviate the two recognized populations as `LV` and `RV` after
/// the sample size. Anything else, including a missing token, is `Unknown`.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum SampleType {
    LikelyVoters,
    RegisteredVoters,
    Unknown,
}

impl SampleType {
    /// Maps the second token of a sample descriptor (`1880 LV`) to a sample type.
    ///
    /// The comparison is exact: `lv` is not recognized.
    pub fn from_token(token: Option<&str>) -> SampleType {
        match token {
            Some("LV") => SampleType::LikelyVoters,
            Some("RV") => SampleType::RegisteredVoters,
            _ => SampleType::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SampleType::LikelyVoters => "likely voters",
            SampleType::RegisteredVoters => "registered voters",
            SampleType::Unknown => "unknown",
        }
    }
}

impl Display for SampleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The typed columns of a poll row, used to report parsing failures.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Column {
    Date,
    SampleSize,
    HarrisResult,
    TrumpResult,
}

impl Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Column::Date => "date",
            Column::SampleSize => "sample size",
            Column::HarrisResult => "Harris result",
            Column::TrumpResult => "Trump result",
        };
        write!(f, "{}", name)
    }
}

// ******** Output data structures *********

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Leader {
    Harris,
    Trump,
    /// Both candidates share the same highest value.
    Even,
}

impl Display for Leader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Leader::Harris => "Harris",
            Leader::Trump => "Trump",
            Leader::Even => "EVEN",
        };
        write!(f, "{}", name)
    }
}

/// The single highest result recorded in a dataset.
///
/// Displays as `Harris 57.0%`, with one decimal place.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct HighestPoll {
    pub leader: Leader,
    /// Fraction in [0, 1].
    pub fraction: f64,
}

impl Display for HighestPoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:.1}%", self.leader, self.fraction * 100.0)
    }
}

/// A value computed for each candidate, as a fraction.
#[derive(PartialEq, Debug, Clone, Copy, Default)]
pub struct CandidatePair {
    pub harris: f64,
    pub trump: f64,
}

impl From<CandidatePair> for (f64, f64) {
    fn from(p: CandidatePair) -> (f64, f64) {
        (p.harris, p.trump)
    }
}

/// Errors that abort the construction of a store.
///
/// Rows that are too short are not errors: they are dropped silently.
#[derive(PartialEq, Debug, Clone)]
pub enum PollError {
    /// A numeric field could not be parsed.
    MalformedRow {
        lineno: usize,
        column: Column,
        value: String,
    },
    /// A result that does not normalize to a fraction in [0, 1].
    ResultOutOfRange {
        lineno: usize,
        column: Column,
        value: f64,
    },
    /// The rows themselves could not be read (invalid UTF-8, I/O failure).
    Reading { message: String },
}

impl Error for PollError {}

impl Display for PollError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollError::MalformedRow {
                lineno,
                column,
                value,
            } => write!(f, "line {}: could not parse {} from {:?}", lineno, column, value),
            PollError::ResultOutOfRange {
                lineno,
                column,
                value,
            } => write!(
                f,
                "line {}: {} {} is not a fraction or a percentage",
                lineno, column, value
            ),
            PollError::Reading { message } => write!(f, "could not read poll rows: {}", message),
        }
    }
}
