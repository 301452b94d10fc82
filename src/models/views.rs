//! Tables produced by the aggregator and consumed by the report writers.

use serde::Serialize;

/// Result of an aggregation: either the table or the reason there is nothing
/// to show. An empty filter is an expected outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome<T> {
    Data(T),
    NoData(String),
}

impl<T> QueryOutcome<T> {
    pub fn no_data(reason: impl Into<String>) -> Self {
        QueryOutcome::NoData(reason.into())
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, QueryOutcome::NoData(_))
    }

    pub fn as_data(&self) -> Option<&T> {
        match self {
            QueryOutcome::Data(data) => Some(data),
            QueryOutcome::NoData(_) => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            QueryOutcome::Data(data) => Some(data),
            QueryOutcome::NoData(_) => None,
        }
    }
}

impl<U> QueryOutcome<Vec<U>> {
    /// `Data(rows)` unless `rows` is empty
    pub fn from_rows(rows: Vec<U>, reason: impl Into<String>) -> Self {
        if rows.is_empty() {
            QueryOutcome::NoData(reason.into())
        } else {
            QueryOutcome::Data(rows)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyMean {
    pub month: u32,
    pub mean: f64,
    pub samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationMean {
    pub station: String,
    pub mean: f64,
    pub samples: usize,
}

/// Monthly profile of one station and pollutant in the latest year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FocusView {
    pub year: i32,
    pub station: String,
    pub pollutant: String,
    pub series: Vec<MonthlyMean>,
    pub peak: MonthlyMean,
}
