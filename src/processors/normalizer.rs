use crate::error::{AirQualityError, Result};
use crate::models::{NormalizationReport, NormalizedMeasurement, RawMeasurement, RawValue};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// What to do with a record whose date cannot be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateErrorPolicy {
    /// Fail the whole batch
    Fatal,
    /// Drop the record and keep going
    #[default]
    SkipRow,
}

pub struct Normalizer {
    date_policy: DateErrorPolicy,
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            date_policy: DateErrorPolicy::default(),
        }
    }

    pub fn with_date_policy(date_policy: DateErrorPolicy) -> Self {
        Self { date_policy }
    }

    /// Normalize a batch of raw records, preserving their order.
    pub fn normalize(
        &self,
        records: &[RawMeasurement],
    ) -> Result<(Vec<NormalizedMeasurement>, NormalizationReport)> {
        let mut report = NormalizationReport {
            input_rows: records.len(),
            ..Default::default()
        };
        let mut normalized = Vec::with_capacity(records.len());

        for (index, record) in records.iter().enumerate() {
            let Some(date) = record.date.as_deref().and_then(parse_date) else {
                let raw = record.date.clone().unwrap_or_default();
                if self.date_policy == DateErrorPolicy::Fatal {
                    return Err(AirQualityError::DateParse { raw, index });
                }
                debug!(index, date = %raw, "Skipping record with invalid date");
                report.invalid_dates += 1;
                continue;
            };

            let station_id = record.station_id.as_ref().and_then(|id| id.canonical());
            let pollutant = record
                .pollutant
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty());

            let (Some(station_id), Some(pollutant)) = (station_id, pollutant) else {
                debug!(index, "Skipping record without station or pollutant");
                report.malformed_rows += 1;
                continue;
            };

            let value = record.value.as_ref().and_then(parse_value);
            if value.is_none() {
                report.missing_values += 1;
            }

            normalized.push(NormalizedMeasurement {
                station_id,
                pollutant: pollutant.to_string(),
                date,
                year: date.year(),
                month: date.month(),
                value,
            });
        }

        report.normalized_rows = normalized.len();

        if report.invalid_dates > 0 {
            warn!(rows = report.invalid_dates, "Dropped records with invalid dates");
        }
        if report.malformed_rows > 0 {
            warn!(
                rows = report.malformed_rows,
                "Dropped records without station or pollutant"
            );
        }

        Ok((normalized, report))
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse the date part of a record. Times and offsets are accepted and dropped.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
                .map(|datetime| datetime.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|datetime| datetime.date_naive())
        })
}

/// Coerce a raw value to a finite number; anything else is missing.
pub fn parse_value(raw: &RawValue) -> Option<f64> {
    let value = match raw {
        RawValue::Number(value) => Some(*value),
        RawValue::Text(text) => text.trim().parse::<f64>().ok(),
        RawValue::Other(_) => None,
    };

    value.filter(|v| v.is_finite())
}
