use crate::analyzers::DatasetSummary;
use crate::error::Result;
use crate::models::{FocusView, MonthlyMean, QueryOutcome, Station, StationMean, YearCount};
use crate::utils::constants::{BAR_WIDTH, VALUE_UNIT};
use chrono::Month;
use clap::ValueEnum;
use serde::Serialize;
use serde_json::json;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Csv,
    Json,
}

#[derive(Serialize)]
struct FocusRow {
    month: u32,
    mean: f64,
    samples: usize,
    peak: bool,
}

#[derive(Serialize)]
struct StationRow<'a> {
    id: &'a str,
    name: &'a str,
    pollutants: String,
    longitude: f64,
    latitude: f64,
}

/// Three-letter English month name, or the number if out of range
pub fn month_label(month: u32) -> String {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name()[..3].to_string())
        .unwrap_or_else(|| month.to_string())
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let width = ((value / max) * BAR_WIDTH as f64).round() as usize;
    "#".repeat(width.clamp(1, BAR_WIDTH))
}

/// Renders the aggregator's tables as text, CSV or JSON.
pub struct ReportWriter {
    format: ReportFormat,
}

impl ReportWriter {
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> ReportFormat {
        self.format
    }

    pub fn write_yearly_counts<W: Write>(
        &self,
        out: &mut W,
        outcome: &QueryOutcome<Vec<YearCount>>,
    ) -> Result<()> {
        let title = "Measurements per year";
        let rows = match outcome {
            QueryOutcome::Data(rows) => rows,
            QueryOutcome::NoData(reason) => return self.write_no_data(out, title, reason),
        };

        match self.format {
            ReportFormat::Text => {
                let max = rows.iter().map(|r| r.count).max().unwrap_or(0) as f64;
                writeln!(out, "{}", title)?;
                writeln!(out, "  {:<6} {:>10}", "Year", "Count")?;
                for row in rows {
                    writeln!(
                        out,
                        "  {:<6} {:>10}  {}",
                        row.year,
                        row.count,
                        bar(row.count as f64, max)
                    )?;
                }
                let total: usize = rows.iter().map(|r| r.count).sum();
                writeln!(out, "  {:<6} {:>10}", "Total", total)?;
                Ok(())
            }
            ReportFormat::Csv => self.write_csv(out, rows),
            ReportFormat::Json => self.write_json(out, title, rows),
        }
    }

    pub fn write_monthly_means<W: Write>(
        &self,
        out: &mut W,
        year: i32,
        pollutant: &str,
        outcome: &QueryOutcome<Vec<MonthlyMean>>,
    ) -> Result<()> {
        let title = format!("Monthly mean of {} in {} ({})", pollutant, year, VALUE_UNIT);
        let rows = match outcome {
            QueryOutcome::Data(rows) => rows,
            QueryOutcome::NoData(reason) => return self.write_no_data(out, &title, reason),
        };

        match self.format {
            ReportFormat::Text => {
                writeln!(out, "{}", title)?;
                self.write_month_table(out, rows, None)
            }
            ReportFormat::Csv => self.write_csv(out, rows),
            ReportFormat::Json => self.write_json(out, &title, rows),
        }
    }

    pub fn write_station_ranking<W: Write>(
        &self,
        out: &mut W,
        pollutant: &str,
        outcome: &QueryOutcome<Vec<StationMean>>,
    ) -> Result<()> {
        let title = format!("Station ranking by mean {} ({})", pollutant, VALUE_UNIT);
        let rows = match outcome {
            QueryOutcome::Data(rows) => rows,
            QueryOutcome::NoData(reason) => return self.write_no_data(out, &title, reason),
        };

        match self.format {
            ReportFormat::Text => {
                let name_width = rows
                    .iter()
                    .map(|r| r.station.chars().count())
                    .max()
                    .unwrap_or(0)
                    .max("Station".len());
                let max = rows.first().map(|r| r.mean).unwrap_or(0.0);

                writeln!(out, "{}", title)?;
                writeln!(
                    out,
                    "  {:>3}  {:<width$} {:>9} {:>8}",
                    "#",
                    "Station",
                    "Mean",
                    "Samples",
                    width = name_width
                )?;
                for (rank, row) in rows.iter().enumerate() {
                    writeln!(
                        out,
                        "  {:>3}  {:<width$} {:>9.2} {:>8}  {}",
                        rank + 1,
                        row.station,
                        row.mean,
                        row.samples,
                        bar(row.mean, max),
                        width = name_width
                    )?;
                }
                Ok(())
            }
            ReportFormat::Csv => self.write_csv(out, rows),
            ReportFormat::Json => self.write_json(out, &title, rows),
        }
    }

    pub fn write_focus<W: Write>(
        &self,
        out: &mut W,
        outcome: &QueryOutcome<FocusView>,
    ) -> Result<()> {
        let view = match outcome {
            QueryOutcome::Data(view) => view,
            QueryOutcome::NoData(reason) => {
                return self.write_no_data(out, "Latest year focus", reason)
            }
        };
        let title = format!(
            "Focus {}: {} at {}, monthly mean ({})",
            view.year, view.pollutant, view.station, VALUE_UNIT
        );

        match self.format {
            ReportFormat::Text => {
                writeln!(out, "{}", title)?;
                self.write_month_table(out, &view.series, Some(view.peak.month))?;
                writeln!(
                    out,
                    "  Peak: {} ({:.2} {})",
                    month_label(view.peak.month),
                    view.peak.mean,
                    VALUE_UNIT
                )?;
                Ok(())
            }
            ReportFormat::Csv => {
                let rows: Vec<FocusRow> = view
                    .series
                    .iter()
                    .map(|m| FocusRow {
                        month: m.month,
                        mean: m.mean,
                        samples: m.samples,
                        peak: m.month == view.peak.month,
                    })
                    .collect();
                self.write_csv(out, &rows)
            }
            ReportFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, &json!({ "title": title, "focus": view }))?;
                writeln!(out)?;
                Ok(())
            }
        }
    }

    pub fn write_stations<W: Write>(&self, out: &mut W, stations: &[Station]) -> Result<()> {
        let title = "Monitoring stations";
        if stations.is_empty() {
            return self.write_no_data(out, title, "No stations in the catalog");
        }

        match self.format {
            ReportFormat::Text => {
                writeln!(out, "{}", title)?;
                for station in stations {
                    writeln!(
                        out,
                        "  {:>4}  {:<28} {:>9.5} {:>9.5}  {}",
                        station.id,
                        station.name,
                        station.latitude,
                        station.longitude,
                        station.pollutants.join(", ")
                    )?;
                }
                Ok(())
            }
            ReportFormat::Csv => {
                let rows: Vec<StationRow> = stations
                    .iter()
                    .map(|s| StationRow {
                        id: &s.id,
                        name: &s.name,
                        pollutants: s.pollutants.join(","),
                        longitude: s.longitude,
                        latitude: s.latitude,
                    })
                    .collect();
                self.write_csv(out, &rows)
            }
            ReportFormat::Json => self.write_json(out, title, stations),
        }
    }

    /// A titled list of plain values (pollutant codes, station names)
    pub fn write_list<W: Write>(&self, out: &mut W, title: &str, items: &[String]) -> Result<()> {
        if items.is_empty() {
            return self.write_no_data(out, title, "Nothing available");
        }

        match self.format {
            ReportFormat::Text => {
                writeln!(out, "{}", title)?;
                for item in items {
                    writeln!(out, "  {}", item)?;
                }
                Ok(())
            }
            ReportFormat::Csv => {
                let mut writer = csv::Writer::from_writer(&mut *out);
                writer.write_record(["value"])?;
                for item in items {
                    writer.write_record([item])?;
                }
                writer.flush()?;
                Ok(())
            }
            ReportFormat::Json => self.write_json(out, title, items),
        }
    }

    pub fn write_summary<W: Write>(&self, out: &mut W, summary: &DatasetSummary) -> Result<()> {
        match self.format {
            ReportFormat::Text => {
                writeln!(out, "{}", summary.summary())?;
                Ok(())
            }
            ReportFormat::Csv => {
                let mut writer = csv::Writer::from_writer(&mut *out);
                writer.write_record(["metric", "value"])?;
                let metrics = [
                    ("total_records", summary.total_records),
                    ("valid_records", summary.valid_records),
                    ("missing_values", summary.missing_values),
                    ("skipped_records", summary.skipped_records),
                    ("joined_records", summary.joined_records),
                    ("unmatched_records", summary.unmatched_records),
                    ("catalog_stations", summary.catalog_stations),
                    ("stations_with_data", summary.stations_with_data),
                    ("notices", summary.notices.len()),
                ];
                for (metric, value) in metrics {
                    writer.write_record([metric, value.to_string().as_str()])?;
                }
                writer.flush()?;
                Ok(())
            }
            ReportFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, summary)?;
                writeln!(out)?;
                Ok(())
            }
        }
    }

    fn write_month_table<W: Write>(
        &self,
        out: &mut W,
        rows: &[MonthlyMean],
        peak: Option<u32>,
    ) -> Result<()> {
        let max = rows.iter().map(|r| r.mean).fold(0.0, f64::max);

        writeln!(out, "  {:<5} {:>9} {:>8}", "Month", "Mean", "Samples")?;
        for row in rows {
            let marker = if peak == Some(row.month) { "  <- peak" } else { "" };
            writeln!(
                out,
                "  {:<5} {:>9.2} {:>8}  {}{}",
                month_label(row.month),
                row.mean,
                row.samples,
                bar(row.mean, max),
                marker
            )?;
        }
        Ok(())
    }

    fn write_no_data<W: Write>(&self, out: &mut W, title: &str, reason: &str) -> Result<()> {
        match self.format {
            ReportFormat::Text => {
                writeln!(out, "{}", title)?;
                writeln!(out, "  No data: {}", reason)?;
            }
            ReportFormat::Csv => writeln!(out, "# {}", reason)?,
            ReportFormat::Json => {
                serde_json::to_writer_pretty(
                    &mut *out,
                    &json!({ "title": title, "no_data": reason }),
                )?;
                writeln!(out)?;
            }
        }
        Ok(())
    }

    fn write_csv<W: Write, R: Serialize>(&self, out: &mut W, rows: &[R]) -> Result<()> {
        let mut writer = csv::Writer::from_writer(&mut *out);
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn write_json<W: Write, R: Serialize + ?Sized>(
        &self,
        out: &mut W,
        title: &str,
        rows: &R,
    ) -> Result<()> {
        serde_json::to_writer_pretty(&mut *out, &json!({ "title": title, "rows": rows }))?;
        writeln!(out)?;
        Ok(())
    }
}

impl Default for ReportWriter {
    fn default() -> Self {
        Self::new(ReportFormat::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render<F>(format: ReportFormat, f: F) -> String
    where
        F: FnOnce(&ReportWriter, &mut Vec<u8>) -> Result<()>,
    {
        let writer = ReportWriter::new(format);
        let mut out = Vec::new();
        f(&writer, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn focus_view() -> FocusView {
        let series = vec![
            MonthlyMean { month: 1, mean: 5.0, samples: 2 },
            MonthlyMean { month: 2, mean: 9.0, samples: 1 },
            MonthlyMean { month: 3, mean: 3.0, samples: 4 },
        ];
        FocusView {
            year: 2025,
            station: "Via Senato".to_string(),
            pollutant: "NO2".to_string(),
            peak: series[1],
            series,
        }
    }

    #[test]
    fn test_month_label() {
        assert_eq!(month_label(1), "Jan");
        assert_eq!(month_label(12), "Dec");
        assert_eq!(month_label(13), "13");
    }

    #[test]
    fn test_yearly_counts_csv() {
        let outcome = QueryOutcome::Data(vec![
            YearCount { year: 2020, count: 3 },
            YearCount { year: 2022, count: 1 },
        ]);

        let text = render(ReportFormat::Csv, |w, out| w.write_yearly_counts(out, &outcome));

        assert_eq!(text, "year,count\n2020,3\n2022,1\n");
    }

    #[test]
    fn test_focus_text_marks_peak() {
        let outcome = QueryOutcome::Data(focus_view());

        let text = render(ReportFormat::Text, |w, out| w.write_focus(out, &outcome));

        let peak_line = text.lines().find(|l| l.contains("<- peak")).unwrap();
        assert!(peak_line.trim_start().starts_with("Feb"));
        assert!(text.contains("Peak: Feb (9.00"));
    }

    #[test]
    fn test_focus_csv_peak_column() {
        let outcome = QueryOutcome::Data(focus_view());

        let text = render(ReportFormat::Csv, |w, out| w.write_focus(out, &outcome));

        assert_eq!(
            text,
            "month,mean,samples,peak\n1,5.0,2,false\n2,9.0,1,true\n3,3.0,4,false\n"
        );
    }

    #[test]
    fn test_no_data_is_informational() {
        let outcome: QueryOutcome<Vec<StationMean>> =
            QueryOutcome::no_data("Not enough data to compute station means for CO");

        let text = render(ReportFormat::Text, |w, out| {
            w.write_station_ranking(out, "CO", &outcome)
        });
        assert!(text.contains("No data: Not enough data to compute station means for CO"));

        let json = render(ReportFormat::Json, |w, out| {
            w.write_station_ranking(out, "CO", &outcome)
        });
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value["no_data"],
            "Not enough data to compute station means for CO"
        );
    }

    #[test]
    fn test_ranking_json_rows() {
        let outcome = QueryOutcome::Data(vec![StationMean {
            station: "Via Senato".to_string(),
            mean: 40.0,
            samples: 1,
        }]);

        let json = render(ReportFormat::Json, |w, out| {
            w.write_station_ranking(out, "NO2", &outcome)
        });
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["rows"][0]["station"], "Via Senato");
        assert_eq!(value["rows"][0]["mean"], 40.0);
    }

    #[test]
    fn test_bar_scaling() {
        assert_eq!(bar(10.0, 10.0).len(), BAR_WIDTH);
        assert_eq!(bar(0.0, 10.0), "");
        assert_eq!(bar(0.01, 10.0).len(), 1);
    }
}
