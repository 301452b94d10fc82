use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::models::StationKey;

/// Measured value as found in a yearly file: a number, a numeric string, or
/// whatever else the export produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Other(Value),
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

/// Strings only; any other JSON type reads as absent
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        _ => None,
    })
}

/// One record of a `<year>_stazioni.json` file, fields kept as loaded.
///
/// No field type fails deserialization; the normalizer decides what is usable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawMeasurement {
    #[serde(rename = "stazione_id", default)]
    pub station_id: Option<StationKey>,

    #[serde(rename = "inquinante", default, deserialize_with = "lenient_string")]
    pub pollutant: Option<String>,

    #[serde(rename = "data", default, deserialize_with = "lenient_string")]
    pub date: Option<String>,

    #[serde(rename = "valore", default)]
    pub value: Option<RawValue>,
}

impl RawMeasurement {
    pub fn new(
        station_id: impl Into<StationKey>,
        pollutant: &str,
        date: &str,
        value: impl Into<RawValue>,
    ) -> Self {
        Self {
            station_id: Some(station_id.into()),
            pollutant: Some(pollutant.to_string()),
            date: Some(date.to_string()),
            value: Some(value.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMeasurement {
    pub station_id: String,
    pub pollutant: String,
    pub date: NaiveDate,
    pub year: i32,
    pub month: u32,
    /// `None` when the source value was missing or not numeric
    pub value: Option<f64>,
}

impl NormalizedMeasurement {
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }
}

/// A normalized measurement with the display name of its station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinedMeasurement {
    pub station_name: String,

    #[serde(flatten)]
    pub measurement: NormalizedMeasurement,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_measurement_from_json() {
        let records: Vec<RawMeasurement> = serde_json::from_str(
            r#"[
                {"data": "2020-03-01", "valore": "40", "inquinante": "NO2", "stazione_id": "1"},
                {"data": "2020-03-02", "valore": 38.5, "inquinante": "NO2", "stazione_id": 1},
                {"data": "2020-03-03", "valore": null, "inquinante": "NO2", "stazione_id": 1},
                {"data": "2020-03-04", "inquinante": "NO2", "stazione_id": 1}
            ]"#,
        )
        .unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(records[0].value, Some(RawValue::Text("40".to_string())));
        assert_eq!(records[0].station_id, Some(StationKey::Text("1".to_string())));
        assert_eq!(records[1].value, Some(RawValue::Number(38.5)));
        assert_eq!(records[1].station_id, Some(StationKey::Integer(1)));
        assert_eq!(records[2].value, None);
        assert_eq!(records[3].value, None);
    }

    #[test]
    fn test_unexpected_value_type_is_kept() {
        let record: RawMeasurement =
            serde_json::from_str(r#"{"data": "2020-01-01", "valore": true}"#).unwrap();

        assert_eq!(
            record.value,
            Some(RawValue::Other(Value::Bool(true)))
        );
        assert_eq!(record.pollutant, None);
    }

    #[test]
    fn test_mistyped_fields_read_as_absent() {
        let record: RawMeasurement = serde_json::from_str(
            r#"{"data": 20200101, "valore": "3", "inquinante": 10, "stazione_id": true}"#,
        )
        .unwrap();

        assert_eq!(record.pollutant, None);
        assert_eq!(record.date, None);
        assert_eq!(record.station_id, Some(StationKey::Other(Value::Bool(true))));
        assert_eq!(record.value, Some(RawValue::Text("3".to_string())));
    }
}
