use crate::error::{AirQualityError, Result};
use serde_json::Value;

/// Read a `[lon, lat]` pair from a GeoJSON `coordinates` array.
///
/// Extra elements (altitude) are ignored. Both values must be finite numbers.
///
/// # Examples
/// ```
/// use milan_air_quality::utils::parse_lon_lat;
/// use serde_json::json;
///
/// let (lon, lat) = parse_lon_lat(&json!([9.1953, 45.4719])).unwrap();
/// assert!((lon - 9.1953).abs() < 1e-9);
/// assert!((lat - 45.4719).abs() < 1e-9);
/// ```
pub fn parse_lon_lat(coordinates: &Value) -> Result<(f64, f64)> {
    let items = coordinates.as_array().ok_or_else(|| {
        AirQualityError::MalformedCatalog(format!(
            "coordinates must be an array, got: {}",
            coordinates
        ))
    })?;

    if items.len() < 2 {
        return Err(AirQualityError::MalformedCatalog(format!(
            "coordinates need a longitude and a latitude, got {} values",
            items.len()
        )));
    }

    let longitude = coordinate_value(&items[0], "longitude")?;
    let latitude = coordinate_value(&items[1], "latitude")?;

    Ok((longitude, latitude))
}

fn coordinate_value(value: &Value, name: &str) -> Result<f64> {
    // Some exports quote the numbers
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed.filter(|v| v.is_finite()).ok_or_else(|| {
        AirQualityError::MalformedCatalog(format!("Invalid {} value: {}", name, value))
    })
}
