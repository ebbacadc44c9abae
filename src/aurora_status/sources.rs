// aurora_status - Aurora visibility status from public space weather data
//
// Copyright 2022 Nick Pillitteri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

//! Readers for each upstream provider.
//!
//! Every reader is split into a pure `parse_*` function operating on the raw response
//! body and an async `read_*` wrapper that performs the fetch. The wrappers never fail:
//! any transport or parse error is logged and turned into absent values for every
//! field the reader is responsible for.

use crate::client::{ClientError, Endpoints, Fetch};
use crate::indicator::round_tenths;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use std::error;
use std::fmt;

const CLOUD_FRACTION_POINTER: &str = "/data/instant/details/cloud_area_fraction";
const KP_TAG_OBSERVED: &str = "observed";
const KP_COLUMN_VALUE: usize = 1;
const KP_COLUMN_TAG: usize = 2;

#[derive(Debug)]
pub enum SourceError {
    Client(ClientError),
    Decode(serde_json::Error),
    Malformed(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client(e) => write!(f, "{}", e),
            Self::Decode(e) => write!(f, "unable to decode payload: {}", e),
            Self::Malformed(m) => write!(f, "malformed payload: {}", m),
        }
    }
}

impl error::Error for SourceError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Client(e) => Some(e),
            Self::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ClientError> for SourceError {
    fn from(e: ClientError) -> Self {
        Self::Client(e)
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e)
    }
}

/// Aurora probability at the target grid cell and averaged over its neighborhood.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct AuroraProbability {
    pub point: Option<f64>,
    pub region: Option<f64>,
}

/// Latest observed planetary K-index and the two forecast values following it.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct KpIndex {
    pub current: Option<f64>,
    pub plus_3h: Option<f64>,
    pub plus_6h: Option<f64>,
}

/// Interplanetary magnetic field summary, in nanotesla.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SolarWind {
    pub bz: Option<f64>,
    pub bt: Option<f64>,
}

#[derive(Deserialize, Debug)]
struct LocationForecast {
    properties: ForecastProperties,
}

#[derive(Deserialize, Debug)]
struct ForecastProperties {
    // Only the first entry is used so the rest are left untyped
    #[serde(default)]
    timeseries: Vec<Value>,
}

#[derive(Deserialize, Debug)]
struct OvationGrid {
    #[serde(default)]
    coordinates: Vec<(f64, f64, f64)>,
}

#[derive(Deserialize, Debug)]
struct SolarWindSummary {
    #[serde(rename = "Bz")]
    bz: Option<Value>,
    #[serde(rename = "Bt")]
    bt: Option<Value>,
}

/// Cloud area fraction (0-100) from the first entry of a MET Norway location forecast.
///
/// The first entry is used as-is; no attempt is made to find the entry closest to
/// the current time.
pub fn parse_cloud_coverage(body: &[u8]) -> Result<Option<f64>, SourceError> {
    let forecast: LocationForecast = serde_json::from_slice(body)?;
    Ok(forecast
        .properties
        .timeseries
        .first()
        .and_then(|e| e.pointer(CLOUD_FRACTION_POINTER))
        .and_then(numeric))
}

/// Point and regional aurora probability from an OVATION grid of `[lon, lat, value]`.
///
/// The target is rounded to the nearest integer grid cell, ties to even. The regional
/// value is the mean of every cell within one degree (inclusive) of that cell, rounded
/// to tenths.
pub fn parse_aurora_probability(body: &[u8], lat: f64, lon: f64) -> Result<AuroraProbability, SourceError> {
    let grid: OvationGrid = serde_json::from_slice(body)?;
    let target_lat = lat.round_ties_even();
    let target_lon = lon.round_ties_even();

    let mut point = None;
    let mut sum = 0.0;
    let mut count = 0usize;

    for &(cell_lon, cell_lat, value) in &grid.coordinates {
        if cell_lat == target_lat && cell_lon == target_lon {
            point = Some(value);
        }

        if (cell_lon - target_lon).abs() <= 1.0 && (cell_lat - target_lat).abs() <= 1.0 {
            sum += value;
            count += 1;
        }
    }

    let region = if count > 0 {
        Some(round_tenths(sum / count as f64))
    } else {
        None
    };

    Ok(AuroraProbability { point, region })
}

/// Current, +3h, and +6h K-index values from the NOAA planetary K-index table.
///
/// The first row is a header. The current value comes from the last row tagged
/// "observed" and the two rows after it supply the forecasts regardless of their tag.
pub fn parse_kp_index(body: &[u8]) -> Result<KpIndex, SourceError> {
    let table: Vec<Vec<Value>> = serde_json::from_slice(body)?;
    let rows = table.get(1..).unwrap_or(&[]);

    let last_observed = rows
        .iter()
        .rposition(|row| row.get(KP_COLUMN_TAG).and_then(Value::as_str) == Some(KP_TAG_OBSERVED));

    let idx = match last_observed {
        Some(i) => i,
        None => return Ok(KpIndex::default()),
    };

    Ok(KpIndex {
        current: Some(kp_value(&rows[idx])?),
        plus_3h: rows.get(idx + 1).map(|r| kp_value(r)).transpose()?,
        plus_6h: rows.get(idx + 2).map(|r| kp_value(r)).transpose()?,
    })
}

fn kp_value(row: &[Value]) -> Result<f64, SourceError> {
    row.get(KP_COLUMN_VALUE)
        .and_then(numeric)
        .ok_or_else(|| SourceError::Malformed(format!("non-numeric K-index in row {:?}", row)))
}

/// Bz and Bt from the NOAA solar wind magnetic field summary.
///
/// Each field is extracted independently; a missing or non-numeric field is absent.
pub fn parse_solar_wind(body: &[u8]) -> Result<SolarWind, SourceError> {
    let summary: SolarWindSummary = serde_json::from_slice(body)?;
    Ok(SolarWind {
        bz: summary.bz.as_ref().and_then(numeric),
        bt: summary.bt.as_ref().and_then(numeric),
    })
}

/// Numeric value of a JSON number or a string containing one.
fn numeric(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

pub async fn read_cloud_coverage<F>(fetcher: &F, endpoints: &Endpoints, lat: f64, lon: f64) -> Option<f64>
where
    F: Fetch + ?Sized,
{
    let url = endpoints.cloud_forecast(lat, lon);
    read_source(fetcher, "cloud_coverage", url, parse_cloud_coverage)
        .await
        .flatten()
}

pub async fn read_aurora_probability<F>(fetcher: &F, endpoints: &Endpoints, lat: f64, lon: f64) -> AuroraProbability
where
    F: Fetch + ?Sized,
{
    let url = endpoints.ovation_grid();
    read_source(fetcher, "ovation", url, |body| parse_aurora_probability(body, lat, lon))
        .await
        .unwrap_or_default()
}

pub async fn read_kp_index<F>(fetcher: &F, endpoints: &Endpoints) -> KpIndex
where
    F: Fetch + ?Sized,
{
    let url = endpoints.kp_forecast();
    read_source(fetcher, "kp_index", url, parse_kp_index)
        .await
        .unwrap_or_default()
}

pub async fn read_solar_wind<F>(fetcher: &F, endpoints: &Endpoints) -> SolarWind
where
    F: Fetch + ?Sized,
{
    let url = endpoints.solar_wind();
    read_source(fetcher, "solar_wind", url, parse_solar_wind)
        .await
        .unwrap_or_default()
}

async fn read_source<F, T, P>(fetcher: &F, source: &'static str, url: Url, parse: P) -> Option<T>
where
    F: Fetch + ?Sized,
    P: FnOnce(&[u8]) -> Result<T, SourceError>,
{
    let res = match fetcher.fetch(url.clone()).await {
        Ok(body) => parse(&body),
        Err(e) => Err(SourceError::from(e)),
    };

    match res {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(message = "failed to read source", source = source, url = %url, error = %e);
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{
        parse_aurora_probability, parse_cloud_coverage, parse_kp_index, parse_solar_wind, read_aurora_probability,
        read_cloud_coverage, read_kp_index, read_solar_wind, AuroraProbability, KpIndex, SolarWind,
    };
    use crate::client::{ClientError, Endpoints, Fetch};
    use async_trait::async_trait;
    use reqwest::{StatusCode, Url};
    use std::collections::HashMap;
    use std::sync::Mutex;

    pub(crate) const CLOUD_BODY: &str = r#"{
        "type": "Feature",
        "properties": {
            "timeseries": [
                {"time": "2026-02-10T18:00:00Z", "data": {"instant": {"details": {"cloud_area_fraction": 30.5}}}},
                {"time": "2026-02-10T19:00:00Z", "data": {"instant": {"details": {"cloud_area_fraction": 0.0}}}}
            ]
        }
    }"#;

    pub(crate) const OVATION_BODY: &str = r#"{
        "Observation Time": "2026-02-10T18:00:00Z",
        "coordinates": [[25, 65, 40], [24, 65, 30], [26, 64, 20], [27, 65, 90], [25, 67, 80]]
    }"#;

    pub(crate) const KP_BODY: &str = r#"[
        ["time_tag", "kp", "observed", "noaa_scale"],
        ["2026-02-10 06:00:00", "3.00", "observed", null],
        ["2026-02-10 09:00:00", "4.00", "observed", null],
        ["2026-02-10 12:00:00", "5.00", "predicted", "G1"],
        ["2026-02-10 15:00:00", "6.00", "predicted", "G2"]
    ]"#;

    pub(crate) const SOLAR_WIND_BODY: &str = r#"{"Bt": "12", "Bz": "-7", "TimeStamp": "2026-02-10 18:00:00.000"}"#;

    /// Serves canned bodies keyed by URL path, failing for anything unknown.
    #[derive(Debug, Default)]
    pub(crate) struct CannedFetcher {
        bodies: HashMap<String, Vec<u8>>,
        pub(crate) requests: Mutex<Vec<Url>>,
    }

    impl CannedFetcher {
        pub(crate) fn with(mut self, path: &str, body: &str) -> Self {
            self.bodies.insert(path.to_owned(), body.as_bytes().to_vec());
            self
        }

        pub(crate) fn all() -> Self {
            Self::default()
                .with("/weatherapi/locationforecast/2.0/compact", CLOUD_BODY)
                .with("/json/ovation_aurora_latest.json", OVATION_BODY)
                .with("/products/noaa-planetary-k-index-forecast.json", KP_BODY)
                .with("/products/summary/solar-wind-mag-field.json", SOLAR_WIND_BODY)
        }
    }

    #[async_trait]
    impl Fetch for CannedFetcher {
        async fn fetch(&self, url: Url) -> Result<Vec<u8>, ClientError> {
            self.requests.lock().unwrap().push(url.clone());
            match self.bodies.get(url.path()) {
                Some(b) => Ok(b.clone()),
                None => Err(ClientError::Unexpected(StatusCode::SERVICE_UNAVAILABLE, url)),
            }
        }
    }

    #[test]
    fn test_parse_cloud_coverage_first_entry() {
        assert_eq!(Some(30.5), parse_cloud_coverage(CLOUD_BODY.as_bytes()).unwrap());
    }

    #[test]
    fn test_parse_cloud_coverage_empty_timeseries() {
        let body = br#"{"properties": {"timeseries": []}}"#;
        assert_eq!(None, parse_cloud_coverage(body).unwrap());
    }

    #[test]
    fn test_parse_cloud_coverage_missing_fraction() {
        let body = br#"{"properties": {"timeseries": [{"data": {"instant": {"details": {"air_temperature": -12.1}}}}]}}"#;
        assert_eq!(None, parse_cloud_coverage(body).unwrap());
    }

    #[test]
    fn test_parse_cloud_coverage_ignores_later_entries() {
        let body = br#"{"properties": {"timeseries": [
            {"time": "2026-02-10T18:00:00Z", "data": {"instant": {"details": {"cloud_area_fraction": 30.0}}}},
            {"time": "2026-02-10T19:00:00Z"}
        ]}}"#;
        assert_eq!(Some(30.0), parse_cloud_coverage(body).unwrap());
    }

    #[test]
    fn test_parse_cloud_coverage_numeric_string() {
        let body = br#"{"properties": {"timeseries": [{"data": {"instant": {"details": {"cloud_area_fraction": "87.5"}}}}]}}"#;
        assert_eq!(Some(87.5), parse_cloud_coverage(body).unwrap());
    }

    #[test]
    fn test_parse_cloud_coverage_first_entry_without_data() {
        let body = br#"{"properties": {"timeseries": [{"time": "2026-02-10T18:00:00Z"}]}}"#;
        assert_eq!(None, parse_cloud_coverage(body).unwrap());
    }

    #[test]
    fn test_parse_cloud_coverage_malformed() {
        assert!(parse_cloud_coverage(b"<html>bad gateway</html>").is_err());
    }

    #[test]
    fn test_parse_aurora_probability_point_and_region() {
        let body = br#"{"coordinates": [[25, 65, 40], [24, 65, 30], [26, 64, 20]]}"#;
        let res = parse_aurora_probability(body, 65.01, 25.47).unwrap();
        assert_eq!(Some(40.0), res.point);
        assert_eq!(Some(30.0), res.region);
    }

    #[test]
    fn test_parse_aurora_probability_excludes_outside_window() {
        let res = parse_aurora_probability(OVATION_BODY.as_bytes(), 65.01, 25.47).unwrap();
        assert_eq!(Some(40.0), res.point);
        assert_eq!(Some(30.0), res.region);
    }

    #[test]
    fn test_parse_aurora_probability_region_rounded() {
        let body = br#"{"coordinates": [[24, 64, 10], [25, 65, 11], [26, 66, 11]]}"#;
        let res = parse_aurora_probability(body, 65.0, 25.0).unwrap();
        assert_eq!(Some(11.0), res.point);
        assert_eq!(Some(10.7), res.region);
    }

    #[test]
    fn test_parse_aurora_probability_region_ties_to_even() {
        // Mean is exactly 10.25
        let body = br#"{"coordinates": [[24, 64, 10], [25, 65, 10], [26, 66, 10], [25, 64, 11]]}"#;
        let res = parse_aurora_probability(body, 65.0, 25.0).unwrap();
        assert_eq!(Some(10.2), res.region);
    }

    #[test]
    fn test_parse_aurora_probability_target_ties_to_even() {
        let body = br#"{"coordinates": [[24, 65, 40], [25, 65, 70]]}"#;
        let res = parse_aurora_probability(body, 65.0, 24.5).unwrap();
        assert_eq!(Some(40.0), res.point);

        let res = parse_aurora_probability(body, 65.0, 25.5).unwrap();
        assert_eq!(None, res.point);
        assert_eq!(Some(70.0), res.region);
    }

    #[test]
    fn test_parse_aurora_probability_no_exact_cell() {
        let body = br#"{"coordinates": [[24, 65, 30], [26, 64, 20]]}"#;
        let res = parse_aurora_probability(body, 65.01, 25.47).unwrap();
        assert_eq!(None, res.point);
        assert_eq!(Some(25.0), res.region);
    }

    #[test]
    fn test_parse_aurora_probability_empty_window() {
        let body = br#"{"coordinates": [[100, 10, 30]]}"#;
        let res = parse_aurora_probability(body, 65.01, 25.47).unwrap();
        assert_eq!(AuroraProbability::default(), res);
    }

    #[test]
    fn test_parse_kp_index_last_observed() {
        let res = parse_kp_index(KP_BODY.as_bytes()).unwrap();
        assert_eq!(
            KpIndex {
                current: Some(4.0),
                plus_3h: Some(5.0),
                plus_6h: Some(6.0),
            },
            res
        );
    }

    #[test]
    fn test_parse_kp_index_forecast_positions_missing() {
        let body = br#"[
            ["time_tag", "kp", "observed", "noaa_scale"],
            ["2026-02-10 06:00:00", 2.33, "observed", null],
            ["2026-02-10 09:00:00", 2.67, "estimated", null]
        ]"#;
        let res = parse_kp_index(body).unwrap();
        assert_eq!(Some(2.33), res.current);
        assert_eq!(Some(2.67), res.plus_3h);
        assert_eq!(None, res.plus_6h);
    }

    #[test]
    fn test_parse_kp_index_no_observed() {
        let body = br#"[
            ["time_tag", "kp", "observed", "noaa_scale"],
            ["2026-02-10 06:00:00", "3.00", "predicted", null]
        ]"#;
        assert_eq!(KpIndex::default(), parse_kp_index(body).unwrap());
    }

    #[test]
    fn test_parse_kp_index_header_only() {
        let body = br#"[["time_tag", "kp", "observed", "noaa_scale"]]"#;
        assert_eq!(KpIndex::default(), parse_kp_index(body).unwrap());
        assert_eq!(KpIndex::default(), parse_kp_index(b"[]").unwrap());
    }

    #[test]
    fn test_parse_kp_index_header_not_counted() {
        // The header's third column is literally "observed" and must be skipped
        let body = br#"[["time_tag", "kp", "observed"], ["2026-02-10 06:00:00", "1.00", "predicted"]]"#;
        assert_eq!(KpIndex::default(), parse_kp_index(body).unwrap());
    }

    #[test]
    fn test_parse_kp_index_non_numeric() {
        let body = br#"[
            ["time_tag", "kp", "observed", "noaa_scale"],
            ["2026-02-10 06:00:00", "n/a", "observed", null]
        ]"#;
        assert!(parse_kp_index(body).is_err());
    }

    #[test]
    fn test_parse_solar_wind_strings_and_numbers() {
        let res = parse_solar_wind(SOLAR_WIND_BODY.as_bytes()).unwrap();
        assert_eq!(
            SolarWind {
                bz: Some(-7.0),
                bt: Some(12.0),
            },
            res
        );

        let res = parse_solar_wind(br#"{"Bz": -2.5, "Bt": 4.1}"#).unwrap();
        assert_eq!(Some(-2.5), res.bz);
        assert_eq!(Some(4.1), res.bt);
    }

    #[test]
    fn test_parse_solar_wind_missing_or_non_numeric() {
        let res = parse_solar_wind(br#"{"Bz": "bogus"}"#).unwrap();
        assert_eq!(SolarWind::default(), res);
    }

    #[tokio::test]
    async fn test_read_all_sources() {
        let fetcher = CannedFetcher::all();
        let endpoints = Endpoints::default();

        assert_eq!(Some(30.5), read_cloud_coverage(&fetcher, &endpoints, 65.01, 25.47).await);
        assert_eq!(
            Some(40.0),
            read_aurora_probability(&fetcher, &endpoints, 65.01, 25.47).await.point
        );
        assert_eq!(Some(4.0), read_kp_index(&fetcher, &endpoints).await.current);
        assert_eq!(Some(-7.0), read_solar_wind(&fetcher, &endpoints).await.bz);
    }

    #[tokio::test]
    async fn test_read_failures_are_absent() {
        let fetcher = CannedFetcher::default()
            .with("/products/noaa-planetary-k-index-forecast.json", "{\"not\": \"a table\"}");
        let endpoints = Endpoints::default();

        assert_eq!(None, read_cloud_coverage(&fetcher, &endpoints, 65.01, 25.47).await);
        assert_eq!(
            AuroraProbability::default(),
            read_aurora_probability(&fetcher, &endpoints, 65.01, 25.47).await
        );
        assert_eq!(KpIndex::default(), read_kp_index(&fetcher, &endpoints).await);
        assert_eq!(SolarWind::default(), read_solar_wind(&fetcher, &endpoints).await);
    }
}
