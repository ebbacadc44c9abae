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

use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode, Url};
use std::error;
use std::fmt;

pub const DEFAULT_MET_API_URL: &str = "https://api.met.no/";
pub const DEFAULT_SWPC_API_URL: &str = "https://services.swpc.noaa.gov/";
pub const DEFAULT_PUSHOVER_API_URL: &str = "https://api.pushover.net/";

#[derive(Debug)]
pub enum ClientError {
    Internal(reqwest::Error),
    InvalidUrl(String),
    Unexpected(StatusCode, Url),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Internal(e) => write!(f, "{}", e),
            Self::InvalidUrl(u) => write!(f, "invalid base URL {}", u),
            Self::Unexpected(status, url) => write!(f, "unexpected status {} for {}", status, url),
        }
    }
}

impl error::Error for ClientError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Internal(e) => Some(e),
            _ => None,
        }
    }
}

/// Narrow capability for fetching the raw body of an upstream resource.
///
/// Readers only ever see bytes or a failure which keeps them testable with
/// canned payloads.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: Url) -> Result<Vec<u8>, ClientError>;
}

/// URLs for each upstream provider, derived from a configurable base URL per host.
#[derive(Debug, Clone)]
pub struct Endpoints {
    met: Url,
    swpc: Url,
}

impl Endpoints {
    pub fn new(met_base: &str, swpc_base: &str) -> Result<Self, ClientError> {
        Ok(Endpoints {
            met: parse_base(met_base)?,
            swpc: parse_base(swpc_base)?,
        })
    }

    pub fn cloud_forecast(&self, lat: f64, lon: f64) -> Url {
        let mut url = with_path(&self.met, &["weatherapi", "locationforecast", "2.0", "compact"]);
        url.query_pairs_mut()
            .clear()
            .append_pair("lat", &lat.to_string())
            .append_pair("lon", &lon.to_string());
        url
    }

    pub fn ovation_grid(&self) -> Url {
        with_path(&self.swpc, &["json", "ovation_aurora_latest.json"])
    }

    pub fn kp_forecast(&self) -> Url {
        with_path(&self.swpc, &["products", "noaa-planetary-k-index-forecast.json"])
    }

    pub fn solar_wind(&self) -> Url {
        with_path(&self.swpc, &["products", "summary", "solar-wind-mag-field.json"])
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            met: Url::parse(DEFAULT_MET_API_URL).expect("default MET URL is valid"),
            swpc: Url::parse(DEFAULT_SWPC_API_URL).expect("default SWPC URL is valid"),
        }
    }
}

pub(crate) fn parse_base(base: &str) -> Result<Url, ClientError> {
    let url = Url::parse(base).map_err(|_| ClientError::InvalidUrl(base.to_owned()))?;
    if url.cannot_be_a_base() {
        return Err(ClientError::InvalidUrl(base.to_owned()));
    }

    Ok(url)
}

pub(crate) fn with_path(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    {
        url.path_segments_mut()
            .map(|mut p| {
                p.clear().extend(segments);
            })
            .expect("base URL checked to be usable as a base");
    }

    url
}

/// `Fetch` implementation backed by a `reqwest::Client`.
///
/// Timeouts are configured on the wrapped client.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub const USER_AGENT: &'static str = concat!(
        "AuroraStatus/",
        env!("CARGO_PKG_VERSION"),
        " (",
        env!("CARGO_PKG_REPOSITORY"),
        ")"
    );
    const JSON_RESPONSE: &'static str = "application/json";

    pub fn new(client: Client) -> Self {
        HttpClient { client }
    }
}

#[async_trait]
impl Fetch for HttpClient {
    async fn fetch(&self, url: Url) -> Result<Vec<u8>, ClientError> {
        tracing::debug!(message = "making upstream request", url = %url);

        let res = self
            .client
            .get(url.clone())
            .header(USER_AGENT, Self::USER_AGENT)
            .header(ACCEPT, Self::JSON_RESPONSE)
            .send()
            .await
            .map_err(ClientError::Internal)?;

        let status = res.status();
        if status != StatusCode::OK {
            return Err(ClientError::Unexpected(status, url));
        }

        let body = res.bytes().await.map_err(ClientError::Internal)?;
        Ok(body.to_vec())
    }
}
