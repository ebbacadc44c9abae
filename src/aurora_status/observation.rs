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

use crate::client::{Endpoints, Fetch};
use crate::sources::{self, AuroraProbability, KpIndex, SolarWind};
use chrono::{DateTime, Utc};

/// Named place to assess aurora visibility for.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub fn new<S: Into<String>>(name: S, lat: f64, lon: f64) -> Self {
        Location {
            name: name.into(),
            lat,
            lon,
        }
    }
}

/// Values collected from every upstream source during a single run.
///
/// Any field may be absent when its source failed or didn't have a usable value.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub cloud_coverage: Option<f64>,
    pub aurora_point_probability: Option<f64>,
    pub aurora_region_probability: Option<f64>,
    pub kp_current: Option<f64>,
    pub kp_plus_3h: Option<f64>,
    pub kp_plus_6h: Option<f64>,
    pub bz: Option<f64>,
    pub bt: Option<f64>,
    pub fetched_at: DateTime<Utc>,
}

impl Observation {
    pub fn from_sources(
        cloud_coverage: Option<f64>,
        aurora: AuroraProbability,
        kp: KpIndex,
        wind: SolarWind,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Observation {
            cloud_coverage,
            aurora_point_probability: aurora.point,
            aurora_region_probability: aurora.region,
            kp_current: kp.current,
            kp_plus_3h: kp.plus_3h,
            kp_plus_6h: kp.plus_6h,
            bz: wind.bz,
            bt: wind.bt,
            fetched_at,
        }
    }
}

/// Read every source for the given location and combine the results.
///
/// Sources are read concurrently and independently. A failing source only leaves its
/// own fields absent.
pub async fn collect<F>(fetcher: &F, endpoints: &Endpoints, location: &Location) -> Observation
where
    F: Fetch + ?Sized,
{
    let (clouds, aurora, kp, wind) = tokio::join!(
        sources::read_cloud_coverage(fetcher, endpoints, location.lat, location.lon),
        sources::read_aurora_probability(fetcher, endpoints, location.lat, location.lon),
        sources::read_kp_index(fetcher, endpoints),
        sources::read_solar_wind(fetcher, endpoints),
    );

    tracing::info!(message = "cloud coverage", percent = ?clouds);
    tracing::info!(message = "aurora probability", point = ?aurora.point, region = ?aurora.region);
    tracing::info!(message = "kp index", current = ?kp.current, plus_3h = ?kp.plus_3h, plus_6h = ?kp.plus_6h);
    tracing::info!(message = "solar wind", bz = ?wind.bz, bt = ?wind.bt);

    Observation::from_sources(clouds, aurora, kp, wind, Utc::now())
}
