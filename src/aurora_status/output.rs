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

use crate::badge::Badge;
use crate::indicator::{ConditionClass, TrafficLight};
use crate::observation::Observation;
use serde::Serialize;
use std::error;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum OutputError {
    Io(PathBuf, io::Error),
    Serialize(serde_json::Error),
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(path, e) => write!(f, "unable to write {}: {}", path.display(), e),
            Self::Serialize(e) => write!(f, "unable to serialize document: {}", e),
        }
    }
}

impl error::Error for OutputError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io(_, e) => Some(e),
            Self::Serialize(e) => Some(e),
        }
    }
}

/// Persisted status document for a single run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Snapshot {
    pub last_update: i64,
    pub cloud_coverage: Option<f64>,
    pub aurora_probability: Option<f64>,
    pub aurora_probability_region: Option<f64>,
    pub kp_index: Option<f64>,
    pub kp_index_3h: Option<f64>,
    pub kp_index_6h: Option<f64>,
    pub bz: Option<f64>,
    pub bt: Option<f64>,
    pub aurora_indicator: f64,
    pub aurora_traffic_light: TrafficLight,
}

impl Snapshot {
    pub fn new(obs: &Observation, score: f64, class: ConditionClass) -> Self {
        Snapshot {
            last_update: obs.fetched_at.timestamp(),
            cloud_coverage: obs.cloud_coverage,
            aurora_probability: obs.aurora_point_probability,
            aurora_probability_region: obs.aurora_region_probability,
            kp_index: obs.kp_current,
            kp_index_3h: obs.kp_plus_3h,
            kp_index_6h: obs.kp_plus_6h,
            bz: obs.bz,
            bt: obs.bt,
            aurora_indicator: score,
            aurora_traffic_light: class.traffic_light(),
        }
    }
}

/// Replace the contents of `path` with the pretty printed JSON form of `value`.
///
/// The document is written to a sibling temporary file and renamed into place so
/// readers never observe a partially written file.
pub fn write_json<T, P>(path: P, value: &T) -> Result<(), OutputError>
where
    T: Serialize + ?Sized,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let bytes = serde_json::to_vec_pretty(value).map_err(OutputError::Serialize)?;

    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    fs::write(&tmp, &bytes).map_err(|e| OutputError::Io(tmp.clone(), e))?;
    fs::rename(&tmp, path).map_err(|e| OutputError::Io(path.to_path_buf(), e))
}

/// Write each badge to `{dir}/{name}.json`, creating `dir` if needed.
pub fn write_badges<P: AsRef<Path>>(dir: P, badges: &[(&str, Badge)]) -> Result<(), OutputError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|e| OutputError::Io(dir.to_path_buf(), e))?;

    for (name, badge) in badges {
        write_json(dir.join(format!("{}.json", name)), badge)?;
    }

    Ok(())
}
