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

use crate::observation::Observation;
use serde::Serialize;
use std::fmt;

const CLEAR_SKY_MAX_COVERAGE: f64 = 50.0;

/// How worthwhile it is to go outside and look, in increasing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConditionClass {
    DontBother,
    Possible,
    WorthChecking,
    GoNow,
}

impl ConditionClass {
    pub fn name(&self) -> &'static str {
        match self {
            Self::DontBother => "dont-bother",
            Self::Possible => "possible",
            Self::WorthChecking => "worth-checking",
            Self::GoNow => "go-now",
        }
    }

    /// Color used for this class in the persisted snapshot.
    ///
    /// The bottom band is "black" here while badges use "gray" for it.
    pub fn traffic_light(&self) -> TrafficLight {
        match self {
            Self::DontBother => TrafficLight::Black,
            Self::Possible => TrafficLight::Green,
            Self::WorthChecking => TrafficLight::Yellow,
            Self::GoNow => TrafficLight::Red,
        }
    }
}

impl fmt::Display for ConditionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficLight {
    Red,
    Yellow,
    Green,
    Black,
}

impl fmt::Display for TrafficLight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Red => "red",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Black => "black",
        };

        f.write_str(s)
    }
}

/// Fraction of the aurora expected to be visible through the given cloud coverage.
///
/// Coverage up to 50% (or unknown coverage) doesn't reduce visibility. Above that
/// visibility drops linearly to zero at full coverage. Out of range coverage is not
/// clamped here.
pub fn visibility_multiplier(cloud_coverage: Option<f64>) -> f64 {
    match cloud_coverage {
        Some(c) if c > CLEAR_SKY_MAX_COVERAGE => (100.0 - c) / CLEAR_SKY_MAX_COVERAGE,
        _ => 1.0,
    }
}

/// Visibility score (0-100, one decimal place) for an observation.
pub fn score(obs: &Observation) -> f64 {
    score_from(obs.aurora_point_probability, obs.cloud_coverage)
}

pub fn score_from(aurora_probability: Option<f64>, cloud_coverage: Option<f64>) -> f64 {
    let probability = match aurora_probability {
        Some(p) => p,
        None => return 0.0,
    };

    let raw = probability * visibility_multiplier(cloud_coverage);
    round_tenths(raw.clamp(0.0, 100.0))
}

pub fn classify(score: f64) -> ConditionClass {
    if score >= 50.0 {
        ConditionClass::GoNow
    } else if score >= 25.0 {
        ConditionClass::WorthChecking
    } else if score >= 10.0 {
        ConditionClass::Possible
    } else {
        ConditionClass::DontBother
    }
}

/// Round to one decimal place, ties to even.
pub(crate) fn round_tenths(v: f64) -> f64 {
    (v * 10.0).round_ties_even() / 10.0
}
