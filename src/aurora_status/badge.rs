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

//! Badge documents for shields.io style endpoint badges.
//!
//! Each badge is derived from a single value and colored on a red (best) to gray
//! (worst or unknown) ladder. Missing values always render as a gray "N/A".

use crate::indicator::ConditionClass;
use crate::observation::Observation;
use serde::{Serialize, Serializer};

const SCHEMA_VERSION: u32 = 1;
const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeColor {
    Red,
    Yellow,
    Green,
    Gray,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub label: &'static str,
    pub message: String,
    pub color: BadgeColor,
}

impl Badge {
    fn new<S: Into<String>>(label: &'static str, message: S, color: BadgeColor) -> Self {
        Badge {
            label,
            message: message.into(),
            color,
        }
    }

    fn not_available(label: &'static str) -> Self {
        Self::new(label, NOT_AVAILABLE, BadgeColor::Gray)
    }
}

impl Serialize for Badge {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Document<'a> {
            schema_version: u32,
            label: &'a str,
            message: &'a str,
            color: BadgeColor,
        }

        Document {
            schema_version: SCHEMA_VERSION,
            label: self.label,
            message: &self.message,
            color: self.color,
        }
        .serialize(serializer)
    }
}

pub fn recommendation(class: ConditionClass) -> Badge {
    let (message, color) = match class {
        ConditionClass::GoNow => ("Pretty sure", BadgeColor::Red),
        ConditionClass::WorthChecking => ("Worth checking", BadgeColor::Yellow),
        ConditionClass::Possible => ("Probably not", BadgeColor::Green),
        ConditionClass::DontBother => ("Definitely not", BadgeColor::Gray),
    };

    Badge::new("Current Status", message, color)
}

pub fn aurora_probability(probability: Option<f64>) -> Badge {
    const LABEL: &str = "Aurora Probability";
    let p = match probability {
        Some(p) => p,
        None => return Badge::not_available(LABEL),
    };

    let color = if p >= 50.0 {
        BadgeColor::Red
    } else if p >= 25.0 {
        BadgeColor::Yellow
    } else if p >= 10.0 {
        BadgeColor::Green
    } else {
        BadgeColor::Gray
    };

    Badge::new(LABEL, format!("{:.0}%", p), color)
}

/// Clear skies are best, so the ladder is inverted.
pub fn cloud_coverage(coverage: Option<f64>) -> Badge {
    const LABEL: &str = "Cloud Coverage";
    let c = match coverage {
        Some(c) => c,
        None => return Badge::not_available(LABEL),
    };

    let color = if c <= 25.0 {
        BadgeColor::Red
    } else if c <= 50.0 {
        BadgeColor::Yellow
    } else if c <= 75.0 {
        BadgeColor::Green
    } else {
        BadgeColor::Gray
    };

    Badge::new(LABEL, format!("{:.0}%", c), color)
}

pub fn kp_index(kp: Option<f64>) -> Badge {
    const LABEL: &str = "KP Index";
    let kp = match kp {
        Some(kp) => kp,
        None => return Badge::not_available(LABEL),
    };

    let color = if kp >= 5.0 {
        BadgeColor::Red
    } else if kp >= 3.0 {
        BadgeColor::Yellow
    } else if kp >= 2.0 {
        BadgeColor::Green
    } else {
        BadgeColor::Gray
    };

    Badge::new(LABEL, format!("{:.1}", kp), color)
}

/// A strongly southward (negative) Bz is best.
pub fn bz(bz: Option<f64>) -> Badge {
    const LABEL: &str = "Bz";
    let bz = match bz {
        Some(bz) => bz,
        None => return Badge::not_available(LABEL),
    };

    let color = if bz <= -10.0 {
        BadgeColor::Red
    } else if bz <= -5.0 {
        BadgeColor::Yellow
    } else if bz < 0.0 {
        BadgeColor::Green
    } else {
        BadgeColor::Gray
    };

    Badge::new(LABEL, format!("{:.1} nT", bz), color)
}

pub fn bt(bt: Option<f64>) -> Badge {
    const LABEL: &str = "Bt";
    let bt = match bt {
        Some(bt) => bt,
        None => return Badge::not_available(LABEL),
    };

    let color = if bt >= 20.0 {
        BadgeColor::Red
    } else if bt >= 10.0 {
        BadgeColor::Yellow
    } else if bt >= 5.0 {
        BadgeColor::Green
    } else {
        BadgeColor::Gray
    };

    Badge::new(LABEL, format!("{:.1} nT", bt), color)
}

/// Every badge for an observation, paired with the file stem it's published under.
pub fn all_badges(obs: &Observation, class: ConditionClass) -> Vec<(&'static str, Badge)> {
    vec![
        ("recommendation", recommendation(class)),
        ("aurora-probability", aurora_probability(obs.aurora_point_probability)),
        ("cloud-coverage", cloud_coverage(obs.cloud_coverage)),
        ("kp-index", kp_index(obs.kp_current)),
        ("bz", bz(obs.bz)),
        ("bt", bt(obs.bt)),
    ]
}
