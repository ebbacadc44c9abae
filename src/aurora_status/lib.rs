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

//! Aurora visibility status from public space weather data
//!
//! ## Features
//!
//! `aurora_status` fetches space weather and cloud forecast data for a single location from
//! several public providers, combines it into an aurora visibility score, and publishes the
//! result as a JSON document and an optional set of [shields.io endpoint badges]. When run in
//! CI with Pushover credentials available it can also send a push notification when
//! conditions are good enough to be worth going outside.
//!
//! The following sources are used. Any of them may fail independently, in which case the
//! values they provide are reported as `null` (or "N/A" on badges).
//!
//! * [MET Norway] location forecast - Cloud coverage (0-100) for the nearest forecast hour.
//! * [NOAA OVATION] - Aurora probability (0-100) at the location and averaged over
//!   the surrounding one degree.
//! * [NOAA planetary K-index] - Latest observed K-index and the forecasts for the next
//!   three and six hours.
//! * [NOAA solar wind] - Bz and Bt of the interplanetary magnetic field, in nT.
//!
//! [shields.io endpoint badges]: https://shields.io/badges/endpoint-badge
//! [MET Norway]: https://api.met.no/weatherapi/locationforecast/2.0/documentation
//! [NOAA OVATION]: https://services.swpc.noaa.gov/json/ovation_aurora_latest.json
//! [NOAA planetary K-index]: https://services.swpc.noaa.gov/products/noaa-planetary-k-index-forecast.json
//! [NOAA solar wind]: https://services.swpc.noaa.gov/products/summary/solar-wind-mag-field.json
//!
//! ## Scoring
//!
//! The aurora indicator is the OVATION probability at the location, reduced linearly when
//! cloud coverage is above 50% (down to zero at full coverage). The indicator maps to a
//! traffic light:
//!
//! * `red` - 50 and above, go outside now.
//! * `yellow` - 25 and above, worth checking.
//! * `green` - 10 and above, possible but unlikely.
//! * `black` - below 10, don't bother.
//!
//! ## Build
//!
//! `aurora_status` is a Rust program and must be built from source using a
//! [Rust toolchain](https://rustup.rs/).
//!
//! ```text
//! git clone git@github.com:56quarters/aurora_status.git && cd aurora_status
//! cargo build --release
//! ```
//!
//! ## Usage
//!
//! ```text
//! ./aurora_status --location Oulu --lat 65.01 --lon 25.47 --output current_observation_oulu.json --badges
//! ```
//!
//! ### Notifications
//!
//! Notifications are only sent when the `GITHUB_ACTIONS`, `PUSHOVER_TOKEN`, and `PUSHOVER_USER`
//! environment variables are all set and the traffic light is `yellow` or `red`. They can be
//! further limited to a window of local (UTC+2) time.
//!
//! ```text
//! ./aurora_status --notify-start '2026-02-10 20:00' --notify-end '2026-02-11 02:00'
//! ```
//!

pub mod badge;
pub mod client;
pub mod indicator;
pub mod notify;
pub mod observation;
pub mod output;
pub mod sources;
