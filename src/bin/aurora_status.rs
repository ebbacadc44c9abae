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

use aurora_status::badge;
use aurora_status::client::{
    Endpoints, HttpClient, DEFAULT_MET_API_URL, DEFAULT_PUSHOVER_API_URL, DEFAULT_SWPC_API_URL,
};
use aurora_status::indicator;
use aurora_status::notify::{self, NotifyEnv, NotifyWindow, PushoverClient};
use aurora_status::observation::{self, Location};
use aurora_status::output::{self, Snapshot};
use chrono::{DateTime, FixedOffset, Utc};
use clap::Parser;
use reqwest::Client;
use std::error::Error;
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing::{Instrument, Level};

const DEFAULT_LOG_LEVEL: Level = Level::INFO;
const DEFAULT_TIMEOUT_MILLIS: u64 = 30_000;
const DEFAULT_LOCATION: &str = "Oulu";
const DEFAULT_LAT: f64 = 65.01;
const DEFAULT_LON: f64 = 25.47;
const DEFAULT_OUTPUT: &str = "current_observation_oulu.json";
const DEFAULT_BADGE_DIR: &str = "badges";

#[derive(Debug, Parser)]
#[clap(name = "aurora_status", version = clap::crate_version!())]
struct AuroraStatusApplication {
    /// Location name, used in notifications
    #[clap(long, default_value_t = DEFAULT_LOCATION.into())]
    location: String,

    /// Latitude of the location, in degrees
    #[clap(long, default_value_t = DEFAULT_LAT, allow_hyphen_values = true)]
    lat: f64,

    /// Longitude of the location, in degrees
    #[clap(long, default_value_t = DEFAULT_LON, allow_hyphen_values = true)]
    lon: f64,

    /// Path to write the JSON status document to
    #[clap(long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Write shields.io endpoint badge documents
    #[clap(long)]
    badges: bool,

    /// Directory to write badge documents to when --badges is set
    #[clap(long, default_value = DEFAULT_BADGE_DIR)]
    badge_dir: PathBuf,

    /// Don't send notifications before this local time (UTC+2, format: 'YYYY-MM-DD HH:MM')
    #[clap(long, value_parser = parse_window_bound)]
    notify_start: Option<DateTime<FixedOffset>>,

    /// Don't send notifications after this local time (UTC+2, format: 'YYYY-MM-DD HH:MM')
    #[clap(long, value_parser = parse_window_bound)]
    notify_end: Option<DateTime<FixedOffset>>,

    /// Base URL for the MET Norway API
    #[clap(long, default_value_t = DEFAULT_MET_API_URL.into())]
    met_api_url: String,

    /// Base URL for the NOAA SWPC API
    #[clap(long, default_value_t = DEFAULT_SWPC_API_URL.into())]
    swpc_api_url: String,

    /// Base URL for the Pushover API
    #[clap(long, default_value_t = DEFAULT_PUSHOVER_API_URL.into())]
    pushover_api_url: String,

    /// Timeout for each upstream request, in milliseconds.
    #[clap(long, default_value_t = DEFAULT_TIMEOUT_MILLIS)]
    timeout_millis: u64,

    /// Logging verbosity. Allowed values are 'trace', 'debug', 'info', 'warn', and 'error'
    /// (case insensitive)
    #[clap(long, default_value_t = DEFAULT_LOG_LEVEL)]
    log_level: Level,
}

fn parse_window_bound(s: &str) -> Result<DateTime<FixedOffset>, notify::WindowError> {
    notify::parse_local_time(s)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let opts = AuroraStatusApplication::parse();
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(opts.log_level)
            .finish(),
    )
    .expect("failed to set tracing subscriber");

    let timeout = Duration::from_millis(opts.timeout_millis);
    let http_client = Client::builder()
        .timeout(timeout)
        .user_agent(HttpClient::USER_AGENT)
        .build()
        .unwrap_or_else(|e| {
            tracing::error!(message = "unable to initialize HTTP client", error = %e);
            process::exit(1)
        });

    let endpoints = Endpoints::new(&opts.met_api_url, &opts.swpc_api_url).unwrap_or_else(|e| {
        tracing::error!(message = "invalid API URL", error = %e);
        process::exit(1)
    });

    let notifier = PushoverClient::new(http_client.clone(), &opts.pushover_api_url).unwrap_or_else(|e| {
        tracing::error!(message = "invalid Pushover API URL", error = %e);
        process::exit(1)
    });

    let window = NotifyWindow {
        start: opts.notify_start,
        end: opts.notify_end,
    };
    let env = NotifyEnv::from_env();
    let location = Location::new(opts.location.clone(), opts.lat, opts.lon);
    let fetcher = HttpClient::new(http_client);

    tracing::info!(
        message = "fetching aurora observation data",
        location = %location.name,
        lat = location.lat,
        lon = location.lon,
    );

    let obs = observation::collect(&fetcher, &endpoints, &location)
        .instrument(tracing::span!(Level::DEBUG, "collect_observation"))
        .await;

    let score = indicator::score(&obs);
    let class = indicator::classify(score);
    tracing::info!(
        message = "computed aurora indicator",
        indicator = score,
        condition = %class,
        traffic_light = %class.traffic_light(),
    );

    let snapshot = Snapshot::new(&obs, score, class);
    if let Err(e) = output::write_json(&opts.output, &snapshot) {
        tracing::error!(message = "failed to write status document", error = %e);
        process::exit(1)
    }
    tracing::info!(message = "wrote status document", path = %opts.output.display());

    if opts.badges {
        match output::write_badges(&opts.badge_dir, &badge::all_badges(&obs, class)) {
            Ok(_) => tracing::info!(message = "wrote badges", path = %opts.badge_dir.display()),
            Err(e) => tracing::error!(message = "failed to write badges", error = %e),
        }
    }

    notify::dispatch(&notifier, &env, &window, Utc::now(), &location, score, &obs)
        .instrument(tracing::span!(Level::DEBUG, "notify"))
        .await;

    Ok(())
}
