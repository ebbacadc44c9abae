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

//! Decide whether conditions warrant a push notification and send at most one.

use crate::client::{parse_base, with_path, ClientError};
use crate::indicator::{classify, ConditionClass};
use crate::observation::{Location, Observation};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use reqwest::{Client, StatusCode, Url};
use std::env;
use std::error;
use std::fmt;

pub const ENV_AUTOMATED: &str = "GITHUB_ACTIONS";
pub const ENV_TOKEN: &str = "PUSHOVER_TOKEN";
pub const ENV_USER: &str = "PUSHOVER_USER";

const LOCAL_OFFSET_SECS: i32 = 2 * 3600;
const WINDOW_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Fixed UTC+2 offset that notification windows are expressed in. No DST.
pub fn local_offset() -> FixedOffset {
    FixedOffset::east_opt(LOCAL_OFFSET_SECS).expect("UTC+2 is a valid offset")
}

#[derive(Debug)]
pub struct WindowError {
    input: String,
    source: chrono::ParseError,
}

impl fmt::Display for WindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid time '{}', expected 'YYYY-MM-DD HH:MM': {}",
            self.input, self.source
        )
    }
}

impl error::Error for WindowError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Parse a `YYYY-MM-DD HH:MM` local time in the fixed UTC+2 offset.
pub fn parse_local_time(s: &str) -> Result<DateTime<FixedOffset>, WindowError> {
    let naive = NaiveDateTime::parse_from_str(s.trim(), WINDOW_FORMAT).map_err(|e| WindowError {
        input: s.to_owned(),
        source: e,
    })?;

    // A fixed offset has exactly one mapping for every local time
    Ok(local_offset().from_utc_datetime(&(naive - local_offset())))
}

/// Optional bounds on when notifications may be sent, both inclusive.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NotifyWindow {
    pub start: Option<DateTime<FixedOffset>>,
    pub end: Option<DateTime<FixedOffset>>,
}

/// Notification related settings provided by the execution environment.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NotifyEnv {
    pub automated: bool,
    pub token: Option<String>,
    pub user: Option<String>,
}

impl NotifyEnv {
    /// Read settings from the process environment. Empty values count as unset.
    pub fn from_env() -> Self {
        let non_empty = |key: &str| env::var(key).ok().filter(|v| !v.is_empty());

        NotifyEnv {
            automated: non_empty(ENV_AUTOMATED).is_some(),
            token: non_empty(ENV_TOKEN),
            user: non_empty(ENV_USER),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDecision {
    pub should_send: bool,
    pub reason: String,
}

impl NotificationDecision {
    fn skip<S: Into<String>>(reason: S) -> Self {
        NotificationDecision {
            should_send: false,
            reason: reason.into(),
        }
    }

    fn send(class: ConditionClass) -> Self {
        NotificationDecision {
            should_send: true,
            reason: format!("conditions are {}", class),
        }
    }
}

/// Evaluate each precondition for sending a notification in order, stopping at the
/// first one that fails.
pub fn decide(
    class: ConditionClass,
    now: DateTime<Utc>,
    env: &NotifyEnv,
    window: &NotifyWindow,
) -> NotificationDecision {
    if !env.automated {
        return NotificationDecision::skip("not running in automated environment");
    }

    if env.token.is_none() || env.user.is_none() {
        return NotificationDecision::skip("credentials not configured");
    }

    let local = now.with_timezone(&local_offset());
    if let Some(start) = window.start {
        if local < start {
            return NotificationDecision::skip(format!("before window: {}", start));
        }
    }

    if let Some(end) = window.end {
        if local > end {
            return NotificationDecision::skip(format!("after window: {}", end));
        }
    }

    if class < ConditionClass::WorthChecking {
        return NotificationDecision::skip(format!("conditions are only {}", class));
    }

    NotificationDecision::send(class)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(location: &Location, score: f64, obs: &Observation) -> Self {
        Notification {
            title: format!("Aurora in {} • {:.0}% Chance", location.name, score),
            message: format!(
                "NOAA Probability: {}\nCloud Coverage: {}",
                percent(obs.aurora_point_probability),
                percent(obs.cloud_coverage)
            ),
        }
    }
}

fn percent(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{:.0}%", v),
        None => "N/A".to_owned(),
    }
}

/// Capability for delivering a single push notification.
#[async_trait]
pub trait Notify: Send + Sync {
    async fn send(&self, token: &str, user: &str, notification: &Notification) -> Result<(), ClientError>;
}

/// Sends notifications using the Pushover message API.
#[derive(Debug, Clone)]
pub struct PushoverClient {
    client: Client,
    url: Url,
}

impl PushoverClient {
    pub fn new(client: Client, base_url: &str) -> Result<Self, ClientError> {
        let base = parse_base(base_url)?;
        Ok(PushoverClient {
            client,
            url: with_path(&base, &["1", "messages.json"]),
        })
    }
}

#[async_trait]
impl Notify for PushoverClient {
    async fn send(&self, token: &str, user: &str, notification: &Notification) -> Result<(), ClientError> {
        let params = [
            ("token", token),
            ("user", user),
            ("title", notification.title.as_str()),
            ("message", notification.message.as_str()),
        ];

        let res = self
            .client
            .post(self.url.clone())
            .form(&params)
            .send()
            .await
            .map_err(ClientError::Internal)?;

        let status = res.status();
        if status == StatusCode::OK {
            Ok(())
        } else {
            Err(ClientError::Unexpected(status, self.url.clone()))
        }
    }
}

/// Run the gate and, when it passes, make exactly one delivery attempt.
///
/// Delivery failures are logged and never retried. Returns `true` if a notification
/// was delivered.
pub async fn dispatch<N>(
    notifier: &N,
    env: &NotifyEnv,
    window: &NotifyWindow,
    now: DateTime<Utc>,
    location: &Location,
    score: f64,
    obs: &Observation,
) -> bool
where
    N: Notify + ?Sized,
{
    let decision = decide(classify(score), now, env, window);
    let (token, user) = match (&env.token, &env.user) {
        (Some(t), Some(u)) if decision.should_send => (t, u),
        _ => {
            tracing::info!(message = "skipping notification", reason = %decision.reason);
            return false;
        }
    };

    let notification = Notification::new(location, score, obs);
    match notifier.send(token, user, &notification).await {
        Ok(_) => {
            tracing::info!(message = "notification sent", title = %notification.title, reason = %decision.reason);
            true
        }
        Err(e) => {
            tracing::error!(message = "notification failed", error = %e);
            false
        }
    }
}
