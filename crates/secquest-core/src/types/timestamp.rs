// Copyright 2025 The secquest Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::Display;
use std::fmt::Formatter;

use chrono::DateTime;
use chrono::Duration;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::de::Error;

use crate::error::ErrorReport;
use crate::types::date::Date;

/// A timestamp without a timezone and millisecond precision.
///
/// Written as an ISO string. Reads either that or a number of milliseconds
/// since the Unix epoch, which is how the browser app stores times.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(try_from = "StoredTimestamp", into = "String")]
pub struct Timestamp(NaiveDateTime);

/// The shapes a timestamp can take in stored JSON.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum StoredTimestamp {
    Text(String),
    EpochMillis(i64),
}

impl Timestamp {
    /// Converts a timestamp into a `NaiveDateTime`.
    pub fn into_inner(self) -> NaiveDateTime {
        self.0
    }

    /// The current timestamp in the user's local time.
    #[cfg(feature = "clock")]
    pub fn now() -> Self {
        use chrono::SubsecRound;
        Self(chrono::Local::now().naive_local().trunc_subsecs(3))
    }

    /// The date component of this timestamp.
    pub fn date(self) -> Date {
        Date::new(self.0.date())
    }

    pub fn plus_days(self, days: i64) -> Timestamp {
        Timestamp(self.0 + Duration::days(days))
    }

    /// Milliseconds elapsed since `earlier`, saturating at zero.
    pub fn millis_since(self, earlier: Timestamp) -> u64 {
        (self.0 - earlier.0).num_milliseconds().max(0) as u64
    }

    /// Milliseconds since the Unix epoch, treating the timestamp as UTC.
    pub fn epoch_millis(self) -> i64 {
        self.0.and_utc().timestamp_millis()
    }

    /// The inverse of [`Timestamp::epoch_millis`].
    pub fn from_epoch_millis(millis: i64) -> Result<Self, ErrorReport> {
        DateTime::from_timestamp_millis(millis)
            .map(|dt| Timestamp(dt.naive_utc()))
            .ok_or_else(|| ErrorReport::new(format!("timestamp out of range: {millis}")))
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%S%.3f"))
    }
}

impl TryFrom<String> for Timestamp {
    type Error = ErrorReport;

    /// Also accepts the `Z`-suffixed form of `toISOString()`.
    fn try_from(value: String) -> Result<Self, Self::Error> {
        let text = value.strip_suffix('Z').unwrap_or(&value);
        let ndt = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.3f")
            .map_err(|_| ErrorReport::new(format!("Failed to parse timestamp: '{value}'.")))?;
        Ok(Timestamp(ndt))
    }
}

impl TryFrom<StoredTimestamp> for Timestamp {
    type Error = ErrorReport;

    fn try_from(value: StoredTimestamp) -> Result<Self, Self::Error> {
        match value {
            StoredTimestamp::Text(text) => Timestamp::try_from(text),
            StoredTimestamp::EpochMillis(millis) => Timestamp::from_epoch_millis(millis),
        }
    }
}

/// Deserialize an optional timestamp where `null`, `0` and `""` all mean
/// "never".
pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<StoredTimestamp>::deserialize(deserializer)? {
        None | Some(StoredTimestamp::EpochMillis(0)) => Ok(None),
        Some(StoredTimestamp::Text(text)) if text.is_empty() => Ok(None),
        Some(stored) => Timestamp::try_from(stored).map(Some).map_err(D::Error::custom),
    }
}

impl From<Timestamp> for String {
    fn from(ts: Timestamp) -> String {
        ts.to_string()
    }
}
