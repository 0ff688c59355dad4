//! Daily challenge scheduling
//!
//! The challenge day rolls over at 10:00 in America/New_York. Every visitor
//! on the same challenge day gets the same Pokemon, derived only from the
//! date key.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::America::New_York;
use serde::Serialize;
use ts_rs::TS;

/// Local hour (Eastern time) at which a new challenge starts
pub const ROLLOVER_HOUR_ET: i64 = 10;

/// Number of Pokemon the daily id is drawn from
pub const POKEDEX_SIZE: u32 = 1025;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Time left until the next rollover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Countdown {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl Countdown {
    fn from_seconds(total: i64) -> Self {
        let total = total.max(0);
        Self {
            hours: (total / 3600) as u32,
            minutes: (total % 3600 / 60) as u32,
            seconds: (total % 60) as u32,
        }
    }
}

/// Everything the client needs to render today's challenge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct DailyChallenge {
    pub date_key: String,
    pub pokemon_id: u32,
    pub next_rollover: DateTime<Utc>,
    pub countdown: Countdown,
}

impl DailyChallenge {
    pub fn at(now: DateTime<Utc>) -> Self {
        let date_key = challenge_date_key(now);
        let next_rollover = next_rollover(now);
        Self {
            pokemon_id: daily_pokemon_id(&date_key),
            date_key,
            next_rollover,
            countdown: Countdown::from_seconds((next_rollover - now).num_seconds()),
        }
    }
}

/// Challenge date (`YYYY-MM-DD`) in effect at `now`
///
/// Before 10:00 Eastern this is still the previous calendar day.
pub fn challenge_date_key(now: DateTime<Utc>) -> String {
    challenge_date(now).format("%Y-%m-%d").to_string()
}

pub fn time_until_next_challenge(now: DateTime<Utc>) -> Countdown {
    Countdown::from_seconds((next_rollover(now) - now).num_seconds())
}

/// Deterministic Pokemon id in `1..=1025` for a date key (FNV-1a, 32 bit)
pub fn daily_pokemon_id(date_key: &str) -> u32 {
    let hash = date_key.bytes().fold(FNV_OFFSET_BASIS, |h, b| {
        (h ^ u32::from(b)).wrapping_mul(FNV_PRIME)
    });
    hash % POKEDEX_SIZE + 1
}

/// Instant of the first rollover strictly after `now`
pub fn next_rollover(now: DateTime<Utc>) -> DateTime<Utc> {
    let local = midnight(challenge_date(now))
        + TimeDelta::days(1)
        + TimeDelta::hours(ROLLOVER_HOUR_ET);
    // 10:00 is never skipped or repeated by a DST transition
    match New_York.from_local_datetime(&local).earliest() {
        Some(rollover) => rollover.with_timezone(&Utc),
        None => (local + TimeDelta::hours(5)).and_utc(),
    }
}

fn challenge_date(now: DateTime<Utc>) -> NaiveDate {
    (to_eastern(now) - TimeDelta::hours(ROLLOVER_HOUR_ET)).date()
}

fn to_eastern(now: DateTime<Utc>) -> NaiveDateTime {
    now.with_timezone(&New_York).naive_local()
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}
