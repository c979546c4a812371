//! Deterministic access-log pattern generators.
//!
//! Each generator walks a time range with exact instant arithmetic and writes
//! combined-format records to a sink in timestamp order. Re-running a
//! generator with the same range reproduces the same bytes.
//!
//! | Pattern | Step | Range | Records |
//! |---------|------|-------|---------|
//! | escalating-hourly | 1 h | start..=stop | `hour + 1` per hour, reset at midnight |
//! | daily-burst | 1 h | start..=stop | 1 crawl per hour, 13 agent records at midnight |
//! | per-minute | 1 min | start..=stop | 1 per minute |
//! | per-second | 1 s | start..=stop | 1 per second |
//! | bandwidth-burst | 600 s | start..stop | 13 agents (+15 download copies), geometric size |

use std::fmt::Display;
use std::io::{self, Write};

use chrono::{DateTime, Datelike, TimeDelta, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

use crate::record::LogRecord;
use crate::tables::{AddressPool, AgentCategory};

/// Response size used by every fixed-size record.
pub const STANDARD_SIZE: u64 = 781;

/// Response size of the daily per-agent records.
pub const DAILY_AGENT_SIZE: u64 = 17_681;

/// Starting size of the bandwidth pattern, restored whenever the pool wraps.
pub const BANDWIDTH_BASE_SIZE: u64 = 512;

/// Factor applied to the bandwidth size after every agent record.
pub const BANDWIDTH_GROWTH: f64 = 1.7;

/// Copies of the download record written per bandwidth step (the spike).
pub const BANDWIDTH_DOWNLOAD_COPIES: u64 = 16;

/// Seconds between bandwidth steps.
pub const BANDWIDTH_STEP_SECS: i64 = 600;

/// Pool index used by the per-minute and per-second patterns.
pub const STEADY_ADDRESS_INDEX: usize = 6;

/// Path requested every hour by the daily-burst crawler.
pub const CRAWL_URI: &str = "/pub/tuhs.org/PDP-11/Trees/2.11BSD/usr/src/usr.lib/lib2648/rdchar.c";

/// Path requested every minute.
pub const MINUTE_URI: &str = "/rdchar.c";

/// Path requested every second.
pub const SECOND_URI: &str = "/favicon.ico";

/// The five fixture patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternKind {
    EscalatingHourly,
    DailyBurst,
    PerMinute,
    PerSecond,
    BandwidthBurst,
}

impl PatternKind {
    /// Get all pattern kinds.
    pub fn all() -> &'static [PatternKind] {
        &[
            PatternKind::EscalatingHourly,
            PatternKind::DailyBurst,
            PatternKind::PerMinute,
            PatternKind::PerSecond,
            PatternKind::BandwidthBurst,
        ]
    }

    /// Get the pattern name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            PatternKind::EscalatingHourly => "escalating-hourly",
            PatternKind::DailyBurst => "daily-burst",
            PatternKind::PerMinute => "per-minute",
            PatternKind::PerSecond => "per-second",
            PatternKind::BandwidthBurst => "bandwidth-burst",
        }
    }

    /// Run this pattern over `start..stop` and return the number of records written.
    pub fn generate<Tz, W>(
        &self,
        start: &DateTime<Tz>,
        stop: &DateTime<Tz>,
        pool: &AddressPool<'_>,
        out: &mut W,
    ) -> io::Result<u64>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
        W: Write,
    {
        match self {
            PatternKind::EscalatingHourly => escalating_hourly(start, stop, pool, out),
            PatternKind::DailyBurst => daily_burst(start, stop, pool, out),
            PatternKind::PerMinute => per_minute(start, stop, pool, out),
            PatternKind::PerSecond => per_second(start, stop, pool, out),
            PatternKind::BandwidthBurst => bandwidth_burst(start, stop, pool, out),
        }
    }
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy)]
enum Bound {
    Inclusive,
    Exclusive,
}

/// Instants from `start` in `step` increments while within `stop`.
///
/// Yields nothing when `stop` precedes `start`.
fn steps<Tz: TimeZone>(
    start: &DateTime<Tz>,
    stop: &DateTime<Tz>,
    step: TimeDelta,
    bound: Bound,
) -> impl Iterator<Item = DateTime<Tz>> {
    let stop = stop.clone();
    std::iter::successors(Some(start.clone()), move |time: &DateTime<Tz>| {
        time.clone().checked_add_signed(step)
    })
    .take_while(move |time| match bound {
        Bound::Inclusive => *time <= stop,
        Bound::Exclusive => *time < stop,
    })
}

/// Write `line` `copies` times.
fn write_repeated<W: Write>(out: &mut W, line: &str, copies: u64) -> io::Result<u64> {
    for _ in 0..copies {
        out.write_all(line.as_bytes())?;
    }
    Ok(copies)
}

/// Hour `H` of each day gets `H + 1` identical requests for `/`.
///
/// The count follows the walk, not the clock: a repeated hour at a DST
/// fall-back keeps climbing and a skipped hour is never counted. A range
/// starting mid-day begins at `start.hour() + 1`.
pub fn escalating_hourly<Tz, W>(
    start: &DateTime<Tz>,
    stop: &DateTime<Tz>,
    pool: &AddressPool<'_>,
    out: &mut W,
) -> io::Result<u64>
where
    Tz: TimeZone,
    Tz::Offset: Display,
    W: Write,
{
    let agent = AgentCategory::Browser.user_agent();
    let mut per_hour = u64::from(start.hour()) + 1;
    let mut records = 0;

    for time in steps(start, stop, TimeDelta::hours(1), Bound::Inclusive) {
        if time.hour() == 0 {
            per_hour = 1;
        }
        let line = LogRecord::get(pool.get(0), &time, "/", STANDARD_SIZE, agent).to_line();
        records += write_repeated(out, &line, per_hour)?;
        per_hour += 1;
    }

    out.flush()?;
    Ok(records)
}

/// One crawler request per hour, plus one request per agent category at midnight.
///
/// The midnight burst is stamped `60 * month + day` seconds (1-based month)
/// after midnight and uses pool addresses 1, 2, 3, ... in agent-table order,
/// wrapping if the pool is shorter than the table.
pub fn daily_burst<Tz, W>(
    start: &DateTime<Tz>,
    stop: &DateTime<Tz>,
    pool: &AddressPool<'_>,
    out: &mut W,
) -> io::Result<u64>
where
    Tz: TimeZone,
    Tz::Offset: Display,
    W: Write,
{
    let crawler = AgentCategory::Bot.user_agent();
    let mut records = 0;

    for time in steps(start, stop, TimeDelta::hours(1), Bound::Inclusive) {
        LogRecord::get(pool.get(0), &time, CRAWL_URI, STANDARD_SIZE, crawler).write_to(out)?;
        records += 1;

        if time.hour() != 0 {
            continue;
        }
        let offset = TimeDelta::seconds(i64::from(60 * time.month() + time.day()));
        let Some(burst_time) = time.clone().checked_add_signed(offset) else {
            continue;
        };
        for (position, category) in AgentCategory::all().iter().enumerate() {
            let path = category.path();
            LogRecord::get(
                pool.get(position + 1),
                &burst_time,
                &path,
                DAILY_AGENT_SIZE,
                category.user_agent(),
            )
            .write_to(out)?;
            records += 1;
        }
    }

    out.flush()?;
    Ok(records)
}

/// One download request per minute.
pub fn per_minute<Tz, W>(
    start: &DateTime<Tz>,
    stop: &DateTime<Tz>,
    pool: &AddressPool<'_>,
    out: &mut W,
) -> io::Result<u64>
where
    Tz: TimeZone,
    Tz::Offset: Display,
    W: Write,
{
    steady(start, stop, TimeDelta::minutes(1), MINUTE_URI, AgentCategory::Download, pool, out)
}

/// One unwanted-agent request per second.
pub fn per_second<Tz, W>(
    start: &DateTime<Tz>,
    stop: &DateTime<Tz>,
    pool: &AddressPool<'_>,
    out: &mut W,
) -> io::Result<u64>
where
    Tz: TimeZone,
    Tz::Offset: Display,
    W: Write,
{
    steady(start, stop, TimeDelta::seconds(1), SECOND_URI, AgentCategory::Unwanted, pool, out)
}

fn steady<Tz, W>(
    start: &DateTime<Tz>,
    stop: &DateTime<Tz>,
    step: TimeDelta,
    uri: &str,
    category: AgentCategory,
    pool: &AddressPool<'_>,
    out: &mut W,
) -> io::Result<u64>
where
    Tz: TimeZone,
    Tz::Offset: Display,
    W: Write,
{
    let address = pool.get(STEADY_ADDRESS_INDEX);
    let agent = category.user_agent();
    let mut records = 0;

    for time in steps(start, stop, step, Bound::Inclusive) {
        LogRecord::get(address, &time, uri, STANDARD_SIZE, agent).write_to(out)?;
        records += 1;
    }

    out.flush()?;
    Ok(records)
}

/// Every ten minutes, one request per agent category with a growing size.
///
/// The address index advances per record and the size grows by
/// [`BANDWIDTH_GROWTH`] per category; both carry over between time steps
/// and reset together only when the index runs off the end of the pool.
/// The download category is written [`BANDWIDTH_DOWNLOAD_COPIES`] times. The
/// stop instant itself is excluded.
pub fn bandwidth_burst<Tz, W>(
    start: &DateTime<Tz>,
    stop: &DateTime<Tz>,
    pool: &AddressPool<'_>,
    out: &mut W,
) -> io::Result<u64>
where
    Tz: TimeZone,
    Tz::Offset: Display,
    W: Write,
{
    let mut index = 0;
    let mut size = BANDWIDTH_BASE_SIZE;
    let mut records = 0;

    let step = TimeDelta::seconds(BANDWIDTH_STEP_SECS);
    for time in steps(start, stop, step, Bound::Exclusive) {
        for category in AgentCategory::all() {
            if index == pool.len() {
                index = 0;
                size = BANDWIDTH_BASE_SIZE;
            }
            let path = category.path();
            let line = LogRecord::get(pool.get(index), &time, &path, size, category.user_agent()).to_line();
            let copies = match category {
                AgentCategory::Download => BANDWIDTH_DOWNLOAD_COPIES,
                _ => 1,
            };
            records += write_repeated(out, &line, copies)?;
            size = grow(size);
            index += 1;
        }
    }

    out.flush()?;
    Ok(records)
}

fn grow(size: u64) -> u64 {
    (size as f64 * BANDWIDTH_GROWTH).floor() as u64
}
