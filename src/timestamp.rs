//! Apache access-log timestamps.
//!
//! Formats an instant as `DD/Mon/YYYY:HH:MM:SS ±ZZZZ` using the offset the
//! zone had at that instant, and resolves wall-clock times into instants.

use std::fmt::Display;

use chrono::{DateTime, LocalResult, NaiveDateTime, TimeDelta, TimeZone};

/// strftime pattern of the combined log format `%t` field.
pub const TIMESTAMP_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Number of one-hour steps tried when a wall-clock time falls in a DST gap.
const MAX_GAP_STEPS: u32 = 24;

/// Format an instant as an access-log timestamp.
///
/// ```
/// use chrono::{FixedOffset, TimeZone};
/// use alscan_fixtures::timestamp::format_timestamp;
///
/// let cst = FixedOffset::west_opt(6 * 3600).unwrap();
/// let t = cst.with_ymd_and_hms(2010, 1, 1, 6, 34, 56).unwrap();
/// assert_eq!(format_timestamp(&t), "01/Jan/2010:06:34:56 -0600");
/// ```
pub fn format_timestamp<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// Resolve a wall-clock time in `tz` to an instant.
///
/// Ambiguous times (the repeated hour when clocks fall back) resolve to the
/// earlier instant. Times inside a spring-forward gap move forward an hour at
/// a time until they exist. Returns `None` only if no valid time is found
/// within a day.
pub fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    let mut candidate = naive;
    for _ in 0..=MAX_GAP_STEPS {
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(time) => return Some(time),
            LocalResult::Ambiguous(earliest, _) => return Some(earliest),
            LocalResult::None => {
                candidate = candidate.checked_add_signed(TimeDelta::hours(1))?;
            }
        }
    }
    None
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate, Offset, Utc};
    use regex::Regex;

    /// A zone observing US Central time with the 2012 transitions:
    /// CDT from 2012-03-11 02:00 CST to 2012-11-04 02:00 CDT.
    #[derive(Debug, Clone, Copy)]
    pub(crate) struct Central2012;

    fn cst() -> FixedOffset {
        FixedOffset::west_opt(6 * 3600).unwrap()
    }

    fn cdt() -> FixedOffset {
        FixedOffset::west_opt(5 * 3600).unwrap()
    }

    fn dst_start_utc() -> NaiveDateTime {
        // 2012-03-11 02:00 CST
        NaiveDate::from_ymd_opt(2012, 3, 11)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn dst_end_utc() -> NaiveDateTime {
        // 2012-11-04 02:00 CDT
        NaiveDate::from_ymd_opt(2012, 11, 4)
            .unwrap()
            .and_hms_opt(7, 0, 0)
            .unwrap()
    }

    impl TimeZone for Central2012 {
        type Offset = FixedOffset;

        fn from_offset(_offset: &FixedOffset) -> Self {
            Central2012
        }

        fn offset_from_local_date(&self, local: &chrono::NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_hms_opt(12, 0, 0).unwrap())
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let as_cst = *local - cst().fix();
            let as_cdt = *local - cdt().fix();
            let cst_valid = self.offset_from_utc_datetime(&as_cst) == cst();
            let cdt_valid = self.offset_from_utc_datetime(&as_cdt) == cdt();
            match (cdt_valid, cst_valid) {
                (true, true) => LocalResult::Ambiguous(cdt(), cst()),
                (true, false) => LocalResult::Single(cdt()),
                (false, true) => LocalResult::Single(cst()),
                (false, false) => LocalResult::None,
            }
        }

        fn offset_from_utc_date(&self, utc: &chrono::NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_hms_opt(12, 0, 0).unwrap())
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc >= dst_start_utc() && *utc < dst_end_utc() {
                cdt()
            } else {
                cst()
            }
        }
    }

    fn naive(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_format_fixed_offset() {
        let t = cst().with_ymd_and_hms(2010, 1, 1, 6, 34, 56).unwrap();
        assert_eq!(format_timestamp(&t), "01/Jan/2010:06:34:56 -0600");
    }

    #[test]
    fn test_format_utc_and_positive_offset() {
        let t = Utc.with_ymd_and_hms(2013, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(format_timestamp(&t), "31/Dec/2013:23:59:59 +0000");

        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let t = ist.with_ymd_and_hms(2012, 7, 4, 0, 0, 9).unwrap();
        assert_eq!(format_timestamp(&t), "04/Jul/2012:00:00:09 +0530");
    }

    #[test]
    fn test_format_matches_fixed_width_pattern() {
        let pattern = Regex::new(r"^\d{2}/[A-Za-z]{3}/\d{4}:\d{2}:\d{2}:\d{2} [+-]\d{4}$").unwrap();
        let start = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();
        for days in (0..800).step_by(7) {
            let t = start + TimeDelta::days(days) + TimeDelta::seconds(days * 131);
            assert!(pattern.is_match(&format_timestamp(&t)));
            assert!(pattern.is_match(&format_timestamp(&t.with_timezone(&Central2012))));
        }
    }

    #[test]
    fn test_format_follows_dst_offset() {
        let winter = resolve_local(&Central2012, naive(2012, 1, 15, 12, 0, 0)).unwrap();
        let summer = resolve_local(&Central2012, naive(2012, 7, 15, 12, 0, 0)).unwrap();
        assert_eq!(format_timestamp(&winter), "15/Jan/2012:12:00:00 -0600");
        assert_eq!(format_timestamp(&summer), "15/Jul/2012:12:00:00 -0500");
    }

    #[test]
    fn test_resolve_single() {
        let t = resolve_local(&Utc, naive(2013, 1, 1, 0, 0, 0)).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2013, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_resolve_ambiguous_picks_earlier() {
        let t = resolve_local(&Central2012, naive(2012, 11, 4, 1, 30, 0)).unwrap();
        assert_eq!(format_timestamp(&t), "04/Nov/2012:01:30:00 -0500");
    }

    #[test]
    fn test_resolve_gap_moves_forward() {
        let t = resolve_local(&Central2012, naive(2012, 3, 11, 2, 30, 0)).unwrap();
        assert_eq!(format_timestamp(&t), "11/Mar/2012:03:30:00 -0500");
    }
}
