//! Combined-format access-log records.

use std::fmt::Display;
use std::io::{self, Write};

use chrono::{DateTime, TimeZone};

use crate::timestamp::format_timestamp;

/// Protocol written into every request line.
pub const PROTOCOL: &str = "HTTP/1.1";

/// One access-log request.
///
/// Fields are written verbatim: none may contain a double quote.
#[derive(Debug, Clone)]
pub struct LogRecord<'a, Tz: TimeZone> {
    /// Client address
    pub address: &'a str,

    /// Time the request was received
    pub time: &'a DateTime<Tz>,

    /// HTTP method
    pub method: &'a str,

    /// Request URI
    pub uri: &'a str,

    /// Response status code
    pub status: u16,

    /// Response size in bytes
    pub size: u64,

    /// Referer header, `-` when absent
    pub referer: &'a str,

    /// User-Agent header
    pub agent: &'a str,
}

impl<'a, Tz> LogRecord<'a, Tz>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    /// A `GET` request answered with `200` and no referer.
    pub fn get(address: &'a str, time: &'a DateTime<Tz>, uri: &'a str, size: u64, agent: &'a str) -> Self {
        Self {
            address,
            time,
            method: "GET",
            uri,
            status: 200,
            size,
            referer: "-",
            agent,
        }
    }

    /// Render the record as a newline-terminated line.
    pub fn to_line(&self) -> String {
        format!("{}\n", self)
    }

    /// Write the record, newline included, to `out`.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", self)
    }
}

impl<Tz> Display for LogRecord<'_, Tz>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - - [{}] \"{} {} {}\" {} {} \"{}\" \"{}\"",
            self.address,
            format_timestamp(self.time),
            self.method,
            self.uri,
            PROTOCOL,
            self.status,
            self.size,
            self.referer,
            self.agent
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn sample_time() -> DateTime<FixedOffset> {
        FixedOffset::west_opt(6 * 3600)
            .unwrap()
            .with_ymd_and_hms(2010, 1, 1, 6, 34, 56)
            .unwrap()
    }

    #[test]
    fn test_combined_line_format() {
        let time = sample_time();
        let record = LogRecord::get("100.43.83.155", &time, "/", 781, "ZmEu");
        assert_eq!(
            record.to_line(),
            "100.43.83.155 - - [01/Jan/2010:06:34:56 -0600] \"GET / HTTP/1.1\" 200 781 \"-\" \"ZmEu\"\n"
        );
    }

    #[test]
    fn test_line_has_single_trailing_newline() {
        let time = sample_time();
        let record = LogRecord {
            address: "10.1.1.1",
            time: &time,
            method: "POST",
            uri: "/a/b?c=d",
            status: 404,
            size: 0,
            referer: "http://example.com/",
            agent: "-",
        };
        let line = record.to_line();
        assert!(line.ends_with('\n'));
        assert!(!line.ends_with("\n\n"));
        assert_eq!(line.matches('\n').count(), 1);
    }

    #[test]
    fn test_quoted_groups_in_order() {
        let time = sample_time();
        let record = LogRecord {
            address: "10.1.1.1",
            time: &time,
            method: "HEAD",
            uri: "/index.html",
            status: 304,
            size: 12,
            referer: "http://ref.example/",
            agent: "Agent/1.0",
        };
        let line = record.to_line();
        let groups: Vec<&str> = line.split('"').skip(1).step_by(2).collect();
        assert_eq!(
            groups,
            vec!["HEAD /index.html HTTP/1.1", "http://ref.example/", "Agent/1.0"]
        );
        assert_eq!(line.matches('"').count(), 6);
        assert!(line.contains("[01/Jan/2010:06:34:56 -0600]"));
        assert!(line.contains("\" 304 12 \""));
    }

    #[test]
    fn test_write_to_matches_to_line() {
        let time = sample_time();
        let record = LogRecord::get("1.2.3.4", &time, "/favicon.ico", 781, "ZmEu");
        let mut out = Vec::new();
        record.write_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), record.to_line());
    }
}
