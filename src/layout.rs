//! Hosting-panel fixture layouts.
//!
//! A [`PanelLayout`] expands to an ordered plan of [`Provision`] steps that
//! place static sample logs and generated fixtures where the panel keeps
//! per-account access logs. The [`Provisioner`] executes plans against a
//! [`FixtureSink`]:
//!
//! - a generated fixture that cannot be written aborts the run
//! - a copy, link or marker that fails is logged and recorded, and the run
//!   continues

use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::lines::write_numbered_lines;
use crate::patterns::PatternKind;
use crate::sink::{FixtureSink, SinkError};
use crate::tables::AddressPool;
use crate::timestamp::{format_timestamp, resolve_local};

/// cPanel per-domain log directory.
pub const CPANEL_DOMLOGS: &str = "cpanel/usr/local/apache/domlogs";

/// Directory of the static sample logs shipped with the data set.
pub const SAMPLE_LOGS: &str = "logs";

/// Contents of the files the analyzer is expected to skip.
pub const IGNORED_MARKER: &[u8] = b"# this file should be ignored.\n";

/// Default number of lines in the numbered-lines fixtures.
pub const DEFAULT_LINE_COUNT: u64 = 10_000;

const WTMP: &str = "datetime/valid/var/log/wtmp";

const DRUID_LOGS: [&str; 11] = [
    "alscan-org.druiddesigns.com",
    "ddinfo.druiddesigns.com",
    "ddnet.druiddesigns.com",
    "ddorg.druiddesigns.com",
    "druiddesigns.com",
    "druiddesigns.com-ssl_log",
    "ftp.druiddesigns.com-ftp_log",
    "isinfo.druiddesigns.com",
    "isorg.druiddesigns.com",
    "redmine.druiddesigns.com",
    "z80cim.druiddesigns.com",
];

const SAMPLX_LOGS: [&str; 2] = ["pub.samplx.org", "samplx.org"];

const ALSCAN_LOGS: [&str; 7] = [
    "addon.alscan.info",
    "alscan.info",
    "bandwidth.alscan.info",
    "days.alscan.info",
    "dst.alscan.info",
    "minutes.alscan.info",
    "seconds.alscan.info",
];

const CPANEL_IGNORED: [&str; 25] = [
    "addon.alscan.info-bytes_log",
    "alscan.info-bytes_log",
    "bandwidth.alscan.info-bytes_log",
    "days.alscan.info-bytes_log",
    "dst.alscan.info-bytes_log",
    "minutes.alscan.info-bytes_log",
    "seconds.alscan.info-bytes_log",
    "alscan-org.druiddesigns.com-bytes_log",
    "ddinfo.druiddesigns.com-bytes_log",
    "ddnet.druiddesigns.com-bytes_log",
    "ddorg.druiddesigns.com-bytes_log",
    "druiddesigns.com-bytes_log",
    "druiddesigns.com-ssl_log.bkup",
    "druiddesigns.com.bkup2",
    "ftp.druiddesigns.com-ftp_log.offset",
    "ftp.druiddesigns.com-ftp_log.offsetftpbytes",
    "isinfo.druiddesigns.com-bytes_log",
    "isorg.druiddesigns.com-bytes_log",
    "redmine.druiddesigns.com-bytes_log",
    "z80cim.druiddesigns.com-bytes_log",
    "pub.samplx.org-bytes_log",
    "samplx.org-bytes_log",
    "ftpxferlog",
    "ftpxferlog.offset",
    "ftpxferlog.offsetftpsep",
];

/// Errors that abort provisioning.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// The data directory is missing
    #[error("data directory not found")]
    MissingDataDir,

    /// A generated fixture could not be written
    #[error("failed to generate {path}: {source}")]
    Generate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The sink could not provide a writer for a generated fixture
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// A wall-clock time has no instant in the run's time zone
    #[error("{0} cannot be represented in the local time zone")]
    UnrepresentableTime(WallClock),

    /// The report could not be written
    #[error("failed to write report {path}: {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The report could not be serialized
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A calendar date and time of day, without a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallClock {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl WallClock {
    pub const fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Midnight at the start of the given day.
    pub const fn midnight(year: i32, month: u32, day: u32) -> Self {
        Self::new(year, month, day, 0, 0, 0)
    }

    /// The naive date-time, if the fields form a valid one.
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
            .and_then(|date| date.and_hms_opt(self.hour, self.minute, self.second))
    }

    /// Resolve to an instant in `tz`.
    pub fn resolve<Tz: TimeZone>(&self, tz: &Tz) -> Result<DateTime<Tz>, ProvisionError> {
        self.to_naive()
            .and_then(|naive| resolve_local(tz, naive))
            .ok_or(ProvisionError::UnrepresentableTime(*self))
    }
}

impl Display for WallClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// One generator invocation: which pattern, over which range, into which file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixtureSpec {
    pub kind: PatternKind,
    pub start: WallClock,
    pub stop: WallClock,
    pub destination: PathBuf,
}

impl FixtureSpec {
    pub fn new(kind: PatternKind, start: WallClock, stop: WallClock, destination: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            start,
            stop,
            destination: destination.into(),
        }
    }
}

/// A single provisioning step. Paths are relative to the data directory.
#[derive(Debug, Clone, PartialEq)]
pub enum Provision {
    /// Copy a static file
    Copy { source: PathBuf, dest: PathBuf },

    /// Run a pattern generator
    Generate(FixtureSpec),

    /// Hard-link `domlogs/<file>` into `domlogs/<account>/<file>`
    AccountLinks {
        domlogs: PathBuf,
        account: String,
        files: Vec<String>,
    },

    /// Point `<home>/access-logs` at the account's domlogs directory
    AccessLogsLink { home: PathBuf, account: String },

    /// Create a marker file the analyzer should ignore, unless present
    IgnoredMarker(PathBuf),

    /// Write a numbered-lines file
    NumberedLines { dest: PathBuf, trailing_newline: bool },
}

impl Provision {
    fn copy(source: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Provision::Copy {
            source: source.into(),
            dest: dest.into(),
        }
    }

    fn account_links(domlogs: &str, account: &str, files: &[&str]) -> Self {
        Provision::AccountLinks {
            domlogs: PathBuf::from(domlogs),
            account: account.to_string(),
            files: files.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Generated fixtures shared by both panels.
///
/// Each entry is (pattern, start, stop, cPanel domlog name, Plesk vhost).
const GENERATED: [(PatternKind, WallClock, WallClock, &str, &str); 6] = [
    (
        PatternKind::PerMinute,
        WallClock::midnight(2013, 1, 1),
        WallClock::new(2013, 1, 1, 23, 59, 59),
        "minutes.alscan.info",
        "minutes.info",
    ),
    (
        PatternKind::PerSecond,
        WallClock::midnight(2012, 12, 31),
        WallClock::new(2013, 1, 1, 23, 59, 59),
        "seconds.alscan.info",
        "seconds.info",
    ),
    (
        PatternKind::EscalatingHourly,
        WallClock::midnight(2012, 11, 4),
        WallClock::new(2012, 11, 11, 23, 0, 0),
        "dst.alscan.info",
        "fall.dst.us",
    ),
    (
        PatternKind::EscalatingHourly,
        WallClock::midnight(2012, 3, 11),
        WallClock::new(2012, 3, 18, 23, 0, 0),
        "addon.alscan.info",
        "spring.dst.us",
    ),
    (
        PatternKind::DailyBurst,
        WallClock::midnight(2012, 1, 1),
        WallClock::new(2012, 1, 31, 23, 0, 0),
        "days.alscan.info",
        "days.info",
    ),
    (
        PatternKind::BandwidthBurst,
        WallClock::new(2001, 1, 1, 6, 34, 56),
        WallClock::new(2001, 1, 1, 10, 0, 0),
        "bandwidth.alscan.info",
        "bandwidth.net",
    ),
];

/// Hosting-control-panel directory conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelLayout {
    Cpanel,
    Plesk,
}

impl PanelLayout {
    /// Get all layouts.
    pub fn all() -> &'static [PanelLayout] {
        &[PanelLayout::Cpanel, PanelLayout::Plesk]
    }

    /// Get the layout name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            PanelLayout::Cpanel => "cpanel",
            PanelLayout::Plesk => "plesk",
        }
    }

    /// Look a layout up by name, ignoring case and surrounding whitespace.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::all()
            .iter()
            .copied()
            .find(|layout| layout.name().eq_ignore_ascii_case(name))
    }

    /// The ordered provisioning steps for this layout.
    pub fn plan(&self) -> Vec<Provision> {
        match self {
            PanelLayout::Cpanel => cpanel_plan(),
            PanelLayout::Plesk => plesk_plan(),
        }
    }
}

impl Display for PanelLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn sample(name: &str) -> PathBuf {
    Path::new(SAMPLE_LOGS).join(name)
}

fn domlog(name: &str) -> PathBuf {
    Path::new(CPANEL_DOMLOGS).join(name)
}

fn cpanel_plan() -> Vec<Provision> {
    let mut plan = vec![Provision::copy(sample("alscan.info"), domlog("alscan.info"))];
    plan.extend(
        GENERATED
            .iter()
            .map(|&(kind, start, stop, name, _)| Provision::Generate(FixtureSpec::new(kind, start, stop, domlog(name)))),
    );
    plan.push(Provision::account_links(CPANEL_DOMLOGS, "alscan", &ALSCAN_LOGS));

    plan.extend(DRUID_LOGS.iter().map(|name| Provision::copy(sample(name), domlog(name))));
    plan.push(Provision::account_links(CPANEL_DOMLOGS, "druid", &DRUID_LOGS));
    plan.push(Provision::AccessLogsLink {
        home: PathBuf::from("cpanel/home1/druid"),
        account: "druid".to_string(),
    });

    plan.extend(SAMPLX_LOGS.iter().map(|name| Provision::copy(sample(name), domlog(name))));
    plan.push(Provision::account_links(CPANEL_DOMLOGS, "samplx", &SAMPLX_LOGS));

    plan.push(Provision::copy(sample("main-access_log"), "cpanel/usr/local/apache/logs/access_log"));
    plan.push(Provision::copy(sample("cpanel-access_log"), "cpanel/usr/local/cpanel/logs/access_log"));
    plan.push(Provision::copy(WTMP, "cpanel/var/log/wtmp"));

    plan.extend(CPANEL_IGNORED.iter().map(|name| Provision::IgnoredMarker(domlog(name))));
    plan
}

fn vhost_log(domain: &str) -> PathBuf {
    Path::new("plesk/var/www/vhosts")
        .join(domain)
        .join("statistics/logs/access_log")
}

fn plesk_plan() -> Vec<Provision> {
    let mut plan = vec![
        Provision::copy(WTMP, "plesk/var/log/wtmp"),
        Provision::copy(sample("main-access_log"), "plesk/var/log/httpd/access_log"),
        Provision::copy(sample("pub.samplx.org"), "plesk/var/log/httpd/ssl_access_log"),
        Provision::copy(sample("alscan.info"), vhost_log("alscan.info")),
    ];
    plan.extend(
        GENERATED
            .iter()
            .map(|&(kind, start, stop, _, domain)| Provision::Generate(FixtureSpec::new(kind, start, stop, vhost_log(domain)))),
    );
    plan
}

/// Numbered-lines fixtures, written regardless of layout.
pub fn lines_plan() -> Vec<Provision> {
    vec![
        Provision::NumberedLines {
            dest: PathBuf::from("lines/lines"),
            trailing_newline: true,
        },
        Provision::NumberedLines {
            dest: PathBuf::from("lines/no-nl"),
            trailing_newline: false,
        },
    ]
}

/// Outcome of one generated fixture.
#[derive(Debug, Clone, Serialize)]
pub struct FixtureOutcome {
    pub kind: PatternKind,
    pub destination: PathBuf,
    pub start: DateTime<FixedOffset>,
    pub stop: DateTime<FixedOffset>,
    pub records: u64,
}

/// Summary of a provisioning run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProvisionReport {
    /// Generated fixtures, in plan order
    pub fixtures: Vec<FixtureOutcome>,

    /// Static files copied
    pub copied: u64,

    /// Hard links created
    pub linked: u64,

    /// Symlinks created
    pub symlinked: u64,

    /// Ignored-file markers created (existing ones are left alone)
    pub markers_created: u64,

    /// Numbered-lines files written
    pub line_files: u64,

    /// Messages for steps that failed without aborting the run
    pub failures: Vec<String>,
}

impl ProvisionReport {
    /// Total records across all generated fixtures.
    pub fn total_records(&self) -> u64 {
        self.fixtures.iter().map(|f| f.records).sum()
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), ProvisionError> {
        let report_error = |source| ProvisionError::Report {
            path: path.to_path_buf(),
            source,
        };
        let mut writer = BufWriter::new(File::create(path).map_err(report_error)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush().map_err(report_error)
    }
}

/// Executes provisioning plans against a sink.
pub struct Provisioner<S, Tz> {
    sink: S,
    tz: Tz,
    pool: AddressPool<'static>,
    line_count: u64,
    report: ProvisionReport,
}

impl<S, Tz> Provisioner<S, Tz>
where
    S: FixtureSink,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    /// Create a provisioner writing to `sink`, resolving fixture times in `tz`.
    pub fn new(sink: S, tz: Tz) -> Self {
        Self {
            sink,
            tz,
            pool: AddressPool::standard(),
            line_count: DEFAULT_LINE_COUNT,
            report: ProvisionReport::default(),
        }
    }

    /// Set the number of lines in the numbered-lines fixtures.
    pub fn with_line_count(mut self, line_count: u64) -> Self {
        self.line_count = line_count;
        self
    }

    /// The report so far.
    pub fn report(&self) -> &ProvisionReport {
        &self.report
    }

    /// Provision every layout in `layouts`, then the numbered-lines files.
    ///
    /// # Errors
    ///
    /// Returns `ProvisionError::MissingDataDir` if the sink root does not
    /// exist, or the first error that aborts a generated fixture.
    pub fn run(mut self, layouts: &[PanelLayout]) -> Result<ProvisionReport, ProvisionError> {
        if !self.sink.exists(Path::new(".")) {
            return Err(ProvisionError::MissingDataDir);
        }

        for layout in layouts {
            let plan = layout.plan();
            info!(layout = %layout, steps = plan.len(), "Provisioning layout");
            for step in &plan {
                self.apply(step)?;
            }
        }
        for step in &lines_plan() {
            self.apply(step)?;
        }

        Ok(self.report)
    }

    /// Execute one step, recording its outcome.
    pub fn apply(&mut self, step: &Provision) -> Result<(), ProvisionError> {
        match step {
            Provision::Generate(spec) => self.generate(spec),
            Provision::NumberedLines { dest, trailing_newline } => self.numbered_lines(dest, *trailing_newline),
            Provision::Copy { source, dest } => {
                match self.sink.copy(source, dest) {
                    Ok(bytes) => {
                        debug!(source = %source.display(), dest = %dest.display(), bytes, "Copied");
                        self.report.copied += 1;
                    }
                    Err(e) => self.record_failure("copy", e),
                }
                Ok(())
            }
            Provision::AccountLinks { domlogs, account, files } => {
                self.account_links(domlogs, account, files);
                Ok(())
            }
            Provision::AccessLogsLink { home, account } => {
                self.access_logs_link(home, account);
                Ok(())
            }
            Provision::IgnoredMarker(path) => {
                match self.sink.write_new(path, IGNORED_MARKER) {
                    Ok(true) => self.report.markers_created += 1,
                    Ok(false) => debug!(path = %path.display(), "Marker already present"),
                    Err(e) => self.record_failure("marker", e),
                }
                Ok(())
            }
        }
    }

    fn generate(&mut self, spec: &FixtureSpec) -> Result<(), ProvisionError> {
        let start = spec.start.resolve(&self.tz)?;
        let stop = spec.stop.resolve(&self.tz)?;
        let mut writer = self.sink.create(&spec.destination)?;

        let records = spec
            .kind
            .generate(&start, &stop, &self.pool, &mut writer)
            .map_err(|source| ProvisionError::Generate {
                path: spec.destination.clone(),
                source,
            })?;

        info!(
            pattern = %spec.kind,
            path = %spec.destination.display(),
            start = %format_timestamp(&start),
            stop = %format_timestamp(&stop),
            records,
            "Generated fixture"
        );
        self.report.fixtures.push(FixtureOutcome {
            kind: spec.kind,
            destination: spec.destination.clone(),
            start: start.with_timezone(&start.offset().fix()),
            stop: stop.with_timezone(&stop.offset().fix()),
            records,
        });
        Ok(())
    }

    fn numbered_lines(&mut self, dest: &Path, trailing_newline: bool) -> Result<(), ProvisionError> {
        let mut writer = self.sink.create(dest)?;
        write_numbered_lines(&mut writer, self.line_count, trailing_newline).map_err(|source| {
            ProvisionError::Generate {
                path: dest.to_path_buf(),
                source,
            }
        })?;
        debug!(path = %dest.display(), lines = self.line_count, trailing_newline, "Wrote numbered lines");
        self.report.line_files += 1;
        Ok(())
    }

    fn account_links(&mut self, domlogs: &Path, account: &str, files: &[String]) {
        if !self.sink.exists(domlogs) {
            self.record_failure("account links", SinkError::MissingDirectory(domlogs.to_path_buf()));
            return;
        }
        let account_dir = domlogs.join(account);
        if let Err(e) = self.sink.create_dir_all(&account_dir) {
            self.record_failure("account links", e);
            return;
        }
        for file in files {
            match self.sink.link(&domlogs.join(file), &account_dir.join(file)) {
                Ok(()) => self.report.linked += 1,
                Err(e) => self.record_failure("account links", e),
            }
        }
    }

    fn access_logs_link(&mut self, home: &Path, account: &str) {
        if !self.sink.exists(home) {
            self.record_failure("access-logs link", SinkError::MissingDirectory(home.to_path_buf()));
            return;
        }
        let target = Path::new("../../usr/local/apache/domlogs").join(account);
        match self.sink.symlink(&target, &home.join("access-logs")) {
            Ok(()) => self.report.symlinked += 1,
            Err(e) => self.record_failure("access-logs link", e),
        }
    }

    fn record_failure(&mut self, step: &str, err: SinkError) {
        error!(step, error = %err, "Provisioning step failed");
        self.report.failures.push(format!("{step}: {err}"));
    }
}
