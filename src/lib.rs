//! Access-log fixture library
//!
//! This library builds the synthetic Apache access-log fixtures that the
//! log scanner's tests read:
//!
//! - **timestamp**: combined-log timestamps and local wall-clock resolution
//! - **tables**: fixed address pool and user-agent categories
//! - **record**: one combined-format log line
//! - **patterns**: the five traffic generators
//! - **lines**: numbered-lines fixtures
//! - **sink**: filesystem output capability
//! - **layout**: cPanel and Plesk directory layouts and the provisioner
//! - **config**: environment-based configuration for the binary
//!
//! # Example
//!
//! ```no_run
//! use alscan_fixtures::config::Config;
//! use alscan_fixtures::layout::Provisioner;
//! use alscan_fixtures::sink::FsSink;
//! use chrono::Local;
//!
//! let config = Config::from_env().expect("Failed to load config");
//!
//! let report = Provisioner::new(FsSink::new(&config.data_dir), Local)
//!     .with_line_count(config.line_count)
//!     .run(&config.layouts)
//!     .expect("Provisioning failed");
//!
//! println!("{} records written", report.total_records());
//! ```

// Module declarations
pub mod config;
pub mod layout;
pub mod lines;
pub mod patterns;
pub mod record;
pub mod sink;
pub mod tables;
pub mod timestamp;

// Re-export commonly used types at crate root for convenience
pub use config::{Config, ConfigError};
pub use layout::{PanelLayout, Provision, ProvisionError, ProvisionReport, Provisioner, WallClock};
pub use patterns::PatternKind;
pub use record::LogRecord;
pub use sink::{FixtureSink, FsSink, SinkError};
pub use tables::{AddressPool, AgentCategory};
