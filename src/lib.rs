//! # fritzmon
//!
//! Live bandwidth monitoring for FRITZ!Box routers over their UPnP/SOAP
//! control interface.
//!
//! The crate polls the router's cumulative traffic counters on a fixed
//! cadence, reconstructs them across 32-bit counter wraps, smooths rates
//! over a rolling window of recent samples and renders one continuously
//! rewritten terminal line.
//!
//! ## Quick Start
//!
//! ```no_run
//! use fritzmon::{SoapSource, TrafficMonitor};
//!
//! let source = SoapSource::new("fritz.box", 49000)?;
//! for report in TrafficMonitor::new(source).reports() {
//!     println!("{}", report?);
//! }
//! # Ok::<(), fritzmon::Error>(())
//! ```
//!
//! Any type implementing [`SampleSource`] can stand in for the router, which
//! keeps the sampling engine testable without a device on the network.

mod error;
mod types;

pub mod monitor;
pub mod overflow;
pub mod render;
pub mod soap;
pub mod source;
pub mod window;

// Re-export core types
pub use error::{Error, Result};
pub use types::{RawSample, TimedSample, TrafficReport};

pub use monitor::{CancelToken, Reports, TrafficMonitor};
pub use overflow::OverflowTracker;
pub use render::{format_rate, format_size, LineRenderer};
pub use soap::{SoapSource, DEFAULT_HOST, DEFAULT_PORT};
pub use source::SampleSource;
pub use window::RollingWindow;
