//! Rendering of monitor outcomes.

mod monitor;

pub use monitor::{
    format_monitor_output, render_monitor_report, MonitorEntry, MonitorFailure, MonitorReport,
    SEPARATOR,
};
