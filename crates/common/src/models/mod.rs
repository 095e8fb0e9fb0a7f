//! Data models of the cilium health API.

pub mod monitor_status;

pub use monitor_status::MonitorStatus;
