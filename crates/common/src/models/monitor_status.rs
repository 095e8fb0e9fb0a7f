use serde::{Deserialize, Serialize};

use crate::error::Result;

fn is_zero(v: &i64) -> bool {
    *v == 0
}

/// Status of the node monitor.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorStatus {
    /// Number of CPUs to listen on for events.
    #[serde(skip_serializing_if = "is_zero")]
    pub cpus: i64,

    /// Number of samples lost by perf.
    #[serde(skip_serializing_if = "is_zero")]
    pub lost: i64,

    /// Number of pages used for the perf ring buffer.
    #[serde(skip_serializing_if = "is_zero")]
    pub npages: i64,

    /// Pages size used for the perf ring buffer.
    #[serde(skip_serializing_if = "is_zero")]
    pub pagesize: i64,

    /// Number of unknown samples.
    #[serde(skip_serializing_if = "is_zero")]
    pub unknown: i64,
}

impl MonitorStatus {
    /// The model carries no constraints.
    pub fn validate(&self) -> Result<()> {
        Ok(())
    }

    pub fn marshal_binary(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn unmarshal_binary(b: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(b)?)
    }
}
