#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How urgently an alert needs attention.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Severity {
    /// Informational, eg. a train waiting for clearance.
    Low,
    /// A safety violation, eg. a segment over capacity.
    High,
}

/// A message raised during a tick. Alerts are regenerated every tick.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Alert {
    pub severity: Severity,
    pub message: String,
}

impl Alert {
    pub fn low(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Low,
            message: message.into(),
        }
    }

    pub fn high(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::High,
            message: message.into(),
        }
    }
}
