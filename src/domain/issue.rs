use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    /// A mandatory column is missing; the dataset cannot be processed.
    Blocking,
    /// Degraded input; processing continues.
    Info,
}

/// Data-quality diagnostic shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: IssueSeverity,
    pub message: String,
}

impl Issue {
    pub fn blocking(message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Blocking,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Info,
            message: message.into(),
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.severity == IssueSeverity::Blocking
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            IssueSeverity::Blocking => write!(f, "{}", self.message),
            IssueSeverity::Info => write!(f, "⚠️ {}", self.message),
        }
    }
}
