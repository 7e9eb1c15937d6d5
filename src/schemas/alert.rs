//! Alert schema - severity-graded validation results
//!
//! Alerts are ephemeral values: produced fresh on every validation call and
//! discarded after the caller acts on them. A validation failure is a normal
//! result, never an error.

use serde::{Deserialize, Serialize};

/// Severity of a validation alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks submission entirely; cannot be acknowledged away
    Error,
    /// Requires explicit operator acknowledgement to proceed
    Warning,
    /// Informational; shown alongside warnings for acknowledgement
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// One validation alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// How serious the alert is
    pub severity: Severity,

    /// Human-readable explanation
    pub message: String,

    /// True when accepting this alert requires a non-empty note
    #[serde(default)]
    pub requires_note: bool,
}

impl Alert {
    /// Create a blocking error alert
    pub fn error(message: impl Into<String>) -> Self {
        Alert { severity: Severity::Error, message: message.into(), requires_note: false }
    }

    /// Create a warning alert
    pub fn warning(message: impl Into<String>) -> Self {
        Alert { severity: Severity::Warning, message: message.into(), requires_note: false }
    }

    /// Create a warning alert that demands an explanatory note
    pub fn warning_with_note(message: impl Into<String>) -> Self {
        Alert { severity: Severity::Warning, message: message.into(), requires_note: true }
    }

    /// Create an informational alert
    pub fn info(message: impl Into<String>) -> Self {
        Alert { severity: Severity::Info, message: message.into(), requires_note: false }
    }
}

/// Aggregate result of one validation run.
///
/// Alerts are ordered most severe first. `is_valid` is true iff no
/// error-severity alert is present; warnings and infos still require the
/// caller to obtain operator acknowledgement before committing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    /// All applicable alerts, most severe first
    pub alerts: Vec<Alert>,
}

impl ValidationReport {
    /// Build a report from alerts in any order; sorts most severe first,
    /// preserving the relative order of alerts with equal severity.
    pub fn from_alerts(mut alerts: Vec<Alert>) -> Self {
        alerts.sort_by_key(|a| a.severity);
        ValidationReport { alerts }
    }

    /// True iff no error-severity alert is present
    pub fn is_valid(&self) -> bool {
        !self.alerts.iter().any(|a| a.severity == Severity::Error)
    }

    /// True iff at least one warning is present
    pub fn has_warning(&self) -> bool {
        self.alerts.iter().any(|a| a.severity == Severity::Warning)
    }

    /// True iff at least one informational alert is present
    pub fn has_info(&self) -> bool {
        self.alerts.iter().any(|a| a.severity == Severity::Info)
    }

    /// True iff any alert demands a non-empty note to proceed
    pub fn requires_note(&self) -> bool {
        self.alerts.iter().any(|a| a.requires_note)
    }

    /// True iff the report carries no alerts at all
    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}
