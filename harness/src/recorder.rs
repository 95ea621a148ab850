use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use mockstore::StoreResult;
use serde::Serialize;

/// The outcome of one audit check.
#[derive(Debug, Clone, Serialize)]
pub struct CheckRecord {
    pub name: String,
    pub passed: bool,
    pub message: String,
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

/// Critical subsystems and the checks whose combined outcome decides
/// whether the subsystem counts as working.
const CRITICAL_SYSTEMS: &[(&str, &[&str])] = &[
    ("Daily Timer System", &["Daily Timer Reset"]),
    ("Credit System", &["Credit Usage"]),
    ("Chat System", &["Chat Creation", "Message Sending"]),
    ("Matchmaking System", &["Matchmaking Queue", "Partner Finding"]),
    ("Authentication", &["User Creation", "User Data Retrieval"]),
];

/// Aggregated counts over all recorded checks, plus per-subsystem rollups.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
    pub subsystems: IndexMap<String, bool>,
}

/// Accumulates check outcomes across the whole audit run.
///
/// Every failure — assertion mismatch or store error — becomes a failure
/// record; one check failing never prevents subsequent checks from
/// running. Only an error escaping the top-level driver aborts the run.
#[derive(Default)]
pub struct CheckRecorder {
    records: Vec<CheckRecord>,
}

impl CheckRecorder {
    pub fn new() -> Self {
        CheckRecorder {
            records: Vec::new(),
        }
    }

    /// Records one check outcome.
    pub fn record(&mut self, name: &str, passed: bool, message: &str) {
        self.record_with_details(name, passed, message, serde_json::Value::Null);
    }

    /// Records one check outcome with structured detail for the report.
    pub fn record_with_details(
        &mut self,
        name: &str,
        passed: bool,
        message: &str,
        details: serde_json::Value,
    ) {
        if passed {
            log::info!("PASS {}: {}", name, message);
        } else {
            log::warn!("FAIL {}: {}", name, message);
        }
        self.records.push(CheckRecord {
            name: name.to_string(),
            passed,
            message: message.to_string(),
            details,
            timestamp: Utc::now(),
        });
    }

    /// Runs a check body, converting any escaping store error into a
    /// failure record under `name`. This is the per-check error boundary:
    /// the run continues regardless of the outcome.
    pub fn guard(&mut self, name: &str, f: impl FnOnce(&mut CheckRecorder) -> StoreResult<()>) {
        if let Err(err) = f(self) {
            self.record(name, false, &format!("Error: {}", err));
        }
    }

    pub fn records(&self) -> &[CheckRecord] {
        &self.records
    }

    pub fn all_passed(&self) -> bool {
        self.records.iter().all(|record| record.passed)
    }

    /// Looks up the most recent outcome recorded under `name`.
    pub fn outcome(&self, name: &str) -> Option<bool> {
        self.records
            .iter()
            .rev()
            .find(|record| record.name == name)
            .map(|record| record.passed)
    }

    pub fn summary(&self) -> Summary {
        let total = self.records.len();
        let passed = self.records.iter().filter(|record| record.passed).count();
        let failed = total - passed;
        let pass_rate = if total > 0 {
            passed as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        let mut subsystems = IndexMap::new();
        for (system, checks) in CRITICAL_SYSTEMS {
            let working = self
                .records
                .iter()
                .filter(|record| checks.contains(&record.name.as_str()))
                .all(|record| record.passed);
            subsystems.insert(system.to_string(), working);
        }

        Summary {
            total,
            passed,
            failed,
            pass_rate,
            subsystems,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockstore::{ErrorKind, StoreError};

    #[test]
    fn test_record_and_summary() {
        let mut rec = CheckRecorder::new();
        rec.record("Daily Timer Reset", true, "ok");
        rec.record("Credit Usage", false, "mismatch");
        let summary = rec.summary();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.pass_rate, 50.0);
        assert_eq!(summary.subsystems["Daily Timer System"], true);
        assert_eq!(summary.subsystems["Credit System"], false);
        // no checks recorded for the chat system: counts as working
        assert_eq!(summary.subsystems["Chat System"], true);
        assert!(!rec.all_passed());
    }

    #[test]
    fn test_guard_converts_error_to_failure() {
        let mut rec = CheckRecorder::new();
        rec.guard("Exploding Check", |_| {
            Err(StoreError::new("boom", ErrorKind::InternalError))
        });
        assert_eq!(rec.records().len(), 1);
        let record = &rec.records()[0];
        assert!(!record.passed);
        assert!(record.message.contains("boom"));
    }

    #[test]
    fn test_guard_passes_through_success() {
        let mut rec = CheckRecorder::new();
        rec.guard("Quiet Check", |rec| {
            rec.record("Quiet Check", true, "fine");
            Ok(())
        });
        assert_eq!(rec.records().len(), 1);
        assert!(rec.all_passed());
    }

    #[test]
    fn test_outcome_lookup() {
        let mut rec = CheckRecorder::new();
        rec.record("X", false, "first");
        rec.record("X", true, "second");
        assert_eq!(rec.outcome("X"), Some(true));
        assert_eq!(rec.outcome("Y"), None);
    }

    #[test]
    fn test_empty_summary() {
        let rec = CheckRecorder::new();
        let summary = rec.summary();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.pass_rate, 0.0);
        assert!(rec.all_passed());
    }
}
