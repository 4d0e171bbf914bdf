use crate::session::QueryOutcome;

/// Summary handed back to callers after a statement completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterResponse {
    /// Full status line, e.g. `INSERT 0 1`.
    pub message: String,
    /// Status with counters stripped, e.g. `INSERT`.
    pub code: String,
    /// Rows touched or returned by the statement.
    pub rows_affected: u64,
}

impl AdapterResponse {
    #[must_use]
    pub fn new(message: impl Into<String>, rows_affected: u64) -> Self {
        let message = message.into();
        let code = strip_counters(&message);
        Self {
            message,
            code,
            rows_affected,
        }
    }

    #[must_use]
    pub fn from_outcome(outcome: &QueryOutcome) -> Self {
        Self::new(outcome.status.clone(), outcome.rows_affected)
    }
}

/// Drop purely numeric words from a status line, keeping the verbs.
fn strip_counters(status: &str) -> String {
    status
        .split_whitespace()
        .filter(|word| !word.chars().all(|c| c.is_ascii_digit()))
        .collect::<Vec<_>>()
        .join(" ")
}
