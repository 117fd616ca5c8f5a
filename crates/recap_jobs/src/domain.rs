use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

/// Opaque handle for one summarization request.
///
/// Only meaningful while the record is live in the [`crate::JobStore`]; once
/// the terminal result has been consumed the id resolves to nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

impl JobId {
    /// Time-derived token of the form `req_<unix-millis>-<seq>`. The sequence
    /// suffix disambiguates submissions landing on the same millisecond; the
    /// store additionally regenerates if a generated id is somehow still live.
    pub(crate) fn generate() -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        JobId(format!("req_{millis}-{seq}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobId {
    fn from(raw: String) -> Self {
        JobId(raw)
    }
}

impl From<&str> for JobId {
    fn from(raw: &str) -> Self {
        JobId(raw.to_string())
    }
}

/// Lifecycle of one record. Transitions only move forward: a `Pending` record
/// may update its stage or finish, a terminal record never changes again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Pending { stage: String },
    Complete { summary: String },
    Failed { error: String },
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobState::Pending { .. })
    }
}

/// What a result poll observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultPoll {
    /// Terminal outcome. The record was deleted as part of this read; `Ok`
    /// carries the summary, `Err` the failure description.
    Finished(Result<String, String>),
    /// The pipeline is still running; the record was left untouched.
    Processing { stage: String },
    /// No live record: never submitted, or already consumed.
    NotFound,
}
