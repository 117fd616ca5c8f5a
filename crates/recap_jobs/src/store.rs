use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::{JobId, JobState, ResultPoll};

/// Status string reported for a record that has finished but whose result has
/// not been consumed yet. Status reads never leak the outcome itself.
pub const RESULT_READY: &str = "Result ready";

/// Process-wide map of live summarization jobs.
///
/// Created once at startup and shared by handle; the dispatcher inserts, the
/// pipeline worker for a given id is the only writer afterwards, and result
/// polls delete. All access goes through the internal mutex, which is only
/// ever held for map operations.
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: Mutex<HashMap<JobId, JobState>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh id and inserts a `Pending` record for it in one
    /// critical section, so the record is visible to concurrent reads before
    /// the id is handed back.
    pub fn create(&self, stage: impl Into<String>) -> JobId {
        let stage = stage.into();
        let mut jobs = self.lock();
        loop {
            let id = JobId::generate();
            if jobs.contains_key(&id) {
                continue;
            }
            jobs.insert(id.clone(), JobState::Pending { stage });
            return id;
        }
    }

    /// Moves a `Pending` record to the next stage description.
    pub fn advance(&self, id: &JobId, stage: impl Into<String>) {
        self.transition(id, JobState::Pending { stage: stage.into() });
    }

    /// Terminal success.
    pub fn complete(&self, id: &JobId, summary: impl Into<String>) {
        self.transition(
            id,
            JobState::Complete {
                summary: summary.into(),
            },
        );
    }

    /// Terminal failure.
    pub fn fail(&self, id: &JobId, error: impl Into<String>) {
        self.transition(
            id,
            JobState::Failed {
                error: error.into(),
            },
        );
    }

    fn transition(&self, id: &JobId, next: JobState) {
        let mut jobs = self.lock();
        match jobs.get_mut(id) {
            Some(state) if !state.is_terminal() => *state = next,
            Some(state) => {
                tracing::warn!(%id, current = ?state, refused = ?next, "Ignoring write to a terminal record");
            }
            None => {
                tracing::warn!(%id, refused = ?next, "Ignoring write to an unknown record");
            }
        }
    }

    /// Removes a record whose job never made it onto a worker, e.g. a
    /// submission the queue rejected. Not a consume: no outcome is returned.
    pub fn discard(&self, id: &JobId) {
        self.lock().remove(id);
    }

    /// Non-consuming peek at a record's progress. Terminal records report
    /// [`RESULT_READY`] rather than their outcome.
    pub fn status(&self, id: &JobId) -> Option<String> {
        match self.lock().get(id) {
            Some(JobState::Pending { stage }) => Some(stage.clone()),
            Some(_) => Some(RESULT_READY.to_string()),
            None => None,
        }
    }

    /// Polls for the result. Safe to call repeatedly while the job runs; once
    /// the record is terminal this read removes it, so a second poll for the
    /// same id returns [`ResultPoll::NotFound`].
    pub fn consume(&self, id: &JobId) -> ResultPoll {
        let mut jobs = self.lock();
        match jobs.get(id) {
            None => return ResultPoll::NotFound,
            Some(JobState::Pending { stage }) => {
                return ResultPoll::Processing {
                    stage: stage.clone(),
                }
            }
            Some(_) => {}
        }
        match jobs.remove(id) {
            Some(JobState::Complete { summary }) => ResultPoll::Finished(Ok(summary)),
            Some(JobState::Failed { error }) => ResultPoll::Finished(Err(error)),
            _ => ResultPoll::NotFound,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<JobId, JobState>> {
        // A panicking holder only ever leaves complete map entries behind.
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_inserts_a_pending_record() {
        let store = JobStore::new();
        let id = store.create("Starting...");
        assert_eq!(store.status(&id), Some("Starting...".to_string()));
    }

    #[test]
    fn generated_ids_are_unique() {
        let store = JobStore::new();
        let a = store.create("Starting...");
        let b = store.create("Starting...");
        assert_ne!(a, b);
    }

    #[test]
    fn advance_updates_the_stage() {
        let store = JobStore::new();
        let id = store.create("Starting...");
        store.advance(&id, "Extracting video info...");
        assert_eq!(
            store.status(&id),
            Some("Extracting video info...".to_string())
        );
    }

    #[test]
    fn status_is_idempotent_while_pending() {
        let store = JobStore::new();
        let id = store.create("Starting...");
        for _ in 0..3 {
            assert_eq!(store.status(&id), Some("Starting...".to_string()));
        }
        assert_eq!(
            store.consume(&id),
            ResultPoll::Processing {
                stage: "Starting...".to_string()
            }
        );
        // polling did not delete or mutate the record
        assert_eq!(store.status(&id), Some("Starting...".to_string()));
    }

    #[test]
    fn terminal_status_reports_result_ready() {
        let store = JobStore::new();
        let id = store.create("Starting...");
        store.complete(&id, "a summary");
        assert_eq!(store.status(&id), Some(RESULT_READY.to_string()));
    }

    #[test]
    fn consume_delivers_a_completed_summary_exactly_once() {
        let store = JobStore::new();
        let id = store.create("Starting...");
        store.complete(&id, "a summary");

        assert_eq!(
            store.consume(&id),
            ResultPoll::Finished(Ok("a summary".to_string()))
        );
        assert_eq!(store.consume(&id), ResultPoll::NotFound);
        assert_eq!(store.status(&id), None);
    }

    #[test]
    fn consume_delivers_a_failure_exactly_once() {
        let store = JobStore::new();
        let id = store.create("Starting...");
        store.fail(&id, "Could not transcribe video audio");

        assert_eq!(
            store.consume(&id),
            ResultPoll::Finished(Err("Could not transcribe video audio".to_string()))
        );
        assert_eq!(store.consume(&id), ResultPoll::NotFound);
    }

    #[test]
    fn terminal_records_refuse_further_writes() {
        let store = JobStore::new();
        let id = store.create("Starting...");
        store.fail(&id, "Could not generate summary");

        store.advance(&id, "Generating summary with AI...");
        store.complete(&id, "late summary");

        assert_eq!(
            store.consume(&id),
            ResultPoll::Finished(Err("Could not generate summary".to_string()))
        );
    }

    #[test]
    fn discard_drops_the_record_without_an_outcome() {
        let store = JobStore::new();
        let id = store.create("Starting...");
        store.discard(&id);
        assert_eq!(store.status(&id), None);
        assert_eq!(store.consume(&id), ResultPoll::NotFound);
    }

    #[test]
    fn unknown_ids_resolve_to_not_found() {
        let store = JobStore::new();
        let id = JobId::from("req_0-0");
        assert_eq!(store.status(&id), None);
        assert_eq!(store.consume(&id), ResultPoll::NotFound);
    }
}
