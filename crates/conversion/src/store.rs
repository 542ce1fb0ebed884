use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use crate::{
    error::{ConversionError, Result},
    job::{Job, JobId},
};

/// Registry of jobs shared between submitters and status readers.
///
/// `update` is the only way to mutate a job. The mutation runs on a copy and
/// is committed only when it succeeds, so a rejected transition leaves the
/// stored job untouched.
pub trait TaskStore: Send + Sync {
    /// Register a new pending job
    fn create(&self) -> Job;

    fn get(&self, id: &JobId) -> Option<Job>;

    /// Apply `mutate` atomically and return the committed job
    fn update(&self, id: &JobId, mutate: &mut dyn FnMut(&mut Job) -> Result<()>) -> Result<Job>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local store behind a read/write lock.
///
/// Entries are never evicted.
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskStore for InMemoryTaskStore {
    fn create(&self) -> Job {
        let job = Job::new(JobId::new());
        self.jobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(job.id, job.clone());
        job
    }

    fn get(&self, id: &JobId) -> Option<Job> {
        self.jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    fn update(&self, id: &JobId, mutate: &mut dyn FnMut(&mut Job) -> Result<()>) -> Result<Job> {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        let stored = jobs
            .get_mut(id)
            .ok_or_else(|| ConversionError::NotFound(id.to_string()))?;

        let mut draft = stored.clone();
        mutate(&mut draft)?;
        *stored = draft.clone();
        Ok(draft)
    }

    fn len(&self) -> usize {
        self.jobs.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobStatus;
    use std::sync::Arc;

    #[test]
    fn test_create_and_get() {
        let store = InMemoryTaskStore::new();
        let job = store.create();

        let fetched = store.get(&job.id).expect("Should find the job");
        assert_eq!(fetched.status, JobStatus::Pending);
        assert_eq!(fetched.progress, 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_unknown_id_is_absent() {
        let store = InMemoryTaskStore::new();
        store.create();
        assert!(store.get(&JobId::new()).is_none());

        let result = store.update(&JobId::new(), &mut |job| job.start());
        assert!(matches!(result, Err(ConversionError::NotFound(_))));
    }

    #[test]
    fn test_failed_update_is_not_committed() {
        let store = InMemoryTaskStore::new();
        let job = store.create();
        store.update(&job.id, &mut |job| job.start()).expect("start");
        store.update(&job.id, &mut |job| job.advance(70)).expect("advance");

        let result = store.update(&job.id, &mut |job| {
            job.error = Some("scribbled".to_string());
            job.advance(50)
        });
        assert!(result.is_err());

        let stored = store.get(&job.id).expect("job");
        assert_eq!(stored.progress, 70);
        assert_eq!(stored.error, None);
    }

    #[test]
    fn test_concurrent_updates_are_serialized() {
        let store = Arc::new(InMemoryTaskStore::new());
        let job = store.create();
        store.update(&job.id, &mut |job| job.start()).expect("start");

        let handles: Vec<_> = (21..=99u8)
            .map(|checkpoint| {
                let store = Arc::clone(&store);
                let id = job.id;
                std::thread::spawn(move || {
                    // Out-of-order checkpoints are rejected, never applied
                    let _ = store.update(&id, &mut |job| job.advance(checkpoint));
                    store.get(&id).map(|job| job.progress)
                })
            })
            .collect();

        for handle in handles {
            let observed = handle.join().expect("thread").expect("job");
            assert!(observed >= 20);
        }
        let stored = store.get(&job.id).expect("job");
        assert_eq!(stored.status, JobStatus::Processing);
        assert!(stored.progress >= 21);
    }
}
