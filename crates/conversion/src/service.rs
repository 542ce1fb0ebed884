use std::sync::Arc;

use crate::{
    config::ServiceConfig,
    driver::{ConversionPlan, JobDriver},
    error::{ConversionError, Result},
    job::{Job, JobId, JobSnapshot},
    request::ConversionRequest,
    results::{FsResultStore, ResultFile, ResultStore},
    source::{ImageFetcher, ImageSource},
    store::{InMemoryTaskStore, TaskStore},
};

/// The service as deployed: HTTP/file fetching, results on local disk
pub type FsConversionService = ConversionService<ImageFetcher, FsResultStore>;

/// Submit, status and result operations over a shared job registry.
pub struct ConversionService<S, R> {
    store: Arc<dyn TaskStore>,
    source: S,
    results: R,
}

impl<S: ImageSource, R: ResultStore> ConversionService<S, R> {
    pub fn new(store: Arc<dyn TaskStore>, source: S, results: R) -> Self {
        Self { store, source, results }
    }

    pub fn store(&self) -> &Arc<dyn TaskStore> {
        &self.store
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run a conversion to completion.
    ///
    /// Any stage failure marks the job failed and comes back as
    /// [`ConversionError::Processing`], carrying the job id; the job itself
    /// stays queryable.
    pub async fn submit(&self, request: ConversionRequest) -> Result<JobSnapshot> {
        let job = self.store.create();
        tracing::info!(job = %job.id, image = %request.image_url, "job submitted");
        self.execute(job.id, &request)
            .await
            .map(|job| job.snapshot())
            .map_err(|err| ConversionError::Processing {
                id: job.id.to_string(),
                kind: err.kind(),
                message: err.to_string(),
            })
    }

    /// Create a job and run it on a background task, returning at once.
    ///
    /// Poll [`status`](Self::status) to follow it.
    pub fn spawn(self: &Arc<Self>, request: ConversionRequest) -> JobSnapshot
    where
        S: 'static,
        R: 'static,
    {
        let job = self.store.create();
        let snapshot = job.snapshot();
        let service = Arc::clone(self);
        tokio::spawn(async move {
            // the outcome is recorded on the job
            let _ = service.execute(job.id, &request).await;
        });
        snapshot
    }

    async fn execute(&self, id: JobId, request: &ConversionRequest) -> Result<Job> {
        let plan = match ConversionPlan::from_request(request) {
            Ok(plan) => plan,
            Err(err) => {
                tracing::warn!(job = %id, error = %err, "request rejected");
                let message = err.to_string();
                self.store.update(&id, &mut |job| job.fail(message.clone()))?;
                return Err(err);
            }
        };
        JobDriver::new(self.store.as_ref(), &self.source, &self.results)
            .run(&id, &plan)
            .await
    }

    /// Current state of a job; unknown ids are NotFound
    pub fn status(&self, id: &str) -> Result<JobSnapshot> {
        self.lookup(id).map(|job| job.snapshot())
    }

    /// The persisted DXF of a completed job
    pub fn result(&self, id: &str) -> Result<ResultFile> {
        let job = self.lookup(id)?;
        let path = job
            .result_path
            .ok_or_else(|| ConversionError::ResultNotFound(id.to_string()))?;
        Ok(ResultFile::new(path, self.results.download_name(&job.id)))
    }

    fn lookup(&self, id: &str) -> Result<Job> {
        id.parse::<JobId>()
            .ok()
            .and_then(|job_id| self.store.get(&job_id))
            .ok_or_else(|| ConversionError::NotFound(id.to_string()))
    }
}

impl FsConversionService {
    /// Build the deployed service with a fresh in-memory job store
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let source = ImageFetcher::new(config.fetch_timeout())?;
        let results = FsResultStore::new(&config.data_dir, config.public_base_url.clone())?;
        tracing::debug!(data_dir = %config.data_dir.display(), "conversion service configured");
        Ok(Self::new(Arc::new(InMemoryTaskStore::new()), source, results))
    }
}
