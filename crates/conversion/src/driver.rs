//! Staged pipeline driver.
//!
//! A job runs an ordered list of [`Stage`]s. Each stage consumes the
//! [`Artifact`] produced by the previous one. Entering a stage records its
//! progress checkpoint; the first error fails the job and nothing after it
//! runs.

use std::path::PathBuf;

use image::GrayImage;
use strum::{Display, EnumIter, IntoStaticStr};

use outline::{DrawingPolygon, DxfEncoder, Pipeline};

use crate::{
    error::{ConversionError, Result},
    job::{progress, Job, JobId},
    request::ConversionRequest,
    results::ResultStore,
    source::ImageSource,
    store::TaskStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    Fetch,
    Decode,
    Trace,
    Encode,
}

impl Stage {
    pub const ORDER: [Stage; 4] = [Stage::Fetch, Stage::Decode, Stage::Trace, Stage::Encode];

    /// Progress recorded when the stage starts
    pub fn checkpoint(&self) -> u8 {
        match self {
            Self::Fetch | Self::Decode => progress::STARTED,
            Self::Trace => progress::IMAGE_READY,
            Self::Encode => progress::POLYGONS_READY,
        }
    }
}

/// Data handed from one stage to the next
#[derive(Debug)]
pub enum Artifact {
    Nothing,
    Bytes(Vec<u8>),
    Image(GrayImage),
    Polygons(Vec<DrawingPolygon>),
    Persisted(PathBuf),
}

const MAX_THRESHOLD_PERCENT: u8 = 100;

/// A validated request, ready to run
pub struct ConversionPlan {
    pub image_url: String,
    pub pipeline: Pipeline,
    pub encoder: DxfEncoder,
}

impl ConversionPlan {
    /// Validate a request. Out-of-range thresholds, unsupported profiles and
    /// units are rejected here, before any stage runs.
    pub fn from_request(request: &ConversionRequest) -> Result<Self> {
        if request.threshold > MAX_THRESHOLD_PERCENT {
            return Err(ConversionError::InvalidRequest(format!(
                "threshold must be between 0 and {MAX_THRESHOLD_PERCENT}, got {}",
                request.threshold
            )));
        }
        let encoder = DxfEncoder::from_names(&request.dxf_version, &request.unit, request.line_width)?;
        let pipeline = Pipeline::builder()
            .with_threshold(request.threshold, request.invert)
            .build();
        Ok(Self {
            image_url: request.image_url.clone(),
            pipeline,
            encoder,
        })
    }
}

/// Runs one job's stages against the shared store and collaborators
pub struct JobDriver<'a, S, R> {
    store: &'a dyn TaskStore,
    source: &'a S,
    results: &'a R,
}

impl<'a, S: ImageSource, R: ResultStore> JobDriver<'a, S, R> {
    pub fn new(store: &'a dyn TaskStore, source: &'a S, results: &'a R) -> Self {
        Self { store, source, results }
    }

    /// Drive `id` from Pending to a terminal state.
    ///
    /// Returns the completed job, or the first stage error after the job has
    /// been marked failed.
    pub async fn run(&self, id: &JobId, plan: &ConversionPlan) -> Result<Job> {
        self.store.update(id, &mut |job| job.start())?;

        let mut artifact = Artifact::Nothing;
        for stage in Stage::ORDER {
            self.store
                .update(id, &mut |job| job.advance(stage.checkpoint()))?;
            tracing::info!(job = %id, %stage, progress = stage.checkpoint(), "stage started");

            artifact = match self.execute(stage, artifact, id, plan).await {
                Ok(next) => next,
                Err(err) => {
                    self.fail(id, &err);
                    return Err(err);
                }
            };
        }

        let Artifact::Persisted(path) = artifact else {
            let err = ConversionError::StageOrder("complete");
            self.fail(id, &err);
            return Err(err);
        };
        let download_url = self.results.download_url(id);
        let job = self.store.update(id, &mut |job| {
            job.complete(path.clone(), download_url.clone())
        })?;
        tracing::info!(job = %id, path = %path.display(), "job completed");
        Ok(job)
    }

    async fn execute(
        &self,
        stage: Stage,
        input: Artifact,
        id: &JobId,
        plan: &ConversionPlan,
    ) -> Result<Artifact> {
        match (stage, input) {
            (Stage::Fetch, Artifact::Nothing) => {
                let bytes = self.source.fetch(&plan.image_url).await?;
                tracing::debug!(job = %id, bytes = bytes.len(), "image fetched");
                Ok(Artifact::Bytes(bytes))
            }
            (Stage::Decode, Artifact::Bytes(bytes)) => {
                let image = outline::to_luma_bt601(&image::load_from_memory(&bytes)?);
                tracing::debug!(job = %id, width = image.width(), height = image.height(), "image decoded");
                Ok(Artifact::Image(image))
            }
            (Stage::Trace, Artifact::Image(image)) => {
                let outline = plan.pipeline.process(&image);
                tracing::info!(
                    job = %id,
                    boundaries = outline.boundary_count,
                    polygons = outline.polygons.len(),
                    "outline traced"
                );
                Ok(Artifact::Polygons(outline.polygons))
            }
            (Stage::Encode, Artifact::Polygons(polygons)) => {
                let path = self.results.destination(id);
                let entities = plan.encoder.encode_to_file(&polygons, &path)?;
                tracing::debug!(job = %id, entities, profile = %plan.encoder.profile, "DXF written");
                Ok(Artifact::Persisted(path))
            }
            (stage, _) => Err(ConversionError::StageOrder(stage.into())),
        }
    }

    fn fail(&self, id: &JobId, err: &ConversionError) {
        let message = err.to_string();
        tracing::error!(job = %id, error = %message, "job failed");
        if let Err(update_err) = self.store.update(id, &mut |job| job.fail(message.clone())) {
            tracing::warn!(job = %id, error = %update_err, "could not record job failure");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkpoints_are_non_decreasing() {
        let checkpoints: Vec<u8> = Stage::ORDER.iter().map(Stage::checkpoint).collect();
        assert!(checkpoints.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(checkpoints.first(), Some(&progress::STARTED));
        assert!(checkpoints.iter().all(|&p| p < progress::DONE));
    }

    #[test]
    fn test_plan_rejects_unknown_profile() {
        let mut request = ConversionRequest::new("a.png");
        request.dxf_version = "R14".to_string();
        assert!(matches!(
            ConversionPlan::from_request(&request),
            Err(ConversionError::Encoding(outline::OutlineError::UnsupportedProfile(_)))
        ));

        let mut request = ConversionRequest::new("a.png");
        request.unit = "inch".to_string();
        assert!(ConversionPlan::from_request(&request).is_err());
    }

    #[test]
    fn test_plan_rejects_threshold_above_100() {
        let mut request = ConversionRequest::new("a.png");
        request.threshold = 101;
        let err = ConversionPlan::from_request(&request).err().expect("rejected");
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidRequest);

        request.threshold = 100;
        assert!(ConversionPlan::from_request(&request).is_ok());
    }

    #[test]
    fn test_plan_carries_stroke_weight() {
        let mut request = ConversionRequest::new("a.png");
        request.line_width = 0.3;
        let plan = ConversionPlan::from_request(&request).expect("plan");
        assert_eq!(plan.encoder.stroke_weight(), 30);
    }
}
