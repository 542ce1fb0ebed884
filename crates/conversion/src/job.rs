//! Job lifecycle.
//!
//! A job moves `Pending -> Processing -> Completed | Failed`. A request that
//! is rejected before any stage runs goes straight from `Pending` to `Failed`.
//! Terminal jobs never change again and progress never goes down.

use std::{fmt, path::PathBuf, str::FromStr};

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{ConversionError, Result};

/// Progress checkpoints reported while a job runs
pub mod progress {
    /// Pipeline started, fetching the source image
    pub const STARTED: u8 = 20;
    /// Image decoded, binarization about to run
    pub const IMAGE_READY: u8 = 50;
    /// Polygons traced, encoding about to run
    pub const POLYGONS_READY: u8 = 70;
    /// Terminal, whether completed or failed
    pub const DONE: u8 = 100;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

#[derive(
    Debug, Clone, Copy,
    Serialize, Deserialize, JsonSchema, TS,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq, Hash
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Allowed moves of the lifecycle state machine
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Pending, Self::Failed)
                | (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Failed)
        )
    }
}

/// One tracked run of the conversion pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    pub progress: u8,
    pub result_path: Option<PathBuf>,
    pub download_url: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new(id: JobId) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: JobStatus::Pending,
            progress: 0,
            result_path: None,
            download_url: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Pending -> Processing at the first checkpoint
    pub fn start(&mut self) -> Result<()> {
        self.transition(JobStatus::Processing)?;
        self.set_progress(progress::STARTED)
    }

    /// Record a progress checkpoint while processing
    pub fn advance(&mut self, progress: u8) -> Result<()> {
        if self.status != JobStatus::Processing {
            return Err(ConversionError::InvalidTransition {
                from: self.status,
                to: JobStatus::Processing,
            });
        }
        self.set_progress(progress.min(progress::DONE))
    }

    /// Processing -> Completed with the persisted result
    pub fn complete(&mut self, result_path: PathBuf, download_url: Option<String>) -> Result<()> {
        self.transition(JobStatus::Completed)?;
        self.result_path = Some(result_path);
        self.download_url = download_url;
        self.set_progress(progress::DONE)
    }

    /// Move to Failed, recording the error message verbatim
    pub fn fail(&mut self, message: impl Into<String>) -> Result<()> {
        self.transition(JobStatus::Failed)?;
        self.error = Some(message.into());
        self.set_progress(progress::DONE)
    }

    fn transition(&mut self, next: JobStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(ConversionError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    fn set_progress(&mut self, progress: u8) -> Result<()> {
        if progress < self.progress {
            return Err(ConversionError::ProgressRegression {
                from: self.progress,
                to: progress,
            });
        }
        self.progress = progress;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot::from(self)
    }
}

/// Wire view of a job returned by submit and status queries
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, TS, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct JobSnapshot {
    pub id: String,
    pub status: JobStatus,
    pub progress: u8,
    pub download_url: Option<String>,
    pub error: Option<String>,
}

impl From<&Job> for JobSnapshot {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id.to_string(),
            status: job.status,
            progress: job.progress,
            download_url: job.download_url.clone(),
            error: job.error.clone(),
        }
    }
}
