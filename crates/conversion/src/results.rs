use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Serialize;
use schemars::JsonSchema;

use outline::DXF_MEDIA_TYPE;

use crate::{error::Result, job::JobId};

/// Decides where a job's DXF file lives and how it is offered for download
pub trait ResultStore: Send + Sync {
    /// File the encoder writes for this job
    fn destination(&self, id: &JobId) -> PathBuf;

    /// Public URL of the result, if the service is reachable from outside
    fn download_url(&self, id: &JobId) -> Option<String>;

    /// File name suggested to downloaders
    fn download_name(&self, id: &JobId) -> String {
        format!("pattern-{id}.dxf")
    }
}

/// Results stored as `<data_dir>/<job id>.dxf`
#[derive(Debug, Clone)]
pub struct FsResultStore {
    data_dir: PathBuf,
    public_base_url: Option<String>,
}

impl FsResultStore {
    /// Create the store, making sure the data directory exists
    pub fn new(data_dir: impl Into<PathBuf>, public_base_url: Option<String>) -> Result<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;
        Ok(Self {
            data_dir,
            public_base_url: public_base_url.map(|url| url.trim_end_matches('/').to_string()),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl ResultStore for FsResultStore {
    fn destination(&self, id: &JobId) -> PathBuf {
        self.data_dir.join(format!("{id}.dxf"))
    }

    fn download_url(&self, id: &JobId) -> Option<String> {
        self.public_base_url
            .as_ref()
            .map(|base| format!("{base}/api/png-to-dxf/files/{id}"))
    }
}

/// A persisted DXF ready to be served
#[derive(Debug, Clone, Serialize, JsonSchema, PartialEq)]
pub struct ResultFile {
    pub path: PathBuf,
    pub file_name: String,
    pub media_type: String,
}

impl ResultFile {
    pub fn new(path: PathBuf, file_name: String) -> Self {
        Self {
            path,
            file_name,
            media_type: DXF_MEDIA_TYPE.to_string(),
        }
    }
}
