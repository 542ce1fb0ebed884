use crate::{
    error::ConversionError,
    job::JobSnapshot,
    request::ConversionRequest,
    results::ResultFile,
    service::FsConversionService,
};
use rmcp::{
    handler::server::tool::IntoCallToolResult, model::{CallToolResult, Content, ServerCapabilities, ServerInfo}, schemars, tool, Error as McpError, ServerHandler
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Request naming an existing job
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct JobIdRequest {
    #[schemars(description = "Job id returned by convert_image")]
    pub job_id: String,
}

/// Outcome of a tool call, rendered as pretty JSON
#[derive(Debug, Serialize, schemars::JsonSchema)]
#[serde(untagged)]
pub enum JobResponse {
    Job(JobSnapshot),
    Result(ResultFile),
    Error {
        #[schemars(description = "Error classification, e.g. not_found or fetch")]
        kind: String,
        #[schemars(description = "Job the error belongs to, when one was created")]
        job_id: Option<String>,
        message: String,
    },
}

impl From<ConversionError> for JobResponse {
    fn from(err: ConversionError) -> Self {
        let job_id = match &err {
            ConversionError::Processing { id, .. } => Some(id.clone()),
            _ => None,
        };
        Self::Error {
            kind: err.kind().to_string(),
            job_id,
            message: err.to_string(),
        }
    }
}

impl IntoCallToolResult for JobResponse {
    fn into_call_tool_result(self) -> Result<CallToolResult, McpError> {
        let text = serde_json::to_string_pretty(&self).unwrap_or_else(|_| format!("{:?}", self));
        Ok(match self {
            Self::Error { .. } => CallToolResult::error(vec![Content::text(text)]),
            _ => CallToolResult::success(vec![Content::text(text)]),
        })
    }
}

/// MCP Server for PNG to DXF conversion
#[derive(Clone)]
pub struct ConversionMcpServer {
    service: Arc<FsConversionService>,
}

impl ConversionMcpServer {
    pub fn new(service: Arc<FsConversionService>) -> Self {
        Self { service }
    }
}

#[tool(tool_box)]
impl ConversionMcpServer {
    #[tool(description = "Convert a raster image into a DXF file of closed outline polylines. Runs the job to completion and returns its final status.")]
    async fn convert_image(&self, #[tool(aggr)] request: ConversionRequest) -> JobResponse {
        match self.service.submit(request).await {
            Ok(snapshot) => JobResponse::Job(snapshot),
            Err(e) => e.into(),
        }
    }

    #[tool(description = "Get the status and progress of a conversion job")]
    fn get_job_status(&self, #[tool(aggr)] JobIdRequest { job_id }: JobIdRequest) -> JobResponse {
        match self.service.status(&job_id) {
            Ok(snapshot) => JobResponse::Job(snapshot),
            Err(e) => e.into(),
        }
    }

    #[tool(description = "Get the DXF file produced by a completed conversion job")]
    fn get_job_result(&self, #[tool(aggr)] JobIdRequest { job_id }: JobIdRequest) -> JobResponse {
        match self.service.result(&job_id) {
            Ok(file) => JobResponse::Result(file),
            Err(e) => e.into(),
        }
    }

    #[tool(description = "Get the JSON schema of convert_image requests")]
    fn get_request_schema(&self) -> String {
        let schema = schemars::schema_for!(ConversionRequest);
        serde_json::to_string_pretty(&schema)
            .unwrap_or_else(|e| format!("Failed to serialize schema: {}", e))
    }
}

#[tool(tool_box)]
impl ServerHandler for ConversionMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some("PNG to DXF Server - Trace the external outlines of a mask image and export them as closed polylines in an R12 or R2000 DXF file.".into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
