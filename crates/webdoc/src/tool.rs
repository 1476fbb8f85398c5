//! Tool builder and contract for WebDoc

use schemars::schema_for;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::DocError;
use crate::read::{document_info, read_lines, read_pages, read_smart};
use crate::types::{
    DocumentInfoRequest, DocumentInfoResponse, ReadLinesRequest, ReadLinesResponse,
    ReadPagesRequest, ReadPagesResponse, SmartReadRequest, SmartReadResponse,
};
use crate::{
    INFO_DESCRIPTION, LINES_DESCRIPTION, PAGES_DESCRIPTION, SMART_DESCRIPTION, TOOL_LLMTXT,
};

/// The four document operations, as served to a model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocOperation {
    Info,
    Smart,
    Pages,
    Lines,
}

impl DocOperation {
    /// Every operation, in listing order
    pub const ALL: [DocOperation; 4] = [
        DocOperation::Info,
        DocOperation::Smart,
        DocOperation::Pages,
        DocOperation::Lines,
    ];

    /// Tool name
    pub fn name(self) -> &'static str {
        match self {
            DocOperation::Info => "get_document_info",
            DocOperation::Smart => "read_document_smart",
            DocOperation::Pages => "read_document_by_page",
            DocOperation::Lines => "read_document_by_line",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            DocOperation::Info => INFO_DESCRIPTION,
            DocOperation::Smart => SMART_DESCRIPTION,
            DocOperation::Pages => PAGES_DESCRIPTION,
            DocOperation::Lines => LINES_DESCRIPTION,
        }
    }

    /// Get input schema as JSON
    pub fn input_schema(self) -> Value {
        let schema = match self {
            DocOperation::Info => schema_for!(DocumentInfoRequest),
            DocOperation::Smart => schema_for!(SmartReadRequest),
            DocOperation::Pages => schema_for!(ReadPagesRequest),
            DocOperation::Lines => schema_for!(ReadLinesRequest),
        };
        serde_json::to_value(schema).unwrap_or_default()
    }

    /// Get output schema as JSON
    pub fn output_schema(self) -> Value {
        let schema = match self {
            DocOperation::Info => schema_for!(DocumentInfoResponse),
            DocOperation::Smart => schema_for!(SmartReadResponse),
            DocOperation::Pages => schema_for!(ReadPagesResponse),
            DocOperation::Lines => schema_for!(ReadLinesResponse),
        };
        serde_json::to_value(schema).unwrap_or_default()
    }
}

/// Builder for configuring the WebDoc tool
#[derive(Debug, Clone, Default)]
pub struct ToolBuilder {
    allowed_dirs: Vec<PathBuf>,
}

impl ToolBuilder {
    /// Create a new tool builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Only serve files below this directory (may be given several times)
    ///
    /// Without any allowed directory every readable path is served.
    pub fn allow_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.allowed_dirs.push(dir.into());
        self
    }

    /// Build the tool
    ///
    /// Allowed directories that do not exist are dropped with a warning.
    pub fn build(self) -> Tool {
        let allowed_dirs = self
            .allowed_dirs
            .into_iter()
            .filter_map(|dir| match dir.canonicalize() {
                Ok(dir) => Some(dir),
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "ignoring allowed directory");
                    None
                }
            })
            .collect();
        Tool { allowed_dirs }
    }
}

/// Configured WebDoc tool
#[derive(Debug, Clone, Default)]
pub struct Tool {
    allowed_dirs: Vec<PathBuf>,
}

impl Tool {
    /// Create a new tool builder
    pub fn builder() -> ToolBuilder {
        ToolBuilder::new()
    }

    /// Get full documentation (llmtxt)
    pub fn llmtxt(&self) -> &'static str {
        TOOL_LLMTXT
    }

    /// Document type, size, page counts and metadata
    pub async fn info(&self, req: DocumentInfoRequest) -> DocumentInfoResponse {
        let result = self
            .run(&req.file_path, |path| Ok(document_info(path)))
            .await;
        respond(&req.file_path, result, DocumentInfoResponse::from_error)
    }

    /// Read within a character budget
    pub async fn read_smart(&self, req: SmartReadRequest) -> SmartReadResponse {
        let file_path = req.file_path.clone();
        let result = self.run(&file_path, move |path| read_smart(path, &req)).await;
        respond(&file_path, result, SmartReadResponse::from_error)
    }

    /// Read a page range
    pub async fn read_pages(&self, req: ReadPagesRequest) -> ReadPagesResponse {
        let result = self
            .run(&req.file_path, move |path| {
                read_pages(path, req.start_page, req.end_page)
            })
            .await;
        respond(&req.file_path, result, ReadPagesResponse::from_error)
    }

    /// Read a line range of one page
    pub async fn read_lines(&self, req: ReadLinesRequest) -> ReadLinesResponse {
        let result = self
            .run(&req.file_path, move |path| {
                read_lines(path, req.start_line, req.end_line, req.page_index)
            })
            .await;
        respond(&req.file_path, result, ReadLinesResponse::from_error)
    }

    /// Run one operation on JSON arguments
    ///
    /// Arguments that do not deserialize are the only `Err`; read failures
    /// are reported through `error_message`.
    pub async fn call(&self, op: DocOperation, arguments: Value) -> Result<Value, serde_json::Error> {
        match op {
            DocOperation::Info => {
                serde_json::to_value(self.info(serde_json::from_value(arguments)?).await)
            }
            DocOperation::Smart => {
                serde_json::to_value(self.read_smart(serde_json::from_value(arguments)?).await)
            }
            DocOperation::Pages => {
                serde_json::to_value(self.read_pages(serde_json::from_value(arguments)?).await)
            }
            DocOperation::Lines => {
                serde_json::to_value(self.read_lines(serde_json::from_value(arguments)?).await)
            }
        }
    }

    /// Check the path and run a blocking read off the async workers
    async fn run<T, F>(&self, file_path: &str, read: F) -> Result<T, DocError>
    where
        T: Send + 'static,
        F: FnOnce(&Path) -> Result<T, DocError> + Send + 'static,
    {
        let path = self.resolve(file_path)?;
        tokio::task::spawn_blocking(move || read(&path))
            .await
            .map_err(|e| DocError::Interrupted(e.to_string()))?
    }

    /// Validate the path against the allowed directories
    fn resolve(&self, file_path: &str) -> Result<PathBuf, DocError> {
        if file_path.trim().is_empty() {
            return Err(DocError::MissingPath);
        }

        let path = PathBuf::from(file_path);
        if self.allowed_dirs.is_empty() {
            return Ok(path);
        }

        let canonical = path
            .canonicalize()
            .map_err(|e| DocError::FileAccess(e.to_string()))?;
        if self.allowed_dirs.iter().any(|dir| canonical.starts_with(dir)) {
            Ok(canonical)
        } else {
            Err(DocError::NotAllowed(file_path.to_string()))
        }
    }
}

fn respond<T>(file_path: &str, result: Result<T, DocError>, from_error: fn(&DocError) -> T) -> T {
    result.unwrap_or_else(|err| {
        warn!(file_path, error = %err, "document read failed");
        from_error(&err)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_names() {
        let names: Vec<_> = DocOperation::ALL.iter().map(|op| op.name()).collect();
        assert_eq!(
            names,
            vec![
                "get_document_info",
                "read_document_smart",
                "read_document_by_page",
                "read_document_by_line"
            ]
        );
        assert!(DocOperation::Smart.description().contains("50000"));
    }

    #[test]
    fn test_operation_schemas() {
        let input = DocOperation::Lines.input_schema();
        assert!(input["properties"]["file_path"].is_object());
        assert!(input["properties"]["page_index"].is_object());
        assert_eq!(input["required"], serde_json::json!(["file_path"]));

        let output = DocOperation::Smart.output_schema();
        assert!(output["properties"]["is_truncated"].is_object());
        assert!(output["properties"]["suggestion"].is_object());
    }

    #[tokio::test]
    async fn test_missing_path_reported() {
        let tool = Tool::default();
        let resp = tool.read_smart(SmartReadRequest::new("  ")).await;
        assert_eq!(resp.error_message.as_deref(), Some("file_path is required"));
    }

    #[tokio::test]
    async fn test_call_rejects_bad_arguments() {
        let tool = Tool::default();
        let result = tool
            .call(DocOperation::Pages, serde_json::json!({"start_page": 1}))
            .await;
        assert!(result.is_err());
    }
}
