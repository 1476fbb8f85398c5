//! Tool builder and contract for WebSearch

use schemars::schema_for;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::client::SearchClient;
use crate::config::SessionConfig;
use crate::error::SearchError;
use crate::types::{Region, SearchRequest, SearchResponse};
use crate::{TOOL_DESCRIPTION, TOOL_LLMTXT};

/// Builder for configuring the WebSearch tool
#[derive(Debug, Clone, Default)]
pub struct ToolBuilder {
    config: SessionConfig,
}

impl ToolBuilder {
    /// Create a new tool builder with default session settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the region
    pub fn region(mut self, region: Region) -> Self {
        self.config = self.config.region(region);
        self
    }

    /// Set the maximum number of results
    pub fn max_results(mut self, max_results: usize) -> Self {
        self.config = self.config.max_results(max_results);
        self
    }

    /// Set the per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Route requests through a proxy
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.config = self.config.proxy(proxy);
        self
    }

    /// Replace the whole session configuration
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the tool
    pub fn build(self) -> Result<Tool, SearchError> {
        Ok(Tool {
            client: SearchClient::new(self.config)?,
        })
    }
}

/// Configured WebSearch tool
#[derive(Debug, Clone)]
pub struct Tool {
    client: SearchClient,
}

impl Tool {
    /// Create a new tool builder
    pub fn builder() -> ToolBuilder {
        ToolBuilder::new()
    }

    /// Get tool description
    pub fn description(&self) -> &'static str {
        TOOL_DESCRIPTION
    }

    /// Get full documentation (llmtxt)
    pub fn llmtxt(&self) -> &'static str {
        TOOL_LLMTXT
    }

    /// Get input schema as JSON
    pub fn input_schema(&self) -> serde_json::Value {
        let schema = schema_for!(SearchRequest);
        serde_json::to_value(schema).unwrap_or_default()
    }

    /// Get output schema as JSON
    pub fn output_schema(&self) -> serde_json::Value {
        let schema = schema_for!(SearchResponse);
        serde_json::to_value(schema).unwrap_or_default()
    }

    /// Underlying search session
    pub fn client(&self) -> &SearchClient {
        &self.client
    }

    /// Execute the tool with the given request
    pub async fn execute(&self, req: SearchRequest) -> SearchResponse {
        self.client.search(req).await
    }

    /// Execute the tool, stopping early when `cancel` fires
    pub async fn execute_cancellable(
        &self,
        req: SearchRequest,
        cancel: &CancellationToken,
    ) -> SearchResponse {
        self.client.search_cancellable(req, cancel).await
    }
}
