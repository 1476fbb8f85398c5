//! Tool builder and contract for WebFetch

use crate::client::{fetch_with_options, FetchOptions};
use crate::types::{WebFetchRequest, WebFetchResponse};
use crate::{TOOL_DESCRIPTION, TOOL_LLMTXT};
use schemars::schema_for;
use tracing::warn;

/// Builder for configuring the WebFetch tool
#[derive(Debug, Clone, Default)]
pub struct ToolBuilder {
    options: FetchOptions,
}

impl ToolBuilder {
    /// Create a new tool builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom User-Agent
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.options.user_agent = Some(ua.into());
        self
    }

    /// Add URL prefix to allow list
    pub fn allow_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.options.allow_prefixes.push(prefix.into());
        self
    }

    /// Add URL prefix to block list
    pub fn block_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.options.block_prefixes.push(prefix.into());
        self
    }

    /// Route requests through a proxy
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.options.proxy = Some(proxy.into());
        self
    }

    /// Build the tool
    pub fn build(self) -> Tool {
        Tool {
            options: self.options,
        }
    }
}

/// Configured WebFetch tool
#[derive(Debug, Clone, Default)]
pub struct Tool {
    options: FetchOptions,
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
        let schema = schema_for!(WebFetchRequest);
        serde_json::to_value(schema).unwrap_or_default()
    }

    /// Get output schema as JSON
    pub fn output_schema(&self) -> serde_json::Value {
        let schema = schema_for!(WebFetchResponse);
        serde_json::to_value(schema).unwrap_or_default()
    }

    /// Execute the tool with the given request
    ///
    /// Failures are reported through `error_message`.
    pub async fn execute(&self, req: WebFetchRequest) -> WebFetchResponse {
        let url = req.url.clone();
        match fetch_with_options(req, &self.options).await {
            Ok(resp) => resp,
            Err(err) => {
                warn!(%url, error = %err, "fetch failed");
                WebFetchResponse::from_error(&err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_builder() {
        let tool = Tool::builder()
            .user_agent("TestAgent/1.0")
            .allow_prefix("https://allowed.com")
            .block_prefix("https://blocked.com")
            .proxy("http://127.0.0.1:8080")
            .build();

        assert_eq!(tool.options.user_agent, Some("TestAgent/1.0".to_string()));
        assert_eq!(tool.options.allow_prefixes, vec!["https://allowed.com"]);
        assert_eq!(tool.options.block_prefixes, vec!["https://blocked.com"]);
        assert_eq!(
            tool.options.proxy,
            Some("http://127.0.0.1:8080".to_string())
        );
    }

    #[test]
    fn test_tool_description() {
        let tool = Tool::default();
        assert!(tool.description().contains("## When to Use"));
        assert!(!tool.llmtxt().is_empty());
    }

    #[test]
    fn test_tool_schemas() {
        let tool = Tool::default();
        let input_schema = tool.input_schema();
        let output_schema = tool.output_schema();

        assert!(input_schema["properties"]["url"].is_object());
        assert!(input_schema["properties"]["format"].is_object());
        assert!(input_schema["properties"]["timeout"].is_object());
        assert_eq!(input_schema["required"], serde_json::json!(["url"]));

        assert!(output_schema["properties"]["content"].is_object());
        assert!(output_schema["properties"]["status_code"].is_object());
        assert!(output_schema["properties"]["error_message"].is_object());
    }

    #[tokio::test]
    async fn test_execute_reports_errors_in_response() {
        let tool = Tool::default();

        let resp = tool.execute(WebFetchRequest::new("")).await;
        assert_eq!(resp.error_message.as_deref(), Some("URL is required"));

        let resp = tool
            .execute(WebFetchRequest {
                url: "https://example.com".to_string(),
                format: Some("pdf".to_string()),
                timeout: None,
            })
            .await;
        assert_eq!(
            resp.error_message.as_deref(),
            Some("format must be one of: text, markdown, html, json")
        );
    }
}
