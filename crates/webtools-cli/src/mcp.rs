//! MCP (Model Context Protocol) server implementation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{Settings, ToolGroup};

const PROTOCOL_VERSION: &str = "2025-06-18";

/// JSON-RPC 2.0 request
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct JsonRpcRequest {
    jsonrpc: String,
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

/// JSON-RPC 2.0 response
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error
#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

impl JsonRpcResponse {
    fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }

    fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// A tool the server can expose
#[async_trait]
pub trait McpTool: Send + Sync {
    /// Name used in `tools/call`
    fn name(&self) -> &'static str;

    /// Description shown to the model
    fn description(&self) -> &'static str;

    /// JSON schema of the arguments
    fn input_schema(&self) -> Value;

    /// JSON schema of the structured result
    fn output_schema(&self) -> Value;

    /// Run the tool
    ///
    /// Arguments that do not deserialize are the only `Err`; failures of the
    /// tool itself are part of the returned value.
    async fn call(&self, arguments: Value) -> Result<Value, serde_json::Error>;
}

/// `search` tool handler
pub struct SearchTool {
    tool: websearch::Tool,
    cancel: CancellationToken,
}

impl SearchTool {
    pub fn new(tool: websearch::Tool, cancel: CancellationToken) -> Self {
        Self { tool, cancel }
    }
}

#[async_trait]
impl McpTool for SearchTool {
    fn name(&self) -> &'static str {
        "search"
    }

    fn description(&self) -> &'static str {
        self.tool.description()
    }

    fn input_schema(&self) -> Value {
        self.tool.input_schema()
    }

    fn output_schema(&self) -> Value {
        self.tool.output_schema()
    }

    async fn call(&self, arguments: Value) -> Result<Value, serde_json::Error> {
        let request: websearch::SearchRequest = serde_json::from_value(arguments)?;
        let response = self.tool.execute_cancellable(request, &self.cancel).await;
        serde_json::to_value(response)
    }
}

/// `fetch` tool handler
pub struct FetchTool {
    tool: webfetch::Tool,
}

impl FetchTool {
    pub fn new(tool: webfetch::Tool) -> Self {
        Self { tool }
    }
}

#[async_trait]
impl McpTool for FetchTool {
    fn name(&self) -> &'static str {
        "fetch"
    }

    fn description(&self) -> &'static str {
        self.tool.description()
    }

    fn input_schema(&self) -> Value {
        self.tool.input_schema()
    }

    fn output_schema(&self) -> Value {
        self.tool.output_schema()
    }

    async fn call(&self, arguments: Value) -> Result<Value, serde_json::Error> {
        let request: webfetch::WebFetchRequest = serde_json::from_value(arguments)?;
        let response = self.tool.execute(request).await;
        serde_json::to_value(response)
    }
}

/// Handler for one document operation
pub struct DocTool {
    tool: webdoc::Tool,
    op: webdoc::DocOperation,
}

impl DocTool {
    pub fn new(tool: webdoc::Tool, op: webdoc::DocOperation) -> Self {
        Self { tool, op }
    }
}

#[async_trait]
impl McpTool for DocTool {
    fn name(&self) -> &'static str {
        self.op.name()
    }

    fn description(&self) -> &'static str {
        self.op.description()
    }

    fn input_schema(&self) -> Value {
        self.op.input_schema()
    }

    fn output_schema(&self) -> Value {
        self.op.output_schema()
    }

    async fn call(&self, arguments: Value) -> Result<Value, serde_json::Error> {
        self.tool.call(self.op, arguments).await
    }
}

/// Ordered set of tools served by the MCP server
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn McpTool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry with the selected tool groups
    pub fn from_groups(
        groups: &[ToolGroup],
        settings: &Settings,
        cancel: &CancellationToken,
    ) -> anyhow::Result<Self> {
        let mut registry = Self::new();
        for group in ToolGroup::ALL {
            if !groups.contains(&group) {
                continue;
            }
            match group {
                ToolGroup::Search => {
                    registry.register(SearchTool::new(settings.search_tool()?, cancel.clone()))
                }
                ToolGroup::Fetch => registry.register(FetchTool::new(settings.fetch_tool(None))),
                ToolGroup::Doc => {
                    let tool = settings.doc_tool();
                    for op in webdoc::DocOperation::ALL {
                        registry.register(DocTool::new(tool.clone(), op));
                    }
                }
            }
        }
        Ok(registry)
    }

    /// Register a tool; a tool with the same name is replaced
    pub fn register<T: McpTool + 'static>(&mut self, tool: T) {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(Box::new(tool));
    }

    /// Find a tool by name
    pub fn get(&self, name: &str) -> Option<&dyn McpTool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    /// Registered tool names, in order
    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    fn iter(&self) -> impl Iterator<Item = &dyn McpTool> {
        self.tools.iter().map(|t| t.as_ref())
    }
}

/// MCP Server implementation
pub struct McpServer {
    registry: ToolRegistry,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    /// Handle one line of input
    ///
    /// Returns the serialized response, or `None` for notifications and
    /// blank lines.
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        if line.trim().is_empty() {
            return None;
        }

        let response = match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) if request.id.is_none() => {
                debug!(method = %request.method, "notification received");
                return None;
            }
            Ok(request) => self.handle_request(request).await,
            Err(e) => {
                warn!(error = %e, "malformed message");
                JsonRpcResponse::error(None, -32700, format!("Parse error: {}", e))
            }
        };

        match serde_json::to_string(&response) {
            Ok(json) => Some(json),
            Err(e) => {
                warn!(error = %e, "failed to serialize response");
                None
            }
        }
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let started = Instant::now();
        let method = request.method.clone();
        let tool = request
            .params
            .get("name")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let response = match method.as_str() {
            "initialize" => self.handle_initialize(request.id),
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "tools/list" => self.handle_tools_list(request.id),
            "tools/call" => self.handle_tools_call(request.id, request.params).await,
            _ => JsonRpcResponse::error(
                request.id,
                -32601,
                format!("Method not found: {}", request.method),
            ),
        };

        let tool_failed = response
            .result
            .as_ref()
            .and_then(|r| r.get("isError"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        info!(
            %method,
            tool = tool.as_deref().unwrap_or("-"),
            duration_ms = started.elapsed().as_millis() as u64,
            ok = !response.is_error() && !tool_failed,
            "request handled"
        );

        response
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": "webtools",
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        )
    }

    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        let tools: Vec<Value> = self
            .registry
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "inputSchema": tool.input_schema(),
                    "outputSchema": tool.output_schema()
                })
            })
            .collect();

        JsonRpcResponse::success(id, json!({ "tools": tools }))
    }

    async fn handle_tools_call(&self, id: Option<Value>, params: Value) -> JsonRpcResponse {
        let tool_name = params
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or_default();

        let Some(tool) = self.registry.get(tool_name) else {
            return JsonRpcResponse::error(id, -32602, format!("Unknown tool: {}", tool_name));
        };

        let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

        let output = match tool.call(arguments).await {
            Ok(output) => output,
            Err(e) => {
                return JsonRpcResponse::error(id, -32602, format!("Invalid arguments: {}", e));
            }
        };

        let is_error = output
            .get("error_message")
            .map(|v| !v.is_null())
            .unwrap_or(false);

        JsonRpcResponse::success(
            id,
            json!({
                "content": [{
                    "type": "text",
                    "text": serde_json::to_string_pretty(&output).unwrap_or_default()
                }],
                "structuredContent": output,
                "isError": is_error
            }),
        )
    }
}

/// Run the MCP server over stdio until stdin closes or `shutdown` fires
pub async fn run_server(registry: ToolRegistry, shutdown: CancellationToken) -> anyhow::Result<()> {
    info!(tools = ?registry.names(), "MCP server listening on stdio");

    let server = Arc::new(McpServer::new(registry));
    serve(
        server,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        shutdown,
    )
    .await?;

    info!("MCP server stopped");
    Ok(())
}

/// Read requests line by line from `input` and write responses to `output`
///
/// Every request runs on its own task, so a slow tool call never holds up
/// the requests behind it. Responses are written in completion order.
/// At end of input the requests still in flight are awaited; on shutdown
/// they are aborted.
async fn serve<R, W>(
    server: Arc<McpServer>,
    input: R,
    mut output: W,
    shutdown: CancellationToken,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let writer = tokio::spawn(async move {
        while let Some(json) = rx.recv().await {
            output.write_all(json.as_bytes()).await?;
            output.write_all(b"\n").await?;
            output.flush().await?;
        }
        Ok::<_, std::io::Error>(())
    });

    let mut lines = input.lines();
    let mut in_flight = JoinSet::new();

    loop {
        let line = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            break;
        };

        let server = Arc::clone(&server);
        let tx = tx.clone();
        in_flight.spawn(async move {
            if let Some(json) = server.handle_line(&line).await {
                // Only fails once the writer is gone
                let _ = tx.send(json);
            }
        });

        while in_flight.try_join_next().is_some() {}
    }

    if shutdown.is_cancelled() {
        in_flight.abort_all();
    }
    while let Some(joined) = in_flight.join_next().await {
        if let Err(e) = joined {
            if !e.is_cancelled() {
                warn!(error = %e, "request task failed");
            }
        }
    }

    drop(tx);
    writer.await??;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::AsyncReadExt;

    /// Tool that echoes its `text` argument, or reports it as an error
    struct EchoTool;

    #[derive(Deserialize)]
    struct EchoArgs {
        text: String,
        #[serde(default)]
        fail: bool,
    }

    #[async_trait]
    impl McpTool for EchoTool {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn description(&self) -> &'static str {
            "Echo the input"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object", "properties": {"text": {"type": "string"}}})
        }

        fn output_schema(&self) -> Value {
            json!({"type": "object"})
        }

        async fn call(&self, arguments: Value) -> Result<Value, serde_json::Error> {
            let args: EchoArgs = serde_json::from_value(arguments)?;
            if args.fail {
                Ok(json!({ "error_message": args.text }))
            } else {
                Ok(json!({ "content": args.text }))
            }
        }
    }

    /// Tool that answers after a fixed delay
    struct SlowTool;

    #[async_trait]
    impl McpTool for SlowTool {
        fn name(&self) -> &'static str {
            "slow"
        }

        fn description(&self) -> &'static str {
            "Answer late"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object"})
        }

        fn output_schema(&self) -> Value {
            json!({"type": "object"})
        }

        async fn call(&self, _arguments: Value) -> Result<Value, serde_json::Error> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(json!({ "content": "done" }))
        }
    }

    fn server() -> McpServer {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);
        McpServer::new(registry)
    }

    async fn call(server: &McpServer, line: &str) -> Value {
        let out = server.handle_line(line).await.expect("response");
        serde_json::from_str(&out).unwrap()
    }

    #[tokio::test]
    async fn test_initialize() {
        let resp = call(
            &server(),
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
        )
        .await;
        assert_eq!(resp["id"], 1);
        assert_eq!(resp["result"]["serverInfo"]["name"], "webtools");
        assert_eq!(resp["result"]["protocolVersion"], PROTOCOL_VERSION);
    }

    #[tokio::test]
    async fn test_ping() {
        let resp = call(&server(), r#"{"jsonrpc":"2.0","id":"p","method":"ping"}"#).await;
        assert_eq!(resp["id"], "p");
        assert_eq!(resp["result"], json!({}));
    }

    #[tokio::test]
    async fn test_tools_list() {
        let resp = call(&server(), r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#).await;
        let tools = resp["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], "echo");
        assert!(tools[0]["inputSchema"]["properties"]["text"].is_object());
    }

    #[tokio::test]
    async fn test_tools_call_success() {
        let resp = call(
            &server(),
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"echo","arguments":{"text":"hi"}}}"#,
        )
        .await;
        let result = &resp["result"];
        assert_eq!(result["isError"], false);
        assert_eq!(result["structuredContent"]["content"], "hi");
        assert_eq!(result["content"][0]["type"], "text");
        assert!(result["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("\"content\": \"hi\""));
    }

    #[tokio::test]
    async fn test_tools_call_error_message_sets_is_error() {
        let resp = call(
            &server(),
            r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"echo","arguments":{"text":"boom","fail":true}}}"#,
        )
        .await;
        assert_eq!(resp["result"]["isError"], true);
        assert_eq!(resp["result"]["structuredContent"]["error_message"], "boom");
    }

    #[tokio::test]
    async fn test_tools_call_invalid_arguments() {
        let resp = call(
            &server(),
            r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"echo","arguments":{}}}"#,
        )
        .await;
        assert_eq!(resp["error"]["code"], -32602);
        assert!(resp["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid arguments"));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let resp = call(
            &server(),
            r#"{"jsonrpc":"2.0","id":6,"method":"tools/call","params":{"name":"nope"}}"#,
        )
        .await;
        assert_eq!(resp["error"]["code"], -32602);
        assert_eq!(resp["error"]["message"], "Unknown tool: nope");
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let resp = call(&server(), r#"{"jsonrpc":"2.0","id":7,"method":"resources/list"}"#).await;
        assert_eq!(resp["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn test_parse_error() {
        let resp = call(&server(), "{not json").await;
        assert_eq!(resp["error"]["code"], -32700);
        assert!(resp.get("id").is_none());
    }

    #[tokio::test]
    async fn test_notifications_and_blank_lines_ignored() {
        let server = server();
        assert!(server
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await
            .is_none());
        assert!(server.handle_line("   ").await.is_none());
    }

    #[tokio::test]
    async fn test_registry_from_groups() {
        let settings = Settings {
            proxy: None,
            region: websearch::Region::World,
            max_results: 5,
            doc_roots: Vec::new(),
        };
        let cancel = CancellationToken::new();

        let all = ToolRegistry::from_groups(&ToolGroup::ALL, &settings, &cancel).unwrap();
        assert_eq!(
            all.names(),
            vec![
                "search",
                "fetch",
                "get_document_info",
                "read_document_smart",
                "read_document_by_page",
                "read_document_by_line"
            ]
        );

        let fetch_only =
            ToolRegistry::from_groups(&[ToolGroup::Fetch], &settings, &cancel).unwrap();
        assert_eq!(fetch_only.names(), vec!["fetch"]);
        assert!(fetch_only.get("search").is_none());
    }

    #[tokio::test]
    async fn test_search_tool_validation_error() {
        let settings = Settings {
            proxy: None,
            region: websearch::Region::World,
            max_results: 5,
            doc_roots: Vec::new(),
        };
        let cancel = CancellationToken::new();
        let registry = ToolRegistry::from_groups(&[ToolGroup::Search], &settings, &cancel).unwrap();
        let server = McpServer::new(registry);

        let resp = call(
            &server,
            r#"{"jsonrpc":"2.0","id":8,"method":"tools/call","params":{"name":"search","arguments":{"query":"   "}}}"#,
        )
        .await;
        assert_eq!(resp["result"]["isError"], true);
        assert_eq!(
            resp["result"]["structuredContent"]["error_message"],
            "search query is required, please provide a query string"
        );
    }

    #[tokio::test]
    async fn test_doc_tool_call() {
        let settings = Settings {
            proxy: None,
            region: websearch::Region::World,
            max_results: 5,
            doc_roots: Vec::new(),
        };
        let cancel = CancellationToken::new();
        let registry = ToolRegistry::from_groups(&[ToolGroup::Doc], &settings, &cancel).unwrap();
        let server = McpServer::new(registry);

        let resp = call(
            &server,
            r#"{"jsonrpc":"2.0","id":9,"method":"tools/call","params":{"name":"get_document_info","arguments":{"file_path":"/nonexistent/report.pdf"}}}"#,
        )
        .await;
        assert_eq!(resp["result"]["isError"], true);
        assert!(resp["result"]["structuredContent"]["error_message"]
            .as_str()
            .unwrap()
            .starts_with("File access failed:"));

        let resp = call(
            &server,
            r#"{"jsonrpc":"2.0","id":10,"method":"tools/call","params":{"name":"read_document_by_page","arguments":{}}}"#,
        )
        .await;
        assert_eq!(resp["error"]["code"], -32602);
    }

    /// Run `serve` over `input` and collect the response ids in write order
    async fn served_ids(input: &str, shutdown: CancellationToken) -> Vec<Value> {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);
        registry.register(SlowTool);

        let (mut client, output) = tokio::io::duplex(64 * 1024);
        serve(Arc::new(McpServer::new(registry)), input.as_bytes(), output, shutdown)
            .await
            .unwrap();

        let mut written = String::new();
        client.read_to_string(&mut written).await.unwrap();
        written
            .lines()
            .map(|line| serde_json::from_str::<Value>(line).unwrap()["id"].clone())
            .collect()
    }

    #[tokio::test]
    async fn test_slow_call_does_not_block_later_requests() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"slow","arguments":{}}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"echo","arguments":{"text":"hi"}}}"#,
            "\n",
        );

        let ids = served_ids(input, CancellationToken::new()).await;

        assert_eq!(ids.len(), 3);
        // The slow call answers last even though it arrived first
        assert_eq!(ids[2], json!(1));
        assert!(ids.contains(&json!(2)));
        assert!(ids.contains(&json!(3)));
    }

    #[tokio::test]
    async fn test_serve_stops_on_shutdown() {
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        let ids = served_ids(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#, shutdown).await;
        assert!(ids.is_empty());
    }
}
