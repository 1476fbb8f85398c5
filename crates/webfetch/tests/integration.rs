//! Integration tests for WebFetch using wiremock

use webfetch::{
    fetch, ContentFormat, FetchError, Tool, WebFetchRequest, DEFAULT_USER_AGENT,
    MAX_RESPONSE_SIZE,
};
use tracing_subscriber::EnvFilter;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Test Page</title><style>h1 { color: red }</style></head>
<body>
  <h1>Welcome</h1>
  <p>This is a <strong>test</strong> page.</p>
  <script>console.log("hidden");</script>
  <ul><li>One</li><li>Two</li></ul>
</body>
</html>"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn serve(server: &MockServer, route: &str, template: ResponseTemplate) {
    init_tracing();
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(template)
        .mount(server)
        .await;
}

fn html_page() -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_raw(PAGE, "text/html; charset=utf-8")
}

#[tokio::test]
async fn test_fetch_text_default() {
    let mock_server = MockServer::start().await;
    serve(&mock_server, "/page", html_page()).await;

    let req = WebFetchRequest::new(format!("{}/page", mock_server.uri()));
    let resp = fetch(req).await.unwrap();

    assert_eq!(resp.status_code, Some(200));
    assert_eq!(
        resp.content_type,
        Some("text/html; charset=utf-8".to_string())
    );
    assert_eq!(resp.content, "Welcome\nThis is a test page.\nOne\nTwo");
    assert!(!resp.is_truncated);
    assert!(resp.error_message.is_none());
}

#[tokio::test]
async fn test_fetch_markdown() {
    let mock_server = MockServer::start().await;
    serve(&mock_server, "/page", html_page()).await;

    let req = WebFetchRequest::new(format!("{}/page", mock_server.uri()))
        .format(ContentFormat::Markdown);
    let resp = fetch(req).await.unwrap();

    assert!(resp.content.contains("# Welcome"));
    assert!(resp.content.contains("This is a **test** page."));
    assert!(resp.content.contains("- One\n- Two"));
    assert!(!resp.content.contains("console.log"));
    assert!(!resp.content.contains("color: red"));
}

#[tokio::test]
async fn test_fetch_html_body() {
    let mock_server = MockServer::start().await;
    serve(&mock_server, "/page", html_page()).await;

    let req =
        WebFetchRequest::new(format!("{}/page", mock_server.uri())).format(ContentFormat::Html);
    let resp = fetch(req).await.unwrap();

    assert!(resp.content.starts_with("<html>\n<body>\n"));
    assert!(resp.content.ends_with("\n</body>\n</html>"));
    assert!(resp.content.contains("<h1>Welcome</h1>"));
    assert!(!resp.content.contains("<title>"));
}

#[tokio::test]
async fn test_fetch_json_unchanged() {
    let mock_server = MockServer::start().await;
    let body = r#"{"name": "webtools", "tags": ["a", "b"]}"#;
    serve(
        &mock_server,
        "/api",
        ResponseTemplate::new(200)
            .set_body_raw(body, "application/json"),
    )
    .await;

    let req =
        WebFetchRequest::new(format!("{}/api", mock_server.uri())).format(ContentFormat::Json);
    let resp = fetch(req).await.unwrap();

    assert_eq!(resp.content, body);
    assert_eq!(resp.content_type, Some("application/json".to_string()));
}

#[tokio::test]
async fn test_fetch_markdown_non_html_is_fenced() {
    let mock_server = MockServer::start().await;
    serve(
        &mock_server,
        "/notes.txt",
        ResponseTemplate::new(200)
            .set_body_string("line one\nline two")
            .insert_header("content-type", "text/plain"),
    )
    .await;

    let req = WebFetchRequest::new(format!("{}/notes.txt", mock_server.uri()))
        .format(ContentFormat::Markdown);
    let resp = fetch(req).await.unwrap();

    assert_eq!(resp.content, "```\nline one\nline two\n```");
}

#[tokio::test]
async fn test_format_is_case_insensitive() {
    let mock_server = MockServer::start().await;
    serve(&mock_server, "/page", html_page()).await;

    let req = WebFetchRequest {
        url: format!("{}/page", mock_server.uri()),
        format: Some("MARKDOWN".to_string()),
        timeout: None,
    };
    let resp = fetch(req).await.unwrap();

    assert!(resp.content.contains("# Welcome"));
}

#[tokio::test]
async fn test_non_ok_status_is_error() {
    let mock_server = MockServer::start().await;
    serve(
        &mock_server,
        "/missing",
        ResponseTemplate::new(404).set_body_string("Not Found"),
    )
    .await;

    let url = format!("{}/missing", mock_server.uri());
    let err = fetch(WebFetchRequest::new(&url)).await.unwrap_err();
    assert!(matches!(err, FetchError::HttpStatus(404)));

    let resp = Tool::default().execute(WebFetchRequest::new(&url)).await;
    assert_eq!(resp.status_code, Some(404));
    assert_eq!(
        resp.error_message.as_deref(),
        Some("request failed with status code: 404")
    );
    assert!(resp.content.is_empty());
}

#[tokio::test]
async fn test_invalid_format_never_requests() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html_page())
        .expect(0)
        .mount(&mock_server)
        .await;

    let req = WebFetchRequest {
        url: format!("{}/page", mock_server.uri()),
        format: Some("xml".to_string()),
        timeout: None,
    };
    let err = fetch(req).await.unwrap_err();
    assert!(matches!(err, FetchError::InvalidFormat));
}

#[tokio::test]
async fn test_invalid_urls() {
    let err = fetch(WebFetchRequest::new("")).await.unwrap_err();
    assert!(matches!(err, FetchError::MissingUrl));

    let err = fetch(WebFetchRequest::new("file:///etc/passwd"))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::InvalidUrlScheme));
}

#[tokio::test]
async fn test_truncates_large_body() {
    let mock_server = MockServer::start().await;
    let body = "a".repeat(MAX_RESPONSE_SIZE + 1024);
    serve(
        &mock_server,
        "/big",
        ResponseTemplate::new(200)
            .set_body_string(body)
            .insert_header("content-type", "text/plain"),
    )
    .await;

    let req = WebFetchRequest::new(format!("{}/big", mock_server.uri())).format(ContentFormat::Json);
    let resp = fetch(req).await.unwrap();

    assert!(resp.is_truncated);
    assert_eq!(resp.content.len(), MAX_RESPONSE_SIZE);
}

#[tokio::test]
async fn test_body_at_size_limit_is_complete() {
    let mock_server = MockServer::start().await;
    let body = "a".repeat(MAX_RESPONSE_SIZE);
    serve(
        &mock_server,
        "/exact",
        ResponseTemplate::new(200)
            .set_body_string(body)
            .insert_header("content-type", "text/plain"),
    )
    .await;

    let req =
        WebFetchRequest::new(format!("{}/exact", mock_server.uri())).format(ContentFormat::Json);
    let resp = fetch(req).await.unwrap();

    assert!(!resp.is_truncated);
    assert_eq!(resp.content.len(), MAX_RESPONSE_SIZE);
}

#[tokio::test]
async fn test_invalid_utf8_body() {
    let mock_server = MockServer::start().await;
    serve(
        &mock_server,
        "/bin",
        ResponseTemplate::new(200)
            .set_body_bytes(vec![0xff, 0xfe, 0x00, 0x41])
            .insert_header("content-type", "text/plain"),
    )
    .await;

    let err = fetch(WebFetchRequest::new(format!("{}/bin", mock_server.uri())))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::InvalidUtf8));
}

#[tokio::test]
async fn test_user_agent_header() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ua"))
        .and(header("user-agent", DEFAULT_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/ua"))
        .and(header("user-agent", "CustomBot/2.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("custom"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/ua", mock_server.uri());
    let resp = fetch(WebFetchRequest::new(&url)).await.unwrap();
    assert_eq!(resp.content, "ok");

    let tool = Tool::builder().user_agent("CustomBot/2.0").build();
    let resp = tool.execute(WebFetchRequest::new(&url)).await;
    assert_eq!(resp.content, "custom");
}

#[tokio::test]
async fn test_tool_prefix_lists() {
    let mock_server = MockServer::start().await;
    serve(&mock_server, "/page", html_page()).await;

    let allowed = format!("{}/page", mock_server.uri());
    let tool = Tool::builder()
        .allow_prefix(mock_server.uri())
        .block_prefix(format!("{}/private", mock_server.uri()))
        .build();

    let resp = tool.execute(WebFetchRequest::new(&allowed)).await;
    assert!(resp.error_message.is_none());

    let resp = tool
        .execute(WebFetchRequest::new(format!(
            "{}/private/page",
            mock_server.uri()
        )))
        .await;
    assert_eq!(
        resp.error_message.as_deref(),
        Some("blocked URL: prefix not allowed")
    );

    let resp = tool
        .execute(WebFetchRequest::new("https://elsewhere.example/"))
        .await;
    assert!(resp.is_error());
}

#[tokio::test]
async fn test_follows_redirect() {
    let mock_server = MockServer::start().await;
    serve(
        &mock_server,
        "/old",
        ResponseTemplate::new(302).insert_header("location", "/new"),
    )
    .await;
    serve(
        &mock_server,
        "/new",
        ResponseTemplate::new(200)
            .set_body_string("moved here")
            .insert_header("content-type", "text/plain"),
    )
    .await;

    let resp = fetch(WebFetchRequest::new(format!("{}/old", mock_server.uri())))
        .await
        .unwrap();
    assert_eq!(resp.status_code, Some(200));
    assert_eq!(resp.content, "moved here");
}
