//! Command-line settings shared by every subcommand

use clap::{Args, ValueEnum};
use std::path::PathBuf;
use websearch::{Region, SearchError, SessionConfig, DEFAULT_MAX_RESULTS};

/// Session settings, with environment fallbacks
#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// Proxy URL for search and fetch requests
    #[arg(long, global = true, env = "MCP_PROXY_URL")]
    pub proxy: Option<String>,

    /// Search region (wt-wt, us-en, uk-en, de-de, fr-fr, jp-jp, cn-zh, ru-ru)
    #[arg(long, global = true, env = "WEBTOOLS_REGION", default_value = "wt-wt")]
    pub region: Region,

    /// Maximum number of search results
    #[arg(long, global = true, env = "WEBTOOLS_MAX_RESULTS", default_value_t = DEFAULT_MAX_RESULTS)]
    pub max_results: usize,

    /// Directories the document tools may read (comma separated; default: any)
    #[arg(
        long = "doc-root",
        global = true,
        env = "WEBTOOLS_DOC_ROOT",
        value_delimiter = ','
    )]
    pub doc_roots: Vec<PathBuf>,
}

impl Settings {
    fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref().filter(|p| !p.trim().is_empty())
    }

    /// Search session configuration
    pub fn session_config(&self) -> SessionConfig {
        let config = SessionConfig::new()
            .region(self.region)
            .max_results(self.max_results);
        match self.proxy() {
            Some(proxy) => config.proxy(proxy),
            None => config,
        }
    }

    /// Build the search tool
    pub fn search_tool(&self) -> Result<websearch::Tool, SearchError> {
        websearch::Tool::builder()
            .config(self.session_config())
            .build()
    }

    /// Build the fetch tool
    pub fn fetch_tool(&self, user_agent: Option<String>) -> webfetch::Tool {
        let mut builder = webfetch::Tool::builder();
        if let Some(proxy) = self.proxy() {
            builder = builder.proxy(proxy);
        }
        if let Some(ua) = user_agent {
            builder = builder.user_agent(ua);
        }
        builder.build()
    }

    /// Build the document tool
    pub fn doc_tool(&self) -> webdoc::Tool {
        self.doc_roots
            .iter()
            .fold(webdoc::Tool::builder(), |builder, dir| builder.allow_dir(dir))
            .build()
    }
}

/// Tool groups that can be served over MCP
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ToolGroup {
    /// Web search
    Search,
    /// URL fetch
    Fetch,
    /// Local document reading
    Doc,
}

impl ToolGroup {
    /// Every group, in registration order
    pub const ALL: [ToolGroup; 3] = [ToolGroup::Search, ToolGroup::Fetch, ToolGroup::Doc];
}
