//! WebTools CLI - web search, fetch and document tools, standalone or over MCP

mod config;
mod logging;
mod mcp;

use clap::{Parser, Subcommand};
use std::io::{self, Write};
use tokio_util::sync::CancellationToken;
use tracing::warn;
use webdoc::{DocumentInfoRequest, SmartReadRequest};
use webfetch::{ContentFormat, WebFetchRequest};
use websearch::{SearchRequest, TimeRange};

use crate::config::{Settings, ToolGroup};
use crate::mcp::ToolRegistry;

/// WebTools - AI-friendly web search and fetch
#[derive(Parser, Debug)]
#[command(name = "webtools")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Print full help with examples (llmtxt)
    #[arg(long)]
    llmtxt: bool,

    /// Log at debug level unless RUST_LOG is set
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(flatten)]
    settings: Settings,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run as MCP (Model Context Protocol) server over stdio
    Mcp {
        /// Tools to expose (comma separated)
        #[arg(long, value_enum, value_delimiter = ',', default_values_t = ToolGroup::ALL)]
        tools: Vec<ToolGroup>,
    },
    /// Search the web and print results as JSON
    Search {
        /// Search keywords
        query: String,

        /// Only results from this period (any, day, week, month, year)
        #[arg(long, short, default_value = "any")]
        time_range: TimeRange,
    },
    /// Fetch URL and print the response as JSON
    Fetch {
        /// URL to fetch
        url: String,

        /// Content format (text, markdown, html, json)
        #[arg(long, short, default_value = "text")]
        format: ContentFormat,

        /// Timeout in seconds (default 30, maximum 120)
        #[arg(long)]
        timeout: Option<u64>,

        /// Custom User-Agent
        #[arg(long)]
        user_agent: Option<String>,
    },
    /// Read a local document and print the response as JSON
    Doc {
        /// Document file path
        file_path: String,

        /// Print document information instead of its content
        #[arg(long)]
        info: bool,

        /// Maximum characters to return (default 50000)
        #[arg(long)]
        max_chars: Option<usize>,

        /// Sample start, middle and end of a large document
        #[arg(long)]
        sample: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Handle --llmtxt flag
    if cli.llmtxt {
        writeln_safe(&format!(
            "{}\n{}\n{}",
            websearch::TOOL_LLMTXT,
            webfetch::TOOL_LLMTXT,
            webdoc::TOOL_LLMTXT
        ));
        return Ok(());
    }

    logging::init(cli.verbose)?;

    match cli.command {
        Some(Commands::Mcp { tools }) => {
            let shutdown = cancel_on_ctrl_c();
            let registry = ToolRegistry::from_groups(&tools, &cli.settings, &shutdown)?;
            mcp::run_server(registry, shutdown).await?;
        }
        Some(Commands::Search { query, time_range }) => {
            run_search(&cli.settings, query, time_range).await?;
        }
        Some(Commands::Fetch {
            url,
            format,
            timeout,
            user_agent,
        }) => {
            run_fetch(&cli.settings, url, format, timeout, user_agent).await?;
        }
        Some(Commands::Doc {
            file_path,
            info,
            max_chars,
            sample,
        }) => {
            run_doc(&cli.settings, file_path, info, max_chars, sample).await?;
        }
        None => {
            eprintln!("Usage: webtools search <QUERY>");
            eprintln!("   or: webtools fetch <URL>");
            eprintln!("   or: webtools doc <FILE>");
            eprintln!("   or: webtools mcp");
            eprintln!("   or: webtools --help");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Token cancelled on the first Ctrl-C
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let watcher = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => watcher.cancel(),
            Err(e) => warn!(error = %e, "failed to listen for Ctrl-C"),
        }
    });
    token
}

async fn run_search(
    settings: &Settings,
    query: String,
    time_range: TimeRange,
) -> anyhow::Result<()> {
    let tool = settings.search_tool()?;
    let cancel = cancel_on_ctrl_c();

    let request = SearchRequest::new(query).time_range(time_range);
    let response = tool.execute_cancellable(request, &cancel).await;

    writeln_safe(&serde_json::to_string_pretty(&response)?);
    if response.is_error() {
        std::process::exit(1);
    }
    Ok(())
}

async fn run_fetch(
    settings: &Settings,
    url: String,
    format: ContentFormat,
    timeout: Option<u64>,
    user_agent: Option<String>,
) -> anyhow::Result<()> {
    let tool = settings.fetch_tool(user_agent);

    let mut request = WebFetchRequest::new(url).format(format);
    if let Some(secs) = timeout {
        request = request.timeout(secs);
    }
    let response = tool.execute(request).await;

    writeln_safe(&serde_json::to_string_pretty(&response)?);
    if response.is_error() {
        std::process::exit(1);
    }
    Ok(())
}

async fn run_doc(
    settings: &Settings,
    file_path: String,
    info: bool,
    max_chars: Option<usize>,
    sample: bool,
) -> anyhow::Result<()> {
    let tool = settings.doc_tool();

    let (json, failed) = if info {
        let response = tool.info(DocumentInfoRequest { file_path }).await;
        (serde_json::to_string_pretty(&response)?, response.is_error())
    } else {
        let mut request = SmartReadRequest::new(file_path).sample_mode(sample);
        request.max_chars = max_chars;
        let response = tool.read_smart(request).await;
        (serde_json::to_string_pretty(&response)?, response.is_error())
    };

    writeln_safe(&json);
    if failed {
        std::process::exit(1);
    }
    Ok(())
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}
