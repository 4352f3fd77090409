//! SiteForge MCP Server — entry point.

use std::sync::Arc;
use tokio::sync::Mutex;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use siteforge_mcp::config::resolve_config;
use siteforge_mcp::protocol::ProtocolHandler;
use siteforge_mcp::session::PipelineSessionManager;
use siteforge_mcp::tools::ToolRegistry;
use siteforge_mcp::transport::StdioTransport;

#[derive(Parser)]
#[command(
    name = "siteforge-mcp",
    about = "MCP server for SiteForge — generate, containerize, and publish static sites",
    version
)]
struct Cli {
    /// Default storage region for deployments.
    #[arg(short, long)]
    region: Option<String>,

    /// Container build timeout in seconds.
    #[arg(long)]
    build_timeout: Option<u64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server over stdio (default).
    Serve {
        /// Default storage region for deployments.
        #[arg(short, long)]
        region: Option<String>,

        /// Container build timeout in seconds.
        #[arg(long)]
        build_timeout: Option<u64>,

        /// Log level (trace, debug, info, warn, error).
        #[arg(long)]
        log_level: Option<String>,
    },

    /// Print server capabilities as JSON.
    Info,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   siteforge-mcp completions bash > ~/.local/share/bash-completion/completions/siteforge-mcp
    ///   siteforge-mcp completions zsh > ~/.zfunc/_siteforge-mcp
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

/// The serve subcommand's --log-level wins over the top-level flag.
fn effective_log_level(cli: &Cli) -> &str {
    match &cli.command {
        Some(Commands::Serve {
            log_level: Some(level),
            ..
        }) => level,
        _ => &cli.log_level,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(effective_log_level(&cli)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Serve {
        region: None,
        build_timeout: None,
        log_level: None,
    }) {
        Commands::Serve {
            region,
            build_timeout,
            log_level: _,
        } => {
            let effective_region = region.or(cli.region);
            let effective_timeout = build_timeout.or(cli.build_timeout);
            let config = resolve_config(effective_region.as_deref(), effective_timeout);
            tracing::info!(
                region = %config.default_region,
                build_timeout_secs = config.build_timeout_secs,
                "SiteForge MCP server"
            );
            let session = PipelineSessionManager::new(config);
            let session = Arc::new(Mutex::new(session));
            let handler = ProtocolHandler::new(session);
            let transport = StdioTransport::new(handler);
            transport.run().await?;
        }

        Commands::Info => {
            let capabilities = siteforge_mcp::types::InitializeResult::default_result();
            let tools = ToolRegistry::list_tools();
            let info = serde_json::json!({
                "server": capabilities.server_info,
                "protocol_version": capabilities.protocol_version,
                "capabilities": capabilities.capabilities,
                "tools": tools.iter().map(|t| &t.name).collect::<Vec<_>>(),
                "tool_count": tools.len(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "siteforge-mcp", &mut std::io::stdout());
        }
    }

    Ok(())
}
