use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use mcp_tool_bridge::{
    BridgeServer, BridgeService, HttpConnector, McpBridgePlugin, ToolHost, load_bridge_config,
};

// rmcp imports for MCP stdio server mode
use rmcp::service::ServiceExt;
use rmcp::transport::stdio;

#[derive(Parser)]
#[command(name = "mcp-tool-bridge")]
#[command(about = "Expose the tools of remote MCP servers through one MCP endpoint")]
struct Cli {
    /// Path to the host configuration file (defaults to $MCP_BRIDGE_CONFIG,
    /// then $XDG_CONFIG_HOME/mcp-bridge/config.json, then ./mcp-bridge.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run as an MCP stdio server
    Stdio,
    /// Run as an MCP HTTP server
    Http {
        /// Bind address, e.g. 0.0.0.0:3943
        #[arg(long, default_value = "127.0.0.1:3943")]
        bind: String,
    },
    /// Connect to the configured servers and print their tools
    List {
        /// Only list tools of this server
        #[arg(long)]
        server: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays free for the stdio transport.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("mcp_tool_bridge=info".parse()?)
                .add_directive("rmcp=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let bridge_config = load_bridge_config(cli.config.as_deref())?;

    let host = Arc::new(ToolHost::new());
    let service = McpBridgePlugin::new(bridge_config, Arc::new(HttpConnector)).register(&host);

    match cli.command {
        Commands::Stdio => {
            info!("Starting MCP stdio server");
            host.start_services().await?;

            let server = BridgeServer::new(host.as_ref().clone());
            let running = server
                .serve(stdio())
                .await
                .inspect_err(|e| tracing::error!("serving error: {:?}", e))?;

            // Block until the MCP session ends.
            let quit = running.waiting().await;
            host.stop_services().await;
            quit?;
            info!("MCP stdio server session ended");
        }
        Commands::Http { bind } => {
            info!("Starting MCP HTTP server on {}", bind);
            host.start_services().await?;

            let server = BridgeServer::new(host.as_ref().clone());
            let served = tokio::select! {
                res = mcp_tool_bridge::server::start_mcp_http(server, &bind) => res,
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted, shutting down");
                    Ok(())
                }
            };
            host.stop_services().await;
            served?;
        }
        Commands::List { server } => {
            host.start_services().await?;
            let printed = print_tools(&service, server.as_deref()).await;
            host.stop_services().await;
            printed?;
        }
    }

    Ok(())
}

async fn print_tools(service: &BridgeService, server: Option<&str>) -> Result<()> {
    let registry = service
        .registry()
        .await
        .ok_or_else(|| anyhow::anyhow!("Bridge did not start"))?;

    let entries = registry.list(server).await;
    if entries.is_empty() {
        println!("No tools found.");
        return Ok(());
    }

    println!("{:<40} {:<20} {}", "REGISTERED NAME", "SERVER", "DESCRIPTION");
    println!("{}", "-".repeat(100));
    for entry in entries {
        let description = entry
            .descriptor
            .description
            .as_deref()
            .unwrap_or("-")
            .lines()
            .next()
            .unwrap_or("-");
        println!(
            "{:<40} {:<20} {}",
            entry.registered_name(),
            entry.server(),
            description
        );
    }
    Ok(())
}
