

use smartnotes::mcp::run_server;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the MCP protocol
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::from_default_env()
                .add_directive("smartnotes=warn".parse()?)
                .add_directive("smartnotes::mcp=info".parse()?),
        )
        .init();

    run_server().await
}
