use clap::Parser;
use futures::StreamExt;
use prospector::adapters::health_handler::HealthHandler;
use prospector::cli::{Cli, Command};
use prospector::config::Settings;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; logs go to stderr so research output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("prospector=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::new_with_cli(&cli)?;
    let credentials = settings.credentials()?;
    let agent = prospector::build_agent(&settings, &credentials)?;

    if let Some(Command::Research { goal, profile_url }) = cli.command {
        let mut events = agent.run(goal, profile_url);
        let mut stdout = std::io::stdout();
        while let Some(event) = events.next().await {
            writeln!(stdout, "{}", serde_json::to_string(&event)?)?;
            stdout.flush()?;
        }
        return Ok(());
    }

    let health_handler = Arc::new(HealthHandler::new(agent.registry().len(), settings.llm.model.clone()));
    let app = prospector::create_app(agent, health_handler);

    // Start server
    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
