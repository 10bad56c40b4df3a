use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use search_skill::api::create_router;
use search_skill::config::Config;
use search_skill::enricher::BatchEnricher;
use search_skill::search::SearchClient;

#[derive(Parser, Debug)]
#[command(about = "Custom web search enrichment skill")]
struct Args {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    #[arg(long, env = "PORT", default_value_t = 7071)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(true)
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;
    tracing::info!(
        endpoint = %config.endpoint,
        market = %config.market,
        count = config.result_count,
        "search skill configured"
    );

    let client = SearchClient::new(config)?;
    let enricher = Arc::new(BatchEnricher::new(Arc::new(client)));
    let app = create_router(enricher);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
