use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use favicon_proxy::{
    config::Config,
    services::FaviconService,
    utils::HttpClientFactory,
    web::{AppState, WebServer},
};

#[derive(Parser)]
#[command(name = "favicon-proxy")]
#[command(version)]
#[command(about = "Resolves and renders the best available favicon for any domain")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = if cli.log_level == "trace" {
        format!("favicon_proxy={},tower_http=trace", cli.log_level)
    } else {
        format!("favicon_proxy={}", cli.log_level)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Favicon Proxy v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }

    let http_factory = HttpClientFactory::new(&config.http);
    let fetcher = http_factory.create_shared_fetcher()?;
    info!("HTTP client initialized (user agent: {})", http_factory.user_agent());

    let favicon_service = FaviconService::from_config(&config, fetcher);
    info!(
        "Transparency cache: capacity {}, ttl {}",
        config.transparency_cache.capacity,
        humantime::format_duration(config.transparency_cache.ttl)
    );

    let server = WebServer::new(AppState::new(config, favicon_service))?;
    info!("Web server configured for {}", server.addr());

    server.serve().await
}
