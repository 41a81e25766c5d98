use clap::Parser;
use matchmaker_portal::cli::Cli;
use matchmaker_portal::error::PortalError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so PORTAL_API_URL and friends can live next to the binary
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = matchmaker_portal::config::config();
    tracing::debug!("Portal client in {:?} mode against {}", config.environment, config.api.base_url);

    let cli = Cli::parse();

    if let Err(e) = matchmaker_portal::cli::run(cli, config).await {
        // portal errors were already reported in the requested output format
        if e.downcast_ref::<PortalError>().is_none() {
            match std::env::var("CLI_VERBOSE").as_deref() {
                Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
                _ => eprintln!("Error: {e}"),
            }
        }
        std::process::exit(1);
    }

    Ok(())
}
