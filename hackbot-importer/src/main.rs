use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = hackbot_core::Config::load()?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.settings.logging.level.as_str().into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Importing ready issues from {} (label: {})",
        config.settings.github.repo, config.settings.github.ready_label
    );
    let count = hackbot_importer::run_import(&config).await?;
    info!("Import finished: {} projects", count);
    Ok(())
}
