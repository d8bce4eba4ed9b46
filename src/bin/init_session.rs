//! Session initialization binary.
//!
//! Usage: init_session

use telegram_media_downloader::commands::init_session;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("telegram_media_downloader=info".parse()?),
        )
        .init();

    init_session::run().await?;
    Ok(())
}
