//! Telegram media downloader CLI - main entry point
//!
//! Downloads photos and documents from a channel, or lists the dialogs
//! visible to the signed-in account with `--list`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use telegram_media_downloader::commands;

const DEFAULT_LOG_DIRECTIVE: &str = "telegram_media_downloader=info";

#[derive(Parser, Debug)]
#[command(name = "tg_media")]
#[command(about = "Download files from a Telegram channel", long_about = None)]
#[command(version)]
struct Cli {
    /// The username or ID of the Telegram channel
    #[arg(required_unless_present = "list")]
    channel: Option<String>,

    /// The type of files to download: images, documents, videos, audios,
    /// archives, or a specific extension (e.g. pdf, jpg). Downloads all media if omitted
    #[arg(short, long)]
    format: Option<String>,

    /// Directory to save downloaded files [default: .]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum number of messages to fetch, 0 for no limit [default: 100]
    #[arg(short, long)]
    limit: Option<usize>,

    /// List all accessible dialogs (channels, groups, chats) and exit
    #[arg(long, conflicts_with = "channel")]
    list: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env for local development
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE)),
        )
        .init();

    let cli = Cli::parse();

    match execute_command(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("An error occurred: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn execute_command(cli: Cli) -> anyhow::Result<()> {
    if cli.list {
        commands::list_dialogs::run().await?;
        return Ok(());
    }

    // clap guarantees a channel when --list is absent
    let Some(channel) = cli.channel else {
        anyhow::bail!("Please specify a channel or use --list to view available dialogs.");
    };

    commands::download::run(commands::DownloadArgs {
        channel,
        format: cli.format,
        output: cli.output,
        limit: cli.limit,
    })
    .await?;

    Ok(())
}
