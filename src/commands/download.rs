//! Download media from a channel into a local directory.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use crate::config::Config;
use crate::download::{fetch_file, DownloadRecord};
use crate::error::Result;
use crate::filter::FormatFilter;
use crate::media::{resolve_target, MediaKind};
use crate::session::{get_client, SessionLock};
use crate::source::ChannelSource;
use crate::storage::{cleanup_incomplete, ensure_directory};
use crate::telegram::{resolve_channel, ChannelRef, TelegramChannel};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Raw command-line input for a download run.
#[derive(Debug, Clone, Default)]
pub struct DownloadArgs {
    pub channel: String,
    pub format: Option<String>,
    pub output: Option<PathBuf>,
    pub limit: Option<usize>,
}

/// Validated settings for one scan.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub output_dir: PathBuf,
    pub filter: FormatFilter,
    /// Maximum number of messages to look at; 0 means the whole history.
    pub limit: usize,
}

impl DownloadOptions {
    fn limit_reached(&self, scanned: u64) -> bool {
        self.limit != 0 && scanned >= self.limit as u64
    }
}

/// Counters for one run of the download loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files_downloaded: u64,
    pub total_bytes: u64,
    pub messages_scanned: u64,
    pub already_present: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl RunSummary {
    fn record(&mut self, record: &DownloadRecord) {
        self.files_downloaded += 1;
        self.total_bytes += record.size;
        if record.already_present {
            self.already_present += 1;
        }
    }

    pub fn total_megabytes(&self) -> f64 {
        self.total_bytes as f64 / BYTES_PER_MB
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Summary: Total files downloaded: {}, Total size: {:.2} MB",
            self.files_downloaded,
            self.total_megabytes()
        )
    }
}

/// Scan a channel and save every attachment the filter accepts.
///
/// Prepares the output directory first, removing partial files from an
/// earlier interrupted run. Per-file failures are logged and skipped; only
/// errors while reading the history abort the scan.
pub async fn download_channel_media<S: ChannelSource>(
    source: &mut S,
    options: &DownloadOptions,
) -> Result<RunSummary> {
    ensure_directory(&options.output_dir)?;
    cleanup_incomplete(&options.output_dir)?;

    let mut summary = RunSummary::default();
    let mut seen: HashSet<PathBuf> = HashSet::new();

    while !options.limit_reached(summary.messages_scanned) {
        let Some(message) = source.next_message().await? else {
            break;
        };
        summary.messages_scanned += 1;

        let target = resolve_target(message.id, &message.kind);
        let (Some(target), Some(media)) = (target, message.media.as_ref()) else {
            continue;
        };

        let is_photo = matches!(message.kind, MediaKind::Photo);
        if !options.filter.accepts(is_photo, &target) {
            tracing::debug!(
                message_id = message.id,
                file = %target.file_name,
                "Skipping: does not match {}",
                options.filter
            );
            summary.skipped += 1;
            continue;
        }

        let path = target.path_in(&options.output_dir);
        if seen.contains(&path) {
            tracing::debug!(
                message_id = message.id,
                "Skipping: {} already handled in this run",
                path.display()
            );
            summary.skipped += 1;
            continue;
        }

        match fetch_file(&*source, media, &path).await {
            Some(record) => {
                summary.record(&record);
                seen.insert(record.path);
            }
            None => summary.failed += 1,
        }
    }

    tracing::debug!(
        scanned = summary.messages_scanned,
        already_present = summary.already_present,
        skipped = summary.skipped,
        failed = summary.failed,
        "Scan finished"
    );
    tracing::info!("{}", summary);

    Ok(summary)
}

/// Entry point for the download command.
pub async fn run(args: DownloadArgs) -> Result<RunSummary> {
    // Everything that can be rejected locally is checked before connecting.
    let filter = FormatFilter::parse(args.format.as_deref())?;
    let channel = ChannelRef::parse(&args.channel)?;
    let config = Config::new();
    config.require_credentials()?;

    let options = DownloadOptions {
        output_dir: args.output.unwrap_or_else(|| config.output_dir.clone()),
        filter,
        limit: args.limit.unwrap_or(config.default_limit),
    };

    let _lock = SessionLock::acquire(&config)?;
    let client = get_client(&config).await?;

    tracing::info!("Fetching messages from channel: {}", args.channel);
    let peer = resolve_channel(&client, &channel).await?;
    let mut source = TelegramChannel::new(&client, &peer);

    download_channel_media(&mut source, &options).await
}
