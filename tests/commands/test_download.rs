//! Tests for the channel download loop

use std::fs;
use std::path::Path;

use tempfile::tempdir;

use telegram_media_downloader::commands::download::{
    download_channel_media, run, DownloadArgs, DownloadOptions, RunSummary,
};
use telegram_media_downloader::{Error, FormatFilter};

use crate::{broken_document, document, file_names, photo, text, FakeChannel};

const MB: usize = 1024 * 1024;

fn options(dir: &Path, format: Option<&str>, limit: usize) -> DownloadOptions {
    DownloadOptions {
        output_dir: dir.to_path_buf(),
        filter: FormatFilter::parse(format).unwrap(),
        limit,
    }
}

fn mixed_history() -> FakeChannel {
    FakeChannel::new(vec![
        photo(10, 100),
        document(9, "application/pdf", Some("report.pdf"), 200),
        text(8),
        document(7, "image/png", Some("diagram"), 300),
        document(6, "video/mp4", None, 400),
        document(5, "application/x-unknown-thing", Some("blob.pdf"), 500),
    ])
}

#[tokio::test]
async fn summary_counts_files_and_megabytes() {
    let temp = tempdir().unwrap();
    let mut channel = FakeChannel::new(vec![
        photo(3, MB),
        photo(2, MB),
        document(1, "application/pdf", Some("big.pdf"), 2 * MB),
    ]);

    let summary = download_channel_media(&mut channel, &options(temp.path(), None, 0))
        .await
        .unwrap();

    assert_eq!(summary.files_downloaded, 3);
    assert_eq!(summary.total_bytes, 4 * MB as u64);
    assert_eq!(
        summary.to_string(),
        "Summary: Total files downloaded: 3, Total size: 4.00 MB"
    );
}

#[tokio::test]
async fn decimal_megabyte_fixture_reports_binary_megabytes() {
    let temp = tempdir().unwrap();
    let mut channel = FakeChannel::new(vec![
        photo(3, 1_000_000),
        photo(2, 1_000_000),
        document(1, "application/pdf", Some("doc.pdf"), 2_097_152),
    ]);

    let summary = download_channel_media(&mut channel, &options(temp.path(), None, 0))
        .await
        .unwrap();

    assert_eq!(summary.files_downloaded, 3);
    assert_eq!(summary.total_bytes, 4_097_152);
    assert!(summary.to_string().ends_with("Total size: 3.91 MB"));
}

#[tokio::test]
async fn no_filter_downloads_every_attachment() {
    let temp = tempdir().unwrap();
    let mut channel = mixed_history();

    let summary = download_channel_media(&mut channel, &options(temp.path(), None, 0))
        .await
        .unwrap();

    assert_eq!(summary.files_downloaded, 5);
    assert_eq!(summary.messages_scanned, 6);
    assert_eq!(
        file_names(temp.path()),
        vec!["10.jpg", "6.mp4", "blob.pdf", "diagram.png", "report.pdf"]
    );
}

#[tokio::test]
async fn images_filter_takes_photos_and_image_documents() {
    let temp = tempdir().unwrap();
    let mut channel = mixed_history();

    let summary = download_channel_media(&mut channel, &options(temp.path(), Some("images"), 0))
        .await
        .unwrap();

    assert_eq!(summary.files_downloaded, 2);
    assert_eq!(summary.skipped, 3);
    assert_eq!(file_names(temp.path()), vec!["10.jpg", "diagram.png"]);
}

#[tokio::test]
async fn extension_filter_uses_resolved_extension() {
    let temp = tempdir().unwrap();
    let mut channel = mixed_history();

    let summary = download_channel_media(&mut channel, &options(temp.path(), Some("pdf"), 0))
        .await
        .unwrap();

    // blob.pdf has an unknown MIME type, so its extension does not resolve
    assert_eq!(summary.files_downloaded, 1);
    assert_eq!(file_names(temp.path()), vec!["report.pdf"]);
}

#[tokio::test]
async fn second_run_reuses_existing_files() {
    let temp = tempdir().unwrap();
    let opts = options(temp.path(), None, 0);

    let mut first = mixed_history();
    let first_summary = download_channel_media(&mut first, &opts).await.unwrap();
    let files_after_first = file_names(temp.path());

    let mut second = mixed_history();
    let second_summary = download_channel_media(&mut second, &opts).await.unwrap();

    assert_eq!(second.download_count(), 0);
    assert_eq!(file_names(temp.path()), files_after_first);
    assert_eq!(second_summary.files_downloaded, first_summary.files_downloaded);
    assert_eq!(second_summary.total_bytes, first_summary.total_bytes);
    assert_eq!(second_summary.already_present, first_summary.files_downloaded);
}

#[tokio::test]
async fn stale_temp_files_are_removed_before_scanning() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("10.jpg.tmp"), b"half a photo").unwrap();
    fs::write(temp.path().join("orphan.zip.tmp"), b"junk").unwrap();

    let mut channel = FakeChannel::new(vec![photo(10, 4096)]);
    let summary = download_channel_media(&mut channel, &options(temp.path(), None, 0))
        .await
        .unwrap();

    assert_eq!(summary.files_downloaded, 1);
    assert_eq!(file_names(temp.path()), vec!["10.jpg"]);
    assert_eq!(fs::metadata(temp.path().join("10.jpg")).unwrap().len(), 4096);
}

#[tokio::test]
async fn failed_download_is_skipped_and_scan_continues() {
    let temp = tempdir().unwrap();
    let mut channel = FakeChannel::new(vec![
        photo(3, 10),
        broken_document(2, "application/zip", "archive.zip"),
        document(1, "application/pdf", Some("after.pdf"), 20),
    ]);

    let summary = download_channel_media(&mut channel, &options(temp.path(), None, 0))
        .await
        .unwrap();

    assert_eq!(summary.files_downloaded, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.total_bytes, 30);
    assert_eq!(file_names(temp.path()), vec!["3.jpg", "after.pdf"]);
}

#[tokio::test]
async fn empty_download_does_not_count() {
    let temp = tempdir().unwrap();
    let mut channel = FakeChannel::new(vec![document(1, "application/pdf", Some("empty.pdf"), 0)]);

    let summary = download_channel_media(&mut channel, &options(temp.path(), None, 0))
        .await
        .unwrap();

    assert_eq!(summary, RunSummary { messages_scanned: 1, failed: 1, ..Default::default() });
    assert!(file_names(temp.path()).is_empty());
}

#[tokio::test]
async fn limit_caps_messages_not_files() {
    let temp = tempdir().unwrap();
    let mut channel = FakeChannel::new(vec![text(5), text(4), photo(3, 1), photo(2, 1), photo(1, 1)]);

    let summary = download_channel_media(&mut channel, &options(temp.path(), None, 3))
        .await
        .unwrap();

    assert_eq!(channel.pulled, 3);
    assert_eq!(summary.messages_scanned, 3);
    assert_eq!(summary.files_downloaded, 1);
}

#[tokio::test]
async fn zero_limit_scans_everything() {
    let temp = tempdir().unwrap();
    let history: Vec<_> = (1..=250).rev().map(|id| photo(id, 1)).collect();
    let mut channel = FakeChannel::new(history);

    let summary = download_channel_media(&mut channel, &options(temp.path(), None, 0))
        .await
        .unwrap();

    assert_eq!(channel.pulled, 250);
    assert_eq!(summary.files_downloaded, 250);
}

#[tokio::test]
async fn same_name_twice_in_one_run_is_counted_once() {
    let temp = tempdir().unwrap();
    let mut channel = FakeChannel::new(vec![
        document(2, "application/pdf", Some("report.pdf"), 10),
        document(1, "application/pdf", Some("report"), 99),
    ]);

    let summary = download_channel_media(&mut channel, &options(temp.path(), None, 0))
        .await
        .unwrap();

    assert_eq!(summary.files_downloaded, 1);
    assert_eq!(summary.total_bytes, 10);
    assert_eq!(channel.download_count(), 1);
}

#[tokio::test]
async fn output_directory_is_created() {
    let temp = tempdir().unwrap();
    let nested = temp.path().join("downloads").join("channel");
    let mut channel = FakeChannel::new(vec![photo(1, 8)]);

    download_channel_media(&mut channel, &options(&nested, None, 0))
        .await
        .unwrap();

    assert!(nested.join("1.jpg").exists());
}

#[tokio::test]
async fn unknown_format_stops_before_any_download() {
    let temp = tempdir().unwrap();
    let err = run(DownloadArgs {
        channel: "@some_channel".to_string(),
        format: Some("xyz".to_string()),
        output: Some(temp.path().join("never")),
        limit: Some(10),
    })
    .await
    .unwrap_err();

    assert!(matches!(err, Error::InvalidArgument(_)));
    assert!(!temp.path().join("never").exists());
}

#[tokio::test]
async fn file_named_like_a_partial_survives_the_next_run() {
    let temp = tempdir().unwrap();
    let opts = options(temp.path(), None, 0);
    let history = || {
        FakeChannel::new(vec![document(
            1,
            "application/x-unknown-thing",
            Some("backup.tmp"),
            1000,
        )])
    };

    let mut first = history();
    download_channel_media(&mut first, &opts).await.unwrap();
    assert_eq!(file_names(temp.path()), vec!["backup.tmp_"]);

    let mut second = history();
    let summary = download_channel_media(&mut second, &opts).await.unwrap();

    assert_eq!(second.download_count(), 0);
    assert_eq!(summary.already_present, 1);
    assert_eq!(summary.total_bytes, 1000);
}

#[tokio::test]
async fn directory_in_the_way_is_reported_as_failed() {
    let temp = tempdir().unwrap();
    fs::create_dir(temp.path().join("10.jpg")).unwrap();
    let mut channel = FakeChannel::new(vec![photo(10, 50), photo(9, 50)]);

    let summary = download_channel_media(&mut channel, &options(temp.path(), None, 0))
        .await
        .unwrap();

    assert_eq!(summary.files_downloaded, 1);
    assert_eq!(summary.total_bytes, 50);
    assert_eq!(summary.failed, 1);
    assert_eq!(channel.download_count(), 1);
}
