//! Integration tests for collage export orchestration.
//!
//! The rasterizer and download sink are in-memory fakes so the tests can
//! observe call counts, block a render mid-flight, and inject failures.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use regex::Regex;
use sha2::{Digest, Sha256};
use tokio::sync::Notify;

use booth::collage::CollageView;
use booth::error::BoothError;
use booth::export::{
    COPY_QUALITY, DEFAULT_PRODUCT_NAME, DirectorySink, ExportOrchestrator, ExportSettings,
    FilenameScheme, LoadState, Notice, RenderNode,
};
use booth::session::Snapshot;
use booth::style::{Layout, StyleState};

use crate::common::fakes::{FAKE_JPEG, FakeRasterizer, FullDiskSink, MemorySink};
use crate::common::fixtures::png_snapshots;
use crate::common::init_test_logging;

fn mounted(count: usize) -> RenderNode {
    let mut style = StyleState::default();
    style.layout = Layout::Masonry;
    let mut view = CollageView::new(png_snapshots(count), style);
    view.render_node_on(NaiveDate::from_ymd_opt(2024, 5, 17).unwrap())
}

fn orchestrator(
    rasterizer: FakeRasterizer,
) -> ExportOrchestrator<FakeRasterizer, MemorySink> {
    ExportOrchestrator::new(
        rasterizer,
        MemorySink::new(),
        DEFAULT_PRODUCT_NAME,
        ExportSettings::default(),
    )
    .unwrap()
}

// ===== Happy path =====

#[tokio::test]
async fn test_export_delivers_one_dated_jpeg() {
    init_test_logging();
    let node = mounted(4);
    node.decode_all();
    let orch = orchestrator(FakeRasterizer::new());

    let record = orch.export_collage(&node).await.unwrap();

    let pattern = Regex::new(r"^vintage-photobooth-\d{4}-\d{2}-\d{2}\.jpg$").unwrap();
    assert!(pattern.is_match(&record.filename), "{}", record.filename);
    assert_eq!(record.bytes, FAKE_JPEG.len());
    assert_eq!(record.sha256, hex::encode(Sha256::digest(FAKE_JPEG)));

    let deliveries = orch.sink().deliveries();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].0, record.filename);
    assert_eq!(deliveries[0].1, FAKE_JPEG);
    assert_eq!(orch.last_export(), Some(record));
    assert!(!node.is_exporting());
}

#[tokio::test]
async fn test_dated_filename_uses_utc_day() {
    let node = mounted(3);
    node.decode_all();
    let orch = orchestrator(FakeRasterizer::new());

    let before = Utc::now().date_naive();
    let record = orch.export_collage(&node).await.unwrap();
    let after = Utc::now().date_naive();

    let named = |day: NaiveDate| format!("vintage-photobooth-{}.jpg", day.format("%Y-%m-%d"));
    assert!(
        record.filename == named(before) || record.filename == named(after),
        "{}",
        record.filename
    );
}

#[tokio::test]
async fn test_export_passes_quality_and_width() {
    let node = mounted(3);
    node.decode_all();
    let settings = ExportSettings {
        quality: 0.8,
        width: 800,
        ..ExportSettings::default()
    };
    let orch =
        ExportOrchestrator::new(FakeRasterizer::new(), MemorySink::new(), "booth", settings)
            .unwrap();

    orch.export_collage(&node).await.unwrap();

    let options = orch.rasterizer().last_options().unwrap();
    assert!((options.quality - 0.8).abs() < f32::EPSILON);
    assert_eq!(options.width, 800);
    assert!(orch.sink().filenames()[0].starts_with("booth-"));
}

#[tokio::test]
async fn test_content_hash_filename() {
    let node = mounted(3);
    node.decode_all();
    let settings = ExportSettings {
        filename: FilenameScheme::ContentHash,
        ..ExportSettings::default()
    };
    let orch = ExportOrchestrator::new(
        FakeRasterizer::new(),
        MemorySink::new(),
        DEFAULT_PRODUCT_NAME,
        settings,
    )
    .unwrap();

    let record = orch.export_collage(&node).await.unwrap();
    let digest = hex::encode(Sha256::digest(FAKE_JPEG));
    assert_eq!(
        record.filename,
        format!("vintage-photobooth-{}.jpg", &digest[..12])
    );
}

#[tokio::test]
async fn test_sequential_exports_both_run() {
    let node = mounted(3);
    node.decode_all();
    let orch = orchestrator(FakeRasterizer::new());

    assert!(orch.handle_download(&node).await.is_saved());
    assert!(orch.handle_download(&node).await.is_saved());
    assert_eq!(orch.rasterizer().calls(), 2);
    assert_eq!(orch.sink().deliveries().len(), 2);
}

// ===== Copy =====

#[tokio::test]
async fn test_copy_renders_at_copy_quality_without_download() {
    let node = mounted(4);
    node.decode_all();
    let orch = orchestrator(FakeRasterizer::new());
    let saved = orch.export_collage(&node).await.unwrap();

    let copied = orch.copy_collage(&node).await.unwrap();

    assert_eq!(copied.data, FAKE_JPEG);
    assert_eq!(copied.mime, "image/jpeg");
    assert_eq!(copied.sha256, hex::encode(Sha256::digest(FAKE_JPEG)));
    let options = orch.rasterizer().last_options().unwrap();
    assert!((options.quality - COPY_QUALITY).abs() < f32::EPSILON);
    assert_eq!(options.width, ExportSettings::default().width);
    assert_eq!(orch.sink().deliveries().len(), 1, "copy must not download");
    assert_eq!(orch.last_export(), Some(saved));
    assert!(!node.is_exporting());
}

#[tokio::test]
async fn test_copy_of_empty_collage_is_rejected() {
    let orch = orchestrator(FakeRasterizer::new());
    assert!(matches!(
        orch.copy_collage(&mounted(0)).await,
        Err(BoothError::NoPhotos)
    ));
    assert_eq!(orch.rasterizer().calls(), 0);
}

#[tokio::test]
async fn test_copy_waits_for_running_export() {
    let gate = Arc::new(Notify::new());
    let node = mounted(3);
    node.decode_all();
    let orch = orchestrator(FakeRasterizer::gated(Arc::clone(&gate)));

    let (saved, copied) = tokio::join!(orch.export_collage(&node), async {
        tokio::task::yield_now().await;
        let copied = orch.copy_collage(&node).await;
        gate.notify_one();
        copied
    });

    assert!(saved.is_ok());
    assert!(matches!(copied, Err(BoothError::ExportInProgress)));
}

// ===== Empty collage =====

#[tokio::test]
async fn test_empty_collage_is_ignored() {
    let node = mounted(0);
    let orch = orchestrator(FakeRasterizer::new());

    assert!(matches!(
        orch.export_collage(&node).await,
        Err(BoothError::NoPhotos)
    ));
    assert_eq!(orch.handle_download(&node).await, Notice::NoPhotos);
    assert_eq!(orch.rasterizer().calls(), 0);
    assert!(orch.sink().deliveries().is_empty());
    assert!(orch.last_export().is_none());
}

#[tokio::test]
async fn test_empty_collage_keeps_previous_export() {
    let full = mounted(3);
    full.decode_all();
    let empty = mounted(0);
    let orch = orchestrator(FakeRasterizer::new());

    let first = orch.export_collage(&full).await.unwrap();
    assert_eq!(orch.handle_download(&empty).await, Notice::NoPhotos);

    assert_eq!(orch.last_export(), Some(first));
    assert_eq!(orch.rasterizer().calls(), 1);
    assert_eq!(orch.sink().deliveries().len(), 1);
}

// ===== Re-entrancy =====

#[tokio::test]
async fn test_concurrent_export_of_same_node_is_rejected() {
    init_test_logging();
    let gate = Arc::new(Notify::new());
    let node = mounted(4);
    node.decode_all();
    let orch = orchestrator(FakeRasterizer::gated(Arc::clone(&gate)));

    let (first, second) = tokio::join!(orch.export_collage(&node), async {
        tokio::task::yield_now().await;
        assert!(node.is_exporting());
        let notice = orch.handle_download(&node).await;
        gate.notify_one();
        notice
    });

    assert!(first.is_ok());
    assert_eq!(second, Notice::Busy);
    assert_eq!(orch.rasterizer().calls(), 1);
    assert_eq!(orch.sink().deliveries().len(), 1);
    assert!(!node.is_exporting());
}

#[tokio::test]
async fn test_other_nodes_export_independently() {
    let a = mounted(3);
    let b = mounted(3);
    a.decode_all();
    b.decode_all();
    let orch = orchestrator(FakeRasterizer::new());

    let (ra, rb) = tokio::join!(orch.export_collage(&a), orch.export_collage(&b));
    assert!(ra.is_ok());
    assert!(rb.is_ok());
    assert_eq!(orch.sink().deliveries().len(), 2);
}

// ===== Image readiness =====

#[tokio::test]
async fn test_export_waits_for_late_images() {
    let node = mounted(3);
    let orch = orchestrator(FakeRasterizer::new());

    let (result, ()) = tokio::join!(orch.export_collage(&node), async {
        tokio::task::yield_now().await;
        assert_eq!(orch.rasterizer().calls(), 0, "rendered before images loaded");
        node.decode_all();
    });

    assert!(result.is_ok());
    assert_eq!(orch.rasterizer().settled_on_entry(), vec![true]);
}

#[tokio::test]
async fn test_failed_image_does_not_block_export() {
    let snapshots = vec![
        Snapshot::new(0, "image/png", b"not a png".to_vec()),
        Snapshot::new(1, "image/png", b"still not a png".to_vec()),
        Snapshot::new(2, "image/png", b"nope".to_vec()),
    ];
    let mut view = CollageView::new(snapshots, StyleState::default());
    let node = view.render_node();
    node.decode_all();
    assert!(
        node.elements()
            .iter()
            .all(|e| e.is_settled() && e.image().is_none())
    );

    let orch = orchestrator(FakeRasterizer::new());
    assert!(orch.handle_download(&node).await.is_saved());
}

#[tokio::test]
async fn test_manually_completed_elements_release_export() {
    let node = mounted(3);
    let orch = orchestrator(FakeRasterizer::new());

    let (result, ()) = tokio::join!(orch.export_collage(&node), async {
        for element in node.elements() {
            tokio::task::yield_now().await;
            element.complete(LoadState::Failed("timed out".to_string()));
        }
    });
    assert!(result.is_ok());
}

// ===== Failures =====

#[tokio::test]
async fn test_rasterization_failure_notice_and_retry() {
    let node = mounted(3);
    node.decode_all();
    let orch = orchestrator(FakeRasterizer::failing());

    let notice = orch.handle_download(&node).await;
    assert_eq!(
        notice,
        Notice::Failed {
            message: "Failed to download collage. Please try again.".to_string(),
            retryable: true,
        }
    );
    assert!(orch.sink().deliveries().is_empty());
    assert!(orch.last_export().is_none());
    assert!(!node.is_exporting(), "failure must release the node");

    orch.rasterizer().set_failing(false);
    assert!(orch.handle_download(&node).await.is_saved());
    assert!(orch.last_export().is_some());
}

#[tokio::test]
async fn test_failure_keeps_previous_record() {
    let node = mounted(3);
    node.decode_all();
    let orch = orchestrator(FakeRasterizer::new());

    let first = orch.export_collage(&node).await.unwrap();
    orch.rasterizer().set_failing(true);
    assert!(orch.export_collage(&node).await.is_err());
    assert_eq!(orch.last_export(), Some(first));
}

#[tokio::test]
async fn test_delivery_failure_is_reported() {
    let node = mounted(3);
    node.decode_all();
    let orch = ExportOrchestrator::new(
        FakeRasterizer::new(),
        FullDiskSink,
        DEFAULT_PRODUCT_NAME,
        ExportSettings::default(),
    )
    .unwrap();

    match orch.handle_download(&node).await {
        Notice::Failed { message, retryable } => {
            assert!(message.contains("No space left"), "{message}");
            assert!(retryable);
        }
        other => panic!("expected failure notice, got {other:?}"),
    }
    assert!(orch.last_export().is_none());
}

#[tokio::test]
async fn test_unwritable_output_directory_is_retryable() {
    let tmp = tempfile::TempDir::new().unwrap();
    let blocker = tmp.path().join("exports");
    std::fs::write(&blocker, b"a file where the directory should be").unwrap();

    let node = mounted(3);
    node.decode_all();
    let orch = ExportOrchestrator::new(
        FakeRasterizer::new(),
        DirectorySink::new(&blocker),
        DEFAULT_PRODUCT_NAME,
        ExportSettings::default(),
    )
    .unwrap();

    match orch.handle_download(&node).await {
        Notice::Failed { message, retryable } => {
            assert!(message.starts_with("Failed to write"), "{message}");
            assert!(retryable);
        }
        other => panic!("expected failure notice, got {other:?}"),
    }
    assert!(orch.last_export().is_none());
}

#[test]
fn test_invalid_settings_rejected_up_front() {
    let low_quality = ExportSettings {
        quality: 0.5,
        ..ExportSettings::default()
    };
    assert!(matches!(
        ExportOrchestrator::new(FakeRasterizer::new(), MemorySink::new(), "x", low_quality),
        Err(BoothError::InvalidQuality { .. })
    ));

    let tiny = ExportSettings {
        width: 10,
        ..ExportSettings::default()
    };
    assert!(matches!(
        ExportOrchestrator::new(FakeRasterizer::new(), MemorySink::new(), "x", tiny),
        Err(BoothError::ConfigInvalid(_))
    ));
}
