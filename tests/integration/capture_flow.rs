//! Integration tests for the capture controller with a directory camera.

use std::time::Duration;

use booth::capture::{
    CaptureEffect, CaptureSession, CaptureSettings, DirectoryCamera, Facing, TickOutcome,
    run_auto_snap,
};
use booth::collage::CollageView;
use booth::error::BoothError;
use booth::export::DirectorySink;
use booth::session::{FileStore, View};
use booth::style::{Filter, StyleState};

use crate::common::fixtures::{FrameDir, SessionDir};

fn settings(photo_count: usize, timer_secs: u32) -> CaptureSettings {
    CaptureSettings {
        photo_count,
        timer_secs,
        effect: CaptureEffect::Shutter,
        facing: None,
    }
}

#[test]
fn test_directory_camera_skips_non_images() {
    let frames = FrameDir::pngs(3);
    frames.add_stray_file("notes.txt");
    let camera = DirectoryCamera::open(frames.path()).unwrap();
    assert_eq!(camera.remaining(), 3);
}

#[test]
fn test_directory_camera_requires_frames() {
    let frames = FrameDir::pngs(0);
    assert!(matches!(
        DirectoryCamera::open(frames.path()),
        Err(BoothError::Other(_))
    ));
}

#[test]
fn test_manual_countdown_sequence() {
    let frames = FrameDir::pngs(3);
    let camera = DirectoryCamera::open(frames.path()).unwrap();
    let mut session = CaptureSession::new(camera, settings(3, 3)).unwrap();

    assert!(session.start_countdown());
    assert_eq!(session.countdown(), Some(3));
    assert_eq!(session.tick(), TickOutcome::Counting { remaining: 2 });
    assert_eq!(session.tick(), TickOutcome::Counting { remaining: 1 });
    assert_eq!(
        session.tick(),
        TickOutcome::Captured {
            index: 0,
            effect: CaptureEffect::Shutter
        }
    );
    assert!(!session.is_pending());
    assert_eq!(session.tick(), TickOutcome::Idle);
    assert_eq!(session.photos().len(), 1);
    assert_eq!(session.photos()[0].mime(), "image/png");
}

#[test]
fn test_auto_snap_fills_session_then_stops() {
    let frames = FrameDir::pngs(6);
    let camera = DirectoryCamera::open(frames.path()).unwrap();
    let mut session = CaptureSession::new(camera, settings(3, 2)).unwrap();
    assert!(session.start_auto_snap());

    let mut outcomes = Vec::new();
    while session.is_pending() {
        outcomes.push(session.tick());
    }

    let captured: Vec<usize> = outcomes
        .iter()
        .filter_map(|o| match o {
            TickOutcome::Captured { index, .. } => Some(*index),
            _ => None,
        })
        .collect();
    assert_eq!(captured, vec![0, 1, 2]);
    assert_eq!(session.photos().len(), 3);
    assert!(session.is_complete());
    assert!(!session.is_auto_snap());
    assert!(!session.start_countdown(), "full session accepts no more captures");
    assert_eq!(session.into_camera().remaining(), 3);
}

#[test]
fn test_cancel_discards_pending_capture() {
    let frames = FrameDir::pngs(3);
    let camera = DirectoryCamera::open(frames.path()).unwrap();
    let mut session = CaptureSession::new(camera, settings(3, 3)).unwrap();

    session.start_auto_snap();
    session.tick();
    session.cancel();
    for _ in 0..5 {
        assert_eq!(session.tick(), TickOutcome::Idle);
    }
    assert!(session.photos().is_empty());
}

#[test]
fn test_remove_photo_then_retake() {
    let frames = FrameDir::pngs(5);
    let camera = DirectoryCamera::open(frames.path()).unwrap();
    let mut session = CaptureSession::new(camera, settings(3, 0)).unwrap();
    session.start_auto_snap();
    while session.is_pending() {
        session.tick();
    }
    assert!(session.is_complete());

    session.remove_photo(1).unwrap();
    assert!(matches!(
        session.remove_photo(7),
        Err(BoothError::PhotoIndexOutOfRange { index: 7, count: 2 })
    ));
    assert!(session.start_countdown());
    assert!(matches!(session.tick(), TickOutcome::Captured { index: 2, .. }));
}

#[test]
fn test_photo_count_must_be_three_to_six() {
    let frames = FrameDir::pngs(3);
    for count in [2, 7] {
        let camera = DirectoryCamera::open(frames.path()).unwrap();
        assert!(matches!(
            CaptureSession::new(camera, settings(count, 3)),
            Err(BoothError::InvalidPhotoCount { .. })
        ));
    }
}

#[tokio::test]
async fn test_run_auto_snap_stops_when_camera_runs_dry() {
    let frames = FrameDir::pngs(2);
    let camera = DirectoryCamera::open(frames.path()).unwrap();
    let mut session = CaptureSession::new(camera, settings(4, 0)).unwrap();

    let outcomes = run_auto_snap(&mut session, Duration::ZERO).await;

    assert_eq!(outcomes.last(), Some(&TickOutcome::Missed));
    assert_eq!(session.photos().len(), 2);
    assert!(!session.is_pending());
}

#[tokio::test]
async fn test_capture_to_collage_handoff() {
    let frames = FrameDir::pngs(4);
    let session_dir = SessionDir::empty();
    let camera = DirectoryCamera::open(frames.path()).unwrap();
    let mut session = CaptureSession::new(camera, settings(4, 1)).unwrap();
    session.set_filter(Filter::Grayscale);

    run_auto_snap(&mut session, Duration::ZERO).await;
    let mut store = FileStore::open(session_dir.path()).unwrap();
    assert_eq!(session.finish(&mut store).unwrap(), View::Result);

    let view = CollageView::load(&store, StyleState::default());
    assert_eq!(view.snapshots().len(), 4);
    assert_eq!(view.style().filter, Filter::Grayscale);
    for (snap, captured) in view.snapshots().iter().zip(session.photos()) {
        assert_eq!(snap.data(), captured.data());
    }
}

#[tokio::test]
async fn test_individual_shots_saved_with_numbered_names() {
    let frames = FrameDir::pngs(3);
    let out = tempfile::TempDir::new().unwrap();
    let camera = DirectoryCamera::open(frames.path()).unwrap();
    let mut session = CaptureSession::new(camera, settings(3, 0)).unwrap();
    run_auto_snap(&mut session, Duration::ZERO).await;

    let sink = DirectorySink::new(out.path());
    for index in 0..session.photos().len() {
        session.download_photo(index, &sink).unwrap();
    }

    let second = std::fs::read(out.path().join("photo-booth-2.jpg")).unwrap();
    assert_eq!(second, session.photos()[1].data());
    assert!(out.path().join("photo-booth-3.jpg").exists());
    assert!(!out.path().join("photo-booth-0.jpg").exists());
}

#[test]
fn test_switching_to_selfie_camera_mirrors_next_shot() {
    let frames = tempfile::TempDir::new().unwrap();
    let mut half = image::RgbImage::from_pixel(8, 4, image::Rgb([220, 40, 40]));
    for y in 0..4 {
        for x in 4..8 {
            half.put_pixel(x, y, image::Rgb([40, 80, 220]));
        }
    }
    half.save(frames.path().join("a.png")).unwrap();
    half.save(frames.path().join("b.png")).unwrap();

    let camera = DirectoryCamera::open(frames.path()).unwrap();
    let mut session = CaptureSession::new(camera, settings(3, 0)).unwrap();
    assert_eq!(session.facing(), Facing::Environment);

    session.start_countdown();
    session.tick();
    assert_eq!(session.switch_camera(), Facing::User);
    session.start_countdown();
    session.tick();

    let left_pixel = |index: usize| {
        image::load_from_memory(session.photos()[index].data())
            .unwrap()
            .to_rgb8()
            .get_pixel(0, 0)
            .0
    };
    assert_eq!(left_pixel(0), [220, 40, 40]);
    assert_eq!(left_pixel(1), [40, 80, 220]);
}
