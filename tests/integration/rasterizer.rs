//! Integration tests for the image-backed rasterizer and directory sink.

use booth::collage::{CollageView, StyleEvent};
use booth::export::{
    DEFAULT_PRODUCT_NAME, DirectorySink, ExportOrchestrator, ExportSettings, ImageRasterizer,
    Notice, RasterOptions, Rasterizer,
};
use booth::style::{Filter, Layout, Rgb, StyleState};
use tempfile::TempDir;

use crate::common::fixtures::png_snapshots;

fn view(count: usize, layout: Layout) -> CollageView {
    let mut view = CollageView::new(png_snapshots(count), StyleState::default());
    view.apply(StyleEvent::Layout(layout));
    view
}

#[tokio::test]
async fn test_render_every_layout_to_jpeg() {
    let options = RasterOptions {
        quality: 0.9,
        width: 480,
    };
    for layout in [
        Layout::Vertical,
        Layout::Polaroid,
        Layout::Masonry,
        Layout::Horizontal,
        Layout::Grid,
    ] {
        let node = view(5, layout).render_node();
        node.decode_all();
        let bytes = ImageRasterizer.render(&node, &options).await.unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8], "{layout:?} is not a JPEG");

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 480, "{layout:?}");
        assert!(decoded.height() > 0);
    }
}

#[tokio::test]
async fn test_export_writes_file_to_directory() {
    let tmp = TempDir::new().unwrap();
    let mut view = view(4, Layout::Masonry);
    view.apply(StyleEvent::Background(Rgb::new(0xf8, 0xf1, 0xe4)));
    view.apply(StyleEvent::Filter(Filter::Sepia));
    let node = view.render_node();
    node.decode_all();

    let orch = ExportOrchestrator::new(
        ImageRasterizer,
        DirectorySink::new(tmp.path().join("downloads")),
        DEFAULT_PRODUCT_NAME,
        ExportSettings::default(),
    )
    .unwrap();

    let notice = orch.handle_download(&node).await;
    let Notice::Saved { filename, location } = notice else {
        panic!("expected saved notice, got {notice:?}");
    };
    assert_eq!(location, tmp.path().join("downloads").join(&filename));

    let written = std::fs::read(&location).unwrap();
    let decoded = image::load_from_memory(&written).unwrap().to_rgb8();
    assert_eq!(decoded.width(), 600);

    // top-left corner is canvas padding, painted in the background color
    let corner = decoded.get_pixel(2, 2);
    for (got, want) in corner.0.iter().zip([0xf8u8, 0xf1, 0xe4]) {
        assert!(got.abs_diff(want) <= 8, "corner {corner:?}");
    }
    assert_eq!(orch.last_export().unwrap().bytes, written.len());
}

#[tokio::test]
async fn test_render_with_undecodable_photo_still_succeeds() {
    let mut snapshots = png_snapshots(2);
    snapshots.push(booth::session::Snapshot::new(2, "image/jpeg", b"garbage".to_vec()));
    let mut view = CollageView::new(snapshots, StyleState::default());
    let node = view.render_node();
    node.decode_all();

    let bytes = ImageRasterizer
        .render(
            &node,
            &RasterOptions {
                quality: 0.8,
                width: 320,
            },
        )
        .await
        .unwrap();
    assert!(image::load_from_memory(&bytes).is_ok());
}
