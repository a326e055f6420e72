//! Integration tests for the collage view.

use chrono::NaiveDate;

use booth::collage::{CollageView, StyleEvent};
use booth::session::{FILTER_KEY, SessionStore};
use booth::style::registry::BRAND_CAPTION;
use booth::style::{Filter, Layout, Rgb, StyleState};

use crate::common::fixtures::{SessionDir, png_snapshots};

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
}

#[test]
fn test_load_uses_handoff_filter_over_style() {
    let session = SessionDir::with_photos(4, Filter::Sepia);
    let mut style = StyleState::default();
    style.filter = Filter::Grayscale;

    let mut view = CollageView::load(&session.store(), style);
    assert_eq!(view.snapshots().len(), 4);
    assert_eq!(view.style().filter, Filter::Sepia);
    assert!(view.placeholder().is_none());
    assert!(
        view.arrangement()
            .cells
            .iter()
            .all(|c| c.filter_class == "filter-sepia")
    );
}

#[test]
fn test_config_filter_kept_when_session_has_no_filter() {
    let session = SessionDir::with_photos(3, Filter::None);
    let mut store = session.store();
    store.remove(FILTER_KEY).unwrap();
    let mut style = StyleState::default();
    style.filter = Filter::Vintage;

    let view = CollageView::load(&store, style);
    assert_eq!(view.snapshots().len(), 3);
    assert_eq!(view.style().filter, Filter::Vintage);
}

#[test]
fn test_stored_none_filter_still_overrides_config() {
    let session = SessionDir::with_photos(3, Filter::None);
    let mut style = StyleState::default();
    style.filter = Filter::Vintage;

    let view = CollageView::load(&session.store(), style);
    assert_eq!(view.style().filter, Filter::None);
}

#[test]
fn test_filter_edit_recomputes_arrangement() {
    let mut view = CollageView::new(png_snapshots(3), StyleState::default());
    assert_eq!(view.arrangement().cells[0].filter_class, "");
    view.apply(StyleEvent::Filter(Filter::Vintage));
    assert_eq!(view.arrangement().cells[0].filter_class, "filter-vintage");
    assert_eq!(view.recomputations(), 2);
}

#[test]
fn test_repeated_reads_do_not_recompute() {
    let mut view = CollageView::new(png_snapshots(5), StyleState::default());
    view.apply(StyleEvent::Layout(Layout::Masonry));
    for _ in 0..5 {
        assert_eq!(view.arrangement().len(), 5);
    }
    assert_eq!(view.recomputations(), 1);
}

#[test]
fn test_unreadable_text_color_is_replaced_with_first_readable() {
    let mut view = CollageView::new(png_snapshots(1), StyleState::default());
    view.apply(StyleEvent::Background(Rgb::BLACK));
    let check = view
        .apply(StyleEvent::TextColor(Rgb::new(10, 10, 10)))
        .expect("color edits report a contrast check");
    assert!(check.was_substituted());
    assert_eq!(view.style().text_color(), Rgb::new(0xb5, 0x6b, 0x75));
}

#[test]
fn test_readable_text_color_is_kept() {
    let mut view = CollageView::new(png_snapshots(1), StyleState::default());
    let check = view.apply(StyleEvent::TextColor(Rgb::BLACK)).unwrap();
    assert!(!check.was_substituted());
    assert_eq!(view.style().text_color(), Rgb::BLACK);
}

#[test]
fn test_non_color_edits_report_nothing() {
    let mut view = CollageView::new(png_snapshots(1), StyleState::default());
    assert!(view.apply(StyleEvent::ShowDate(true)).is_none());
    assert!(view.apply(StyleEvent::MasonryGap(3)).is_none());
}

#[test]
fn test_render_node_chrome_follows_style() {
    let mut view = CollageView::new(png_snapshots(3), StyleState::default());
    view.apply(StyleEvent::Layout(Layout::Polaroid));
    view.apply(StyleEvent::ShowDate(true));
    view.apply(StyleEvent::Background(Rgb::new(0xf8, 0xf1, 0xe4)));

    let node = view.render_node_on(date());
    assert_eq!(node.elements().len(), 3);
    assert_eq!(node.arrangement().layout, Layout::Polaroid);
    assert_eq!(node.chrome().caption, BRAND_CAPTION);
    assert_eq!(node.chrome().date, Some(date()));
    assert_eq!(node.chrome().background, Rgb::new(0xf8, 0xf1, 0xe4));
    assert!(!node.all_settled(), "elements start pending");
}

#[test]
fn test_render_node_without_date() {
    let mut view = CollageView::new(png_snapshots(2), StyleState::default());
    let node = view.render_node_on(date());
    assert_eq!(node.chrome().date, None);
}

#[test]
fn test_each_render_node_is_distinct() {
    let mut view = CollageView::new(png_snapshots(2), StyleState::default());
    let a = view.render_node_on(date());
    let b = view.render_node_on(date());
    assert_ne!(a.id(), b.id());
}
