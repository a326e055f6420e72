//! Robot-mode end-to-end tests.

use serde_json::json;

use booth::style::Filter;

use crate::common::cli::CliRunner;
use crate::common::fixtures::SessionDir;
use crate::common::init_test_logging;

#[test]
fn robot_quick_start_outputs_json() {
    init_test_logging();
    let result = CliRunner::new().run(&["--robot"]);
    result
        .assert_success()
        .assert_json_field("/tool", &json!("booth"))
        .assert_json_array_len("/commands", 5);
}

#[test]
fn robot_version_outputs_build_info() {
    let result = CliRunner::new().run(&["version", "--format=json"]);
    let json = result.assert_success().json();
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert!(json.get("git_sha").is_some());
    assert!(json.get("target").is_some());
}

#[test]
fn robot_compact_format_is_single_line() {
    let result = CliRunner::new().run(&["styles", "--format=json-compact"]);
    result.assert_success();
    assert_eq!(result.stdout.trim().lines().count(), 1);
}

#[test]
fn robot_styles_lists_every_axis() {
    let result = CliRunner::new().run_robot(&["styles"]);
    let json = result.assert_success().json();

    let axes: Vec<&str> = json["axes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["axis"].as_str().unwrap())
        .collect();
    assert_eq!(
        axes,
        vec!["layout", "filter", "aspect ratio", "balance mode", "font", "text size"]
    );
    assert_eq!(json["axes"][0]["default"], "vertical");
    assert_eq!(json["backgrounds"][0]["hex"], "#ffffff");
    assert_eq!(json["text_colors"][0]["hex"], "#b56b75");
}

#[test]
fn robot_contrast_substitutes_faint_caption() {
    let result = CliRunner::new().run_robot(&["contrast", "#fefefe", "--background", "#ffffff"]);
    result
        .assert_success()
        .assert_json_field("/readable", &json!(false))
        .assert_json_field("/background_label", &json!("White"))
        .assert_json_field("/distance", &json!(3))
        .assert_json_field("/threshold", &json!(50))
        .assert_json_field("/check/result", &json!("substituted"))
        .assert_json_field("/check/replacement", &json!("#b56b75"));
}

#[test]
fn robot_contrast_accepts_readable_caption() {
    let result = CliRunner::new().run_robot(&["contrast", "#000000", "-b", "#123456"]);
    result
        .assert_success()
        .assert_stdout_not_contains("background_label")
        .assert_json_field("/readable", &json!(true))
        .assert_json_field("/check/result", &json!("accepted"));
}

#[test]
fn robot_arrange_masonry_placeholders() {
    let result = CliRunner::new().run_robot(&["arrange", "--count", "5", "--layout", "masonry"]);
    result
        .assert_success()
        .assert_json_field("/photos", &json!(5))
        .assert_json_field("/rows", &json!(4))
        .assert_json_field("/arrangement/layout", &json!("masonry"))
        .assert_json_field("/arrangement/columns", &json!(3))
        .assert_json_field("/arrangement/cells/0/emphasized", &json!(true))
        .assert_json_field("/arrangement/cells/0/placement/kind", &json!("grid"))
        .assert_json_field("/arrangement/cells/0/placement/row_span", &json!(2))
        .assert_json_field("/arrangement/cells/3/placement/row_span", &json!(2));
}

#[test]
fn robot_arrange_polaroid_tilts() {
    let result = CliRunner::new().run_robot(&[
        "arrange",
        "--count",
        "3",
        "--layout",
        "polaroid",
        "--polaroid-rotation",
        "6",
    ]);
    let json = result.assert_success().json();
    let tilts: Vec<i64> = json["arrangement"]["cells"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["rotation_deg"].as_i64().unwrap())
        .collect();
    assert_eq!(tilts, vec![-6, 0, 6]);
    assert_eq!(json["arrangement"]["cells"][0]["placement"]["z_index"], 3);
}

#[test]
fn robot_arrange_empty_session_has_placeholder() {
    let session = SessionDir::empty();
    let result = CliRunner::new()
        .with_session_dir(session.path())
        .run_robot(&["arrange"]);
    result
        .assert_success()
        .assert_json_field("/photos", &json!(0))
        .assert_json_field("/placeholder", &json!("No photos selected."));
}

#[test]
fn robot_arrange_reads_session_filter() {
    let session = SessionDir::with_photos(4, Filter::Vintage);
    let result = CliRunner::new()
        .with_session_dir(session.path())
        .run_robot(&["arrange", "--layout", "grid"]);
    result
        .assert_success()
        .assert_json_field("/photos", &json!(4))
        .assert_json_field("/arrangement/cells/0/filter_class", &json!("filter-vintage"));
}

#[test]
fn robot_unreadable_override_warns_first() {
    let result = CliRunner::new().run_robot(&[
        "--format=json-compact",
        "arrange",
        "--count",
        "3",
        "--text-color",
        "#fefefe",
    ]);
    result.assert_success();
    let lines = result.json_lines();
    assert_eq!(lines.len(), 2, "{}", result.stdout);
    assert_eq!(lines[0]["warning"], true);
    assert_eq!(lines[1]["photos"], 3);
}

#[test]
fn robot_export_without_photos_fails() {
    let session = SessionDir::empty();
    let out = tempfile::TempDir::new().unwrap();
    let result = CliRunner::new()
        .with_session_dir(session.path())
        .run_robot(&["export", "--output", &out.path().display().to_string()]);
    result
        .assert_failure()
        .assert_json_field("/status", &json!("no_photos"));
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn robot_error_goes_to_stderr_with_suggestion() {
    let session = SessionDir::with_photos(3, Filter::None);
    let result = CliRunner::new()
        .with_session_dir(session.path())
        .run_robot(&["export", "--quality", "0.5"]);
    result.assert_failure();

    let err = result.stderr_json();
    assert_eq!(err["error"], true);
    assert_eq!(err["suggestion"], "Use a quality between 0.8 and 1.0");
    assert_eq!(err["retryable"], false);
}

#[test]
fn robot_invalid_style_value_is_rejected_by_parser() {
    let result = CliRunner::new().run_robot(&["arrange", "--layout", "diagonal"]);
    result.assert_failure().assert_stderr_contains("diagonal");
}
