use serde_json::json;

use vdiff_core::correspondence::CorrespondenceHint;
use vdiff_core::params::{parse_flag, ComparisonParameters, CorrPts};
use vdiff_core::pipeline::config::{CompareMode, PipelineConfig};

fn quad_json() -> serde_json::Value {
    json!({
        "img1": { "size": { "w": 100.0, "h": 50.0 },
                  "pts": [{"x": 0.0, "y": 0.0}, {"x": 100.0, "y": 0.0},
                          {"x": 100.0, "y": 50.0}, {"x": 0.0, "y": 50.0}] },
        "img2": { "size": { "w": 200.0, "h": 100.0 },
                  "pts": [{"x": 0.0, "y": 0.0}, {"x": 200.0, "y": 0.0},
                          {"x": 200.0, "y": 100.0}, {"x": 0.0, "y": 100.0}] }
    })
}

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

#[test]
fn test_parse_flag_false_forms() {
    for v in [json!("false"), json!("0"), json!(""), json!(false), json!(0), json!(null)] {
        assert!(!parse_flag(&v), "{v} should be false");
    }
}

#[test]
fn test_parse_flag_true_forms() {
    for v in [json!("true"), json!("1"), json!("yes"), json!(true), json!(2)] {
        assert!(parse_flag(&v), "{v} should be true");
    }
}

#[test]
fn test_mode_and_side_accept_loose_flags() {
    let p = ComparisonParameters::from_json(r#"{ "mode": "1", "show_img1_right": "false" }"#)
        .unwrap();
    assert!(p.mode);
    assert!(!p.show_img1_right);
    assert_eq!(p.compare_mode(), CompareMode::GlobalDissolve);
}

#[test]
fn test_nrbi_is_strict() {
    let cases = [
        (r#"{ "nrbi": "1" }"#, Some(true)),
        (r#"{ "nrbi": "true" }"#, Some(true)),
        (r#"{ "nrbi": true }"#, Some(true)),
        (r#"{ "nrbi": "yes" }"#, Some(false)),
        (r#"{ "nrbi": "0" }"#, Some(false)),
        (r#"{ "nrbi": 2 }"#, Some(false)),
        (r#"{}"#, None),
    ];
    for (text, expected) in cases {
        let p = ComparisonParameters::from_json(text).unwrap();
        assert_eq!(p.nrbi, expected, "{text}");
    }
}

// ---------------------------------------------------------------------------
// corr_pts
// ---------------------------------------------------------------------------

#[test]
fn test_corr_pts_tokens() {
    assert_eq!(CorrPts::from_value(json!("corners")), CorrPts::Corners);
    assert_eq!(CorrPts::from_value(json!("auto")), CorrPts::Auto);
    assert_eq!(CorrPts::from_value(json!("")), CorrPts::Auto);
}

#[test]
fn test_corr_pts_object_and_embedded_text_agree() {
    let object = CorrPts::from_value(quad_json());
    let text = CorrPts::from_value(json!(quad_json().to_string()));
    assert!(matches!(&object, CorrPts::Points(set) if set.len() == 4));
    assert_eq!(object, text);
}

#[test]
fn test_corr_pts_malformed_is_auto() {
    assert_eq!(CorrPts::from_value(json!("{not json")), CorrPts::Auto);
    assert_eq!(CorrPts::from_value(json!({ "img1": 3 })), CorrPts::Auto);
    assert_eq!(CorrPts::from_value(json!([1, 2, 3])), CorrPts::Auto);
}

#[test]
fn test_absent_corr_pts_resolves_auto() {
    let p = ComparisonParameters::new("a.png", "b.png");
    assert_eq!(p.hint(), CorrespondenceHint::Auto);

    let p = ComparisonParameters::from_json(r#"{ "corr_pts": "corners" }"#).unwrap();
    assert_eq!(p.hint(), CorrespondenceHint::Corners);
}

// ---------------------------------------------------------------------------
// Round trip and persistence
// ---------------------------------------------------------------------------

fn sample() -> ComparisonParameters {
    ComparisonParameters {
        img1_label: Some("before".into()),
        corr_pts: Some(CorrPts::from_value(quad_json())),
        img1_roi_xywh: Some("pixel:10,10,50,20".into()),
        mode: false,
        show_img1_right: true,
        nrbi: Some(false),
        ..ComparisonParameters::new("a.png", "b.png")
    }
}

#[test]
fn test_json_round_trip() {
    let p = sample();
    let text = p.to_json().unwrap();
    assert_eq!(ComparisonParameters::from_json(&text).unwrap(), p);
}

#[test]
fn test_absent_fields_are_not_written() {
    let text = ComparisonParameters::new("a.png", "b.png").to_json().unwrap();
    assert!(!text.contains("img1_roi_xywh"));
    assert!(!text.contains("nrbi"));
    assert!(text.contains("\"mode\": false"));
}

#[test]
fn test_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("params.json");
    let p = sample();
    p.save(&path).unwrap();
    assert_eq!(ComparisonParameters::load(&path).unwrap(), p);
}

#[test]
fn test_load_rejects_invalid_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ img1: ").unwrap();
    assert!(ComparisonParameters::load(&path).is_err());
}

// ---------------------------------------------------------------------------
// apply_to
// ---------------------------------------------------------------------------

#[test]
fn test_apply_to_overrides_options() {
    let mut config = PipelineConfig::default();
    sample().apply_to(&mut config);
    assert_eq!(config.mode, CompareMode::LocalHighlight);
    assert!(config.show_first_on_right);
    assert_eq!(config.roi.as_deref(), Some("pixel:10,10,50,20"));
    assert!(!config.noise_reduction);
}

#[test]
fn test_apply_to_keeps_unset_options() {
    let mut config = PipelineConfig {
        roi: Some("percent:0,0,50,50".into()),
        ..PipelineConfig::default()
    };
    let p = ComparisonParameters {
        img1_roi_xywh: Some(String::new()),
        ..ComparisonParameters::new("a.png", "b.png")
    };
    p.apply_to(&mut config);
    assert_eq!(config.roi.as_deref(), Some("percent:0,0,50,50"));
    assert!(config.noise_reduction);
}
