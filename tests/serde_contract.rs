use egui::{Pos2, Vec2};
use research_copilot::{
    decode_position, encode_position, AnalysisFailure, AnalysisOutcome, AnalysisReport,
    AnalysisResponse, HostRequest, HostResponse, Phase, ResearchScores, SettingsDrag,
    SettingsLifecycle, StorageError,
};

const VIEWPORT: Vec2 = Vec2::new(1000., 800.);
const BUTTON: Vec2 = Vec2::new(150., 40.);

#[test]
fn test_analysis_success_payload() {
    let raw = r#"{"title":"X","status":"success","analysis":"Research analysis complete"}"#;
    let response: AnalysisResponse = serde_json::from_str(raw).expect("decode report");
    let outcome: AnalysisOutcome = response.into();
    assert_eq!(
        outcome,
        Ok(AnalysisReport {
            title: "X".to_string(),
            status: "success".to_string(),
            analysis: "Research analysis complete".to_string(),
        })
    );
}

#[test]
fn test_analysis_failure_payload() {
    let response: AnalysisResponse =
        serde_json::from_str(r#"{"error":"backend down"}"#).expect("decode failure");
    let outcome: AnalysisOutcome = response.clone().into();
    assert_eq!(
        outcome,
        Err(AnalysisFailure {
            error: "backend down".to_string()
        })
    );
    assert_eq!(
        serde_json::to_string(&AnalysisResponse::from(outcome)).expect("encode"),
        r#"{"error":"backend down"}"#
    );
}

#[test]
fn test_host_request_actions() {
    let known: HostRequest = serde_json::from_str(r#"{"action":"getArxivUrl"}"#).unwrap();
    assert_eq!(known, HostRequest::GetArxivUrl);

    let unknown: HostRequest = serde_json::from_str(r#"{"action":"openPanel"}"#).unwrap();
    assert_eq!(unknown, HostRequest::Unknown);

    assert!(serde_json::from_str::<HostRequest>(r#"{"url":"x"}"#).is_err());

    let reply = HostResponse::Url {
        url: "https://arxiv.org/abs/1".to_string(),
    };
    assert_eq!(
        serde_json::to_string(&reply).unwrap(),
        r#"{"url":"https://arxiv.org/abs/1"}"#
    );
}

#[test]
fn test_stored_position_forms() {
    let written = encode_position(Pos2::new(12.5, 30.)).unwrap();
    assert_eq!(written, r#"{"x":12.5,"y":30.0}"#);
    assert_eq!(
        decode_position(&written, VIEWPORT, BUTTON).unwrap(),
        Pos2::new(12.5, 30.)
    );

    let legacy = r#"{"left":"","top":"","right":"20px","bottom":"20px"}"#;
    assert_eq!(
        decode_position(legacy, VIEWPORT, BUTTON).unwrap(),
        Pos2::new(830., 740.)
    );

    let err = decode_position(r#"{"right":"wide","bottom":"0"}"#, VIEWPORT, BUTTON).unwrap_err();
    assert!(matches!(err, StorageError::CssLength(ref v) if v == "wide"));
}

#[test]
fn test_phase_names() {
    assert_eq!(serde_json::to_string(&Phase::Detail).unwrap(), r#""Detail""#);
    let phase: Phase = serde_json::from_str(r#""Loading""#).unwrap();
    assert_eq!(phase, Phase::Loading);
}

#[test]
fn test_scores_payload() {
    let scores = ResearchScores {
        methodological_rigor: 8,
        data_quality: 10,
        innovation_level: 7,
        insight_count: 2,
    };
    let json = serde_json::to_value(scores).unwrap();
    assert_eq!(json["data_quality"], 10);
    assert_eq!(json["insight_count"], 2);
}

#[test]
fn test_settings_are_serializable() {
    let drag = SettingsDrag::new().with_click_threshold(3.);
    let json = serde_json::to_string(&drag).unwrap();
    let back: SettingsDrag = serde_json::from_str(&json).unwrap();
    assert_eq!(back, drag);

    let lifecycle = SettingsLifecycle::default();
    let value = serde_json::to_value(&lifecycle).unwrap();
    assert_eq!(value["loading_messages"].as_array().map(Vec::len), Some(4));
}
