//! Validation tests for the API boundary types.

#![allow(clippy::unwrap_used, clippy::panic)]

use veritrack::api::{StageSpec, StartRunRequest, validate_document_id};
use veritrack_core::ProcessingMode;

fn base_request() -> StartRunRequest {
    StartRunRequest {
        document_id: "doc-2024-001".to_string(),
        framework: "SOC2".to_string(),
        mode: None,
        stages: None,
    }
}

// =============================================================================
// DOCUMENT ID VALIDATION
// =============================================================================

#[test]
fn document_id_accepts_plain_identifiers() {
    assert!(validate_document_id("doc-2024-001").is_ok());
    assert!(validate_document_id("a").is_ok());
}

#[test]
fn document_id_rejects_empty_and_oversized() {
    assert!(validate_document_id("").is_err());
    assert!(validate_document_id(&"x".repeat(257)).is_err());
    assert!(validate_document_id(&"x".repeat(256)).is_ok());
}

#[test]
fn document_id_rejects_path_escapes() {
    assert!(validate_document_id("../secrets").is_err());
    assert!(validate_document_id("a/b").is_err());
    assert!(validate_document_id("a\\b").is_err());
    assert!(validate_document_id("..").is_err());
}

// =============================================================================
// START RUN REQUEST
// =============================================================================

#[test]
fn default_request_uses_smart_mode_and_default_stages() {
    let (document_id, mode, stages) = base_request().to_parts().unwrap();
    assert_eq!(document_id.as_str(), "doc-2024-001");
    assert_eq!(mode, ProcessingMode::Smart);
    assert!(stages.is_none());
}

#[test]
fn unknown_mode_falls_back_to_smart() {
    let mut request = base_request();
    request.mode = Some("turbo".to_string());
    let (_, mode, _) = request.to_parts().unwrap();
    assert_eq!(mode, ProcessingMode::Smart);

    let mut request = base_request();
    request.mode = Some("comparison".to_string());
    let (_, mode, _) = request.to_parts().unwrap();
    assert_eq!(mode, ProcessingMode::Comparison);
}

#[test]
fn empty_framework_is_rejected() {
    let mut request = base_request();
    request.framework = String::new();
    assert!(request.to_parts().is_err());
}

#[test]
fn custom_stages_are_converted_in_order() {
    let mut request = base_request();
    request.stages = Some(vec![
        StageSpec {
            id: "a".to_string(),
            name: "Stage A".to_string(),
            description: String::new(),
            estimated_secs: 10,
        },
        StageSpec {
            id: "b".to_string(),
            name: "Stage B".to_string(),
            description: "second".to_string(),
            estimated_secs: 30,
        },
    ]);

    let (_, _, stages) = request.to_parts().unwrap();
    let stages = stages.unwrap();
    assert_eq!(stages.len(), 2);
    assert_eq!(stages[0].id.as_str(), "a");
    assert_eq!(stages[1].estimated_secs, 30);
}

#[test]
fn duplicate_stage_ids_are_rejected() {
    let mut request = base_request();
    let spec = StageSpec {
        id: "a".to_string(),
        name: "Stage A".to_string(),
        description: String::new(),
        estimated_secs: 10,
    };
    request.stages = Some(vec![spec.clone(), spec]);
    assert!(request.to_parts().is_err());
}

#[test]
fn oversized_stage_list_is_rejected() {
    let mut request = base_request();
    request.stages = Some(
        (0..=256)
            .map(|i| StageSpec {
                id: format!("s{}", i),
                name: format!("Stage {}", i),
                description: String::new(),
                estimated_secs: 1,
            })
            .collect(),
    );
    assert!(request.to_parts().is_err());
}

#[test]
fn absurd_stage_duration_is_rejected() {
    let mut request = base_request();
    request.stages = Some(vec![StageSpec {
        id: "a".to_string(),
        name: "Stage A".to_string(),
        description: String::new(),
        estimated_secs: u32::MAX,
    }]);
    assert!(request.to_parts().is_err());
}

// =============================================================================
// SERDE SHAPE
// =============================================================================

#[test]
fn start_request_parses_minimal_json() {
    let request: StartRunRequest = serde_json::from_str(
        r#"{ "document_id": "doc-1", "framework": "SOC2" }"#,
    )
    .unwrap();
    assert!(request.mode.is_none());
    assert!(request.stages.is_none());
}

#[test]
fn stage_spec_description_defaults_to_empty() {
    let spec: StageSpec =
        serde_json::from_str(r#"{ "id": "a", "name": "A", "estimated_secs": 5 }"#).unwrap();
    assert!(spec.description.is_empty());
    assert!(spec.to_stage().is_ok());
}
