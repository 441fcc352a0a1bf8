//! Integration tests for the core crate.

use onco_core::{
    EvidenceSource, GateOutcome, Grade, Query, RunStatus, SessionId, Strength, WorkflowRecord,
};

#[test]
fn test_grade_serde() {
    let grade = Grade::OneA;
    let serialized = serde_json::to_string(&grade).unwrap();
    assert_eq!(serialized, r#""1A""#);
    let deserialized: Grade = serde_json::from_str(&serialized).unwrap();
    assert_eq!(deserialized, grade);

    let two_c: Grade = serde_json::from_str(r#""2C""#).unwrap();
    assert_eq!(two_c, Grade::TwoC);
}

#[test]
fn test_strength_serde() {
    let strong = Strength::Strong;
    let serialized = serde_json::to_string(&strong).unwrap();
    assert_eq!(serialized, r#""strong""#);
    let deserialized: Strength = serde_json::from_str(&serialized).unwrap();
    assert_eq!(deserialized, strong);
}

#[test]
fn test_gate_outcome_serde() {
    let approved = GateOutcome::Approved;
    let serialized = serde_json::to_string(&approved).unwrap();
    assert_eq!(serialized, r#""approved""#);
    let deserialized: GateOutcome = serde_json::from_str(&serialized).unwrap();
    assert_eq!(deserialized, approved);
}

#[test]
fn test_evidence_source_serde() {
    let fallback = EvidenceSource::Fallback;
    let serialized = serde_json::to_string(&fallback).unwrap();
    assert_eq!(serialized, r#""fallback""#);
    let deserialized: EvidenceSource = serde_json::from_str(&serialized).unwrap();
    assert_eq!(deserialized, fallback);
}

#[test]
fn test_run_status_serde() {
    let incomplete = RunStatus::Incomplete;
    let serialized = serde_json::to_string(&incomplete).unwrap();
    assert_eq!(serialized, r#""incomplete""#);
    let deserialized: RunStatus = serde_json::from_str(&serialized).unwrap();
    assert_eq!(deserialized, incomplete);
}

#[test]
fn test_session_ids_are_unique() {
    let a = SessionId::new();
    let b = SessionId::new();
    assert_ne!(a, b);
}

#[test]
fn test_workflow_record_round_trips() {
    let record = WorkflowRecord {
        session_id: SessionId::from_str("session-1"),
        query: Query {
            cancer_type: "melanoma".into(),
            treatment_arms: vec!["pembrolizumab".into(), "nivolumab".into()],
            min_year: 2023,
            max_year: 2025,
            max_results: 12,
        },
        evidence: None,
        survival: None,
        risk: None,
        recommendation: None,
        gate: None,
        status: RunStatus::Incomplete,
        warnings: vec!["evidence unavailable".into()],
        created_ms: 1_700_000_000_000,
    };

    let serialized = serde_json::to_string(&record).unwrap();
    let deserialized: WorkflowRecord = serde_json::from_str(&serialized).unwrap();
    assert_eq!(deserialized.session_id, record.session_id);
    assert_eq!(deserialized.status, record.status);
    assert_eq!(deserialized.warnings, record.warnings);
    assert_eq!(deserialized.query.treatment_arms, record.query.treatment_arms);
}
