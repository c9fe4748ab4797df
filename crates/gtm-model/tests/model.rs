use gtm_model::{
    CanonicalDocument, CreationStats, ErrorCode, ResourceCounts, ResourceKind, RunState, RunStatus,
};

#[test]
fn partial_run_serializes_for_reporting() {
    let mut stats = CreationStats::new(ResourceCounts::new(1, 2, 1));
    stats.record_created(ResourceKind::Variable);
    stats.record_failure(ResourceKind::Trigger, "A", "HTTP 400: invalid filter");
    stats.record_created(ResourceKind::Trigger);
    stats.record_created(ResourceKind::Tag);
    let stats = stats.finalize();

    assert_eq!(stats.status, RunStatus::PartialSuccess);
    assert_eq!(stats.failed(ResourceKind::Trigger), 1);
    insta::assert_json_snapshot!(stats, @r#"
    {
      "requested": {
        "variables": 1,
        "triggers": 2,
        "tags": 1
      },
      "created": {
        "variables": 1,
        "triggers": 1,
        "tags": 1
      },
      "errors": [
        "Failed to create trigger 'A': HTTP 400: invalid filter"
      ],
      "status": "PARTIAL_SUCCESS"
    }
    "#);
}

#[test]
fn canonical_document_survives_serialization() {
    let raw = serde_json::json!({
        "variables": [
            {"name": "Const", "type": "c", "parameter": [{"key": "value", "type": "template", "value": "x"}]}
        ],
        "triggers": [
            {"name": "Signup", "type": "CUSTOM_EVENT", "customEventFilter": [{"type": "equals"}]}
        ],
        "tags": [
            {"name": "Pixel", "type": "html", "parameter": [], "firingTriggerId": ["Signup"]}
        ]
    });
    let doc: CanonicalDocument = serde_json::from_value(raw.clone()).unwrap();
    assert_eq!(doc.counts(), ResourceCounts::new(1, 1, 1));
    assert_eq!(serde_json::to_value(&doc).unwrap(), raw);
}

#[test]
fn failed_run_codes_follow_fatal_message() {
    let state = RunState::Init
        .transition(RunState::Validating)
        .and_then(|state| state.transition(RunState::ResolvingContainer))
        .and_then(|state| state.transition(RunState::Aborted))
        .unwrap();
    assert_eq!(state.to_string(), "ABORTED");

    let message = "Could not find GTM container matching identifier 'GTM-XXXX'.";
    assert_eq!(ErrorCode::classify(message), ErrorCode::ContainerNotFound);
    assert_eq!(
        serde_json::to_value(ErrorCode::classify(message)).unwrap(),
        serde_json::json!("CONTAINER_NOT_FOUND")
    );
}
