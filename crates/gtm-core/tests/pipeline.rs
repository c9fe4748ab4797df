mod common;

use common::{FakeConnector, sample_document, tag, trigger};
use gtm_core::{CancelToken, InputSource, RunRequest, run};
use gtm_model::{
    CanonicalDocument, ContainerRef, ErrorCode, RemoteError, ResourceCounts, RunState, RunStatus,
};

fn request(doc: CanonicalDocument) -> RunRequest {
    RunRequest::new(InputSource::Document(doc))
}

#[test]
fn dry_run_stops_after_validation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tags.json");
    std::fs::write(&path, serde_json::to_vec(&sample_document()).unwrap()).unwrap();
    let connector = FakeConnector::default();

    let report = run(
        &RunRequest::from_path(&path).dry_run(true),
        &connector,
        &CancelToken::new(),
    );

    assert_eq!(report.state, RunState::DryRunDone);
    assert_eq!(report.status_label(), "DRY_RUN_SUCCESS");
    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.error_code, None);
    assert_eq!(report.stats.requested, ResourceCounts::new(2, 2, 3));
    assert!(connector.resolved.borrow().is_empty());
    assert!(connector.fake().calls.is_empty());
}

#[test]
fn missing_container_id_aborts() {
    let connector = FakeConnector::default();
    let report = run(
        &request(sample_document()).with_container("  "),
        &connector,
        &CancelToken::new(),
    );

    assert_eq!(report.state, RunState::Aborted);
    assert_eq!(report.error_code, Some(ErrorCode::MissingContainerId));
    assert!(
        report
            .error
            .as_deref()
            .unwrap()
            .starts_with("No GTM container ID provided")
    );
    assert!(connector.resolved.borrow().is_empty());
}

#[test]
fn dangling_reference_fails_before_any_remote_call() {
    let doc = CanonicalDocument {
        triggers: vec![trigger("All Pages")],
        tags: vec![tag("Pixel", &["Missing"])],
        ..CanonicalDocument::default()
    };
    let connector = FakeConnector::default().with_container("GTM-ABC", ContainerRef::new("1", "2"));

    let report = run(
        &request(doc).with_container("GTM-ABC"),
        &connector,
        &CancelToken::new(),
    );

    assert_eq!(report.state, RunState::Aborted);
    assert!(report.error.as_deref().unwrap().contains("'Missing'"));
    assert_eq!(report.error_code, Some(ErrorCode::UnknownError));
    assert!(connector.resolved.borrow().is_empty());
    assert_eq!(connector.fake().mutations(), 0);
}

#[test]
fn public_id_is_resolved_and_everything_created() {
    let connector =
        FakeConnector::default().with_container("GTM-ABC", ContainerRef::new("6001", "42"));

    let report = run(
        &request(sample_document()).with_container("GTM-ABC"),
        &connector,
        &CancelToken::new(),
    );

    assert_eq!(report.state, RunState::Finalized(RunStatus::Success));
    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.error_code, None);
    assert_eq!(report.stats.created, ResourceCounts::new(2, 2, 3));
    assert_eq!(*connector.resolved.borrow(), vec!["GTM-ABC".to_string()]);

    let workspace = report.workspace.as_ref().unwrap();
    assert_eq!(workspace.name, "Automation Workspace");
    assert_eq!(
        workspace.url,
        "https://tagmanager.google.com/#/container/accounts/6001/containers/42/workspaces/1"
    );

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["state"], "FINALIZED");
    assert_eq!(json["stats"]["status"], "SUCCESS");
    assert_eq!(json["errorCode"], serde_json::Value::Null);
}

#[test]
fn account_id_skips_container_lookup() {
    let connector = FakeConnector::default();
    let report = run(
        &request(sample_document())
            .with_container("42")
            .with_account("6001")
            .with_workspace_name("Nightly"),
        &connector,
        &CancelToken::new(),
    );

    assert!(report.is_success());
    assert!(connector.resolved.borrow().is_empty());
    assert_eq!(
        *connector.connected.borrow(),
        Some(ContainerRef::new("6001", "42"))
    );
    assert_eq!(connector.fake().calls[0], "workspace:Nightly");
}

#[test]
fn unknown_container_is_classified() {
    let connector = FakeConnector::default();
    let report = run(
        &request(sample_document()).with_container("GTM-NOPE"),
        &connector,
        &CancelToken::new(),
    );

    assert_eq!(report.state, RunState::Aborted);
    assert_eq!(report.error_code, Some(ErrorCode::ContainerNotFound));
    assert!(connector.connected.borrow().is_none());
}

#[test]
fn authentication_failure_is_classified() {
    let connector = FakeConnector {
        connect_error: Some(RemoteError::Authentication(
            "invalid_grant: Invalid JWT Signature.".to_string(),
        )),
        ..FakeConnector::default()
    };
    let report = run(
        &request(sample_document())
            .with_container("42")
            .with_account("6001"),
        &connector,
        &CancelToken::new(),
    );

    assert_eq!(report.state, RunState::Aborted);
    assert_eq!(report.error_code, Some(ErrorCode::AuthFailed));
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn partial_success_carries_error_code_from_resource_errors() {
    let connector = FakeConnector::default();
    {
        let mut fake = connector.service.0.borrow_mut();
        fake.reject.insert("Banner".to_string());
        fake.reject_message = Some("vendorTemplate.key: Unknown entity type".to_string());
    }
    let report = run(
        &request(sample_document())
            .with_container("42")
            .with_account("6001"),
        &connector,
        &CancelToken::new(),
    );

    assert_eq!(report.state, RunState::Finalized(RunStatus::PartialSuccess));
    assert_eq!(report.status_label(), "PARTIAL_SUCCESS");
    assert_eq!(report.exit_code(), 1);
    assert_eq!(report.error, None);
    assert_eq!(report.error_code, Some(ErrorCode::UnknownTemplate));
}

#[test]
fn interrupt_during_creation_keeps_partial_stats() {
    let cancel = CancelToken::new();
    let connector = FakeConnector::default();
    connector.service.0.borrow_mut().cancel_after = Some((1, cancel.clone()));

    let report = run(
        &request(sample_document())
            .with_container("42")
            .with_account("6001"),
        &connector,
        &cancel,
    );

    assert_eq!(report.state, RunState::Interrupted);
    assert_eq!(report.exit_code(), 130);
    assert_eq!(report.stats.created, ResourceCounts::new(1, 0, 0));
    assert_eq!(report.stats.requested, ResourceCounts::new(2, 2, 3));
    assert_eq!(connector.fake().mutations(), 1);
}

#[test]
fn template_type_filter_applies_before_validation() {
    let mut doc = sample_document();
    doc.tags.push(gtm_model::TagSpec {
        name: "Image".to_string(),
        kind: "img".to_string(),
        ..gtm_model::TagSpec::default()
    });
    for tag in &mut doc.tags {
        tag.firing_trigger_id = None;
    }

    let report = run(
        &request(doc).with_template_type("img").dry_run(true),
        &FakeConnector::default(),
        &CancelToken::new(),
    );

    assert_eq!(report.state, RunState::DryRunDone);
    assert_eq!(report.stats.requested, ResourceCounts::new(0, 0, 1));
}

#[test]
fn unreadable_input_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let report = run(
        &RunRequest::from_path(dir.path().join("absent.xlsx")),
        &FakeConnector::default(),
        &CancelToken::new(),
    );
    assert_eq!(report.state, RunState::Aborted);
    assert!(report.error.as_deref().unwrap().contains("absent.xlsx"));
}
