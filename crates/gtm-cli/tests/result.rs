//! JSON result and summary rendering.

use std::time::Duration;

use gtm_cli::result::DeployResult;
use gtm_cli::summary::resource_table;
use gtm_core::{RunReport, WorkspaceSummary};
use gtm_model::{CreationStats, ErrorCode, ResourceCounts, RunState, RunStatus};
use serde_json::json;

fn report(state: RunState, stats: CreationStats, error: Option<&str>) -> RunReport {
    let mut report = RunReport {
        state,
        stats,
        workspace: None,
        cleared: None,
        duration: Duration::from_millis(1500),
        error: error.map(str::to_string),
        error_code: None,
    };
    if !report.is_success() {
        report.error_code = Some(ErrorCode::classify(&report.failure_text()));
    }
    report
}

fn partial_stats() -> CreationStats {
    let mut stats = CreationStats::new(ResourceCounts::new(1, 1, 2));
    stats.created = ResourceCounts::new(1, 1, 1);
    stats.record_failure(
        gtm_model::ResourceKind::Tag,
        "Bing UET",
        "HTTP 400: vendorTemplate.key: Unknown entity type",
    );
    stats.finalize()
}

#[test]
fn test_success_result() {
    let mut stats = CreationStats::new(ResourceCounts::new(1, 1, 1));
    stats.created = ResourceCounts::new(1, 1, 1);
    let mut report = report(RunState::Finalized(RunStatus::Success), stats.finalize(), None);
    report.workspace = Some(WorkspaceSummary {
        name: "Automation Workspace".to_string(),
        id: "5".to_string(),
        url: "https://tagmanager.google.com/#/container/accounts/1/containers/10/workspaces/5"
            .to_string(),
    });

    let value = serde_json::to_value(DeployResult::new(&report, Some("meta"))).unwrap();

    assert_eq!(value["status"], json!("SUCCESS"));
    assert_eq!(value["message"], json!("Uploaded and processed successfully."));
    assert_eq!(value["errorCode"], json!(null));
    assert_eq!(value["pixel"], json!("meta"));
    assert_eq!(value["report"]["state"], json!("FINALIZED"));
    assert_eq!(value["report"]["durationSecs"], json!(1.5));
    assert_eq!(value["report"]["workspace"]["id"], json!("5"));
}

#[test]
fn test_partial_success_is_reported_as_failed() {
    let report = report(
        RunState::Finalized(RunStatus::PartialSuccess),
        partial_stats(),
        None,
    );

    let result = DeployResult::new(&report, None);

    assert_eq!(result.status, "FAILED");
    assert_eq!(result.error_code, Some(ErrorCode::UnknownTemplate));
    assert_eq!(
        result.message,
        "Some tags use a custom template that is not installed in this container."
    );
    let value = serde_json::to_value(&result).unwrap();
    assert!(value.get("pixel").is_none());
    assert_eq!(value["errorCode"], json!("UNKNOWN_TEMPLATE"));
}

#[test]
fn test_aborted_run_carries_error_code() {
    let report = report(
        RunState::Aborted,
        CreationStats::new(ResourceCounts::new(0, 1, 1)),
        Some("No GTM container ID provided. Pass --container-id (numeric ID or GTM-XXXX public ID) or set GTM_CONTAINER_ID."),
    );

    let result = DeployResult::new(&report, None);

    assert_eq!(result.error_code, Some(ErrorCode::MissingContainerId));
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn test_dry_run_is_success() {
    let report = report(
        RunState::DryRunDone,
        CreationStats::new(ResourceCounts::new(2, 2, 3)),
        None,
    );
    let result = DeployResult::new(&report, None);
    assert_eq!(result.status, "SUCCESS");
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn test_resource_table_lists_counts_per_kind() {
    let report = report(
        RunState::Finalized(RunStatus::PartialSuccess),
        partial_stats(),
        None,
    );
    let mut table = resource_table(&report);
    table.force_no_tty();
    let rendered = table.to_string();

    for label in ["Resource", "variables", "triggers", "tags", "TOTAL"] {
        assert!(rendered.contains(label), "missing {label} in\n{rendered}");
    }
    let tags_row = rendered
        .lines()
        .find(|line| line.contains("tags"))
        .unwrap();
    let numbers: Vec<&str> = tags_row
        .split(|c: char| !c.is_ascii_digit())
        .filter(|part| !part.is_empty())
        .collect();
    assert_eq!(numbers, vec!["2", "1", "1"]);
}
