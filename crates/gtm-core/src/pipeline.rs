//! Run driver with explicit stages.
//!
//! Stages follow [`RunState`]:
//! 1. **Validating**: load and normalize the input, apply the template-type
//!    filter, validate
//! 2. **ResolvingContainer**: require a container identifier and, without an
//!    account ID, look the container up
//! 3. **Authenticating**: open a service bound to the container
//! 4. **PreparingWorkspace**: get or create the named workspace and clear it
//! 5. **Creating**: create variables, triggers and tags
//!
//! A dry run stops after stage 1. Any fatal error ends the run as `ABORTED`
//! (or `INTERRUPTED`) and is still reported with its duration.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use gtm_model::{
    CanonicalDocument, Connector, ContainerRef, CreationStats, ErrorCode, RunState, RunStatus,
    TagManager,
};
use serde::{Serialize, Serializer};
use tracing::{error, info, info_span};

use crate::cancel::CancelToken;
use crate::error::{DeployError, PipelineError};
use crate::orchestrator::{ClearSummary, create_all, prepare_workspace};

/// Workspace reused by every run unless another name is given.
pub const DEFAULT_WORKSPACE_NAME: &str = "Automation Workspace";

/// Where the run's document comes from.
#[derive(Debug, Clone)]
pub enum InputSource {
    /// A `.json`, `.xlsx` or `.xls` file.
    File(PathBuf),
    /// An already-normalized document.
    Document(CanonicalDocument),
}

/// Everything a run needs besides the remote connector.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub input: InputSource,
    pub template_type: Option<String>,
    pub dry_run: bool,
    /// Numeric container ID or public `GTM-XXXX` ID.
    pub container_id: Option<String>,
    /// When set, container lookup is skipped.
    pub account_id: Option<String>,
    pub workspace_name: String,
    pub workspace_description: Option<String>,
}

impl RunRequest {
    pub fn new(input: InputSource) -> Self {
        Self {
            input,
            template_type: None,
            dry_run: false,
            container_id: None,
            account_id: None,
            workspace_name: DEFAULT_WORKSPACE_NAME.to_string(),
            workspace_description: None,
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(InputSource::File(path.into()))
    }

    pub fn with_container(mut self, container_id: impl Into<String>) -> Self {
        self.container_id = Some(container_id.into());
        self
    }

    pub fn with_account(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn with_template_type(mut self, template_type: impl Into<String>) -> Self {
        self.template_type = Some(template_type.into());
        self
    }

    pub fn with_workspace_name(mut self, name: impl Into<String>) -> Self {
        self.workspace_name = name.into();
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    fn description(&self) -> String {
        if let Some(description) = &self.workspace_description {
            return description.clone();
        }
        match &self.input {
            InputSource::File(path) => match path.file_name() {
                Some(name) => format!("Automation workspace for {}", name.to_string_lossy()),
                None => "Automation workspace".to_string(),
            },
            InputSource::Document(_) => "Automation workspace".to_string(),
        }
    }
}

/// Workspace the run wrote into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspaceSummary {
    pub name: String,
    pub id: String,
    pub url: String,
}

/// Outcome of a run, reported for every terminal state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub state: RunState,
    pub stats: CreationStats,
    pub workspace: Option<WorkspaceSummary>,
    pub cleared: Option<ClearSummary>,
    #[serde(rename = "durationSecs", serialize_with = "serialize_secs")]
    pub duration: Duration,
    /// Message of the fatal error, if any.
    pub error: Option<String>,
    /// Set for every run that did not succeed.
    pub error_code: Option<ErrorCode>,
}

impl RunReport {
    /// Status label: the finalized status or the terminal state.
    pub fn status_label(&self) -> &'static str {
        match self.state {
            RunState::Finalized(status) => status.as_str(),
            RunState::DryRunDone => "DRY_RUN_SUCCESS",
            other => other.label(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self.state,
            RunState::DryRunDone | RunState::Finalized(RunStatus::Success)
        )
    }

    /// 0 for success or dry run, 130 when interrupted, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self.state {
            _ if self.is_success() => 0,
            RunState::Interrupted => 130,
            _ => 1,
        }
    }

    /// Fatal error and per-resource errors, one per line.
    pub fn failure_text(&self) -> String {
        self.error
            .iter()
            .chain(self.stats.errors.iter())
            .cloned()
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Mutable run state threaded through the stages.
#[derive(Debug, Default)]
struct Progress {
    state: RunState,
    stats: CreationStats,
    workspace: Option<WorkspaceSummary>,
    cleared: Option<ClearSummary>,
}

impl Progress {
    fn advance(&mut self, next: RunState) -> Result<(), PipelineError> {
        self.state = self.state.transition(next)?;
        info!(state = %self.state, "run state");
        Ok(())
    }
}

/// Drives one run to a terminal state. Never panics on remote failures.
pub fn run<C: Connector>(request: &RunRequest, connector: &C, cancel: &CancelToken) -> RunReport {
    let started = Instant::now();
    let mut progress = Progress::default();

    let fatal = match execute(request, connector, cancel, &mut progress) {
        Ok(()) => None,
        Err(err) => {
            let terminal = if err.is_interrupt() {
                RunState::Interrupted
            } else {
                RunState::Aborted
            };
            let message = err.to_string();
            if let PipelineError::Deploy(DeployError::Interrupted { stats }) = err {
                let requested = progress.stats.requested;
                progress.stats = CreationStats { requested, ..stats };
            }
            progress.state = progress.state.transition(terminal).unwrap_or(terminal);
            error!(state = %progress.state, error = %message, "run ended early");
            Some(message)
        }
    };

    let mut report = RunReport {
        state: progress.state,
        stats: progress.stats,
        workspace: progress.workspace,
        cleared: progress.cleared,
        duration: started.elapsed(),
        error: fatal,
        error_code: None,
    };
    if !report.is_success() {
        report.error_code = Some(ErrorCode::classify(&report.failure_text()));
    }
    info!(
        status = report.status_label(),
        duration_secs = report.duration.as_secs_f64(),
        "run finished"
    );
    report
}

fn execute<C: Connector>(
    request: &RunRequest,
    connector: &C,
    cancel: &CancelToken,
    progress: &mut Progress,
) -> Result<(), PipelineError> {
    progress.advance(RunState::Validating)?;
    let doc = load_and_validate(request, progress)?;

    if request.dry_run {
        info!("dry run completed, no remote resources created");
        return progress.advance(RunState::DryRunDone);
    }

    progress.advance(RunState::ResolvingContainer)?;
    let container = resolve_container(request, connector)?;
    info!(
        account_id = %container.account_id,
        container_id = %container.container_id,
        "using container"
    );
    if cancel.is_cancelled() {
        return Err(PipelineError::Interrupted);
    }

    progress.advance(RunState::Authenticating)?;
    let mut service = connector
        .connect(&container)
        .map_err(PipelineError::Connect)?;

    progress.advance(RunState::PreparingWorkspace)?;
    let (workspace, cleared) = prepare_workspace(
        &mut service,
        &request.workspace_name,
        &request.description(),
        cancel,
    )?;
    progress.cleared = Some(cleared);
    progress.workspace = Some(WorkspaceSummary {
        url: service.workspace_url(&workspace),
        name: workspace.name.clone(),
        id: workspace.id.clone(),
    });

    progress.advance(RunState::Creating)?;
    let stats = {
        let _span = info_span!("create_resources").entered();
        create_all(&doc, &mut service, &workspace, cancel)?
    };
    progress.advance(RunState::Finalized(stats.status))?;
    progress.stats = stats;
    Ok(())
}

fn load_and_validate(
    request: &RunRequest,
    progress: &mut Progress,
) -> Result<CanonicalDocument, PipelineError> {
    let _span = info_span!("validate_input").entered();
    let mut doc = match &request.input {
        InputSource::File(path) => gtm_ingest::load_document(path)?,
        InputSource::Document(doc) => doc.clone(),
    };

    if let Some(template_type) = &request.template_type {
        doc.retain_type(template_type);
        let counts = doc.counts();
        info!(
            template_type = %template_type,
            variables = counts.variables,
            triggers = counts.triggers,
            tags = counts.tags,
            "filtered by template type"
        );
    }
    progress.stats = CreationStats::new(doc.counts());

    gtm_validate::validate(&doc)?;
    Ok(doc)
}

fn resolve_container<C: Connector>(
    request: &RunRequest,
    connector: &C,
) -> Result<ContainerRef, PipelineError> {
    let identifier = non_blank(request.container_id.as_deref())
        .ok_or(PipelineError::MissingContainerId)?;

    match non_blank(request.account_id.as_deref()) {
        Some(account_id) => Ok(ContainerRef::new(account_id, identifier)),
        None => {
            info!(
                container = identifier,
                "no account ID provided, resolving from container"
            );
            connector
                .resolve_container(identifier)
                .map_err(PipelineError::Resolve)
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
