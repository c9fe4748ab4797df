use std::io::Write;

use anyhow::{Context, Result};
use gtm_client::GtmConnector;
use gtm_core::{CancelToken, RunReport, RunRequest};
use gtm_cli::config::{DeploySettings, FileConfig, Overrides};
use tracing::{info, info_span};

use crate::cli::{DeployArgs, NormalizeArgs};

pub fn run_deploy(args: &DeployArgs, cancel: &CancelToken) -> Result<RunReport> {
    let file = FileConfig::load(args.config.as_deref())?;
    let settings = DeploySettings::resolve(
        Overrides {
            account_id: args.account_id.clone(),
            container_id: args.container_id.clone(),
            workspace_name: args.workspace.clone(),
            service_account: args.service_account.clone(),
            retries: args.retries,
        },
        file,
    );

    let span = info_span!("deploy", input = %args.input.display());
    let _guard = span.enter();
    if let Some(pixel) = &args.pixel {
        info!(pixel = %pixel, "pixel selected");
    }

    let mut request = RunRequest::from_path(&args.input)
        .dry_run(args.dry_run)
        .with_workspace_name(settings.workspace_name);
    if let Some(template_type) = &args.template_type {
        request = request.with_template_type(template_type);
    }
    if let Some(container_id) = settings.container_id {
        request = request.with_container(container_id);
    }
    if let Some(account_id) = settings.account_id {
        request = request.with_account(account_id);
    }

    let connector = GtmConnector::new(settings.service_account, settings.client);
    Ok(gtm_core::run(&request, &connector, cancel))
}

pub fn run_normalize(args: &NormalizeArgs) -> Result<()> {
    let mut doc = gtm_ingest::load_document(&args.input)
        .with_context(|| format!("normalize {}", args.input.display()))?;
    if let Some(template_type) = &args.template_type {
        doc.retain_type(template_type);
    }
    let json = serde_json::to_string_pretty(&doc).context("serialize document")?;
    match &args.output {
        Some(path) => std::fs::write(path, json + "\n")
            .with_context(|| format!("write {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}").context("write stdout")?;
        }
    }
    let counts = doc.counts();
    info!(
        variables = counts.variables,
        triggers = counts.triggers,
        tags = counts.tags,
        "document normalized"
    );
    Ok(())
}
