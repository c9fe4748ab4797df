//! Tag deployer CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use gtm_cli::logging::{LogConfig, LogFormat, init_logging};
use gtm_cli::result::DeployResult;
use gtm_cli::summary::print_summary;
use gtm_core::CancelToken;
use tracing::level_filters::LevelFilter;
use tracing::warn;

mod cli;
mod commands;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_deploy, run_normalize};

/// Exit code of a run stopped by Ctrl-C.
const INTERRUPTED_EXIT_CODE: i32 = 130;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    if let Err(error) = ctrlc::set_handler(move || {
        if handler_token.is_cancelled() {
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
        handler_token.cancel();
    }) {
        warn!(%error, "cannot install Ctrl-C handler");
    }

    let exit_code = match cli.command {
        Command::Deploy(args) => match run_deploy(&args, &cancel) {
            Ok(report) => {
                if args.json {
                    let result = DeployResult::new(&report, args.pixel.as_deref());
                    match serde_json::to_string_pretty(&result) {
                        Ok(json) => println!("{json}"),
                        Err(error) => eprintln!("error: {error}"),
                    }
                } else {
                    print_summary(&report);
                }
                report.exit_code()
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Normalize(args) => match run_normalize(&args) {
            Ok(()) => 0,
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
    };
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
