// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use logview_app::{AppState, Viewer};
use runtime::FileRuntime;
use std::env;
use std::path::PathBuf;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `logview --print-example-config` for a template",
            options.config_path.display()
        )
    })?;

    let log_path = options
        .log_path
        .ok_or_else(|| anyhow!("missing log file argument; run with --help for usage"))?;
    // --check never touches the log directory.
    let _guard = if options.check_only {
        None
    } else {
        Some(logging::init_tracing(&config.log_dir()?, config.log_level())?)
    };
    let records = logview_source::read_log_file(&log_path)?;
    let fields = resolve_fields(&config, &records);
    if options.check_only {
        println!(
            "{}: {} records, fields: {}",
            log_path.display(),
            records.len(),
            fields.join(", ")
        );
        return Ok(());
    }

    let mut runtime = FileRuntime::new(log_path);
    tracing::info!(
        path = %runtime.path().display(),
        records = records.len(),
        fields = fields.len(),
        "starting viewer"
    );

    let app = AppState::new(fields).with_reload_every(config.reload_every_ticks()?);
    let viewer = Viewer::with_rows(app, records.into());
    logview_tui::run_app(viewer, &mut runtime, config.tick_rate()?)
}

/// Configured field names, or the ones discovered in the file when the
/// config lists none.
fn resolve_fields(config: &Config, records: &[logview_app::LogRecord]) -> Vec<String> {
    if config.field_names().is_empty() {
        logview_source::discover_fields(records)
    } else {
        config.field_names().to_vec()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    log_path: Option<PathBuf>,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        log_path: None,
        print_config_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => options.print_config_path = true,
            "--print-example-config" => options.print_example = true,
            "--check" => options.check_only = true,
            "--help" | "-h" => options.show_help = true,
            flag if flag.starts_with('-') && flag != "-" => {
                return Err(anyhow!(
                    "unknown argument {flag:?}; run with --help to see supported options"
                ));
            }
            path => {
                if let Some(existing) = &options.log_path {
                    return Err(anyhow!(
                        "only one log file is supported, got {} and {path}; run with --help for usage",
                        existing.display()
                    ));
                }
                options.log_path = Some(PathBuf::from(path));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("logview <log-file>");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --check                  Validate config and log file, then exit");
    println!("  --help                   Show this help");
    println!();
    println!("In the viewer: f filter, r reload, esc/q back, ctrl+c quit.");
}
