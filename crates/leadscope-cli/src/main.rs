// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;

use anyhow::{Context, Result};
use config::Config;
use leadscope_app::{Coordinator, Gateway, Intent};
use leadscope_client::Client;
use leadscope_tui::UiOptions;
use std::env;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

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

    let mut config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `leadscope --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;
    config.apply_env_overrides();
    if let Some(base_url) = options.base_url {
        config.set_base_url(base_url);
    }
    config::validate_base_url(config.base_url()).context("invalid --base-url")?;

    let client = Client::new(config.base_url(), config.timeout()?).with_context(|| {
        format!(
            "invalid [server] config in {}; fix base_url/timeout values",
            options.config_path.display()
        )
    })?;

    if options.check_only {
        let report = check_backend(&client)?;
        println!("{report}");
        return Ok(());
    }

    init_logging(&config.log_path()?, config.log_level())?;
    info!(base_url = client.base_url(), "starting leadscope");

    let mut coordinator = Coordinator::new();
    let ui_options = UiOptions {
        export_path: config.export_path(),
        search_defaults: config.search_defaults(),
    };
    leadscope_tui::run_app(&mut coordinator, client, ui_options)
}

/// Routes tracing output to a file; the terminal belongs to the UI.
fn init_logging(path: &Path, level: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|error| anyhow::anyhow!("install log subscriber: {error}"))
}

/// Probes the backend, then runs the startup loads and reports what came back.
fn check_backend<G: Gateway>(gateway: &G) -> Result<String> {
    gateway
        .fetch_history()
        .context("backend check failed")?;

    let mut coordinator = Coordinator::new();
    coordinator.run_blocking(gateway, Intent::Start);
    let state = coordinator.state();
    Ok(format!(
        "ok: history={} saved={} audience_config={}",
        state.history.len(),
        state.saved_leads.len(),
        if state.audience_config.is_some() {
            "yes"
        } else {
            "no"
        }
    ))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    base_url: Option<String>,
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
        base_url: None,
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
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--base-url" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--base-url requires a URL"))?;
                options.base_url = Some(value.as_ref().to_owned());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("leadscope");
    println!("  --config <path>          Use a specific config path");
    println!("  --base-url <url>         Override [server].base_url");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --check                  Validate config and reach the backend");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, check_backend, parse_cli_args};
    use anyhow::{Result, anyhow};
    use leadscope_client::Client;
    use std::path::PathBuf;
    use std::thread;
    use tiny_http::{Header, Response, Server};

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/leadscope-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                base_url: None,
                print_config_path: false,
                print_example: false,
                check_only: false,
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_and_base_url() -> Result<()> {
        let options = parse_cli_args(
            vec![
                "--config",
                "/custom/config.toml",
                "--base-url",
                "http://10.0.0.5:8000",
            ],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        assert_eq!(options.base_url.as_deref(), Some("http://10.0.0.5:8000"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_values() {
        let error = parse_cli_args(vec!["--config"], default_options_path())
            .expect_err("missing config value should fail");
        assert!(error.to_string().contains("--config requires a file path"));

        let error = parse_cli_args(vec!["--base-url"], default_options_path())
            .expect_err("missing base url should fail");
        assert!(error.to_string().contains("--base-url requires a URL"));
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_sets_print_check_and_help_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--print-config-path", "--print-example-config", "--check", "-h"],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(options.show_help);
        Ok(())
    }

    #[test]
    fn check_backend_reports_startup_counts() -> Result<()> {
        let server =
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
        let addr = format!("http://{}", server.server_addr());

        let handle = thread::spawn(move || {
            for _ in 0..4 {
                let request = server.recv().expect("request expected");
                let body = match request.url() {
                    "/history" => r#"{"history":[{"id":"h1","params":{"keyword":"rust"}}]}"#,
                    "/leads" => r#"{"leads":[{"id":"a"},{"id":"b"}]}"#,
                    "/api/config/audience" => r#"{"data":{"segment":"founders"}}"#,
                    other => panic!("unexpected request {other}"),
                };
                let response = Response::from_string(body).with_header(
                    Header::from_bytes("Content-Type", "application/json")
                        .expect("valid content type header"),
                );
                request.respond(response).expect("response should succeed");
            }
        });

        let client = Client::new(&addr, None)?;
        let report = check_backend(&client)?;
        assert_eq!(report, "ok: history=1 saved=2 audience_config=yes");

        handle.join().expect("server thread should join");
        Ok(())
    }

    #[test]
    fn check_backend_fails_when_unreachable() -> Result<()> {
        let client = Client::new(
            "http://127.0.0.1:1",
            Some(std::time::Duration::from_millis(50)),
        )?;
        let error = check_backend(&client).expect_err("unreachable backend should fail");
        assert!(format!("{error:#}").contains("backend check failed"));
        Ok(())
    }
}
