//! `epf`: replay editing sessions against an evidence profile
//!
//! Loads a profile (or starts blank), applies button identifiers in order
//! and prints the result as a flat form, a nested record or a render
//! snapshot.

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use epf_tree::{Dispatch, EditorConfig, EvidenceProfile, FlatForm, PersistenceSink, TreeError};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn cli() -> Command {
    let profile = Arg::new("profile")
        .long("profile")
        .value_parser(value_parser!(PathBuf))
        .help("Profile JSON to load; a blank profile when omitted");

    Command::new("epf")
        .version(epf_tree::VERSION)
        .about("Evidence profile formset editor")
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Editor configuration TOML"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand_required(true)
        .subcommand(Command::new("config").about("Print the effective configuration as TOML"))
        .subcommand(
            Command::new("check")
                .about("Import a profile and verify every collection")
                .arg(profile.clone().required(true)),
        )
        .subcommand(
            Command::new("edit")
                .about("Apply button identifiers and print the result")
                .arg(profile)
                .arg(
                    Arg::new("action")
                        .long("action")
                        .short('a')
                        .action(ArgAction::Append)
                        .help("Button identifier, e.g. scenarioButton_1_add"),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .value_parser(["form", "json", "view"])
                        .default_value("form")
                        .help("What to print"),
                )
                .arg(
                    Arg::new("strict")
                        .long("strict")
                        .action(ArgAction::SetTrue)
                        .help("Fail on the first ignored action"),
                ),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load_config(matches: &ArgMatches) -> Result<EditorConfig> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => EditorConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(EditorConfig::default()),
    }
}

fn load_profile(args: &ArgMatches, config: EditorConfig) -> Result<EvidenceProfile> {
    let config = Arc::new(config);

    match args.get_one::<PathBuf>("profile") {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading profile {}", path.display()))?;
            EvidenceProfile::from_json(&json, config)
                .with_context(|| format!("importing profile {}", path.display()))
        }
        None => EvidenceProfile::new(config).context("creating blank profile"),
    }
}

/// Writes submissions to stdout as `name=value` lines
struct StdoutSink;

#[async_trait]
impl PersistenceSink for StdoutSink {
    async fn submit(&self, form: &FlatForm) -> Result<(), TreeError> {
        for (name, value) in form {
            println!("{name}={value}");
        }
        Ok(())
    }
}

async fn edit(args: &ArgMatches, config: EditorConfig) -> Result<()> {
    let mut profile = load_profile(args, config)?;
    let strict = args.get_flag("strict");

    for id in args.get_many::<String>("action").into_iter().flatten() {
        match profile.apply_id(id) {
            Dispatch::Changed => tracing::info!(id = %id, "applied"),
            Dispatch::Ignored(reason) if strict => {
                anyhow::bail!("action {id} ignored: {reason}");
            }
            Dispatch::Ignored(reason) => tracing::warn!(id = %id, %reason, "ignored"),
        }
    }

    let output = args
        .get_one::<String>("output")
        .map_or("form", String::as_str);

    match output {
        "json" => println!("{}", profile.to_json()?),
        "view" => println!("{}", serde_json::to_string_pretty(&profile.view())?),
        _ => profile.submit(&StdoutSink).await?,
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("json-logs"));

    let config = load_config(&matches)?;

    match matches.subcommand() {
        Some(("config", _)) => print!("{}", config.to_toml_string()?),
        Some(("check", args)) => {
            let profile = load_profile(args, config)?;
            profile
                .check_invariants()
                .context("profile failed invariant check")?;
            println!(
                "ok: {} streams, {} inferences",
                profile.streams().len(),
                profile.inferences().len()
            );
        }
        Some(("edit", args)) => edit(args, config).await?,
        _ => {}
    }

    Ok(())
}
