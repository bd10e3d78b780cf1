//! `callsim` command-line interface.
//!
//! `simulate` replays a scripted transcript through the full pipeline
//! against the configured chat proxy; the remaining commands inspect and
//! manage stored conversations.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use cs_domain::config::Config;
use cs_domain::{scenario, Error, Result};
use cs_sessions::Speaker;

use crate::controller::CallController;

#[derive(Parser)]
#[command(name = "callsim", about = "Emergency-call operator training simulator")]
pub struct Cli {
    /// Path to the TOML config file.
    #[arg(long, default_value = "callsim.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Replay a scripted transcript through the analysis pipeline.
    Simulate {
        /// Script file: one turn per line, `operator: …` or `dzwoniący: …`.
        script: PathBuf,
        /// Scenario id from the catalogue; omitted = random.
        #[arg(long)]
        scenario: Option<u32>,
    },
    /// List stored conversations, newest first.
    List,
    /// Show one stored conversation with its derived artifacts.
    Show { id: String },
    /// Delete a stored conversation.
    Delete { id: String },
    /// Print the built-in scenario catalogue.
    Scenarios,
}

/// Load the TOML config, falling back to defaults when the file is absent.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }
    let raw = std::fs::read_to_string(path).map_err(Error::Io)?;
    toml::from_str(&raw).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
}

/// Parse one script line into a turn. Empty lines and `#` comments yield
/// `None`; a line without a known speaker prefix is an error.
pub fn parse_script_line(line: &str) -> Result<Option<(Speaker, String)>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (prefix, rest) = line
        .split_once(':')
        .ok_or_else(|| Error::Other(format!("script line without speaker prefix: {line}")))?;

    let speaker = match prefix.trim().to_lowercase().as_str() {
        "operator" => Speaker::Operator,
        "dzwoniący" | "dzwoniacy" | "caller" => Speaker::Caller,
        other => {
            return Err(Error::Other(format!("unknown speaker in script: {other}")));
        }
    };
    Ok(Some((speaker, rest.trim().to_owned())))
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli.config)?;

    match cli.command {
        Command::Simulate { script, scenario: scenario_id } => {
            simulate(&config, &script, scenario_id).await
        }
        Command::List => {
            let controller = CallController::from_config(&config)?;
            for record in controller.sessions() {
                let title = if record.title.is_empty() {
                    "(bez tytułu)"
                } else {
                    record.title.as_str()
                };
                println!(
                    "{}  {}  {}  ({} tur)",
                    record.id,
                    record.start_time.format("%Y-%m-%d %H:%M"),
                    title,
                    record.messages.len()
                );
            }
            Ok(())
        }
        Command::Show { id } => {
            let controller = CallController::from_config(&config)?;
            let Some(session) = controller.open(&id) else {
                anyhow::bail!("no conversation with id {id}");
            };
            println!("Scenariusz: {}\n", session.scenario());
            println!("{}", session.transcript_text());
            if !session.title().is_empty() {
                println!("Tytuł: {}\n", session.title());
            }
            println!("{}\n", session.report());
            if !session.summary().is_empty() {
                println!("{}", session.summary());
            }
            Ok(())
        }
        Command::Delete { id } => {
            let controller = CallController::from_config(&config)?;
            controller.delete(&id)?;
            Ok(())
        }
        Command::Scenarios => {
            for s in scenario::all() {
                println!("{}. {}\n   {}", s.id, s.title, s.description);
            }
            Ok(())
        }
    }
}

/// Replay a script file as a live call: every caller line triggers the
/// same incremental extraction a spoken turn would, and the final analysis
/// runs at end of script.
async fn simulate(
    config: &Config,
    script: &Path,
    scenario_id: Option<u32>,
) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(script)?;

    let scenario = match scenario_id {
        Some(id) => scenario::by_id(id)
            .ok_or_else(|| anyhow::anyhow!("no scenario with id {id}"))?,
        None => scenario::random(),
    };
    println!("Scenariusz: {}\n", scenario.description);

    let controller = CallController::from_config(config)?;
    controller.begin(&scenario.description)?;
    controller.connected()?;

    for line in raw.lines() {
        if let Some((speaker, text)) = parse_script_line(line)? {
            println!("{}: {}", speaker.label(), text);
            controller.observe_turn(&text, speaker)?;
        }
    }

    println!("\nAnaliza rozmowy w toku…\n");
    controller.end_call().await?;

    if let Some(handle) = controller.active() {
        let session = handle.lock();
        if !session.title().is_empty() {
            println!("Tytuł: {}\n", session.title());
        }
        println!("{}\n", session.report());
        if !session.summary().is_empty() {
            println!("{}", session.summary());
        }
        println!("\nZapisano rozmowę {}", session.id());
    }
    Ok(())
}
