use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::LevelFilter;

use sketchquest_lib::commands::settings as cmd;
use sketchquest_lib::config::{resolve_settings_path, SETTINGS_PATH_ENV};

/// Inspect and edit SketchQuest settings outside the web client.
#[derive(Parser)]
#[command(name = "sketchquest-settings", version)]
struct Cli {
    /// Settings file to use instead of the default location
    #[arg(long, global = true, env = SETTINGS_PATH_ENV)]
    file: Option<String>,

    /// Log loads and saves to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the stored settings (defaults if none are stored)
    Show,
    /// Print one setting
    Get { key: String },
    /// Change one setting and save it
    Set { key: String, value: String },
    /// Reset one setting, or every setting, to its default and save
    Reset { key: Option<String> },
    /// List setting names with their defaults
    Keys,
    /// Print the document presentation the stored settings produce
    Preview,
    /// Print the settings file location
    Path,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    simple_logging::log_to_stderr(if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    });

    let path: PathBuf = resolve_settings_path(cli.file.as_deref());

    match cli.command {
        Command::Path => println!("{}", path.display()),
        Command::Keys => {
            for info in cmd::keys() {
                println!("{:<28} {}", info.key, info.default);
            }
        }
        Command::Show => {
            let store = cmd::open_store(&path);
            println!("{}", cmd::show(&store)?);
        }
        Command::Get { key } => {
            let store = cmd::open_store(&path);
            println!("{}", cmd::get(&store, &key)?);
        }
        Command::Set { key, value } => {
            let mut store = cmd::open_store(&path);
            let change = cmd::set(&mut store, &key, &value)
                .with_context(|| format!("could not set {key}"))?;
            println!("{} = {}", change.key(), change.value_json());
        }
        Command::Reset { key } => {
            let mut store = cmd::open_store(&path);
            let unreadable = store.repository().holds_unreadable();
            let changed =
                cmd::reset(&mut store, key.as_deref()).context("could not reset settings")?;
            if unreadable {
                println!("Replaced unreadable settings file with defaults");
            } else if changed.is_empty() {
                println!("Nothing to reset");
            }
            for key in changed {
                println!("reset {key}");
            }
        }
        Command::Preview => {
            let store = cmd::open_store(&path);
            println!("{}", serde_json::to_string_pretty(&cmd::preview(&store))?);
        }
    }

    Ok(())
}
