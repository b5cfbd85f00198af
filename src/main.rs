//! CLI entry point for symboard
//!
//! Provides command-line interface for compiling keyboard specifications
//! into macOS `.keylayout` files and for listing the known dead-key states.

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use symboard::compiler::Compiler;
use symboard::config::{load_states, Settings};
use symboard::core::KeyOutput;
use tracing::Level;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log every pipeline step
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory of state definition files
    #[arg(long, global = true)]
    states_dir: Option<String>,

    /// Directory of base layout files
    #[arg(long, global = true)]
    keylayouts_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a keyboard specification into a .keylayout file
    Compile {
        /// Path to the YAML specification
        input: PathBuf,

        /// Where to write the keylayout (defaults to ./a.keylayout)
        output: Option<PathBuf>,
    },

    /// List all dead-key states
    States,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let mut settings = Settings::from_env();
    if let Some(dir) = &cli.states_dir {
        settings = settings.with_states_dir(dir);
    }
    if let Some(dir) = &cli.keylayouts_dir {
        settings = settings.with_keylayouts_dir(dir);
    }

    match cli.command {
        Commands::Compile { input, output } => compile(settings, &input, output.as_deref())?,
        Commands::States => list_states(&settings)?,
    }

    Ok(())
}

/// Compile a specification and write the keylayout
fn compile(settings: Settings, input: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    println!("{} Compiling: {}", "→".cyan(), input.display());

    let written = Compiler::new(settings)
        .run(input, output)
        .with_context(|| format!("Failed to compile {}", input.display()))?;

    println!("{} Wrote {}", "✓".green(), written.display());
    Ok(())
}

/// List every state with its terminator and outputs
fn list_states(settings: &Settings) -> anyhow::Result<()> {
    let states = load_states(settings)?;

    println!(
        "{}",
        format!("States from: {}\n", settings.states_dir.display()).bold()
    );

    for state in states.iter() {
        let outputs: String = state
            .action_to_output_map
            .values()
            .map(|output| match output {
                KeyOutput::Literal(text) => text.clone(),
                KeyOutput::Action(action) => format!("[{}]", action.id),
            })
            .collect();

        println!(
            "{} {} {}",
            state.name.cyan().bold(),
            format!("({})", state.terminator).dimmed(),
            outputs
        );
    }

    println!("\n{} Total: {} states", "✓".green(), states.len());
    Ok(())
}
