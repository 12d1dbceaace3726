//! Terminal front-end for the simulator core.
//!
//! Stands in for the canvas UI: loads a block list from a JSON file, feeds
//! it through the program model, and drives the execution engine while
//! printing published snapshots.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;

use crate::config::Config;
use crate::engine::{messages, ExecutionEngine, RunOutcome, StartOutcome};
use crate::program::Program;
use crate::types::{BlockKind, Position};

#[derive(Parser)]
#[command(name = "logicforge")]
#[command(about = "Logic Forge - a block-programming robot simulator", long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default search)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Execute a program file against a fresh robot
    Run {
        /// Path to a JSON program file (array of {kind, x, y} entries)
        program: String,

        /// Per-step delay in milliseconds (overrides config)
        #[arg(long)]
        step_delay_ms: Option<u64>,
    },

    /// Print the derived execution order without running
    Order {
        /// Path to a JSON program file
        program: String,
    },
}

/// One entry of a program file. Placement coordinates come straight from
/// the file; execution order follows from `y`.
#[derive(Debug, Deserialize)]
struct BlockEntry {
    kind: String,
    x: f64,
    y: f64,
}

fn load_program(path: &str) -> Result<Program> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read program file {}", path))?;
    let entries: Vec<BlockEntry> =
        serde_json::from_str(&raw).context("Program file is not a JSON block array")?;

    let mut program = Program::new();
    for entry in entries {
        let kind: BlockKind = entry
            .kind
            .parse()
            .with_context(|| format!("Rejected block entry at ({}, {})", entry.x, entry.y))?;
        program.add_block(
            kind,
            Position {
                x: entry.x,
                y: entry.y,
            },
        );
    }
    Ok(program)
}

/// Run the CLI by parsing process arguments.
pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config {
        std::env::set_var("LOGICFORGE_CONFIG_PATH", path);
    }

    let config = Config::load()?;

    match cli.command {
        Commands::Run {
            program,
            step_delay_ms,
        } => {
            let mut simulation = config.simulation.clone();
            if let Some(ms) = step_delay_ms {
                simulation.step_delay_ms = ms;
            }

            let program = load_program(&program)?;
            let engine = ExecutionEngine::new(simulation);

            let mut rx = engine.subscribe();
            let printer = tokio::spawn(async move {
                while rx.changed().await.is_ok() {
                    let snapshot = rx.borrow_and_update().clone();
                    if let Some(step) = snapshot.current_step {
                        println!(
                            "step {} | robot at ({}, {}) facing {:?}",
                            step, snapshot.robot.x, snapshot.robot.y, snapshot.robot.direction
                        );
                    }
                }
            });

            match engine.start(&program) {
                StartOutcome::Started(handle) => {
                    let outcome = handle.wait().await?;
                    let snapshot = engine.snapshot();
                    println!("{}", snapshot.message);
                    println!(
                        "final robot: ({}, {}) facing {:?}, energy {}%",
                        snapshot.robot.x,
                        snapshot.robot.y,
                        snapshot.robot.direction,
                        snapshot.robot.energy
                    );
                    if outcome == RunOutcome::Stopped {
                        std::process::exit(1);
                    }
                }
                StartOutcome::EmptyProgram => println!("{}", messages::EMPTY_PROGRAM),
                StartOutcome::AlreadyRunning => unreachable!("engine was just created"),
            }

            printer.abort();
        }

        Commands::Order { program } => {
            let program = load_program(&program)?;
            let order = ExecutionEngine::execution_order(program.blocks());

            if order.is_empty() {
                println!("No blocks placed");
                return Ok(());
            }

            println!("Execution order ({} block(s)):\n", order.len());
            for (index, block) in order.iter().enumerate() {
                println!("  {} | {} | y={}", index, block.label, block.position.y);
            }
        }
    }

    Ok(())
}
