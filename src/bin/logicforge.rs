//! Logic Forge CLI
//!
//! Drives the simulator core from the terminal, without any canvas UI.

use logicforge_core::cli;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    if let Err(e) = cli::run_cli().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
