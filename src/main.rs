use arm_simulator::{
    cli::{self, CliArgs, ConsoleExit, OperatorCommand},
    config::Config,
    controller::ArmController,
    logging,
    router::RouteTable,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;

fn main() -> Result<()> {
    // Parse command-line arguments
    let cli_args = CliArgs::parse();

    if cli_args.print_routes {
        let table = RouteTable::build()?;
        println!("{}", serde_json::to_string_pretty(&table.entries())?);
        return Ok(());
    }

    // Load configuration
    let config = Config::load(&cli_args)?;

    // Setup logging
    arm_simulator::initialize(config.logging.verbosity, config.logging.log_file.as_deref())?;
    logging::log_app_config(&config);

    // Installed before the controller starts so Ctrl+C always reaches stop().
    let shutdown = cli::shutdown_signal().context("Failed to install signal handler")?;

    let controller = ArmController::new(config.controller_config());
    if !controller.initialize_with_peer(config.peer_config()) {
        bail!("Failed to initialize controller on {}", config.network.endpoint);
    }
    if !controller.start() {
        bail!("Failed to start controller on {}", config.network.endpoint);
    }

    println!("========================================");
    println!("Arm Simulator CLI");
    println!("{}", OperatorCommand::help_text());
    println!("========================================");

    let lines = cli::spawn_stdin_reader().context("Failed to spawn stdin reader")?;
    match cli::run_console(&lines, &shutdown, &controller)? {
        ConsoleExit::Signal => info!("Shutting down on signal"),
        ConsoleExit::EndOfInput => info!("Input closed, shutting down"),
        ConsoleExit::Command => {}
    }

    controller.stop();
    info!("Arm simulator stopped");

    Ok(())
}
