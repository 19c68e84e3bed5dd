use anyhow::Result;
use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use log::{debug, info, LevelFilter};
use std::io;

pub fn setup_logging(verbosity: u8, log_file: Option<&str>) -> Result<()> {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);

    let mut base_config = fern::Dispatch::new();

    base_config = match verbosity {
        0 => base_config.level(LevelFilter::Info),
        1 => base_config.level(LevelFilter::Debug),
        _ => base_config.level(LevelFilter::Trace),
    };

    // File logs carry the full date.
    let file_config = fern::Dispatch::new().format(|out, message, record| {
        out.finish(format_args!(
            "{}[{}][{}] {}",
            Local::now().format("[%Y-%m-%d][%H:%M:%S%.3f]"),
            record.target(),
            record.level(),
            message
        ))
    });

    let stdout_config = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                Local::now().format("[%H:%M:%S%.3f]"),
                record.target(),
                colors.color(record.level()),
                message
            ))
        })
        .chain(io::stdout());

    base_config = base_config.chain(stdout_config);

    if let Some(log_file) = log_file {
        base_config = base_config.chain(file_config.chain(fern::log_file(log_file)?));
    }

    base_config.apply()?;

    info!("Logging system initialized");
    debug!("Debug logging enabled");

    Ok(())
}

pub fn log_app_start(version: &str) {
    info!("Starting arm simulator v{}", version);
}

pub fn log_app_config(config: &crate::config::Config) {
    info!("Application configured with:");
    info!("  Network:");
    info!("    Endpoint: {}", config.network.endpoint);
    info!("    Poll interval: {} ms", config.network.poll_interval_ms);
    info!("  Simulation:");
    info!("    Action delay: {} ms", config.simulation.action_delay_ms);
    info!("    Device id: {}", config.simulation.device_id);
    info!("  Logging:");
    info!("    Verbosity: {}", config.logging.verbosity);
    if let Some(log_file) = &config.logging.log_file {
        info!("    Log file: {}", log_file);
    }
}
