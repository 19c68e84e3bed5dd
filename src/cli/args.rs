use clap::Parser;

/// Simulated arm controller answering a vision controller over ZMQ.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// ZMQ endpoint to bind, e.g. ipc:///tmp/vision_arm.ipc
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Optional TOML configuration file
    #[arg(long)]
    pub config: Option<String>,

    /// Simulated actuation time per command, in milliseconds
    #[arg(long)]
    pub action_delay_ms: Option<u64>,

    #[arg(long)]
    pub device_id: Option<u8>,

    #[arg(long)]
    pub log_file: Option<String>,

    #[arg(long)]
    pub debug: bool,

    /// Print the route table as JSON and exit
    #[arg(long)]
    pub print_routes: bool,
}
