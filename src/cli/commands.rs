use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "chat-relay",
    version,
    about = "Stateless chat relay for the Claude messages API",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Override the config file path globally
    #[arg(short, long, global = true, default_value = "config.yaml")]
    pub config: String,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP relay (default)
    Serve,

    /// Chat with the model from the terminal; history lives only in memory
    Chat,

    /// Run the liveness check once and exit non-zero when unhealthy
    Ping,
}
