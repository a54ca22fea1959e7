use clap::{Parser, Subcommand};

/// iqhook server - Nexus IQ webhook receiver
#[derive(Parser, Debug)]
#[command(name = "iqhookd")]
#[command(version = iqhook_core::VERSION)]
#[command(about = "Nexus IQ webhook receiver daemon", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Default)]
pub enum Commands {
    /// Run server in foreground (default if no command given)
    #[default]
    Run,

    /// Validate the environment configuration and print it
    CheckConfig,
}
