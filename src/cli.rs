use clap::{Parser, Subcommand};

/// Unilock — Simplified identity-provider management gateway
#[derive(Parser)]
#[command(name = "unilock", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the gateway server
    Serve {
        /// Port to bind
        #[arg(short, long, default_value = "8000")]
        port: u16,
    },

    /// Manage access tokens
    Token {
        #[command(subcommand)]
        command: TokenCommands,
    },
}

#[derive(Subcommand)]
pub enum TokenCommands {
    /// Issue a signed access token
    Issue {
        /// Subject the token is issued for
        #[arg(long)]
        subject: String,
        /// Scopes to embed, comma-separated (e.g. admin,user)
        #[arg(long, value_delimiter = ',')]
        scopes: Vec<String>,
        /// Lifetime in minutes (configured default when omitted)
        #[arg(long)]
        ttl_minutes: Option<i64>,
    },
}
