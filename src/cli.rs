//! CLI definitions for vidrelay.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// vidrelay CLI.
#[derive(Parser)]
#[command(name = "vidrelay")]
#[command(about = "Download videos and relay them to Google Drive")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the HTTP server in foreground (default)
    Serve {
        /// Server host (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides server.port)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Process the sheet queue once and print the report as JSON
    Sync {
        /// Process at most this many rows
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_no_subcommand() {
        let cli = Cli::try_parse_from(["vidrelay"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("config/default.toml"));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::try_parse_from(["vidrelay", "serve", "--host", "127.0.0.1", "--port", "9000"])
            .unwrap();
        match cli.command {
            Some(Commands::Serve { host, port }) => {
                assert_eq!(host.as_deref(), Some("127.0.0.1"));
                assert_eq!(port, Some(9000));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_sync_with_limit_and_global_config() {
        let cli = Cli::try_parse_from(["vidrelay", "sync", "--limit", "3", "-c", "/etc/vidrelay.toml"])
            .unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/vidrelay.toml"));
        assert!(matches!(cli.command, Some(Commands::Sync { limit: Some(3) })));
    }

    #[test]
    fn test_rejects_bad_port() {
        assert!(Cli::try_parse_from(["vidrelay", "serve", "--port", "http"]).is_err());
    }
}
