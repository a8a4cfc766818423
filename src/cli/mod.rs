//! Command-line interface.

pub mod catalog;
pub mod serve;

use clap::{Parser, Subcommand};

/// Solaris - AI gateway for OpenAI and Gemini
#[derive(Parser, Debug)]
#[command(name = "solaris", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Listen address (overrides SOLARIS_HOST)
        #[arg(long)]
        host: Option<String>,
        /// Listen port (overrides SOLARIS_PORT)
        #[arg(short, long)]
        port: Option<u16>,
        /// Emit logs as JSON lines
        #[arg(long, default_value_t = false)]
        json_logs: bool,
    },
    /// List providers that have credentials configured
    Providers,
    /// List the models known for a provider
    Models {
        /// Provider name (openai, gemini)
        provider: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from(["solaris", "serve", "--host", "127.0.0.1", "-p", "9000"])
            .unwrap();
        match cli.command {
            Commands::Serve {
                host,
                port,
                json_logs,
            } => {
                assert_eq!(host.as_deref(), Some("127.0.0.1"));
                assert_eq!(port, Some(9000));
                assert!(!json_logs);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_models_requires_provider() {
        assert!(Cli::try_parse_from(["solaris", "models"]).is_err());
        let cli = Cli::try_parse_from(["solaris", "models", "gemini"]).unwrap();
        assert!(matches!(cli.command, Commands::Models { provider } if provider == "gemini"));
    }
}
