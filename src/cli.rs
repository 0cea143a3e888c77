use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Research agent that qualifies a LinkedIn prospect against a sales goal
#[derive(Parser, Debug, Clone)]
#[command(name = "prospector", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "PROSPECTOR_CONFIG", default_value = "prospector.toml")]
    pub config: PathBuf,

    /// Server host address
    #[arg(long, env = "PROSPECTOR_HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(long, env = "PROSPECTOR_PORT")]
    pub port: Option<u16>,

    /// Run a single research instead of serving HTTP
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Research one profile and print every event as a JSON line
    Research {
        /// What the user wants to sell or achieve
        #[arg(long)]
        goal: String,

        /// LinkedIn profile URL to research
        #[arg(long)]
        profile_url: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["prospector"]);
        assert_eq!(cli.config, PathBuf::from("prospector.toml"));
        assert!(cli.host.is_none());
        assert!(cli.port.is_none());
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_with_args() {
        let cli = Cli::parse_from([
            "prospector",
            "--config",
            "custom.toml",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
        ]);
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        assert_eq!(cli.host, Some("0.0.0.0".to_string()));
        assert_eq!(cli.port, Some(8080));
    }

    #[test]
    fn test_research_subcommand() {
        let cli = Cli::parse_from([
            "prospector",
            "research",
            "--goal",
            "Sell SOC tooling",
            "--profile-url",
            "https://www.linkedin.com/in/jane-doe",
        ]);
        match cli.command {
            Some(Command::Research { goal, profile_url }) => {
                assert_eq!(goal, "Sell SOC tooling");
                assert_eq!(profile_url, "https://www.linkedin.com/in/jane-doe");
            }
            None => panic!("expected research subcommand"),
        }
    }
}
