use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tgfs",
    about = "Store files in a Telegram chat",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML config file with `token` and `chat_id`. Falls back to the
    /// TGFS_TOKEN / TGFS_CHAT_ID environment variables.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Name of this remote, used in logs and output.
    #[arg(long, global = true, default_value = "tg")]
    pub name: String,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Upload a local file
    Put(PutArgs),
    /// Write a stored file to stdout
    Cat(RemoteArgs),
    /// Download a stored file to a local path
    Get(GetArgs),
    /// Delete a stored file
    Rm(RemoteArgs),
    /// Show metadata of a stored file
    Stat(RemoteArgs),
    /// Show the destination chat and supported operations
    Info,
}

#[derive(Args)]
pub struct PutArgs {
    pub local: PathBuf,
    /// Name to store the file under (defaults to the local file name)
    #[arg(long = "as")]
    pub remote_name: Option<String>,
}

#[derive(Args)]
pub struct RemoteArgs {
    /// Remote path as printed by `put`, e.g. `/123:BQACAgIAAx...`
    pub remote: String,
}

#[derive(Args)]
pub struct GetArgs {
    pub remote: String,
    pub local: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_put_with_remote_name() {
        let cli = Cli::parse_from(["tgfs", "put", "report.pdf", "--as", "q3.pdf", "-v"]);
        assert!(cli.verbose);
        match cli.command {
            Command::Put(args) => {
                assert_eq!(args.local, PathBuf::from("report.pdf"));
                assert_eq!(args.remote_name.as_deref(), Some("q3.pdf"));
            }
            _ => panic!("expected put"),
        }
    }

    #[test]
    fn global_config_after_subcommand() {
        let cli = Cli::parse_from(["tgfs", "stat", "/1:abc", "--config", "tgfs.toml", "--format", "json"]);
        assert_eq!(cli.config, Some(PathBuf::from("tgfs.toml")));
        assert!(matches!(cli.format, OutputFormat::Json));
        assert!(matches!(cli.command, Command::Stat(ref a) if a.remote == "/1:abc"));
    }
}
