use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "hive",
    about = "Mounted key-value namespace",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate a namespace config and print its mount table
    Mounts(MountsArgs),
    /// Run a script of put/get/ls/rm commands against a namespace
    Run(RunArgs),
}

#[derive(Args)]
pub struct MountsArgs {
    #[arg(short, long)]
    pub config: PathBuf,
}

#[derive(Args)]
pub struct RunArgs {
    #[arg(short, long)]
    pub config: PathBuf,
    /// Script file; standard input when omitted
    pub script: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_mounts() {
        let cli = Cli::try_parse_from(["hive", "mounts", "--config", "ns.toml"]).unwrap();
        if let Command::Mounts(args) = cli.command {
            assert_eq!(args.config, PathBuf::from("ns.toml"));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_run_with_script() {
        let cli = Cli::try_parse_from(["hive", "run", "-c", "ns.toml", "ops.hive"]).unwrap();
        if let Command::Run(args) = cli.command {
            assert_eq!(args.config, PathBuf::from("ns.toml"));
            assert_eq!(args.script, Some(PathBuf::from("ops.hive")));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_run_from_stdin() {
        let cli = Cli::try_parse_from(["hive", "run", "--config", "ns.toml"]).unwrap();
        if let Command::Run(args) = cli.command {
            assert!(args.script.is_none());
        } else { panic!("wrong command"); }
    }

    #[test]
    fn config_is_required() {
        assert!(Cli::try_parse_from(["hive", "mounts"]).is_err());
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["hive", "--verbose", "mounts", "-c", "x"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn parse_json_format() {
        let cli = Cli::try_parse_from(["hive", "--format", "json", "mounts", "-c", "x"]).unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
    }
}
