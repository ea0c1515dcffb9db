//! VFAT2 configuration tool
//!
//! Usage:
//!   vfat2-config check   [options.toml]
//!   vfat2-config dump    [options.toml]
//!   vfat2-config rewrite [options.toml] [--user NAME] [--time TIME]
//!
//! The options file defaults to `.config/vfat2.toml` and is created with
//! default values when missing.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use vfat2_config::logging::init_tracing;
use vfat2_config::{ConfigManager, DocumentKind, ManagerOptions};

const DEFAULT_OPTIONS_PATH: &str = ".config/vfat2.toml";

#[derive(Parser, Debug)]
#[command(name = "vfat2-config", version, about = "Check, dump or rewrite VFAT2 configuration documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
struct OptionsArg {
    /// Options file naming the document pair.
    #[arg(value_name = "OPTIONS", default_value = DEFAULT_OPTIONS_PATH)]
    path: PathBuf,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Parse both documents and print a summary.
    Check {
        #[command(flatten)]
        options: OptionsArg,
    },
    /// Parse both documents and print a JSON snapshot.
    Dump {
        #[command(flatten)]
        options: OptionsArg,
    },
    /// Parse both documents, re-stamp them and write them back.
    Rewrite {
        #[command(flatten)]
        options: OptionsArg,
        /// User stamped into both documents.
        #[arg(long)]
        user: Option<String>,
        /// Build time stamped into both documents.
        #[arg(long)]
        time: Option<String>,
    },
}

impl Command {
    fn options_path(&self) -> &PathBuf {
        match self {
            Self::Check { options } | Self::Dump { options } | Self::Rewrite { options, .. } => {
                &options.path
            }
        }
    }
}

fn run(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    let options_path = command.options_path();
    let options = ManagerOptions::load_or_create(options_path)?;
    init_tracing(options.logging.level);
    tracing::debug!("Loaded options from {}", options_path.display());

    let mut manager = ConfigManager::from_options(&options);
    manager.parse_both()?;

    match command {
        Command::Check { .. } => {
            for kind in [DocumentKind::Global, DocumentKind::Channel] {
                println!(
                    "{}: {} ({} setting(s))",
                    kind,
                    manager.path(kind).display(),
                    manager.settings().scope_len(kind.schema().scope)
                );
            }
        }
        Command::Dump { .. } => {
            println!("{}", manager.snapshot_json()?);
        }
        Command::Rewrite { user, time, .. } => {
            if let Some(user) = user {
                manager.set_user(user);
            }
            if let Some(time) = time {
                manager.set_time(time);
            }
            manager.write_both()?;
            println!(
                "Rewrote {} and {}",
                manager.global_path().display(),
                manager.channel_path().display()
            );
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    // Usage errors exit with status 2 from clap.
    let cli = Cli::parse();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Command, clap::Error> {
        Cli::try_parse_from(std::iter::once("vfat2-config").chain(args.iter().copied()))
            .map(|cli| cli.command)
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_options_path() {
        let command = parse(&["check"]).unwrap();
        assert!(matches!(command, Command::Check { .. }));
        assert_eq!(command.options_path(), &PathBuf::from(DEFAULT_OPTIONS_PATH));
    }

    #[test]
    fn rewrite_takes_stamp_overrides() {
        let command = parse(&[
            "rewrite",
            "site.toml",
            "--user",
            "alice",
            "--time",
            "2016-01-01 00:00:00",
        ])
        .unwrap();

        assert_eq!(
            command,
            Command::Rewrite {
                options: OptionsArg {
                    path: PathBuf::from("site.toml"),
                },
                user: Some("alice".to_string()),
                time: Some("2016-01-01 00:00:00".to_string()),
            }
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["frobnicate"]).is_err());
        assert!(parse(&["dump", "--user", "alice"]).is_err());
        assert!(parse(&["rewrite", "--user"]).is_err());
        assert!(parse(&["check", "a.toml", "b.toml"]).is_err());
    }

    #[test]
    fn usage_errors_exit_with_status_two() {
        let err = parse(&["frobnicate"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
