//! Command-line interface for the menu host.
//!
//! Options given here override the matching configuration file settings.

use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;

/// Command line arguments parsed from user input.
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Optional override for the layout directory
    pub layout_dir: Option<PathBuf>,
    /// Optional override for the message file
    pub messages_file: Option<PathBuf>,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
    /// Render every layout once, print the pages as JSON and exit
    pub dump: bool,
    /// Number of sample fillers handed to fillable layouts in dump mode
    pub sample_fillers: usize,
}

impl CliArgs {
    /// Parses command line arguments using clap.
    pub fn parse() -> Self {
        Self::from_matches(Self::command().get_matches())
    }

    fn command() -> Command {
        Command::new("Menu Host")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Loads menu layouts and drives the menu engine tick loop")
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path")
                    .default_value("menus.toml"),
            )
            .arg(
                Arg::new("layouts")
                    .short('L')
                    .long("layouts")
                    .value_name("DIR")
                    .help("Layout directory path"),
            )
            .arg(
                Arg::new("messages")
                    .short('m')
                    .long("messages")
                    .value_name("FILE")
                    .help("Message file path"),
            )
            .arg(
                Arg::new("log-level")
                    .short('l')
                    .long("log-level")
                    .value_name("LEVEL")
                    .help("Log level (trace, debug, info, warn, error)"),
            )
            .arg(
                Arg::new("json-logs")
                    .long("json-logs")
                    .help("Output logs in JSON format")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("dump")
                    .long("dump")
                    .help("Render every layout, print the pages as JSON and exit")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("sample-fillers")
                    .long("sample-fillers")
                    .value_name("COUNT")
                    .help("Sample fillers given to fillable layouts in dump mode")
                    .value_parser(clap::value_parser!(usize))
                    .default_value("0"),
            )
    }

    fn from_matches(matches: clap::ArgMatches) -> Self {
        Self {
            config_path: matches
                .get_one::<String>("config")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("menus.toml")),
            layout_dir: matches.get_one::<String>("layouts").map(PathBuf::from),
            messages_file: matches.get_one::<String>("messages").map(PathBuf::from),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
            dump: matches.get_flag("dump"),
            sample_fillers: matches.get_one::<usize>("sample-fillers").copied().unwrap_or(0),
        }
    }
}
