//! CLI argument definitions for the table compiler.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "tablec",
    version,
    about = "Table compiler - turn design workbooks into game data tables",
    long_about = "Compile spreadsheet design workbooks into record files, companion\n\
                  schema code, enumeration code and localization files.\n\
                  Nothing is written unless every selected table is clean."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for humans, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Prefix log lines with a timestamp.
    #[arg(long = "log-timestamps", global = true)]
    pub log_timestamps: bool,

    /// Include the module path of each log event.
    #[arg(long = "log-target", global = true)]
    pub log_target: bool,

    /// Leave span close events out of json logs.
    #[arg(long = "no-log-spans", global = true)]
    pub no_log_spans: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compile the workbooks of a design folder.
    Build(BuildArgs),

    /// List the workbooks and table sheets of a design folder.
    List(ListArgs),
}

#[derive(Parser)]
pub struct BuildArgs {
    /// Folder holding the design workbooks.
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Workbook file name, file stem or table sheet name to compile.
    ///
    /// May be repeated. Related workbooks (every type workbook, every
    /// localization workbook, the rest of a merge group) are added
    /// automatically.
    #[arg(long = "select", short = 's', value_name = "NAME")]
    pub select: Vec<String>,

    /// Compile every table workbook (the default without --select).
    #[arg(long = "all", conflicts_with = "select")]
    pub all: bool,

    /// Configuration file (default: <INPUT_DIR>/tablec.toml when present).
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output root, overriding the configuration file.
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Namespace for generated code, overriding the configuration file.
    #[arg(long = "namespace", value_name = "NS")]
    pub namespace: Option<String>,

    /// Worker threads per parallel phase.
    #[arg(long = "jobs", short = 'j', value_name = "N")]
    pub jobs: Option<usize>,

    /// Diagnostic report path (default: error/ExportError_<timestamp>.<ext>).
    #[arg(long = "report", value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Diagnostic report format; inferred from --report when omitted.
    #[arg(long = "report-format", value_enum)]
    pub report_format: Option<ReportFormatArg>,

    /// Validate everything without writing any output.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct ListArgs {
    /// Folder holding the design workbooks.
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ReportFormatArg {
    Xlsx,
    Csv,
    Json,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn build_flags_parse() {
        let cli = Cli::parse_from([
            "tablec", "build", "design", "-s", "Item", "--select", "quest", "-j", "2", "--dry-run",
        ]);
        let Command::Build(args) = cli.command else {
            panic!("expected build");
        };
        assert_eq!(args.select, vec!["Item", "quest"]);
        assert_eq!(args.jobs, Some(2));
        assert!(args.dry_run);
        assert!(!args.all);
    }

    #[test]
    fn log_display_flags_are_global() {
        let cli = Cli::parse_from([
            "tablec", "list", "design", "--log-timestamps", "--log-target", "--no-log-spans",
        ]);
        assert!(cli.log_timestamps);
        assert!(cli.log_target);
        assert!(cli.no_log_spans);
    }

    #[test]
    fn all_conflicts_with_select() {
        let parsed = Cli::try_parse_from(["tablec", "build", "design", "--all", "-s", "Item"]);
        assert!(parsed.is_err());
    }
}
