use std::path::PathBuf;

use argspec_cli::{
    CliError, Manifest, exit_on_failure, match_all_args_or_exit, prepend_args_from_file,
};
use argspec_core::{MatchPolicy, ParseError, SinkSnapshot};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(name = "argspec")]
#[command(about = "Match command-line arguments against option specifications")]
#[command(disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Match arguments against a manifest and print the stored values as JSON.
    Check(CheckArgs),
    /// Print the help message generated for a manifest.
    Help(HelpArgs),
    /// Print the compiled option descriptors of a manifest as JSON.
    Describe(DescribeArgs),
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// YAML manifest declaring the options.
    #[arg(long)]
    manifest: PathBuf,
    /// File whose tokens are prepended to the arguments.
    #[arg(long)]
    args_file: Option<PathBuf>,
    /// Report unknown arguments instead of failing on them.
    #[arg(long)]
    collect_unmatched: bool,
    /// Arguments to match, given after `--`.
    #[arg(last = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct HelpArgs {
    /// YAML manifest declaring the options.
    #[arg(long)]
    manifest: PathBuf,
    /// Console width used for word-wrapping.
    #[arg(long)]
    columns: Option<usize>,
    /// Column at which help text starts.
    #[arg(long)]
    indent: Option<usize>,
}

#[derive(Debug, Args)]
struct DescribeArgs {
    /// YAML manifest declaring the options.
    #[arg(long)]
    manifest: PathBuf,
}

/// JSON report printed by `check`.
#[derive(Debug, Serialize)]
struct CheckReport {
    values: std::collections::BTreeMap<String, SinkSnapshot>,
    unmatched: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Check(args) => run_check(args),
        Command::Help(args) => run_help(args),
        Command::Describe(args) => run_describe(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_check(args: CheckArgs) -> Result<(), CliError> {
    let manifest = Manifest::load(&args.manifest)?;
    let mut bound = manifest.build()?;
    let tokens = match &args.args_file {
        Some(path) => prepend_args_from_file(path, &args.args)?,
        None => args.args,
    };

    let unmatched = if args.collect_unmatched {
        match bound.parser.match_all_args(&tokens, 0, MatchPolicy::COLLECT) {
            Ok(unmatched) => {
                if let Some(err) = bound.parser.last_error() {
                    exit_on_failure(&bound.parser, &ParseError::Match(err.clone()));
                }
                unmatched.unwrap_or_default()
            }
            Err(err) => exit_on_failure(&bound.parser, &err),
        }
    } else {
        match_all_args_or_exit(&mut bound.parser, &tokens);
        Vec::new()
    };

    let report = CheckReport {
        values: bound.values(),
        unmatched,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_help(args: HelpArgs) -> Result<(), CliError> {
    let mut manifest = Manifest::load(&args.manifest)?;
    if let Some(columns) = args.columns {
        manifest.help.columns = columns;
    }
    if let Some(indent) = args.indent {
        manifest.help.indent = indent;
    }
    let bound = manifest.build()?;
    print!("{}", bound.parser.help_message());
    Ok(())
}

fn run_describe(args: DescribeArgs) -> Result<(), CliError> {
    let manifest = Manifest::load(&args.manifest)?;
    let bound = manifest.build()?;
    println!(
        "{}",
        serde_json::to_string_pretty(bound.parser.descriptors())?
    );
    Ok(())
}
