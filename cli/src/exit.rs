//! Process exit policy for terminal parse outcomes.
//!
//! The core never prints or exits. These helpers map its terminal outcomes
//! onto the conventional behaviour of a command-line program: help goes to
//! stdout with status 0, failures go to stderr with status 1.

use argspec_core::{ArgParser, MatchPolicy, ParseError};

/// Renders `error` with a hint naming the first help option, when help is
/// enabled.
///
/// # Examples
///
/// ```
/// use argspec_cli::failure_message;
/// use argspec_core::{ArgParser, ParseError};
///
/// let parser = ArgParser::new("demo");
/// let error = ParseError::Unmatched("-x".to_string());
/// assert_eq!(
///     failure_message(&parser, &error),
///     "unrecognized argument: -x\nUse --help for help information"
/// );
/// ```
pub fn failure_message(parser: &ArgParser, error: &ParseError) -> String {
    let mut message = error.to_string();
    if parser.help_enabled() {
        if let Some(name) = parser.first_help_option_name() {
            message.push_str(&format!("\nUse {name} for help information"));
        }
    }
    message
}

/// Exits the process for a terminal outcome.
///
/// A help request prints the help text to stdout and exits with status 0;
/// any other error prints [`failure_message`] to stderr and exits with
/// status 1.
pub fn exit_on_failure(parser: &ArgParser, error: &ParseError) -> ! {
    match error {
        ParseError::HelpRequested(text) => {
            print!("{text}");
            std::process::exit(0);
        }
        _ => {
            eprintln!("{}", failure_message(parser, error));
            std::process::exit(1);
        }
    }
}

/// Matches every argument under [`MatchPolicy::STRICT`], exiting the process
/// on a help request, a bad value or an unknown argument.
pub fn match_all_args_or_exit<S: AsRef<str>>(parser: &mut ArgParser, args: &[S]) {
    if let Err(err) = parser.match_all_args(args, 0, MatchPolicy::STRICT) {
        exit_on_failure(parser, &err);
    }
}
