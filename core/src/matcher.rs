//! Matching engine.
//!
//! [`ArgParser`] owns the ordered descriptor list. Declaration order decides
//! both matching priority and help layout, so a longer single-word prefix
//! such as `-file=` should be declared before a shorter one such as `-f`.
//!
//! # Examples
//!
//! ```
//! use argspec_core::{ArgParser, Holder, MatchPolicy};
//!
//! let verbose = Holder::<bool>::new();
//! let name = Holder::<String>::new();
//! let mut parser = ArgParser::new("greet [options]");
//! parser.add_option("-v,--verbose %v #print more", &verbose).unwrap();
//! parser.add_option("-name=%s #who to greet", &name).unwrap();
//!
//! let args = ["-v", "-name=world", "extra"];
//! let unmatched = parser.match_all_args(&args, 0, MatchPolicy::COLLECT).unwrap();
//! assert!(verbose.get());
//! assert_eq!(name.get(), "world");
//! assert_eq!(unmatched, Some(vec!["extra".to_string()]));
//! ```

use tracing::{debug, trace};

use crate::error::{MatchError, ParseError, SpecError};
use crate::help::{HelpConfig, render_help};
use crate::scanner::Scanner;
use crate::sink::ResultSink;
use crate::spec::compile;
use crate::types::{
    Alias, ConversionCode, OptionDescriptor, Scalar, VALID_CONVERSION_CODES, Value, ValueKind,
};

/// Name of the synthesized help option used in failure hints.
const DEFAULT_HELP_NAME: &str = "--help";

/// Returns every character accepted after `%` in a specification string.
pub fn valid_conversion_codes() -> &'static str {
    VALID_CONVERSION_CODES
}

/// What a driving loop does when a token fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPolicy {
    /// Return [`ParseError::Match`] on a bad value. Otherwise the pass stops
    /// and the error is kept in [`ArgParser::last_error`].
    pub halt_on_error: bool,
    /// Return [`ParseError::Unmatched`] on a token that selects no option.
    /// Otherwise the token is collected and matching continues.
    pub halt_on_unmatched: bool,
}

impl MatchPolicy {
    /// Fail on the first bad value or unknown token.
    pub const STRICT: Self = Self {
        halt_on_error: true,
        halt_on_unmatched: true,
    };

    /// Collect unknown tokens; stop quietly on a bad value.
    pub const COLLECT: Self = Self {
        halt_on_error: false,
        halt_on_unmatched: false,
    };
}

/// Which descriptor, if any, answers help requests.
#[derive(Debug, Clone, PartialEq, Eq)]
enum HelpSlot {
    /// The synthesized `--help,-?` option is `descriptors[0]`.
    Synthesized,
    /// No help option registered yet.
    Vacant,
    /// A user-declared help option, by primary name.
    Declared(String),
}

/// Option registry and matcher.
#[derive(Debug)]
pub struct ArgParser {
    descriptors: Vec<OptionDescriptor>,
    help_slot: HelpSlot,
    help_enabled: bool,
    synopsis: String,
    help_config: HelpConfig,
    last_error: Option<MatchError>,
    unmatched: Option<String>,
}

impl ArgParser {
    /// Creates a parser with the synthesized help option
    /// `--help,-? %h #displays help information`.
    ///
    /// The synthesized option is replaced by the first help option the
    /// caller registers.
    pub fn new(synopsis: impl Into<String>) -> Self {
        let mut parser = Self::without_default_help(synopsis);
        parser.descriptors.push(default_help_descriptor());
        parser.help_slot = HelpSlot::Synthesized;
        parser
    }

    /// Creates a parser without any help option.
    pub fn without_default_help(synopsis: impl Into<String>) -> Self {
        Self {
            descriptors: Vec::new(),
            help_slot: HelpSlot::Vacant,
            help_enabled: true,
            synopsis: synopsis.into(),
            help_config: HelpConfig::default(),
            last_error: None,
            unmatched: None,
        }
    }

    /// Registers a visible option.
    ///
    /// # Errors
    ///
    /// Returns a [`SpecError`] if the specification is malformed or the sink
    /// cannot store its values. Nothing is registered on error.
    pub fn add_option(&mut self, spec: &str, sink: impl Into<ResultSink>) -> Result<(), SpecError> {
        self.add_option_with_visibility(spec, sink, true)
    }

    /// Registers an option that is matched but left out of generated help.
    pub fn add_hidden_option(
        &mut self,
        spec: &str,
        sink: impl Into<ResultSink>,
    ) -> Result<(), SpecError> {
        self.add_option_with_visibility(spec, sink, false)
    }

    /// Registers an option with explicit help visibility.
    pub fn add_option_with_visibility(
        &mut self,
        spec: &str,
        sink: impl Into<ResultSink>,
        visible: bool,
    ) -> Result<(), SpecError> {
        let mut descriptor = compile(spec, sink.into())?;
        descriptor.visible = visible;

        if descriptor.is_help() {
            let name = descriptor.primary_name().unwrap_or_default().to_string();
            match self.help_slot {
                HelpSlot::Synthesized => {
                    self.descriptors.remove(0);
                    debug!(option = %name, "Replacing synthesized help option");
                    self.help_slot = HelpSlot::Declared(name);
                }
                HelpSlot::Vacant => self.help_slot = HelpSlot::Declared(name),
                HelpSlot::Declared(_) => {}
            }
        }

        debug!(
            spec,
            code = ?descriptor.code,
            kind = %descriptor.kind,
            multiplicity = descriptor.multiplicity,
            "Registered option"
        );
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Adds a heading line to the generated help. Delimiters never match.
    pub fn add_delimiter(&mut self, text: impl Into<String>) {
        self.descriptors.push(OptionDescriptor::delimiter(text));
    }

    /// Shows or hides the option named `name` in generated help.
    ///
    /// Returns `false` if no alias of any option equals `name`.
    pub fn set_option_visible(&mut self, name: &str, visible: bool) -> bool {
        let found = self
            .descriptors
            .iter_mut()
            .find(|descriptor| descriptor.aliases.iter().any(|alias| alias.name == name));
        match found {
            Some(descriptor) => {
                descriptor.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Descriptors in declaration order, delimiters included.
    pub fn descriptors(&self) -> &[OptionDescriptor] {
        &self.descriptors
    }

    /// The most recently registered descriptor.
    pub fn last_descriptor(&self) -> Option<&OptionDescriptor> {
        self.descriptors.last()
    }

    /// Finds the first descriptor selected by `token`.
    ///
    /// Single-word aliases match by prefix, all others exactly. Help options
    /// are found even while help is disabled.
    pub fn find_descriptor(&self, token: &str) -> Option<&OptionDescriptor> {
        self.lookup(token).map(|(position, _)| &self.descriptors[position])
    }

    fn lookup(&self, token: &str) -> Option<(usize, usize)> {
        self.descriptors
            .iter()
            .enumerate()
            .find_map(|(position, descriptor)| {
                descriptor
                    .alias_position(token)
                    .map(|alias_index| (position, alias_index))
            })
    }

    /// Matches the option at `args[index]` and returns the index where the
    /// next match should start.
    ///
    /// A token that selects no option (or a help option while help is
    /// disabled) is recorded in [`unmatched_argument`](Self::unmatched_argument)
    /// and skipped.
    ///
    /// # Errors
    ///
    /// [`ParseError::Match`] when the option's values are missing, malformed
    /// or out of range; the sink is left untouched. [`ParseError::HelpRequested`]
    /// with the rendered help when an enabled help option matches.
    pub fn match_arg<S: AsRef<str>>(&mut self, args: &[S], index: usize) -> Result<usize, ParseError> {
        self.unmatched = None;
        self.last_error = None;

        let Some(token) = args.get(index).map(AsRef::as_ref) else {
            return Ok(args.len());
        };

        let found = self
            .lookup(token)
            .filter(|&(position, _)| self.help_enabled || !self.descriptors[position].is_help());
        let Some((position, alias_index)) = found else {
            trace!(token, index, "Unmatched argument");
            self.unmatched = Some(token.to_string());
            return Ok(index + 1);
        };

        let descriptor = &self.descriptors[position];
        if descriptor.is_help() {
            debug!(token, "Help requested");
            return Err(ParseError::HelpRequested(self.help_message()));
        }

        let alias = &descriptor.aliases[alias_index];
        debug!(option = %alias.name, token, index, "Matched argument");
        match read_values(descriptor, alias, args, index) {
            Ok((next, values)) => {
                descriptor.sink.commit(values, descriptor.multiplicity);
                Ok(next)
            }
            Err(err) => {
                self.last_error = Some(err.clone());
                Err(err.into())
            }
        }
    }

    /// Matches every token from `start` onwards.
    ///
    /// Returns the unmatched tokens in their original order, or `None` when
    /// every token matched. Under a non-halting policy a bad value stops the
    /// pass early and is available from [`last_error`](Self::last_error).
    ///
    /// # Errors
    ///
    /// [`ParseError::HelpRequested`] whenever an enabled help option matches;
    /// [`ParseError::Match`] and [`ParseError::Unmatched`] as selected by
    /// `policy`.
    pub fn match_all_args<S: AsRef<str>>(
        &mut self,
        args: &[S],
        start: usize,
        policy: MatchPolicy,
    ) -> Result<Option<Vec<String>>, ParseError> {
        let mut unmatched = Vec::new();
        let mut index = start;
        while index < args.len() {
            match self.match_arg(args, index) {
                Ok(next) => {
                    index = next;
                    if let Some(token) = self.unmatched.clone() {
                        if policy.halt_on_unmatched {
                            return Err(ParseError::Unmatched(token));
                        }
                        unmatched.push(token);
                    }
                }
                Err(ParseError::Match(_)) if !policy.halt_on_error => break,
                Err(err) => return Err(err),
            }
        }
        Ok((!unmatched.is_empty()).then_some(unmatched))
    }

    /// Error raised by the most recent [`match_arg`](Self::match_arg) call.
    pub fn last_error(&self) -> Option<&MatchError> {
        self.last_error.as_ref()
    }

    /// Token skipped by the most recent [`match_arg`](Self::match_arg) call.
    pub fn unmatched_argument(&self) -> Option<&str> {
        self.unmatched.as_deref()
    }

    /// Primary name of the option that answers help requests.
    pub fn first_help_option_name(&self) -> Option<&str> {
        match &self.help_slot {
            HelpSlot::Synthesized => Some(DEFAULT_HELP_NAME),
            HelpSlot::Declared(name) => Some(name),
            HelpSlot::Vacant => None,
        }
    }

    /// Enables or disables help options. Disabled help options are neither
    /// matched nor shown.
    pub fn set_help_enabled(&mut self, enabled: bool) {
        self.help_enabled = enabled;
    }

    /// Returns `true` if help options are matched.
    pub fn help_enabled(&self) -> bool {
        self.help_enabled
    }

    /// Replaces the usage synopsis.
    pub fn set_synopsis(&mut self, synopsis: impl Into<String>) {
        self.synopsis = synopsis.into();
    }

    /// Usage synopsis shown after `Usage:`.
    pub fn synopsis(&self) -> &str {
        &self.synopsis
    }

    /// Help layout settings.
    pub fn help_config(&self) -> &HelpConfig {
        &self.help_config
    }

    /// Replaces the help layout settings.
    pub fn set_help_config(&mut self, config: HelpConfig) {
        self.help_config = config;
    }

    /// Renders the help message.
    pub fn help_message(&self) -> String {
        render_help(
            &self.synopsis,
            &self.descriptors,
            self.help_enabled,
            &self.help_config,
        )
    }
}

fn default_help_descriptor() -> OptionDescriptor {
    OptionDescriptor {
        aliases: vec![Alias::new(DEFAULT_HELP_NAME, false), Alias::new("-?", false)],
        code: Some(ConversionCode::Help),
        kind: ValueKind::Help,
        multiplicity: 1,
        range: None,
        value_desc: None,
        help: "displays help information".to_string(),
        visible: true,
        flag_default: true,
        sink: ResultSink::None,
    }
}

/// Reads the value(s) of a matched option without writing the sink.
///
/// Returns the next index and the values to store.
fn read_values<S: AsRef<str>>(
    descriptor: &OptionDescriptor,
    alias: &Alias,
    args: &[S],
    index: usize,
) -> Result<(usize, Vec<Value>), MatchError> {
    let count = descriptor.multiplicity;
    let code = descriptor.code;

    if code == Some(ConversionCode::Flag) {
        return Ok((index + 1, vec![Value::Bool(descriptor.flag_default); count]));
    }

    if alias.single_word {
        let token = args[index].as_ref();
        let value = scan_value(descriptor, &alias.name, &token[alias.name.len()..])?;
        return Ok((index + 1, vec![value]));
    }

    if code == Some(ConversionCode::Boolean) && count == 1 {
        // A boolean option may omit its value. Anything that is not a
        // boolean is left for the next match.
        let Some(next) = args.get(index + 1) else {
            return Ok((index + 1, vec![Value::Bool(true)]));
        };
        return match scan_value(descriptor, &alias.name, next.as_ref()) {
            Ok(value) => Ok((index + 2, vec![value])),
            Err(err) if err.is_malformed_boolean() => Ok((index + 1, vec![Value::Bool(true)])),
            Err(err) => Err(err),
        };
    }

    if index + count >= args.len() {
        return Err(MatchError::MissingValues {
            name: alias.name.clone(),
            count,
        });
    }
    let values = args[index + 1..=index + count]
        .iter()
        .map(|token| scan_value(descriptor, &alias.name, token.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((index + count + 1, values))
}

/// Scans one value token, checks its range and narrows it to the
/// descriptor's storage kind.
fn scan_value(descriptor: &OptionDescriptor, name: &str, text: &str) -> Result<Value, MatchError> {
    if text.is_empty() {
        return Err(MatchError::EmptyValue {
            name: name.to_string(),
        });
    }
    let code = descriptor.code.unwrap_or(ConversionCode::String);
    let malformed = || MatchError::MalformedValue {
        name: name.to_string(),
        code,
        text: text.to_string(),
    };

    let mut scanner = Scanner::new(text);
    let scanned = match code {
        ConversionCode::Int => scanner.scan_int().map(Scalar::Int),
        ConversionCode::Octal => scanner.scan_int_radix(8, false).map(Scalar::Int),
        ConversionCode::Decimal => scanner.scan_int_radix(10, false).map(Scalar::Int),
        ConversionCode::Hex => scanner.scan_int_radix(16, false).map(Scalar::Int),
        ConversionCode::Char => scanner.scan_char().map(Scalar::Char),
        ConversionCode::Boolean => scanner.scan_bool().map(Scalar::Bool),
        ConversionCode::Float => scanner.scan_float().map(Scalar::Float),
        ConversionCode::String => Ok(Scalar::Str(scanner.take_remainder().to_string())),
        ConversionCode::Flag | ConversionCode::Help => return Err(malformed()),
    };
    let scalar = scanned.map_err(|_| malformed())?;
    scanner.skip_whitespace();
    if !scanner.at_end() {
        return Err(malformed());
    }

    if let Some(range) = &descriptor.range {
        if !range.contains(&scalar) {
            return Err(MatchError::OutOfRange {
                name: name.to_string(),
                text: text.to_string(),
                range: range.text.clone(),
            });
        }
    }

    Value::narrow(scalar, descriptor.kind).ok_or_else(|| MatchError::OutOfBounds {
        name: name.to_string(),
        text: text.to_string(),
        kind: descriptor.kind,
    })
}
