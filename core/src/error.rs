//! Error types for specification compilation and argument matching.
//!
//! The error model follows the lifecycle of an option:
//!
//! - [`ScanError`]: a literal could not be scanned. Carries the byte index
//!   where scanning failed so callers can slice the original input.
//! - [`RangeError`]: a `{...}` range spec is malformed.
//! - [`SpecError`]: an option specification string or its result sink is
//!   invalid. Always raised at registration time.
//! - [`MatchError`]: a matched option received a bad or missing value.
//! - [`ParseError`]: terminal outcome of a driving loop, either a match
//!   error, an unmatched token under a strict policy, or a help request.

use thiserror::Error;

use crate::types::{ConversionCode, ValueKind};

/// What went wrong while scanning a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScanErrorKind {
    /// Input ended before a literal started.
    #[error("unexpected end of input")]
    EndOfInput,
    /// No digits were found for the given radix.
    #[error("no digits for base {0}")]
    NoDigits(u32),
    /// A character is not a digit of the given radix.
    #[error("invalid digit for base {0}")]
    InvalidDigit(u32),
    /// The integer does not fit in 64 bits.
    #[error("integer overflow")]
    Overflow,
    /// Not a valid floating point literal.
    #[error("malformed floating point number")]
    MalformedFloat,
    /// Not `true` or `false`.
    #[error("malformed boolean")]
    MalformedBoolean,
    /// Character literal is malformed (for example a missing closing quote).
    #[error("malformed character")]
    MalformedChar,
    /// Unknown or truncated backslash escape.
    #[error("malformed escape sequence")]
    BadEscape,
    /// A quoted string has no closing quote.
    #[error("unterminated string")]
    UnterminatedString,
    /// A bare string was empty.
    #[error("empty string")]
    EmptyString,
}

/// A scan failure at a specific byte index of the scanned input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind} at index {index}")]
pub struct ScanError {
    /// Byte index of the offending character.
    pub index: usize,
    /// Failure category.
    pub kind: ScanErrorKind,
}

impl ScanError {
    pub(crate) fn new(index: usize, kind: ScanErrorKind) -> Self {
        Self { index, kind }
    }
}

/// Range specification errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// `[a,b]` or `(a,b)` given for a boolean or flag option.
    #[error("sub ranges not supported for %b or %v")]
    SubRangeNotSupported,
    /// The two endpoints of a sub range are not separated by `,`.
    #[error("missing ',' in subrange specification")]
    MissingComma,
    /// A sub range is not closed by `]` or `)`.
    #[error("unterminated subrange")]
    UnterminatedSubRange,
    /// Something other than `,` or `}` follows a range item.
    #[error("range spec: ',' or '}}' expected")]
    ExpectedSeparator,
    /// An endpoint literal could not be scanned.
    #[error("malformed {type_name} '{text}' in range spec")]
    MalformedValue {
        /// Display name of the expected type.
        type_name: &'static str,
        /// The offending text.
        text: String,
    },
}

/// Errors raised while compiling an option specification.
///
/// A specification error is a programming error in the caller; the option is
/// never partially registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    /// An alias is empty (for example `",-f %s"`).
    #[error("null option name given")]
    EmptyName,
    /// The specification has no `%` conversion character.
    #[error("no conversion character given")]
    MissingConversion,
    /// Names are separated by something other than `,`.
    #[error("names not separated by ','")]
    NamesNotSeparated,
    /// The character after `%` is not a known conversion code.
    #[error("conversion code '{code}' not one of '{valid}'")]
    InvalidConversion {
        /// The rejected character.
        code: char,
        /// All legal codes.
        valid: &'static str,
    },
    /// The result sink cannot hold values of this conversion.
    #[error("invalid result holder for %{code}: expected {expected}, found {found}")]
    InvalidSink {
        /// Conversion code being registered.
        code: ConversionCode,
        /// Human readable list of accepted kinds.
        expected: &'static str,
        /// Description of the supplied sink.
        found: String,
    },
    /// `{...}` given for `%h`.
    #[error("ranges not supported for %h")]
    RangeNotSupported,
    /// `{` without a matching `}`.
    #[error("unterminated range specification")]
    UnterminatedRange,
    /// The range spec itself is malformed.
    #[error(transparent)]
    Range(#[from] RangeError),
    /// `X<n>` given for `%h`.
    #[error("multipliers not supported for %h")]
    MultiplierNotSupported,
    /// The value after `X` is not an integer.
    #[error("malformed value multiplier")]
    MalformedMultiplier,
    /// The multiplier is zero or negative.
    #[error("value multiplier number must be > 0")]
    NonPositiveMultiplier,
    /// Multiple values requested for a single-word alias.
    #[error("multiplier value incompatible with one word option {0}")]
    SingleWordMultiplier(String),
    /// An array sink is shorter than the multiplier.
    #[error("result holder array must have a length >= {0}")]
    ArrayTooShort(usize),
    /// A multiplier above one requires an array or collector sink.
    #[error("multiplier requires result holder to be an array of length >= {0}")]
    MultiplierNeedsArray(usize),
    /// Trailing characters that do not start help text.
    #[error("illegal character(s), expecting '#'")]
    ExpectedHelpText,
}

/// Errors raised while consuming the value(s) of a matched option.
///
/// Every variant names the alias that was matched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// Fewer tokens remain than the option's multiplicity.
    #[error("{name}: requires {count} value{}", plural_suffix(.count))]
    MissingValues {
        /// Matched alias.
        name: String,
        /// Number of values required.
        count: usize,
    },
    /// The value token is empty.
    #[error("{name}: requires a contiguous value")]
    EmptyValue {
        /// Matched alias.
        name: String,
    },
    /// The value could not be scanned as the option's type.
    #[error("{name}: malformed {} '{text}'", type_name(.code))]
    MalformedValue {
        /// Matched alias.
        name: String,
        /// Conversion used for scanning.
        code: ConversionCode,
        /// The raw value text.
        text: String,
    },
    /// The value is outside every declared range atom.
    #[error("{name}: value '{text}' not in range {range}")]
    OutOfRange {
        /// Matched alias.
        name: String,
        /// The raw value text.
        text: String,
        /// The range text as written in the option specification.
        range: String,
    },
    /// The value does not fit the sink's storage width.
    #[error("{name}: value '{text}' does not fit in {kind}")]
    OutOfBounds {
        /// Matched alias.
        name: String,
        /// The raw value text.
        text: String,
        /// Storage kind of the sink.
        kind: ValueKind,
    },
}

fn plural_suffix(count: &usize) -> &'static str {
    if *count > 1 { "s" } else { "" }
}

fn type_name(code: &ConversionCode) -> &'static str {
    code.type_name()
}

impl MatchError {
    /// Returns `true` when the value failed to scan as a boolean.
    pub fn is_malformed_boolean(&self) -> bool {
        matches!(
            self,
            MatchError::MalformedValue {
                code: ConversionCode::Boolean,
                ..
            }
        )
    }
}

/// Terminal outcome of [`ArgParser::match_all_args`](crate::ArgParser::match_all_args).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A matched option had a bad value.
    #[error(transparent)]
    Match(#[from] MatchError),
    /// A token matched no option and the policy halts on unmatched tokens.
    #[error("unrecognized argument: {0}")]
    Unmatched(String),
    /// A help option was matched; carries the rendered help text.
    #[error("help requested")]
    HelpRequested(String),
}
