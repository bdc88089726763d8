//! Descriptor model shared by the compiler, the matcher and the help
//! formatter.
//!
//! An [`OptionDescriptor`] is produced once per registered specification
//! string and is immutable afterwards, apart from its visibility. The types
//! derive [`serde::Serialize`] so descriptors can be dumped as JSON.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::range::RangeSet;
use crate::sink::ResultSink;

/// Every character accepted after `%` in a specification string.
pub const VALID_CONVERSION_CODES: &str = "iodxcbfsvh";

/// Conversion code selected by the character after `%`.
///
/// # Examples
///
/// ```
/// use argspec_core::{ConversionCode, ValueKind};
///
/// let code = ConversionCode::from_char('x').unwrap();
/// assert_eq!(code, ConversionCode::Hex);
/// assert_eq!(code.type_name(), "hex integer");
/// assert_eq!(code.default_kind(), ValueKind::Long);
/// assert!(ConversionCode::from_char('q').is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConversionCode {
    /// `%i`: integer, base detected from a `0x`/`0` prefix.
    Int,
    /// `%o`: octal integer.
    Octal,
    /// `%d`: decimal integer.
    Decimal,
    /// `%x`: hexadecimal integer.
    Hex,
    /// `%c`: single character, escapes allowed.
    Char,
    /// `%b`: boolean value, may be omitted to mean `true`.
    Boolean,
    /// `%f`: floating point number.
    Float,
    /// `%s`: string.
    String,
    /// `%v`: flag without a value.
    Flag,
    /// `%h`: help option.
    Help,
}

impl ConversionCode {
    /// Parses a conversion character.
    pub fn from_char(ch: char) -> Option<Self> {
        let code = match ch {
            'i' => Self::Int,
            'o' => Self::Octal,
            'd' => Self::Decimal,
            'x' => Self::Hex,
            'c' => Self::Char,
            'b' => Self::Boolean,
            'f' => Self::Float,
            's' => Self::String,
            'v' => Self::Flag,
            'h' => Self::Help,
            _ => return None,
        };
        Some(code)
    }

    /// Returns the character that selects this code.
    pub fn as_char(self) -> char {
        match self {
            Self::Int => 'i',
            Self::Octal => 'o',
            Self::Decimal => 'd',
            Self::Hex => 'x',
            Self::Char => 'c',
            Self::Boolean => 'b',
            Self::Float => 'f',
            Self::String => 's',
            Self::Flag => 'v',
            Self::Help => 'h',
        }
    }

    /// Type name used in help placeholders and error messages.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Int => "integer",
            Self::Octal => "octal integer",
            Self::Decimal => "decimal integer",
            Self::Hex => "hex integer",
            Self::Char => "char",
            Self::Boolean => "boolean",
            Self::Float => "float",
            Self::String => "string",
            Self::Flag | Self::Help => "unknown",
        }
    }

    /// Storage kind used when the sink does not pick a width itself
    /// (growable collectors).
    pub fn default_kind(self) -> ValueKind {
        match self {
            Self::Int | Self::Octal | Self::Decimal | Self::Hex => ValueKind::Long,
            Self::Char => ValueKind::Char,
            Self::Boolean | Self::Flag => ValueKind::Boolean,
            Self::Float => ValueKind::Double,
            Self::String => ValueKind::String,
            Self::Help => ValueKind::Help,
        }
    }

    /// Storage kinds a holder or array sink may declare for this code.
    pub(crate) fn accepted_kinds(self) -> &'static [ValueKind] {
        match self {
            Self::Int | Self::Octal | Self::Decimal | Self::Hex => {
                &[ValueKind::Int, ValueKind::Long]
            }
            Self::Char => &[ValueKind::Char],
            Self::Boolean | Self::Flag => &[ValueKind::Boolean],
            Self::Float => &[ValueKind::Float, ValueKind::Double],
            Self::String => &[ValueKind::String],
            Self::Help => &[],
        }
    }

    pub(crate) fn expected_sinks(self) -> &'static str {
        match self {
            Self::Int | Self::Octal | Self::Decimal | Self::Hex => "i32 or i64",
            Self::Char => "char",
            Self::Boolean | Self::Flag => "bool",
            Self::Float => "f32 or f64",
            Self::String => "String",
            Self::Help => "nothing",
        }
    }
}

impl fmt::Display for ConversionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Kind of value an option stores, including its storage width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValueKind {
    /// `bool`
    Boolean,
    /// `char`
    Char,
    /// `i32`
    Int,
    /// `i64`
    Long,
    /// `f32`
    Float,
    /// `f64`
    Double,
    /// `String`
    String,
    /// Help option; stores nothing.
    Help,
    /// Help-text heading; matches nothing.
    Delimiter,
}

impl ValueKind {
    /// Rust type name of the storage.
    pub fn name(self) -> &'static str {
        match self {
            Self::Boolean => "bool",
            Self::Char => "char",
            Self::Int => "i32",
            Self::Long => "i64",
            Self::Float => "f32",
            Self::Double => "f64",
            Self::String => "String",
            Self::Help => "help",
            Self::Delimiter => "delimiter",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A literal as scanned from a value token or range endpoint, before it is
/// narrowed to the sink's storage width.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Boolean literal.
    Bool(bool),
    /// Character literal.
    Char(char),
    /// Integer literal in any base.
    Int(i64),
    /// Floating point literal.
    Float(f64),
    /// String literal.
    Str(String),
}

impl PartialOrd for Scalar {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.partial_cmp(b),
            (Self::Char(a), Self::Char(b)) => a.partial_cmp(b),
            (Self::Int(a), Self::Int(b)) => a.partial_cmp(b),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Str(a), Self::Str(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// A value stored into a result sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// `bool`
    Bool(bool),
    /// `char`
    Char(char),
    /// `i32`
    Int(i32),
    /// `i64`
    Long(i64),
    /// `f32`
    Float(f32),
    /// `f64`
    Double(f64),
    /// `String`
    Str(String),
}

impl Value {
    /// Narrows a scanned literal to `kind`.
    ///
    /// Returns `None` when the literal has the wrong shape or does not fit
    /// (an `i64` outside the `i32` range).
    pub fn narrow(scalar: Scalar, kind: ValueKind) -> Option<Self> {
        match (scalar, kind) {
            (Scalar::Bool(b), ValueKind::Boolean) => Some(Self::Bool(b)),
            (Scalar::Char(c), ValueKind::Char) => Some(Self::Char(c)),
            (Scalar::Int(n), ValueKind::Int) => i32::try_from(n).ok().map(Self::Int),
            (Scalar::Int(n), ValueKind::Long) => Some(Self::Long(n)),
            (Scalar::Float(x), ValueKind::Float) => Some(Self::Float(x as f32)),
            (Scalar::Float(x), ValueKind::Double) => Some(Self::Double(x)),
            (Scalar::Str(s), ValueKind::String) => Some(Self::Str(s)),
            _ => None,
        }
    }
}

/// One name form of an option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alias {
    /// Name as written, for example `-file=` or `--verbose`.
    pub name: String,
    /// The value is concatenated onto the token (`-file=x`) rather than
    /// read from the following token(s).
    pub single_word: bool,
}

impl Alias {
    /// Creates an alias.
    pub fn new(name: impl Into<String>, single_word: bool) -> Self {
        Self {
            name: name.into(),
            single_word,
        }
    }

    /// Returns `true` if `token` selects this alias.
    ///
    /// Single-word aliases match by prefix unless `exact_only` is set, in
    /// which case every alias must match the token exactly.
    pub fn matches(&self, token: &str, exact_only: bool) -> bool {
        if self.single_word && !exact_only {
            token.starts_with(&self.name)
        } else {
            token == self.name
        }
    }
}

/// Compiled form of one option specification string, or a delimiter line.
///
/// # Examples
///
/// ```
/// use argspec_core::{ArgParser, ConversionCode, Holder, ValueKind};
///
/// let size = Holder::<i32>::new();
/// let mut parser = ArgParser::new("demo [options]");
/// parser.add_option("-size, --size %d {1,2,4,8,16} #block size", &size).unwrap();
///
/// let descriptor = parser.last_descriptor().unwrap();
/// assert_eq!(descriptor.primary_name(), Some("-size"));
/// assert_eq!(descriptor.code, Some(ConversionCode::Decimal));
/// assert_eq!(descriptor.kind, ValueKind::Int);
/// assert_eq!(descriptor.range_text(), Some("{1,2,4,8,16}"));
/// assert_eq!(descriptor.help, "block size");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionDescriptor {
    /// Alias names in declaration order. Empty for delimiters.
    pub aliases: Vec<Alias>,
    /// Conversion code. `None` for delimiters.
    pub code: Option<ConversionCode>,
    /// Storage kind resolved at registration.
    pub kind: ValueKind,
    /// Number of values consumed per match.
    pub multiplicity: usize,
    /// Admissible values; `None` means unconstrained.
    pub range: Option<RangeSet>,
    /// Replacement for the `<type>` placeholder in help output.
    pub value_desc: Option<String>,
    /// Option description, or the heading text of a delimiter.
    pub help: String,
    /// Shown in generated help.
    pub visible: bool,
    /// Value stored by `%v` flags when matched.
    pub flag_default: bool,
    #[serde(skip)]
    pub(crate) sink: ResultSink,
}

impl OptionDescriptor {
    pub(crate) fn delimiter(text: impl Into<String>) -> Self {
        Self {
            aliases: Vec::new(),
            code: None,
            kind: ValueKind::Delimiter,
            multiplicity: 1,
            range: None,
            value_desc: None,
            help: text.into(),
            visible: true,
            flag_default: true,
            sink: ResultSink::None,
        }
    }

    /// Returns `true` for help-text delimiter lines.
    pub fn is_delimiter(&self) -> bool {
        self.kind == ValueKind::Delimiter
    }

    /// Returns `true` for `%h` help options.
    pub fn is_help(&self) -> bool {
        self.code == Some(ConversionCode::Help)
    }

    /// First declared alias.
    pub fn primary_name(&self) -> Option<&str> {
        self.aliases.first().map(|alias| alias.name.as_str())
    }

    /// Range text as it appears in error messages and help output.
    pub fn range_text(&self) -> Option<&str> {
        self.range.as_ref().map(|range| range.text.as_str())
    }

    /// Type name of the conversion (`"integer"`, `"float"`, ...).
    pub fn type_name(&self) -> &'static str {
        self.code.map_or("unknown", ConversionCode::type_name)
    }

    /// The result sink bound at registration.
    pub fn sink(&self) -> &ResultSink {
        &self.sink
    }

    /// Index of the alias selected by `token`.
    ///
    /// `%v` flags never match by prefix.
    pub fn alias_position(&self, token: &str) -> Option<usize> {
        let exact_only = self.code == Some(ConversionCode::Flag);
        self.aliases
            .iter()
            .position(|alias| alias.matches(token, exact_only))
    }
}
