//! Range specifications: `{ item (, item)* }`.
//!
//! An item is either a bare value (a single admissible point) or a sub range
//! `[low,high]`, where `[`/`]` include the endpoint and `(`/`)` exclude it.
//! A value is within a range set when it matches ANY atom; an empty set
//! admits everything.
//!
//! # Examples
//!
//! ```
//! use argspec_core::{ConversionCode, RangeSet, Scalar, ValueKind};
//!
//! let range = RangeSet::parse("{(-88,100],1000}", ConversionCode::Int, ValueKind::Long).unwrap();
//! assert!(range.contains(&Scalar::Int(100)));
//! assert!(range.contains(&Scalar::Int(1000)));
//! assert!(!range.contains(&Scalar::Int(-88)));
//! assert!(!range.contains(&Scalar::Int(500)));
//! ```

use std::cmp::Ordering;

use serde::Serialize;

use crate::error::{RangeError, ScanError};
use crate::scanner::Scanner;
use crate::types::{ConversionCode, Scalar, ValueKind};

/// One end of a sub range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Endpoint {
    /// Endpoint value.
    pub value: Scalar,
    /// The endpoint itself is admissible.
    pub closed: bool,
}

/// A single admissible value or a bounded sub range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RangeAtom {
    /// Exactly this value.
    Point(Scalar),
    /// Values between `low` and `high`.
    Span {
        /// Lower endpoint.
        low: Endpoint,
        /// Upper endpoint.
        high: Endpoint,
    },
}

impl RangeAtom {
    /// Builds a sub range, swapping the endpoints when given in reverse.
    ///
    /// Each endpoint keeps its own open/closed flag when swapped.
    pub fn span(first: Endpoint, second: Endpoint) -> Self {
        if first.value.partial_cmp(&second.value) == Some(Ordering::Greater) {
            Self::Span {
                low: second,
                high: first,
            }
        } else {
            Self::Span {
                low: first,
                high: second,
            }
        }
    }

    /// Returns `true` if `value` is admitted by this atom.
    ///
    /// A span admits values strictly between its endpoints, and an endpoint
    /// itself when that endpoint is closed.
    pub fn matches(&self, value: &Scalar) -> bool {
        match self {
            Self::Point(point) => point == value,
            Self::Span { low, high } => {
                let (Some(lc), Some(hc)) = (
                    low.value.partial_cmp(value),
                    high.value.partial_cmp(value),
                ) else {
                    return false;
                };
                (lc == Ordering::Less && hc == Ordering::Greater)
                    || (low.closed && lc == Ordering::Equal)
                    || (high.closed && hc == Ordering::Equal)
            }
        }
    }
}

/// Ordered union of range atoms plus the text they were parsed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeSet {
    /// Atoms in declaration order.
    pub atoms: Vec<RangeAtom>,
    /// Display text: the inner text for a single atom, the full `{...}`
    /// otherwise.
    pub text: String,
}

impl RangeSet {
    /// Parses a complete `{...}` range spec for options of `code` storing
    /// `kind`.
    pub fn parse(spec: &str, code: ConversionCode, kind: ValueKind) -> Result<Self, RangeError> {
        let mut scanner = Scanner::new(spec);
        scanner.set_string_delimiters(",)]}");
        scanner.next_char();
        scanner.skip_whitespace();

        let mut atoms = Vec::new();
        loop {
            match scanner.peek() {
                Some('}') => break,
                None => return Err(RangeError::ExpectedSeparator),
                Some(open @ ('[' | '(')) => {
                    if matches!(code, ConversionCode::Boolean | ConversionCode::Flag) {
                        return Err(RangeError::SubRangeNotSupported);
                    }
                    scanner.next_char();
                    scanner.skip_whitespace();
                    let low = scan_endpoint(&mut scanner, code, kind)?;
                    scanner.skip_whitespace();
                    if scanner.next_char() != Some(',') {
                        return Err(RangeError::MissingComma);
                    }
                    scanner.skip_whitespace();
                    let high = scan_endpoint(&mut scanner, code, kind)?;
                    scanner.skip_whitespace();
                    let close = scanner.next_char();
                    if !matches!(close, Some(']' | ')')) {
                        return Err(RangeError::UnterminatedSubRange);
                    }
                    atoms.push(RangeAtom::span(
                        Endpoint {
                            value: low,
                            closed: open == '[',
                        },
                        Endpoint {
                            value: high,
                            closed: close == Some(']'),
                        },
                    ));
                }
                Some(_) => {
                    let point = scan_endpoint(&mut scanner, code, kind)?;
                    atoms.push(RangeAtom::Point(point));
                }
            }

            scanner.skip_whitespace();
            match scanner.peek() {
                Some(',') => {
                    scanner.next_char();
                    scanner.skip_whitespace();
                }
                Some('}') => {}
                _ => return Err(RangeError::ExpectedSeparator),
            }
        }

        let text = if atoms.len() == 1 {
            spec.get(1..spec.len().saturating_sub(1))
                .unwrap_or_default()
                .to_string()
        } else {
            spec.to_string()
        };
        Ok(Self { atoms, text })
    }

    /// Returns `true` if any atom admits `value`. An empty set admits
    /// everything.
    pub fn contains(&self, value: &Scalar) -> bool {
        self.atoms.is_empty() || self.atoms.iter().any(|atom| atom.matches(value))
    }

    /// First value of the first atom, used as the `%v` default.
    pub fn first_bool(&self) -> Option<bool> {
        match self.atoms.first()? {
            RangeAtom::Point(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }
}

/// Scans one range endpoint typed by the option's storage kind.
fn scan_endpoint(
    scanner: &mut Scanner<'_>,
    code: ConversionCode,
    kind: ValueKind,
) -> Result<Scalar, RangeError> {
    let start = scanner.position();
    let (type_name, result): (&'static str, Result<Scalar, ScanError>) = match kind {
        ValueKind::Char => ("character", scanner.scan_char().map(Scalar::Char)),
        ValueKind::Int | ValueKind::Long => ("integer", scanner.scan_int().map(Scalar::Int)),
        ValueKind::Float | ValueKind::Double => ("float", scanner.scan_float().map(Scalar::Float)),
        ValueKind::String => ("string", scanner.scan_string().map(Scalar::Str)),
        ValueKind::Boolean => ("boolean", scanner.scan_bool().map(Scalar::Bool)),
        ValueKind::Help | ValueKind::Delimiter => {
            return Err(RangeError::MalformedValue {
                type_name: code.type_name(),
                text: scanner.remainder().to_string(),
            });
        }
    };
    result.map_err(|err| RangeError::MalformedValue {
        type_name,
        text: scanner.substring(start, err.index + 1).to_string(),
    })
}
