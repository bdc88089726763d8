//! Option specification compiler.
//!
//! Compiles one specification string of the form
//!
//! ```text
//! name1[,name2...] %<code>[{range}][X<n>][#[valueDesc]#optDesc]
//! ```
//!
//! into an [`OptionDescriptor`]. A name is single-word when nothing but the
//! next `,` or the `%` follows it; if the last name is followed by
//! whitespace, every name of the group is multi-word.

use crate::error::SpecError;
use crate::range::RangeSet;
use crate::scanner::Scanner;
use crate::sink::ResultSink;
use crate::types::{Alias, ConversionCode, OptionDescriptor, VALID_CONVERSION_CODES, ValueKind};

/// Largest value count accepted after `X`.
const MAX_MULTIPLICITY: i64 = i32::MAX as i64;

/// Compiles `spec` against `sink` into a descriptor.
///
/// Fails on the first grammar violation or sink mismatch; nothing is
/// registered on failure.
///
/// # Examples
///
/// ```
/// use argspec_core::{ArrayHolder, compile};
///
/// let pos = ArrayHolder::<f64>::new(3);
/// let descriptor = compile("-pos %fX3 #x y z#position", (&pos).into()).unwrap();
/// assert_eq!(descriptor.multiplicity, 3);
/// assert_eq!(descriptor.value_desc.as_deref(), Some("x y z"));
/// assert_eq!(descriptor.help, "position");
/// ```
pub fn compile(spec: &str, sink: ResultSink) -> Result<OptionDescriptor, SpecError> {
    let mut scanner = Scanner::new(spec);
    let aliases = scan_aliases(&mut scanner)?;

    let code_char = scanner.next_char().ok_or(SpecError::MissingConversion)?;
    let code = ConversionCode::from_char(code_char).ok_or(SpecError::InvalidConversion {
        code: code_char,
        valid: VALID_CONVERSION_CODES,
    })?;

    let kind = resolve_kind(code, &sink)?;
    let sink = if code == ConversionCode::Help {
        ResultSink::None
    } else {
        sink
    };

    scanner.skip_whitespace();
    let mut range = None;
    let mut flag_default = true;
    if scanner.peek() == Some('{') {
        if code == ConversionCode::Help {
            return Err(SpecError::RangeNotSupported);
        }
        let start = scanner.position();
        loop {
            match scanner.next_char() {
                None => return Err(SpecError::UnterminatedRange),
                Some('}') => break,
                Some(_) => {}
            }
        }
        let parsed = RangeSet::parse(scanner.substring(start, scanner.position()), code, kind)?;
        if code == ConversionCode::Flag {
            if let Some(value) = parsed.first_bool() {
                flag_default = value;
            }
        }
        range = Some(parsed);
        scanner.skip_whitespace();
    }

    let mut multiplicity = 1;
    if scanner.peek() == Some('X') {
        if code == ConversionCode::Help {
            return Err(SpecError::MultiplierNotSupported);
        }
        scanner.next_char();
        let count = scanner
            .scan_int()
            .map_err(|_| SpecError::MalformedMultiplier)?;
        if count <= 0 {
            return Err(SpecError::NonPositiveMultiplier);
        }
        if count > MAX_MULTIPLICITY {
            return Err(SpecError::MalformedMultiplier);
        }
        multiplicity = usize::try_from(count).map_err(|_| SpecError::MalformedMultiplier)?;
    }

    if multiplicity > 1 {
        if let Some(alias) = aliases.iter().find(|alias| alias.single_word) {
            return Err(SpecError::SingleWordMultiplier(alias.name.clone()));
        }
    }
    match sink.array_len() {
        Some(len) if len < multiplicity => return Err(SpecError::ArrayTooShort(multiplicity)),
        Some(_) => {}
        None if multiplicity > 1 && !sink.is_collector() => {
            return Err(SpecError::MultiplierNeedsArray(multiplicity));
        }
        None => {}
    }

    scanner.skip_whitespace();
    let (value_desc, help) = if scanner.at_end() {
        (None, String::new())
    } else {
        if scanner.next_char() != Some('#') {
            return Err(SpecError::ExpectedHelpText);
        }
        let info = scanner.remainder();
        match info.split_once('#') {
            Some((value_desc, help)) => (Some(value_desc.to_string()), help.to_string()),
            None => (None, info.to_string()),
        }
    };

    Ok(OptionDescriptor {
        aliases,
        code: Some(code),
        kind,
        multiplicity,
        range,
        value_desc,
        help,
        visible: true,
        flag_default,
        sink,
    })
}

/// Scans the alias list up to and including the `%`.
fn scan_aliases(scanner: &mut Scanner<'_>) -> Result<Vec<Alias>, SpecError> {
    let mut aliases = Vec::new();
    loop {
        scanner.skip_whitespace();
        let start = scanner.position();
        while scanner
            .peek()
            .is_some_and(|ch| !ch.is_whitespace() && ch != ',' && ch != '%')
        {
            scanner.next_char();
        }
        let end = scanner.position();
        if start == end {
            return Err(SpecError::EmptyName);
        }

        let followed_by_space = scanner.peek().is_some_and(char::is_whitespace);
        scanner.skip_whitespace();
        let separator = match scanner.next_char() {
            None => return Err(SpecError::MissingConversion),
            Some(ch @ (',' | '%')) => ch,
            Some(_) => return Err(SpecError::NamesNotSeparated),
        };

        aliases.push(Alias::new(scanner.substring(start, end), !followed_by_space));
        if separator == '%' {
            break;
        }
    }

    if aliases.last().is_some_and(|alias| !alias.single_word) {
        for alias in &mut aliases {
            alias.single_word = false;
        }
    }
    Ok(aliases)
}

/// Resolves the storage kind for `code` from the sink's declared element
/// type.
fn resolve_kind(code: ConversionCode, sink: &ResultSink) -> Result<ValueKind, SpecError> {
    if code == ConversionCode::Help {
        return Ok(ValueKind::Help);
    }
    if sink.is_collector() {
        return Ok(code.default_kind());
    }
    match sink.kind() {
        Some(kind) if code.accepted_kinds().contains(&kind) => Ok(kind),
        _ => Err(SpecError::InvalidSink {
            code,
            expected: code.expected_sinks(),
            found: sink.describe(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{ArrayHolder, Collector, Holder};

    fn holder<T: crate::sink::ArgValue>() -> ResultSink {
        (&Holder::<T>::new()).into()
    }

    #[test]
    fn test_aliases_and_single_word() {
        let d = compile("-file=,--file= %s", holder::<String>()).unwrap();
        assert_eq!(d.aliases.len(), 2);
        assert!(d.aliases.iter().all(|a| !a.single_word));

        let d = compile("-file=%s", holder::<String>()).unwrap();
        assert!(d.aliases[0].single_word);

        let d = compile("-a ,-b%s", holder::<String>()).unwrap();
        assert!(!d.aliases[0].single_word);
        assert!(d.aliases[1].single_word);
    }

    #[test]
    fn test_sink_width_resolution() {
        let d = compile("-n %i", holder::<i32>()).unwrap();
        assert_eq!(d.kind, ValueKind::Int);
        let d = compile("-n %x", holder::<i64>()).unwrap();
        assert_eq!(d.kind, ValueKind::Long);
        let d = compile("-f %f", holder::<f32>()).unwrap();
        assert_eq!(d.kind, ValueKind::Float);
        let d = compile("-f %f", (&Collector::new()).into()).unwrap();
        assert_eq!(d.kind, ValueKind::Double);
    }

    #[test]
    fn test_invalid_sink_names_expected_kinds() {
        let err = compile("-n %d", holder::<String>()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid result holder for %d: expected i32 or i64, found Holder<String>"
        );
        assert!(matches!(
            compile("-n %s", ResultSink::None),
            Err(SpecError::InvalidSink { .. })
        ));
    }

    #[test]
    fn test_grammar_errors() {
        let sink = holder::<String>;
        assert_eq!(compile(",-f %s", sink()), Err(SpecError::EmptyName));
        assert_eq!(compile("-f", sink()), Err(SpecError::MissingConversion));
        assert_eq!(compile("-f %", sink()), Err(SpecError::MissingConversion));
        assert_eq!(compile("-f -g %s", sink()), Err(SpecError::NamesNotSeparated));
        assert_eq!(
            compile("-f %q", sink()),
            Err(SpecError::InvalidConversion {
                code: 'q',
                valid: VALID_CONVERSION_CODES,
            })
        );
        assert_eq!(compile("-f %s {a", sink()), Err(SpecError::UnterminatedRange));
        assert_eq!(compile("-f %s junk", sink()), Err(SpecError::ExpectedHelpText));
    }

    #[test]
    fn test_help_rejects_range_and_multiplier() {
        assert_eq!(
            compile("-help %h {1}", ResultSink::None),
            Err(SpecError::RangeNotSupported)
        );
        assert_eq!(
            compile("-help %hX2", ResultSink::None),
            Err(SpecError::MultiplierNotSupported)
        );
        let d = compile("-help %h #show help", (&Holder::<i32>::new()).into()).unwrap();
        assert!(d.is_help());
        assert!(matches!(d.sink(), ResultSink::None));
    }

    #[test]
    fn test_multiplier_rules() {
        let array = ArrayHolder::<f64>::new(2);
        assert_eq!(
            compile("-pos %fX3", (&array).into()),
            Err(SpecError::ArrayTooShort(3))
        );
        assert_eq!(
            compile("-pos %fX3", holder::<f64>()),
            Err(SpecError::MultiplierNeedsArray(3))
        );
        assert_eq!(
            compile("-pos=%fX2", (&ArrayHolder::<f64>::new(2)).into()),
            Err(SpecError::SingleWordMultiplier("-pos=".into()))
        );
        assert_eq!(
            compile("-pos %fX0", (&array).into()),
            Err(SpecError::NonPositiveMultiplier)
        );
        assert_eq!(
            compile("-pos %fXy", (&array).into()),
            Err(SpecError::MalformedMultiplier)
        );
        let d = compile("-pos %f {[0,1]} X2", (&Collector::new()).into()).unwrap();
        assert_eq!(d.multiplicity, 2);
    }

    #[test]
    fn test_oversized_multiplier_is_rejected() {
        let collector = Collector::new();
        assert_eq!(
            compile("-v %vX4611686018427387904", (&collector).into()),
            Err(SpecError::MalformedMultiplier)
        );
        assert_eq!(
            compile("-p %dX2147483648", (&collector).into()),
            Err(SpecError::MalformedMultiplier)
        );
        let d = compile("-p %dX2147483647", (&collector).into()).unwrap();
        assert_eq!(d.multiplicity, 2_147_483_647);
    }

    #[test]
    fn test_flag_default_from_range() {
        let d = compile("-quiet %v {false}", holder::<bool>()).unwrap();
        assert!(!d.flag_default);
        let d = compile("-quiet %v", holder::<bool>()).unwrap();
        assert!(d.flag_default);
    }

    #[test]
    fn test_help_text_split() {
        let d = compile("-n %d #count", holder::<i32>()).unwrap();
        assert_eq!(d.value_desc, None);
        assert_eq!(d.help, "count");

        let d = compile("-n %d #<n>#count of things", holder::<i32>()).unwrap();
        assert_eq!(d.value_desc.as_deref(), Some("<n>"));
        assert_eq!(d.help, "count of things");

        let d = compile("-n %d", holder::<i32>()).unwrap();
        assert_eq!(d.help, "");
    }

    #[test]
    fn test_compile_is_deterministic() {
        let spec = "-size, --size %d {1,2,4,8,16} X1 #block size";
        let first = compile(spec, holder::<i32>()).unwrap();
        let second = compile(spec, holder::<i32>()).unwrap();
        assert_eq!(first.aliases, second.aliases);
        assert_eq!(first.kind, second.kind);
        assert_eq!(first.multiplicity, second.multiplicity);
        assert_eq!(first.range, second.range);
    }
}
