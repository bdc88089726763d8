//! Character-level cursor with typed literal scans.
//!
//! [`Scanner`] wraps a string and a byte position. Each `scan_*` method
//! consumes the longest valid literal at the cursor; on failure it returns a
//! [`ScanError`] carrying the byte index of the offending character, and the
//! cursor is left where the literal started so the caller can report the
//! exact text with [`Scanner::substring`].
//!
//! # Examples
//!
//! ```
//! use argspec_core::Scanner;
//!
//! let mut scanner = Scanner::new("0x1F, 'a', \"two words\"");
//! assert_eq!(scanner.scan_int().unwrap(), 31);
//! assert_eq!(scanner.next_char(), Some(','));
//! scanner.skip_whitespace();
//! assert_eq!(scanner.scan_char().unwrap(), 'a');
//! scanner.next_char();
//! scanner.skip_whitespace();
//! assert_eq!(scanner.scan_string().unwrap(), "two words");
//! assert!(scanner.at_end());
//! ```

use crate::error::{ScanError, ScanErrorKind};

/// Cursor over a string with typed literal scanning.
///
/// A scanner is created for one parse task and discarded afterwards.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
    delimiters: &'a str,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner positioned at the start of `input`.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            delimiters: "",
        }
    }

    /// Sets the characters that terminate a bare (unquoted) string in
    /// [`scan_string`](Self::scan_string), in addition to whitespace.
    pub fn set_string_delimiters(&mut self, delimiters: &'a str) {
        self.delimiters = delimiters;
    }

    /// Returns the current byte position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns `true` once every character has been consumed.
    pub fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Returns the next character without consuming it.
    pub fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Consumes and returns the next character.
    pub fn next_char(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    /// Consumes any whitespace at the cursor.
    pub fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.next_char();
        }
    }

    /// Returns the text between two recorded positions, exactly as written.
    ///
    /// Positions are clamped to the input and swapped if reversed.
    pub fn substring(&self, start: usize, end: usize) -> &'a str {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        let end = end.min(self.input.len());
        let start = start.min(end);
        self.input.get(start..end).unwrap_or_default()
    }

    /// Returns the unconsumed remainder of the input.
    pub fn remainder(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Consumes and returns the whole remainder of the input.
    pub fn take_remainder(&mut self) -> &'a str {
        let rest = self.remainder();
        self.pos = self.input.len();
        rest
    }

    /// Scans an integer, detecting the base from its prefix.
    ///
    /// `0x`/`0X` selects base 16, a leading `0` selects base 8, anything
    /// else is decimal.
    pub fn scan_int(&mut self) -> Result<i64, ScanError> {
        self.scan_int_radix(10, true)
    }

    /// Scans an integer in `radix`, optionally detecting the base from a
    /// `0x` or `0` prefix.
    pub fn scan_int_radix(&mut self, radix: u32, detect_prefix: bool) -> Result<i64, ScanError> {
        let start = self.pos;
        let result = self.scan_int_inner(radix, detect_prefix);
        if result.is_err() {
            self.pos = start;
        }
        result
    }

    fn scan_int_inner(&mut self, radix: u32, detect_prefix: bool) -> Result<i64, ScanError> {
        let negative = match self.peek() {
            Some('-') => {
                self.next_char();
                true
            }
            Some('+') => {
                self.next_char();
                false
            }
            Some(_) => false,
            None => return Err(ScanError::new(self.pos, ScanErrorKind::EndOfInput)),
        };

        let mut radix = radix;
        let mut leading_zero = false;
        if detect_prefix {
            if self.peek() == Some('0') && matches!(self.peek_second(), Some('x' | 'X')) {
                self.next_char();
                self.next_char();
                radix = 16;
            } else if self.peek() == Some('0') {
                self.next_char();
                leading_zero = true;
                radix = 8;
            } else {
                radix = 10;
            }
        }

        let digits_start = self.pos;
        while self.peek().is_some_and(|ch| ch.is_digit(radix)) {
            self.next_char();
        }
        let digits = &self.input[digits_start..self.pos];

        if let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() {
                return Err(ScanError::new(self.pos, ScanErrorKind::InvalidDigit(radix)));
            }
        }
        if digits.is_empty() && !leading_zero {
            return Err(ScanError::new(self.pos, ScanErrorKind::NoDigits(radix)));
        }

        let magnitude = if digits.is_empty() {
            0
        } else {
            u64::from_str_radix(digits, radix)
                .map_err(|_| ScanError::new(digits_start, ScanErrorKind::Overflow))?
        };

        if negative {
            if magnitude > i64::MAX as u64 + 1 {
                return Err(ScanError::new(digits_start, ScanErrorKind::Overflow));
            }
            Ok((magnitude as i64).wrapping_neg())
        } else {
            i64::try_from(magnitude)
                .map_err(|_| ScanError::new(digits_start, ScanErrorKind::Overflow))
        }
    }

    /// Scans a decimal floating point literal: optional sign, digits with an
    /// optional fraction, and an optional exponent.
    pub fn scan_float(&mut self) -> Result<f64, ScanError> {
        let start = self.pos;
        if matches!(self.peek(), Some('+' | '-')) {
            self.next_char();
        }

        let mut mantissa_digits = 0;
        while self.peek().is_some_and(|ch| ch.is_ascii_digit()) {
            self.next_char();
            mantissa_digits += 1;
        }
        if self.peek() == Some('.') {
            self.next_char();
            while self.peek().is_some_and(|ch| ch.is_ascii_digit()) {
                self.next_char();
                mantissa_digits += 1;
            }
        }
        if mantissa_digits == 0 {
            let index = self.pos;
            self.pos = start;
            return Err(ScanError::new(index, ScanErrorKind::MalformedFloat));
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            let exponent_start = self.pos;
            self.next_char();
            if matches!(self.peek(), Some('+' | '-')) {
                self.next_char();
            }
            let mut exponent_digits = 0;
            while self.peek().is_some_and(|ch| ch.is_ascii_digit()) {
                self.next_char();
                exponent_digits += 1;
            }
            if exponent_digits == 0 {
                self.pos = start;
                return Err(ScanError::new(exponent_start, ScanErrorKind::MalformedFloat));
            }
        }

        match self.input[start..self.pos].parse::<f64>() {
            Ok(value) => Ok(value),
            Err(_) => {
                let index = self.pos;
                self.pos = start;
                Err(ScanError::new(index, ScanErrorKind::MalformedFloat))
            }
        }
    }

    /// Scans one character, decoding backslash escapes and an optional pair
    /// of surrounding single quotes.
    pub fn scan_char(&mut self) -> Result<char, ScanError> {
        let start = self.pos;
        let result = self.scan_char_inner();
        if result.is_err() {
            self.pos = start;
        }
        result
    }

    fn scan_char_inner(&mut self) -> Result<char, ScanError> {
        match self.peek() {
            None => Err(ScanError::new(self.pos, ScanErrorKind::EndOfInput)),
            Some('\'') if self.peek_second().is_some() => {
                self.next_char();
                let ch = self.scan_escaped_char()?;
                if self.peek() != Some('\'') {
                    return Err(ScanError::new(self.pos, ScanErrorKind::MalformedChar));
                }
                self.next_char();
                Ok(ch)
            }
            Some(_) => self.scan_escaped_char(),
        }
    }

    fn scan_escaped_char(&mut self) -> Result<char, ScanError> {
        let index = self.pos;
        let ch = self
            .next_char()
            .ok_or(ScanError::new(index, ScanErrorKind::EndOfInput))?;
        if ch != '\\' {
            return Ok(ch);
        }

        let escaped = self
            .next_char()
            .ok_or(ScanError::new(index, ScanErrorKind::BadEscape))?;
        let decoded = match escaped {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'b' => '\u{8}',
            'f' => '\u{c}',
            '\\' => '\\',
            '\'' => '\'',
            '"' => '"',
            '0'..='7' => {
                let mut code = escaped.to_digit(8).unwrap_or_default();
                for _ in 0..2 {
                    match self.peek().and_then(|next| next.to_digit(8)) {
                        Some(digit) => {
                            code = code * 8 + digit;
                            self.next_char();
                        }
                        None => break,
                    }
                }
                char::from_u32(code).ok_or(ScanError::new(index, ScanErrorKind::BadEscape))?
            }
            _ => return Err(ScanError::new(index, ScanErrorKind::BadEscape)),
        };
        Ok(decoded)
    }

    /// Scans `true` or `false`, ignoring case.
    ///
    /// Consumes nothing on failure.
    pub fn scan_bool(&mut self) -> Result<bool, ScanError> {
        let rest = self.remainder();
        for (word, value) in [("true", true), ("false", false)] {
            let Some(candidate) = rest.get(..word.len()) else {
                continue;
            };
            let at_boundary = rest[word.len()..]
                .chars()
                .next()
                .is_none_or(|ch| !ch.is_alphanumeric());
            if candidate.eq_ignore_ascii_case(word) && at_boundary {
                self.pos += word.len();
                return Ok(value);
            }
        }
        Err(ScanError::new(self.pos, ScanErrorKind::MalformedBoolean))
    }

    /// Scans a double-quoted string (with escapes) or a bare string that ends
    /// at whitespace, a configured delimiter or the end of input.
    pub fn scan_string(&mut self) -> Result<String, ScanError> {
        let start = self.pos;
        let result = self.scan_string_inner();
        if result.is_err() {
            self.pos = start;
        }
        result
    }

    fn scan_string_inner(&mut self) -> Result<String, ScanError> {
        if self.peek() != Some('"') {
            let start = self.pos;
            while let Some(ch) = self.peek() {
                if ch.is_whitespace() || self.delimiters.contains(ch) {
                    break;
                }
                self.next_char();
            }
            if self.pos == start {
                return Err(ScanError::new(start, ScanErrorKind::EmptyString));
            }
            return Ok(self.input[start..self.pos].to_string());
        }

        let open = self.pos;
        self.next_char();
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(ScanError::new(open, ScanErrorKind::UnterminatedString)),
                Some('"') => {
                    self.next_char();
                    return Ok(out);
                }
                Some(_) => out.push(self.scan_escaped_char()?),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of<T: std::fmt::Debug>(result: Result<T, ScanError>) -> ScanErrorKind {
        result.unwrap_err().kind
    }

    #[test]
    fn test_scan_int_detects_prefixes() {
        assert_eq!(Scanner::new("42").scan_int().unwrap(), 42);
        assert_eq!(Scanner::new("0x2a").scan_int().unwrap(), 42);
        assert_eq!(Scanner::new("0X2A").scan_int().unwrap(), 42);
        assert_eq!(Scanner::new("052").scan_int().unwrap(), 42);
        assert_eq!(Scanner::new("0").scan_int().unwrap(), 0);
        assert_eq!(Scanner::new("-17").scan_int().unwrap(), -17);
        assert_eq!(Scanner::new("+8").scan_int().unwrap(), 8);
    }

    #[test]
    fn test_scan_int_fixed_radix() {
        assert_eq!(Scanner::new("777").scan_int_radix(8, false).unwrap(), 511);
        assert_eq!(Scanner::new("ff").scan_int_radix(16, false).unwrap(), 255);
        assert_eq!(Scanner::new("010").scan_int_radix(10, false).unwrap(), 10);
    }

    #[test]
    fn test_scan_int_rejects_bad_digits() {
        assert_eq!(
            kind_of(Scanner::new("089").scan_int()),
            ScanErrorKind::InvalidDigit(8)
        );
        assert_eq!(
            kind_of(Scanner::new("12a").scan_int_radix(10, false)),
            ScanErrorKind::InvalidDigit(10)
        );
        assert_eq!(
            kind_of(Scanner::new("-").scan_int()),
            ScanErrorKind::NoDigits(10)
        );
        assert_eq!(kind_of(Scanner::new("").scan_int()), ScanErrorKind::EndOfInput);
        assert_eq!(
            kind_of(Scanner::new("0x").scan_int()),
            ScanErrorKind::NoDigits(16)
        );
    }

    #[test]
    fn test_scan_int_stops_at_delimiters() {
        let mut scanner = Scanner::new("12,34");
        assert_eq!(scanner.scan_int().unwrap(), 12);
        assert_eq!(scanner.peek(), Some(','));
    }

    #[test]
    fn test_scan_int_overflow_and_extremes() {
        assert_eq!(
            Scanner::new("-9223372036854775808").scan_int().unwrap(),
            i64::MIN
        );
        assert_eq!(
            kind_of(Scanner::new("9223372036854775808").scan_int()),
            ScanErrorKind::Overflow
        );
    }

    #[test]
    fn test_failed_scan_reports_index_and_keeps_position() {
        let mut scanner = Scanner::new("  12x");
        scanner.skip_whitespace();
        let err = scanner.scan_int().unwrap_err();
        assert_eq!(err.index, 4);
        assert_eq!(scanner.position(), 2);
        assert_eq!(scanner.substring(scanner.position(), err.index + 1), "12x");
    }

    #[test]
    fn test_scan_float() {
        assert_eq!(Scanner::new("1.5").scan_float().unwrap(), 1.5);
        assert_eq!(Scanner::new("-78").scan_float().unwrap(), -78.0);
        assert_eq!(Scanner::new(".25").scan_float().unwrap(), 0.25);
        assert_eq!(Scanner::new("1e3").scan_float().unwrap(), 1000.0);
        assert_eq!(Scanner::new("2.5E-1").scan_float().unwrap(), 0.25);
        assert_eq!(
            kind_of(Scanner::new("abc").scan_float()),
            ScanErrorKind::MalformedFloat
        );
        assert_eq!(
            kind_of(Scanner::new("1e").scan_float()),
            ScanErrorKind::MalformedFloat
        );
    }

    #[test]
    fn test_scan_float_leaves_trailing_text() {
        let mut scanner = Scanner::new("3.5abc");
        assert_eq!(scanner.scan_float().unwrap(), 3.5);
        assert_eq!(scanner.remainder(), "abc");
    }

    #[test]
    fn test_scan_char_escapes_and_quotes() {
        assert_eq!(Scanner::new("a").scan_char().unwrap(), 'a');
        assert_eq!(Scanner::new("'b'").scan_char().unwrap(), 'b');
        assert_eq!(Scanner::new("\\n").scan_char().unwrap(), '\n');
        assert_eq!(Scanner::new("'\\t'").scan_char().unwrap(), '\t');
        assert_eq!(Scanner::new("\\101").scan_char().unwrap(), 'A');
        assert_eq!(Scanner::new("'").scan_char().unwrap(), '\'');
        assert_eq!(
            kind_of(Scanner::new("\\q").scan_char()),
            ScanErrorKind::BadEscape
        );
        assert_eq!(
            kind_of(Scanner::new("'ab").scan_char()),
            ScanErrorKind::MalformedChar
        );
    }

    #[test]
    fn test_scan_bool() {
        assert!(Scanner::new("true").scan_bool().unwrap());
        assert!(Scanner::new("TRUE").scan_bool().unwrap());
        assert!(!Scanner::new("False").scan_bool().unwrap());

        let mut scanner = Scanner::new("-other");
        assert_eq!(
            scanner.scan_bool().unwrap_err().kind,
            ScanErrorKind::MalformedBoolean
        );
        assert_eq!(scanner.position(), 0);

        assert!(Scanner::new("truest").scan_bool().is_err());
    }

    #[test]
    fn test_scan_string_quoted_and_bare() {
        let mut scanner = Scanner::new("\"a \\\"b\\\"\" bare,next");
        scanner.set_string_delimiters(",");
        assert_eq!(scanner.scan_string().unwrap(), "a \"b\"");
        scanner.skip_whitespace();
        assert_eq!(scanner.scan_string().unwrap(), "bare");
        assert_eq!(scanner.peek(), Some(','));

        assert_eq!(
            kind_of(Scanner::new("\"open").scan_string()),
            ScanErrorKind::UnterminatedString
        );

        let mut empty = Scanner::new(",");
        empty.set_string_delimiters(",");
        assert_eq!(kind_of(empty.scan_string()), ScanErrorKind::EmptyString);
    }

    #[test]
    fn test_substring_is_lossless() {
        let scanner = Scanner::new("größe=1");
        assert_eq!(scanner.substring(0, "größe".len()), "größe");
        assert_eq!(scanner.substring(100, 0), "größe=1");
    }
}
