//! Argument files.
//!
//! An argument file holds extra command-line tokens, separated by whitespace
//! or written as double-quoted strings with backslash escapes. A `#` starts a
//! comment that runs to the end of the line.
//!
//! # Example file
//!
//! ```text
//! # defaults for the nightly build
//! -level 9
//! -title "nightly \"fast\" build"
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::Path;

use argspec_core::Scanner;
use tracing::debug;

use crate::error::{CliError, Result};

/// Splits one line into tokens.
///
/// # Examples
///
/// ```
/// use argspec_cli::tokenize_line;
///
/// let tokens = tokenize_line(r#"-name "John Smith" -v"#).unwrap();
/// assert_eq!(tokens, vec!["-name", "John Smith", "-v"]);
/// ```
pub fn tokenize_line(line: &str) -> std::result::Result<Vec<String>, argspec_core::ScanError> {
    let mut scanner = Scanner::new(line);
    let mut tokens = Vec::new();
    scanner.skip_whitespace();
    while !scanner.at_end() {
        tokens.push(scanner.scan_string()?);
        scanner.skip_whitespace();
    }
    Ok(tokens)
}

/// Reads tokens from every line of `reader` and returns them followed by
/// `args`.
///
/// # Errors
///
/// [`CliError::MalformedLine`] names the first line holding a malformed
/// string; read failures are returned as [`CliError::IoError`].
pub fn prepend_args<R: Read>(reader: R, args: &[String]) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    for (number, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        let content = line.split('#').next().unwrap_or_default();
        let mut line_tokens =
            tokenize_line(content).map_err(|_| CliError::MalformedLine { line: number + 1 })?;
        tokens.append(&mut line_tokens);
    }
    debug!(count = tokens.len(), "Read argument file tokens");
    tokens.extend(args.iter().cloned());
    Ok(tokens)
}

/// Like [`prepend_args`], reading from the file at `path`.
///
/// Returns `args` unchanged when the file does not exist or is not a
/// regular file.
///
/// # Errors
///
/// [`CliError::ArgFile`] wrapping the underlying failure.
pub fn prepend_args_from_file(path: impl AsRef<Path>, args: &[String]) -> Result<Vec<String>> {
    let path = path.as_ref();
    if !path.is_file() {
        debug!(path = %path.display(), "Argument file not found, skipping");
        return Ok(args.to_vec());
    }
    let wrap = |source: CliError| CliError::ArgFile {
        path: path.to_path_buf(),
        source: Box::new(source),
    };
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(args.to_vec()),
        Err(err) => return Err(wrap(err.into())),
    };
    prepend_args(file, args).map_err(wrap)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_tokenize_line_quotes_and_escapes() {
        let tokens = tokenize_line(r#"  a  "b c" "d\"e" f\n "#).unwrap();
        assert_eq!(tokens, vec!["a", "b c", "d\"e", "f\\n"]);
        assert!(tokenize_line("").unwrap().is_empty());
        assert!(tokenize_line(r#"-x "open"#).is_err());
    }

    #[test]
    fn test_prepend_args_strips_comments() {
        let text = "-a 1 # first\n\n# whole line\n-b \"two words\"\n";
        let args = prepend_args(text.as_bytes(), &strings(&["-c"])).unwrap();
        assert_eq!(args, strings(&["-a", "1", "-b", "two words", "-c"]));
    }

    #[test]
    fn test_prepend_args_reports_line_number() {
        let text = "-a 1\n-b \"unterminated\n";
        let err = prepend_args(text.as_bytes(), &[]).unwrap_err();
        assert!(matches!(err, CliError::MalformedLine { line: 2 }));
    }

    #[test]
    fn test_missing_file_leaves_args_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let args = strings(&["-x"]);
        let result = prepend_args_from_file(dir.path().join("absent.txt"), &args).unwrap();
        assert_eq!(result, args);
        let result = prepend_args_from_file(dir.path(), &args).unwrap();
        assert_eq!(result, args);
    }

    #[test]
    fn test_file_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.args");
        std::fs::write(&path, "ok\n\"broken\n").unwrap();
        let err = prepend_args_from_file(&path, &[]).unwrap_err();
        assert!(err.to_string().ends_with("bad.args: malformed string, line 2"));
    }
}
