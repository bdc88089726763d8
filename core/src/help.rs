//! Help message rendering.
//!
//! The layout is a `Usage:` header followed by one entry per visible
//! descriptor: the alias list, a value placeholder, an optional `X<n>`
//! multiplicity suffix, and the help text aligned at [`HelpConfig::indent`]
//! and word-wrapped to [`HelpConfig::columns`].
//!
//! # Examples
//!
//! ```
//! use argspec_core::{ArgParser, Holder};
//!
//! let level = Holder::<i32>::new();
//! let mut parser = ArgParser::new("demo [options]");
//! parser.add_option("-n %d {[0,9]} #compression level", &level).unwrap();
//!
//! let help = parser.help_message();
//! assert!(help.starts_with("Usage: demo [options]\nOptions include:\n\n"));
//! assert!(help.contains("-n <decimal integer [0,9]>"));
//! ```

use serde::{Deserialize, Serialize};

use crate::types::{ConversionCode, OptionDescriptor};

/// Layout settings for generated help.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelpConfig {
    /// Column at which help text starts.
    pub indent: usize,
    /// Console width used for word-wrapping.
    pub columns: usize,
}

impl Default for HelpConfig {
    fn default() -> Self {
        Self {
            indent: 6,
            columns: 80,
        }
    }
}

/// Renders the help message for `descriptors` in declaration order.
///
/// Invisible descriptors are skipped, as are help options while
/// `help_enabled` is false.
pub fn render_help(
    synopsis: &str,
    descriptors: &[OptionDescriptor],
    help_enabled: bool,
    config: &HelpConfig,
) -> String {
    let mut out = format!("Usage: {synopsis}\nOptions include:\n\n");
    let pad = " ".repeat(config.indent);

    for descriptor in descriptors {
        if !descriptor.visible || (descriptor.is_help() && !help_enabled) {
            continue;
        }
        if descriptor.is_delimiter() {
            out.push('\n');
            out.push_str(&descriptor.help);
            out.push('\n');
            continue;
        }

        let info = option_info(descriptor);
        out.push_str(&info);
        if !descriptor.help.is_empty() {
            let width = info.chars().count();
            let mut gap = config.indent.saturating_sub(width);
            if width + 2 > config.indent {
                out.push('\n');
                gap = config.indent;
            }
            out.push_str(&" ".repeat(gap));
            out.push_str(&insert_line_breaks(
                &descriptor.help,
                config.columns.saturating_sub(config.indent),
                &pad,
                true,
            ));
        }
        out.push('\n');
    }
    out
}

/// Alias list, value placeholder and multiplicity suffix of one option.
fn option_info(descriptor: &OptionDescriptor) -> String {
    let aliases = &descriptor.aliases;
    let has_single_word = aliases.iter().any(|alias| alias.single_word);

    let mut info = String::new();
    let mut i = 0;
    while i < aliases.len() {
        let alias = &aliases[i];
        info.push_str(&alias.name);
        if has_single_word && !alias.single_word {
            info.push(' ');
        }
        i += 1;
        if let Some(next) = aliases.get(i) {
            if is_near_duplicate(&alias.name, &next.name) {
                i += 1;
                if i >= aliases.len() {
                    break;
                }
            }
            info.push_str(", ");
        }
    }
    if !has_single_word {
        info.push(' ');
    }

    if !matches!(
        descriptor.code,
        Some(ConversionCode::Flag | ConversionCode::Help)
    ) {
        match (&descriptor.value_desc, descriptor.range_text()) {
            (Some(desc), _) => info.push_str(desc),
            (None, Some(range)) => {
                info.push_str(&format!("<{} {}>", descriptor.type_name(), range));
            }
            (None, None) => info.push_str(&format!("<{}>", descriptor.type_name())),
        }
    }
    if descriptor.multiplicity > 1 {
        info.push_str(&format!("X{}", descriptor.multiplicity));
    }
    info
}

/// Two aliases that differ only by one trailing character, such as
/// `--color` and `--colour` or `--verbose` and `--verbos`.
fn is_near_duplicate(current: &str, next: &str) -> bool {
    let prefix = longest_common_prefix(next, current).chars().count();
    let current_diff = current.chars().count().abs_diff(prefix);
    let next_diff = next.chars().count().abs_diff(prefix);
    (current_diff == 1 || next_diff == 1) && prefix > 2
}

/// Returns the longest common prefix of `a` and `b`, compared by
/// character.
///
/// ```
/// use argspec_core::longest_common_prefix;
///
/// assert_eq!(longest_common_prefix("--verbose", "--version"), "--ver");
/// assert_eq!(longest_common_prefix("-a", "-b"), "-");
/// assert_eq!(longest_common_prefix("abc", ""), "");
/// ```
pub fn longest_common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let end = a
        .char_indices()
        .zip(b.chars())
        .find(|((_, ca), cb)| ca != cb)
        .map(|((index, _), _)| index)
        .unwrap_or_else(|| {
            a.char_indices()
                .nth(b.chars().count())
                .map_or(a.len(), |(index, _)| index)
        });
    &a[..end]
}

/// Word-wraps `message` at `width` columns.
///
/// Words are separated by single spaces; each inserted line break is
/// followed by `pad`. With `break_before` set a word that would reach
/// `width` starts a new line; otherwise a line is broken only once it has
/// already reached `width`. Line breaks already in the text reset the
/// column count.
///
/// ```
/// use argspec_core::insert_line_breaks;
///
/// let wrapped = insert_line_breaks("one two three four", 10, "  ", true);
/// assert_eq!(wrapped, "one two\n  three\n  four");
/// ```
pub fn insert_line_breaks(message: &str, width: usize, pad: &str, break_before: bool) -> String {
    let mut words = message.split(' ').filter(|word| !word.is_empty());
    let mut out = String::new();
    let Some(first) = words.next() else {
        return out;
    };
    out.push_str(first);
    let mut length = first.chars().count();

    for word in words {
        let word_len = word.chars().count();
        if length >= width || (break_before && length + word_len >= width) {
            out.push('\n');
            out.push_str(pad);
            length = 0;
        } else {
            out.push(' ');
        }
        out.push_str(word);

        match word.rfind('\n') {
            Some(pos) => length = word[pos + 1..].chars().count(),
            None => length += word_len + 1,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{ArrayHolder, Holder};
    use crate::ArgParser;

    #[test]
    fn test_insert_line_breaks_break_after() {
        let wrapped = insert_line_breaks("aaaa bbbb cccc", 4, "", false);
        assert_eq!(wrapped, "aaaa\nbbbb\ncccc");
        assert_eq!(insert_line_breaks("  a   b ", 80, "", true), "a b");
        assert_eq!(insert_line_breaks("", 10, "", true), "");
    }

    #[test]
    fn test_insert_line_breaks_resets_on_embedded_newline() {
        let wrapped = insert_line_breaks("a first\nx second", 10, "", true);
        assert_eq!(wrapped, "a first\nx second");
    }

    #[test]
    fn test_near_duplicate_aliases_collapse() {
        assert!(is_near_duplicate("--color", "--colour"));
        assert!(is_near_duplicate("--verbose", "--verbos"));
        assert!(!is_near_duplicate("-size", "--size"));
        assert!(!is_near_duplicate("-ab", "-a"));
    }

    #[test]
    fn test_option_info_shapes() {
        let file = Holder::<String>::new();
        let pos = ArrayHolder::<f64>::new(3);
        let verbose = Holder::<bool>::new();
        let mut parser = ArgParser::without_default_help("demo");
        parser.add_option("-file=,-f=%s", &file).unwrap();
        parser.add_option("-pos %fX3 #x y z#", &pos).unwrap();
        parser.add_option("--color, --colour, -c %v", &verbose).unwrap();

        let descriptors = parser.descriptors();
        assert_eq!(option_info(&descriptors[0]), "-file=, -f=<string>");
        assert_eq!(option_info(&descriptors[1]), "-pos x y zX3");
        assert_eq!(option_info(&descriptors[2]), "--color, -c ");
    }

    #[test]
    fn test_help_alignment_and_wrapping() {
        let n = Holder::<i32>::new();
        let long = Holder::<String>::new();
        let mut parser = ArgParser::without_default_help("demo");
        parser.add_option("-n %d #count", &n).unwrap();
        parser
            .add_option("--output-file %s #where the results are written", &long)
            .unwrap();
        parser.set_help_config(HelpConfig {
            indent: 20,
            columns: 40,
        });

        let help = parser.help_message();
        let expected = "Usage: demo\nOptions include:\n\n\
                        -n <decimal integer>\n                    count\n\
                        --output-file <string>\n                    where the results\n                    are written\n";
        assert_eq!(help, expected);
    }

    #[test]
    fn test_help_short_info_pads_to_indent() {
        let n = Holder::<i32>::new();
        let mut parser = ArgParser::without_default_help("demo");
        parser.add_option("-n %d #count", &n).unwrap();
        parser.set_help_config(HelpConfig {
            indent: 24,
            columns: 80,
        });
        let help = parser.help_message();
        assert!(help.ends_with("-n <decimal integer>    count\n"));
    }

    #[test]
    fn test_help_skips_hidden_and_renders_delimiters() {
        let a = Holder::<bool>::new();
        let b = Holder::<bool>::new();
        let mut parser = ArgParser::new("demo");
        parser.add_delimiter("Debugging:");
        parser.add_option("-trace %v #trace execution", &a).unwrap();
        parser.add_hidden_option("-secret %v #not shown", &b).unwrap();

        let help = parser.help_message();
        assert!(help.contains("\nDebugging:\n"));
        assert!(help.contains("-trace "));
        assert!(!help.contains("-secret"));
        assert!(help.contains("--help, -? "));

        parser.set_help_enabled(false);
        assert!(!parser.help_message().contains("--help"));
    }

    #[test]
    fn test_help_config_deserializes_with_defaults() {
        let config: HelpConfig = serde_json::from_str(r#"{"columns": 100}"#).unwrap();
        assert_eq!(config, HelpConfig { indent: 6, columns: 100 });
    }
}
