//! YAML option manifests.
//!
//! A manifest declares a parser without writing Rust: a synopsis, optional
//! help layout, and an ordered list of options and help headings.
//!
//! # Example YAML
//!
//! ```yaml
//! synopsis: "copy [options] src dst"
//! default_help: true
//! help:
//!   indent: 20
//!   columns: 80
//! options:
//!   - delimiter: "Transfer:"
//!   - spec: "-size %d {1,2,4,8,16} #block size"
//!     sink: holder
//!     element: int
//!   - spec: "-pos %fX3 #position"
//!     sink: array
//!   - spec: "-tag %s #label, may be repeated"
//!     sink: collector
//!   - spec: "-debug %v #internal"
//!     visible: false
//! ```

use std::collections::BTreeMap;
use std::io::BufReader;
use std::path::Path;

use argspec_core::{
    ArgParser, ArrayHolder, Collector, HelpConfig, Holder, ResultSink, SinkSnapshot, ValueKind,
    compile,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CliError, Result};

/// Storage shape of a manifest option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkShape {
    /// Single value.
    #[default]
    Holder,
    /// Fixed-length array.
    Array,
    /// One occurrence per match.
    Collector,
}

/// Element type of a manifest option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// `bool`
    Bool,
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
}

impl From<ElementType> for ValueKind {
    fn from(element: ElementType) -> Self {
        match element {
            ElementType::Bool => ValueKind::Boolean,
            ElementType::Char => ValueKind::Char,
            ElementType::Int => ValueKind::Int,
            ElementType::Long => ValueKind::Long,
            ElementType::Float => ValueKind::Float,
            ElementType::Double => ValueKind::Double,
            ElementType::String => ValueKind::String,
        }
    }
}

/// One option declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionEntry {
    /// Option specification string.
    pub spec: String,
    /// Storage shape; defaults to a holder.
    #[serde(default)]
    pub sink: SinkShape,
    /// Element type; defaults to the conversion code's widest kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<ElementType>,
    /// Array length; defaults to the multiplicity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    /// Shown in generated help.
    #[serde(default = "default_true")]
    pub visible: bool,
}

/// A manifest entry: a help heading or an option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ManifestEntry {
    /// Help heading line.
    Delimiter {
        /// Heading text.
        delimiter: String,
    },
    /// Option declaration.
    Option(OptionEntry),
}

/// Parser declaration loaded from YAML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Usage synopsis.
    pub synopsis: String,
    /// Synthesize `--help,-?`.
    #[serde(default = "default_true")]
    pub default_help: bool,
    /// Help layout.
    #[serde(default)]
    pub help: HelpConfig,
    /// Options and headings in declaration order.
    #[serde(default)]
    pub options: Vec<ManifestEntry>,
}

fn default_true() -> bool {
    true
}

impl Manifest {
    /// Loads a manifest from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](CliError::IoError) if the file cannot be read, or
    /// [`YamlError`](CliError::YamlError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let manifest = serde_yaml::from_reader(reader)?;
        Ok(manifest)
    }

    /// Parses a manifest from YAML text.
    ///
    /// # Examples
    ///
    /// ```
    /// use argspec_cli::Manifest;
    ///
    /// let manifest = Manifest::from_yaml("synopsis: demo\noptions:\n  - spec: \"-n %d\"\n").unwrap();
    /// let bound = manifest.build().unwrap();
    /// assert_eq!(bound.parser.descriptors().len(), 2);
    /// ```
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Registers every entry with a fresh parser and creates the sinks.
    ///
    /// # Errors
    ///
    /// [`CliError::Spec`] for a rejected specification and
    /// [`CliError::InvalidManifest`] for an array without a usable length.
    pub fn build(&self) -> Result<BoundManifest> {
        let mut parser = if self.default_help {
            ArgParser::new(self.synopsis.clone())
        } else {
            ArgParser::without_default_help(self.synopsis.clone())
        };
        parser.set_help_config(self.help);

        let mut bindings = Vec::new();
        for (index, entry) in self.options.iter().enumerate() {
            match entry {
                ManifestEntry::Delimiter { delimiter } => parser.add_delimiter(delimiter.clone()),
                ManifestEntry::Option(option) => {
                    let sink = create_sink(index, option)?;
                    parser.add_option_with_visibility(&option.spec, sink.clone(), option.visible)?;
                    let name = parser
                        .last_descriptor()
                        .and_then(|descriptor| descriptor.primary_name())
                        .unwrap_or_default()
                        .to_string();
                    if !matches!(sink, ResultSink::None) {
                        bindings.push((name, sink));
                    }
                }
            }
        }
        debug!(options = bindings.len(), "Built parser from manifest");
        Ok(BoundManifest { parser, bindings })
    }
}

/// A parser built from a manifest together with its sinks.
#[derive(Debug)]
pub struct BoundManifest {
    /// The configured parser.
    pub parser: ArgParser,
    bindings: Vec<(String, ResultSink)>,
}

impl BoundManifest {
    /// Current sink contents keyed by each option's first alias.
    pub fn values(&self) -> BTreeMap<String, SinkSnapshot> {
        self.bindings
            .iter()
            .map(|(name, sink)| (name.clone(), sink.snapshot()))
            .collect()
    }
}

/// Creates the sink for one option entry.
///
/// The option specification is first compiled against a collector, which
/// accepts every conversion, to learn its default kind and multiplicity.
fn create_sink(index: usize, entry: &OptionEntry) -> Result<ResultSink> {
    let probe = compile(&entry.spec, ResultSink::from(&Collector::new()))?;
    if probe.is_help() {
        return Ok(ResultSink::None);
    }
    let kind = entry.element.map_or(probe.kind, ValueKind::from);
    let length = entry.length.unwrap_or(probe.multiplicity);
    if entry.sink == SinkShape::Array && length == 0 {
        return Err(CliError::InvalidManifest {
            index,
            reason: "array length must be > 0".to_string(),
        });
    }

    macro_rules! typed {
        ($ty:ty) => {
            match entry.sink {
                SinkShape::Holder => ResultSink::from(&Holder::<$ty>::new()),
                SinkShape::Array => ResultSink::from(&ArrayHolder::<$ty>::new(length)),
                SinkShape::Collector => ResultSink::from(&Collector::new()),
            }
        };
    }

    let sink = match kind {
        ValueKind::Boolean => typed!(bool),
        ValueKind::Char => typed!(char),
        ValueKind::Int => typed!(i32),
        ValueKind::Long => typed!(i64),
        ValueKind::Float => typed!(f32),
        ValueKind::Double => typed!(f64),
        ValueKind::String => typed!(String),
        ValueKind::Help | ValueKind::Delimiter => ResultSink::None,
    };
    Ok(sink)
}

#[cfg(test)]
mod tests {
    use argspec_core::{MatchPolicy, Value};

    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
synopsis: "copy [options]"
help:
  indent: 20
options:
  - delimiter: "Transfer:"
  - spec: "-size %d {1,2,4,8,16} #block size"
    element: int
  - spec: "-pos %fX3 #position"
    sink: array
  - spec: "-tag %s #label"
    sink: collector
  - spec: "-debug %v #internal"
    visible: false
"#
    }

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::from_yaml(sample_yaml()).unwrap();
        assert!(manifest.default_help);
        assert_eq!(manifest.help.indent, 20);
        assert_eq!(manifest.help.columns, 80);
        assert_eq!(manifest.options.len(), 5);
        assert_eq!(
            manifest.options[0],
            ManifestEntry::Delimiter {
                delimiter: "Transfer:".to_string()
            }
        );
        let ManifestEntry::Option(pos) = &manifest.options[2] else {
            panic!("expected option");
        };
        assert_eq!(pos.sink, SinkShape::Array);
        assert_eq!(pos.element, None);
        assert!(pos.visible);
    }

    #[test]
    fn test_build_and_match() {
        let mut bound = Manifest::from_yaml(sample_yaml()).unwrap().build().unwrap();
        let args = ["-size", "8", "-pos", "1", "2", "3", "-tag", "a", "-tag", "b", "-debug"];
        assert_eq!(
            bound.parser.match_all_args(&args, 0, MatchPolicy::STRICT).unwrap(),
            None
        );

        let values = bound.values();
        assert_eq!(values["-size"], SinkSnapshot::Value(Value::Int(8)));
        assert_eq!(
            values["-pos"],
            SinkSnapshot::Array(vec![Value::Double(1.0), Value::Double(2.0), Value::Double(3.0)])
        );
        assert_eq!(values["-debug"], SinkSnapshot::Value(Value::Bool(true)));
        assert!(!values.contains_key("--help"));

        let help = bound.parser.help_message();
        assert!(help.contains("\nTransfer:\n"));
        assert!(!help.contains("-debug"));
    }

    #[test]
    fn test_declared_help_gets_no_sink() {
        let yaml = "synopsis: demo\noptions:\n  - spec: \"-h %h #usage\"\n";
        let bound = Manifest::from_yaml(yaml).unwrap().build().unwrap();
        assert_eq!(bound.parser.first_help_option_name(), Some("-h"));
        assert!(bound.values().is_empty());
    }

    #[test]
    fn test_bad_spec_is_reported() {
        let yaml = "synopsis: demo\noptions:\n  - spec: \"-n %q\"\n";
        let err = Manifest::from_yaml(yaml).unwrap().build().unwrap_err();
        assert!(matches!(err, CliError::Spec(_)));
    }

    #[test]
    fn test_mismatched_element_is_reported() {
        let yaml = "synopsis: demo\noptions:\n  - spec: \"-n %d\"\n    element: string\n";
        let err = Manifest::from_yaml(yaml).unwrap().build().unwrap_err();
        assert!(err.to_string().contains("invalid result holder for %d"));
    }

    #[test]
    fn test_zero_length_array_is_rejected() {
        let yaml = "synopsis: demo\noptions:\n  - spec: \"-n %d\"\n    sink: array\n    length: 0\n";
        let err = Manifest::from_yaml(yaml).unwrap().build().unwrap_err();
        assert!(matches!(err, CliError::InvalidManifest { index: 0, .. }));
    }
}
