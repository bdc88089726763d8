//! Option specification compiler and argument matcher.
//!
//! Options are declared with a compact specification string and bound to a
//! caller-owned result sink:
//!
//! ```text
//! name1[,name2...] %<code>[{range}][X<n>][#[valueDesc]#optDesc]
//! ```
//!
//! - [`Scanner`]: character cursor with typed literal scans (integers in
//!   base 8/10/16, floats, escaped characters and strings, booleans).
//! - [`RangeSet`]: the `{...}` range sub-language and its membership test.
//! - [`compile`]: turns one specification into an [`OptionDescriptor`].
//! - [`ArgParser`]: the ordered option registry and matching engine.
//! - [`render_help`]: the word-wrapped usage text.
//!
//! The crate performs no I/O. A matched help option surfaces as
//! [`ParseError::HelpRequested`]; printing it and exiting the process is up
//! to the caller.
//!
//! # Example
//!
//! ```
//! use argspec_core::*;
//!
//! let size = Holder::<i32>::new();
//! let file = Holder::<String>::new();
//! let values = Collector::new();
//! let mut parser = ArgParser::new("copy [options]");
//! parser.add_option("-size %d {1,2,4,8,16} #block size", &size).unwrap();
//! parser.add_option("-file=%s #output file", &file).unwrap();
//! parser.add_option("-v %f #sample value", &values).unwrap();
//!
//! let args = ["-size", "4", "-file=out.bin", "-v", "0.5", "-v", "2"];
//! assert_eq!(parser.match_all_args(&args, 0, MatchPolicy::STRICT).unwrap(), None);
//! assert_eq!(size.get(), 4);
//! assert_eq!(file.get(), "out.bin");
//! assert_eq!(values.scalars::<f64>(), vec![0.5, 2.0]);
//!
//! let err = parser.match_arg(&["-size", "3"], 0).unwrap_err();
//! assert_eq!(err.to_string(), "-size: value '3' not in range {1,2,4,8,16}");
//! ```

mod error;
mod help;
mod matcher;
mod range;
mod scanner;
mod sink;
mod spec;
mod types;

pub use error::{MatchError, ParseError, RangeError, ScanError, ScanErrorKind, SpecError};
pub use help::{HelpConfig, insert_line_breaks, longest_common_prefix, render_help};
pub use matcher::{ArgParser, MatchPolicy, valid_conversion_codes};
pub use range::{Endpoint, RangeAtom, RangeSet};
pub use scanner::Scanner;
pub use sink::{ArgValue, ArrayHolder, Collector, Holder, Occurrence, ResultSink, SinkSnapshot};
pub use spec::compile;
pub use types::*;
