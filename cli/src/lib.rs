//! Front end for `argspec-core`.
//!
//! The core matcher performs no I/O. This crate supplies the outer layer a
//! command-line program needs around it:
//!
//! - [`argfile`]: argument files whose tokens are prepended to the command
//!   line.
//! - [`exit`]: printing help or failures and exiting with the right status.
//! - [`manifest`]: YAML manifests that declare a parser and its sinks.
//!
//! # Example
//!
//! ```
//! use argspec_cli::{Manifest, prepend_args};
//! use argspec_core::MatchPolicy;
//!
//! let manifest = Manifest::from_yaml(
//!     "synopsis: demo\noptions:\n  - spec: \"-level %d {[0,9]}\"\n    element: int\n",
//! )
//! .unwrap();
//! let mut bound = manifest.build().unwrap();
//!
//! let args = prepend_args("-level 7 # from a file\n".as_bytes(), &["extra".to_string()]).unwrap();
//! let unmatched = bound.parser.match_all_args(&args, 0, MatchPolicy::COLLECT).unwrap();
//! assert_eq!(unmatched, Some(vec!["extra".to_string()]));
//! assert_eq!(serde_json::to_string(&bound.values()).unwrap(), r#"{"-level":7}"#);
//! ```

pub mod argfile;
pub mod error;
pub mod exit;
pub mod manifest;

pub use argfile::{prepend_args, prepend_args_from_file, tokenize_line};
pub use error::{CliError, Result};
pub use exit::{exit_on_failure, failure_message, match_all_args_or_exit};
pub use manifest::{BoundManifest, ElementType, Manifest, ManifestEntry, OptionEntry, SinkShape};
