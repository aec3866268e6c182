//! Source integrity checking: generate and verify checksum manifests.
//!
//! Srccheck records a checksum for each file in a set and writes the result to
//! a reference file, optionally sealed with a freshly generated key. A later
//! check recomputes the checksums and reports any file whose contents changed.
//!
//! ```no_run
//! use srccheck::{HashAlgorithm, SourceCheck};
//! use std::path::{Path, PathBuf};
//!
//! # fn example() -> Result<(), srccheck::SourceCheckError> {
//! let files = vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")];
//!
//! let mut checker = SourceCheck::new(HashAlgorithm::Md5).with_output_dir(".");
//! checker.generate(&files, false)?;
//!
//! let clean = checker.check(Path::new("srccheck.ref"), None)?;
//! assert!(clean);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Modules
//!
//! - [`checksum`]: file checksumming and algorithm selection
//! - [`crypto`]: key generation and the cipher sealing encrypted references
//! - [`manifest`]: the path-to-checksum map and its text and JSON forms
//! - [`reference`]: reading and writing reference and key files
//! - [`source_check`]: the generate and check operations
//! - [`cli`]: command line argument definitions

pub mod checksum;
pub mod cli;
pub mod crypto;
pub mod manifest;
pub mod reference;
pub mod source_check;

pub use checksum::HashAlgorithm;
pub use manifest::Manifest;
pub use source_check::{SourceCheck, SourceCheckError};
