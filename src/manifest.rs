//! The in-memory manifest: a mapping of file path to checksum digest,
//! built fresh on every generate or check and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Malformed record on line {line}: expected `path,checksum`")]
    MalformedRecord { line: usize },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Mapping of file path to hex checksum digest.
///
/// Paths are stored exactly as supplied (relative paths stay relative), so
/// verification must run from the directory generation ran from for relative
/// entries to resolve. Keys are unique and iteration is in sorted path
/// order, which keeps persisted manifests deterministic and diffable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<String, String>,
}

impl Manifest {
    pub fn new() -> Manifest {
        Manifest::default()
    }

    /// Records a checksum for a path. Inserting the same path again
    /// replaces the previous digest.
    pub fn insert(&mut self, path: impl Into<String>, checksum: impl Into<String>) {
        self.entries.insert(path.into(), checksum.into());
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(path, checksum)| (path.as_str(), checksum.as_str()))
    }

    /// Renders the plaintext reference format: one `path,checksum` record
    /// per line, no header.
    ///
    /// Commas in paths are not escaped, so a path containing a comma
    /// produces a record [`Manifest::from_csv`] will reject. This is a
    /// known limitation of the format, kept for compatibility with
    /// existing reference files.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        for (path, checksum) in &self.entries {
            out.push_str(path);
            out.push(',');
            out.push_str(checksum);
            out.push('\n');
        }
        out
    }

    /// Parses the plaintext reference format. Any line that does not split
    /// into exactly two comma-separated fields is an error.
    pub fn from_csv(text: &str) -> Result<Manifest, ManifestError> {
        let mut manifest = Manifest::new();
        for (idx, line) in text.lines().enumerate() {
            let fields: Vec<&str> = line.trim().split(',').collect();
            if fields.len() != 2 {
                return Err(ManifestError::MalformedRecord { line: idx + 1 });
            }
            manifest.insert(fields[0], fields[1]);
        }
        Ok(manifest)
    }

    /// Renders the JSON object form used inside encrypted reference files:
    /// paths as keys, digests as values.
    pub fn to_json(&self) -> Result<Vec<u8>, ManifestError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Manifest, ManifestError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Paths recorded here whose digest in `fresh` is absent or different,
    /// in sorted order. Treating this manifest as the reference, these are
    /// the files that no longer match.
    pub fn mismatched_paths<'a>(&'a self, fresh: &Manifest) -> Vec<&'a str> {
        self.entries
            .iter()
            .filter(|(path, checksum)| fresh.get(path) != Some(checksum.as_str()))
            .map(|(path, _)| path.as_str())
            .collect()
    }
}
