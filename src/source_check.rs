//! The SourceCheck component: `generate` records checksums for a set of
//! source files into a reference manifest on disk, `check` re-checksums
//! the recorded paths and reports any divergence.

use crate::checksum::{ChecksumError, HashAlgorithm, checksum_file};
use crate::crypto::{Cipher, XChaCha};
use crate::manifest::Manifest;
use crate::reference::{Reference, ReferenceError};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum SourceCheckError {
    #[error("Source files not found: {}", paths_display(.0))]
    MissingSources(Vec<PathBuf>),
    #[error("Reference file not found: {}", .0.display())]
    ReferenceNotFound(PathBuf),
    #[error("Key file not found: {}", .0.display())]
    KeyNotFound(PathBuf),
    #[error("Cannot resolve the desktop directory: {0} is not set")]
    DesktopUnresolved(&'static str),
    #[error("Checksum error: {0}")]
    Checksum(#[from] ChecksumError),
    #[error("Reference file error: {0}")]
    Reference(#[from] ReferenceError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn paths_display(paths: &[PathBuf]) -> String {
    let rendered: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
    rendered.join(", ")
}

/// The per-OS desktop directory: `$HOME/Desktop` on unix,
/// `%USERPROFILE%\Desktop` on Windows. This is the default output location
/// for `generate`.
pub fn desktop_dir() -> Result<PathBuf, SourceCheckError> {
    let var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    let home = std::env::var_os(var).ok_or(SourceCheckError::DesktopUnresolved(var))?;
    Ok(PathBuf::from(home).join("Desktop"))
}

/// Generates and verifies source-file checksum manifests.
///
/// The checksum algorithm and the cipher are injected at construction, so
/// callers (and tests) can substitute their own. Report lines go to the
/// configured sink, stdout unless redirected with [`SourceCheck::with_sink`].
/// Stateless between calls: each `generate`/`check` builds its manifests
/// from scratch.
pub struct SourceCheck {
    algorithm: HashAlgorithm,
    cipher: Box<dyn Cipher + Send>,
    output_dir: Option<PathBuf>,
    sink: Box<dyn Write + Send>,
}

impl Default for SourceCheck {
    fn default() -> SourceCheck {
        SourceCheck::new(HashAlgorithm::default())
    }
}

impl SourceCheck {
    pub fn new(algorithm: HashAlgorithm) -> SourceCheck {
        SourceCheck {
            algorithm,
            cipher: Box::new(XChaCha),
            output_dir: None,
            sink: Box::new(std::io::stdout()),
        }
    }

    /// Overrides the desktop default as the output directory for
    /// `generate`.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> SourceCheck {
        self.output_dir = Some(dir.into());
        self
    }

    /// Replaces the cipher used for encrypted reference files.
    pub fn with_cipher(mut self, cipher: Box<dyn Cipher + Send>) -> SourceCheck {
        self.cipher = cipher;
        self
    }

    /// Redirects report lines away from stdout.
    pub fn with_sink(mut self, sink: Box<dyn Write + Send>) -> SourceCheck {
        self.sink = sink;
        self
    }

    /// Generates the reference file for `filepaths`, plus a key file when
    /// `encrypt` is set.
    ///
    /// # Behavior
    /// - Verifies every input path exists; if any are missing, all of them
    ///   are reported and nothing is written
    /// - Checksums every file and writes the manifest to `srccheck.ref` in
    ///   the output directory; with `encrypt`, a fresh key goes to
    ///   `srccheck.key` and the reference file holds the encrypted manifest
    /// - Paths are recorded exactly as supplied, so relative inputs must be
    ///   re-resolved from the same working directory at check time
    ///
    /// # Errors
    /// - `SourceCheckError::MissingSources`: one or more inputs do not
    ///   exist; carries every missing path
    /// - `SourceCheckError::DesktopUnresolved`: no output directory was
    ///   configured and the home environment variable is unset
    /// - Checksum and reference-file errors propagate
    pub fn generate(
        &mut self,
        filepaths: &[PathBuf],
        encrypt: bool,
    ) -> Result<(), SourceCheckError> {
        self.ensure_sources_exist(filepaths)?;

        let mut manifest = Manifest::new();
        for path in filepaths {
            let digest = checksum_file(path, self.algorithm)?;
            manifest.insert(path.to_string_lossy(), digest);
        }

        let out_dir = match &self.output_dir {
            Some(dir) => dir.clone(),
            None => desktop_dir()?,
        };
        let reference = Reference::in_dir(&out_dir, encrypt);
        reference.store(&manifest, self.cipher.as_ref())?;
        info!(
            "Recorded {} checksums in {}",
            manifest.len(),
            reference.ref_file().display()
        );

        match reference {
            Reference::Plaintext { .. } => writeln!(
                self.sink,
                "\nComplete.\nThe reference file is available in {}.",
                out_dir.display()
            )?,
            Reference::Encrypted { .. } => writeln!(
                self.sink,
                "\nComplete.\nThe reference and key files are available in {}.",
                out_dir.display()
            )?,
        }
        Ok(())
    }

    /// Verifies the files named in a reference manifest.
    ///
    /// Supplying `key_file` selects encrypted-reference handling; without
    /// it the reference file is parsed as plaintext CSV. Only the paths
    /// named in the manifest are checksummed.
    ///
    /// # Returns
    /// - `Ok(true)`: every recorded checksum matches, nothing is printed
    /// - `Ok(false)`: at least one file diverged (or is gone); the base
    ///   name of each such file is reported through the sink
    ///
    /// # Errors
    /// - `SourceCheckError::ReferenceNotFound` / `KeyNotFound`: raised
    ///   before any checksumming
    /// - Decryption failures propagate; a mismatch is never an error
    pub fn check(
        &mut self,
        ref_file: &Path,
        key_file: Option<&Path>,
    ) -> Result<bool, SourceCheckError> {
        if !ref_file.exists() {
            return Err(SourceCheckError::ReferenceNotFound(ref_file.to_path_buf()));
        }
        if let Some(key_file) = key_file
            && !key_file.exists()
        {
            return Err(SourceCheckError::KeyNotFound(key_file.to_path_buf()));
        }

        let reference = Reference::select(ref_file.to_path_buf(), key_file.map(Path::to_path_buf));
        let recorded = reference.load(self.cipher.as_ref())?;
        debug!("Reference manifest lists {} files", recorded.len());

        let fresh = self.rebuild_manifest(&recorded)?;
        if fresh == recorded {
            info!("All {} checksums match", recorded.len());
            return Ok(true);
        }

        self.report_mismatches(&recorded, &fresh)?;
        Ok(false)
    }

    fn ensure_sources_exist(&mut self, filepaths: &[PathBuf]) -> Result<(), SourceCheckError> {
        let missing: Vec<PathBuf> = filepaths.iter().filter(|p| !p.exists()).cloned().collect();
        if missing.is_empty() {
            return Ok(());
        }

        writeln!(self.sink, "\nThe following files do not exist:")?;
        for path in &missing {
            writeln!(self.sink, " - {}", path.display())?;
        }
        writeln!(self.sink)?;
        Err(SourceCheckError::MissingSources(missing))
    }

    fn rebuild_manifest(&self, recorded: &Manifest) -> Result<Manifest, SourceCheckError> {
        let mut fresh = Manifest::new();
        for path in recorded.paths() {
            match checksum_file(Path::new(path), self.algorithm) {
                Ok(digest) => fresh.insert(path, digest),
                Err(ChecksumError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                    // A recorded file that is gone surfaces as a mismatch,
                    // not a hard error.
                    debug!("{} no longer exists", path);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(fresh)
    }

    fn report_mismatches(
        &mut self,
        recorded: &Manifest,
        fresh: &Manifest,
    ) -> Result<(), SourceCheckError> {
        writeln!(
            self.sink,
            "\nChecksum verification has failed for the following:"
        )?;
        for path in recorded.mismatched_paths(fresh) {
            let name = Path::new(path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string());
            writeln!(self.sink, "- {name}")?;
        }
        writeln!(self.sink)?;
        Ok(())
    }
}
