mod help_text;

use crate::checksum::HashAlgorithm;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Source integrity tool for generating and verifying checksum manifests
#[derive(Parser, Debug)]
#[command(name = "srccheck", version, about, long_about = help_text::ROOT_LONG_ABOUT)]
pub struct Cli {
    /// Increase log verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a reference file recording a checksum per source file
    #[command(long_about = help_text::GENERATE_LONG_ABOUT)]
    Generate {
        /// Files to record in the reference file
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Encrypt the reference file and write a paired key file
        #[arg(long)]
        encrypt: bool,

        /// Checksum algorithm: crc32, md5, sha1, sha256 or sha512
        #[arg(long, value_name = "ALGORITHM", default_value = "md5")]
        algorithm: HashAlgorithm,

        /// Directory for the output files (defaults to the desktop)
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
    },

    /// Verify the files recorded in a reference file
    #[command(long_about = help_text::CHECK_LONG_ABOUT)]
    Check {
        /// Reference file to verify against
        #[arg(value_name = "REF_FILE")]
        ref_file: PathBuf,

        /// Key file paired with an encrypted reference file
        #[arg(long, value_name = "KEY_FILE")]
        key_file: Option<PathBuf>,

        /// Checksum algorithm the reference was generated with
        #[arg(long, value_name = "ALGORITHM", default_value = "md5")]
        algorithm: HashAlgorithm,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
