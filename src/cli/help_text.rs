pub(super) const ROOT_LONG_ABOUT: &str = "\
Source integrity tool for generating and verifying checksum manifests

Srccheck records a checksum for each file you name in a reference file, and later
verifies that those files still produce the same checksums. Use it to detect
modified or corrupted sources between the time you snapshot them and the time you
(or someone else) consume them.

CORE CONCEPTS:

  Reference file (srccheck.ref):
    A manifest mapping each recorded path to its checksum. In plain-text mode this
    is one 'path,checksum' line per file, sorted by path. Paths are recorded
    exactly as you passed them, so verify from the same working directory when
    using relative paths.

  Key file (srccheck.key):
    With --encrypt, the manifest is sealed with a freshly generated key and the
    reference file becomes an opaque binary blob. The key is written alongside it
    as srccheck.key. Both files are required to verify; store the key separately
    from the reference if you want tamper evidence.

  Checksum algorithms:
    crc32, md5, sha1, sha256 and sha512 are supported (default: md5). The
    reference file does not record which algorithm was used, so pass the same
    --algorithm to 'check' that you used with 'generate'.

TYPICAL WORKFLOW:

  1. Snapshot the files you care about:
     $ srccheck generate src/main.c src/util.c --out-dir .

  2. Hand the sources and srccheck.ref to the consumer

  3. Verify before building:
     $ srccheck check srccheck.ref

COMMANDS:

  generate
    Checksum every named file and write the reference file (plus a key file with
    --encrypt). All named files must exist; if any are missing the command lists
    them and writes nothing.

  check
    Recompute the checksum of every recorded file and compare against the
    reference. Prints the names of files that fail and exits non-zero.

EXIT CODES:

  0    success (all checksums match)
  1    verification found mismatched checksums
  255  any other error (missing reference or key file, unreadable input, ...)

COMMON USE CASES:

  Detect drift in configuration files:
    $ srccheck generate /etc/app/*.conf --out-dir /var/lib/app
    $ srccheck check /var/lib/app/srccheck.ref || alert_admin

  Tamper-evident handoff:
    $ srccheck generate release/*.tar.gz --encrypt --out-dir .
    $ # send srccheck.ref with the release, srccheck.key out of band
    $ srccheck check srccheck.ref --key-file srccheck.key

  Stronger checksums for archival:
    $ srccheck generate data.bin --algorithm sha512 --out-dir .
    $ srccheck check srccheck.ref --algorithm sha512

EXAMPLES:

  # Snapshot two files into ./srccheck.ref
  $ srccheck generate a.txt b.txt --out-dir .

  # Snapshot to the desktop (the default output directory)
  $ srccheck generate a.txt b.txt

  # Encrypted reference plus key file
  $ srccheck generate a.txt b.txt --encrypt --out-dir .

  # Verify, with info-level progress on stderr
  $ srccheck -v check srccheck.ref

For detailed help on any command, use:
  srccheck <command> --help
";

pub(super) const GENERATE_LONG_ABOUT: &str = "\
Generate a reference file recording a checksum per source file

This command checksums every file you name and writes the results to a reference
file named srccheck.ref. With --encrypt it also writes a key file named
srccheck.key. Both land in the output directory, which defaults to your desktop;
pass --out-dir to put them somewhere else.

INPUT VALIDATION:

All named files must exist before anything is written. If one or more are
missing, the command prints the full list of missing paths and exits without
creating or touching any output file. Fix the list and rerun.

PLAIN-TEXT FORMAT:

  Without --encrypt, srccheck.ref contains one line per file:

    path,checksum

  sorted by path. Naming the same file twice records it once. Paths containing a
  comma cannot be represented in this format and will be rejected when checked;
  use --encrypt for such paths, since the encrypted format does not share the
  limitation.

ENCRYPTED FORMAT (--encrypt):

  The manifest is serialized and sealed with a key generated for this run, then
  written as a binary envelope. The key is base64 text in srccheck.key. Verifying
  requires both files:

    $ srccheck check srccheck.ref --key-file srccheck.key

  A new key is generated on every run; an old key does not open a regenerated
  reference file.

ALGORITHM CHOICE:

  --algorithm selects the checksum function (default: md5). The choice is not
  recorded in the reference file, so verification must be run with the same
  --algorithm value. crc32 is fast but not collision-resistant; prefer sha256 or
  sha512 when guarding against deliberate tampering.

EXAMPLES:

  # Plain reference file in the current directory
  $ srccheck generate a.txt b.txt --out-dir .

  # Encrypted reference and key on the desktop
  $ srccheck generate a.txt b.txt --encrypt

  # SHA-256 checksums
  $ srccheck generate a.txt --algorithm sha256 --out-dir .
";

pub(super) const CHECK_LONG_ABOUT: &str = "\
Verify the files recorded in a reference file

This command reads a reference file, recomputes the checksum of every file it
records, and compares the results. If every checksum matches it exits 0 and
prints nothing. Otherwise it prints the names of the files that failed and
exits 1.

PLAIN VS ENCRYPTED:

  Passing only a reference file reads it as plain text. Passing --key-file as
  well decrypts the reference with that key first. The key file must be the one
  written by the same 'generate' run; any other key fails decryption.

WHAT COUNTS AS A MISMATCH:

  A recorded file whose current checksum differs from the recorded one, and a
  recorded file that no longer exists, are both reported as failures. Extra
  files that were never recorded are not srccheck's concern and are ignored.

PRECONDITIONS:

  The reference file (and the key file, when given) must exist; if either is
  missing the command reports it and exits 255 without checksumming anything.
  Relative recorded paths are resolved against the current working directory,
  so run 'check' from the same directory 'generate' ran in.

ALGORITHM:

  Pass the same --algorithm used at generation time (default: md5). Verifying
  with a different algorithm reports every file as failed, since none of the
  recomputed checksums can match.

EXAMPLES:

  # Verify a plain reference file
  $ srccheck check srccheck.ref

  # Verify an encrypted reference file
  $ srccheck check srccheck.ref --key-file srccheck.key

  # Verify SHA-512 checksums with debug logging
  $ srccheck -vv check srccheck.ref --algorithm sha512
";
