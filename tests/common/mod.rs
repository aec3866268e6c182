use assert_cmd::{Command, cargo::cargo_bin_cmd};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub fn srccheck_cmd(cwd: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("srccheck");
    cmd.current_dir(cwd);
    cmd
}

/// Directory holding `a.txt` ("hello") and `b.txt` ("world").
pub fn source_dir() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.txt"), "hello").unwrap();
    fs::write(temp.path().join("b.txt"), "world").unwrap();
    temp
}

/// Runs `generate a.txt b.txt --out-dir .` in `dir`, asserting success.
pub fn generate_reference(dir: &Path, extra_args: &[&str]) {
    srccheck_cmd(dir)
        .arg("generate")
        .arg("a.txt")
        .arg("b.txt")
        .arg("--out-dir")
        .arg(".")
        .args(extra_args)
        .assert()
        .success();
}
