//! Common test utilities for mcpinit tests

use assert_cmd::Command;
use tempfile::TempDir;

/// Command for the mcpinit binary
pub fn mcpinit() -> Command {
    Command::cargo_bin("mcpinit").expect("binary exists")
}

/// Command for the mcpinit binary with a temp dir as working directory
pub fn mcpinit_in(dir: &TempDir) -> Command {
    let mut cmd = mcpinit();
    cmd.current_dir(dir.path());
    cmd
}

/// Creates an empty temporary working directory
pub fn empty_workdir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// Creates a temporary working directory containing a project marker file
pub fn workdir_with_marker(marker: &str) -> TempDir {
    let dir = empty_workdir();
    std::fs::write(dir.path().join(marker), "{}").expect("Failed to write marker");
    dir
}
