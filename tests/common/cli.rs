//! Harness for running the `ib` binary inside a throwaway workspace.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use assert_cmd::Command;
use tempfile::TempDir;

const IB_ENV: [&str; 6] = [
    "IB_TEAM",
    "IB_DATA",
    "IB_RANK_SPACING",
    "IB_MIN_RANK_GAP",
    "IB_REMOTE_TIMEOUT_MS",
    "RUST_LOG",
];

/// A temporary directory the binary runs in.
pub struct IbWorkspace {
    pub temp_dir: TempDir,
}

impl IbWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn data_file(&self) -> PathBuf {
        self.root().join(".issueboard").join("issues.jsonl")
    }

    /// Initialized workspace.
    pub fn init() -> Self {
        let workspace = Self::new();
        let out = run_ib(&workspace, ["init"], "init");
        assert!(out.status.success(), "init failed: {}", out.stderr);
        workspace
    }
}

#[derive(Debug)]
pub struct CmdOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CmdOutput {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout)
            .unwrap_or_else(|e| panic!("stdout is not JSON ({e}): {}", self.stdout))
    }
}

/// Run `ib` with `args` in the workspace. `label` names the step in
/// failure messages.
pub fn run_ib<I, S>(workspace: &IbWorkspace, args: I, label: &str) -> CmdOutput
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::cargo_bin("ib").expect("ib binary");
    cmd.current_dir(workspace.root()).args(args);
    for key in IB_ENV {
        cmd.env_remove(key);
    }
    let output = cmd
        .output()
        .unwrap_or_else(|e| panic!("{label}: failed to run ib: {e}"));
    CmdOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
}

/// Create an issue with `--json` and return its id.
pub fn create_issue(workspace: &IbWorkspace, extra: &[&str], title: &str) -> String {
    let mut args = vec!["--json", "create", title];
    args.extend_from_slice(extra);
    let out = run_ib(workspace, args, "create");
    assert!(out.status.success(), "create failed: {}", out.stderr);
    out.json()["id"]
        .as_str()
        .expect("id in create output")
        .to_string()
}
