use std::path::PathBuf;
use std::process::ExitStatus;

use assert_cmd::Command;
use tempfile::TempDir;

/// Scratch directory standing in for a user's home, with a store path
/// inside it that tests pass via `--db`.
pub struct PromptsWorkspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    pub db: PathBuf,
}

impl PromptsWorkspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let root = temp_dir.path().to_path_buf();
        let db = root.join("prompts-library-db.0.mdb");
        Self { temp_dir, root, db }
    }

    pub fn db_arg(&self) -> String {
        self.db.display().to_string()
    }

    pub fn path_arg(&self, name: &str) -> String {
        self.root.join(name).display().to_string()
    }
}

pub struct CmdOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

fn command(workspace: &PromptsWorkspace) -> Command {
    let mut cmd = Command::cargo_bin("zed-prompts").expect("zed-prompts binary");
    cmd.current_dir(&workspace.root)
        .env("HOME", &workspace.root)
        .env("XDG_CONFIG_HOME", workspace.root.join(".config"))
        .env_remove("ZED_PROMPTS_DB")
        .env_remove("RUST_LOG");
    cmd
}

fn finish(cmd: &mut Command, label: &str) -> CmdOutput {
    let output = cmd.output().unwrap_or_else(|e| panic!("{label}: {e}"));
    let out = CmdOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    if !out.status.success() {
        eprintln!("[{label}] stderr:\n{}", out.stderr);
    }
    out
}

pub fn run_prompts<I, S>(workspace: &PromptsWorkspace, args: I, label: &str) -> CmdOutput
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    let mut cmd = command(workspace);
    cmd.args(args);
    finish(&mut cmd, label)
}

pub fn run_prompts_with_stdin<I, S>(
    workspace: &PromptsWorkspace,
    args: I,
    stdin: &str,
    label: &str,
) -> CmdOutput
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    let mut cmd = command(workspace);
    cmd.args(args).write_stdin(stdin.to_string());
    finish(&mut cmd, label)
}

pub fn run_prompts_with_env<I, S>(
    workspace: &PromptsWorkspace,
    args: I,
    env: &[(&str, &str)],
    label: &str,
) -> CmdOutput
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    let mut cmd = command(workspace);
    cmd.args(args);
    for (key, value) in env {
        cmd.env(key, value);
    }
    finish(&mut cmd, label)
}
