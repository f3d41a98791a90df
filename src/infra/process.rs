//! External process execution
//!
//! Runs build and profiling tools either locally or on a remote machine over
//! ssh. Remote commands are rendered into a single shell string executed in
//! the mapped working directory.

use std::collections::BTreeMap;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output, Stdio};

use crate::core::project::{MachineAuthenticationInfo, MachineInfo};

/// A command to run on a build's machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program name or path
    pub program: String,
    /// Arguments
    pub args: Vec<String>,
    /// Working directory (already mapped to the target machine)
    pub cwd: PathBuf,
    /// Extra environment variables
    pub env: BTreeMap<String, String>,
}

impl CommandSpec {
    /// New command with no arguments
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            env: BTreeMap::new(),
        }
    }

    /// Append one argument
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add environment variables
    #[must_use]
    pub fn envs<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.env.extend(vars);
        self
    }

    /// Render as a POSIX shell command line
    pub fn to_shell(&self) -> String {
        let mut line = format!("cd {} &&", shell_quote(&self.cwd.to_string_lossy()));
        if !self.env.is_empty() {
            line.push_str(" env");
            for (key, value) in &self.env {
                line.push(' ');
                line.push_str(key);
                line.push('=');
                line.push_str(&shell_quote(value));
            }
        }
        line.push(' ');
        line.push_str(&shell_quote(&self.program));
        for arg in &self.args {
            line.push(' ');
            line.push_str(&shell_quote(arg));
        }
        line
    }
}

/// Quote a string for a POSIX shell
pub fn shell_quote(s: &str) -> String {
    if !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c))
    {
        return s.to_string();
    }
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Map a path under the local project root to the machine's project root
pub fn machine_path(project_root: &Path, local: &Path, machine: &MachineInfo) -> PathBuf {
    match (&machine.project_path, machine.is_local()) {
        (Some(remote_root), false) => match local.strip_prefix(project_root) {
            Ok(relative) => remote_root.join(relative),
            Err(_) => local.to_path_buf(),
        },
        _ => local.to_path_buf(),
    }
}

/// Build the `std::process::Command` that runs `spec` on `machine`
pub fn prepare(
    spec: &CommandSpec,
    machine: &MachineInfo,
    auth: Option<&MachineAuthenticationInfo>,
) -> Command {
    if machine.is_local() {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args).current_dir(&spec.cwd).envs(&spec.env);
        return cmd;
    }

    let host = machine.address.as_deref().unwrap_or_default();
    let destination = match auth {
        Some(a) => format!("{}@{host}", a.username),
        None => host.to_string(),
    };
    let password = auth.and_then(|a| a.password.as_deref());

    let mut cmd = if let Some(password) = password {
        let mut cmd = Command::new("sshpass");
        cmd.arg("-e").arg("ssh").env("SSHPASS", password);
        cmd
    } else {
        let mut cmd = Command::new("ssh");
        cmd.args(["-o", "BatchMode=yes"]);
        cmd
    };

    cmd.arg("-p").arg(machine.port.to_string());
    if let Some(key) = auth.and_then(|a| a.identity_file.as_ref()) {
        cmd.arg("-i").arg(key);
    }
    cmd.arg(destination).arg(spec.to_shell());
    cmd
}

/// Run `spec`, calling `on_line` for every line written to stdout or stderr
pub fn run_streaming(
    spec: &CommandSpec,
    machine: &MachineInfo,
    auth: Option<&MachineAuthenticationInfo>,
    on_line: &(dyn Fn(&str) + Sync),
) -> io::Result<ExitStatus> {
    let mut child = prepare(spec, machine, auth)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    tracing::debug!("spawned {} {:?} in {}", spec.program, spec.args, spec.cwd.display());

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    std::thread::scope(|scope| {
        if let Some(stderr) = stderr {
            scope.spawn(move || forward_lines(stderr, on_line));
        }
        if let Some(stdout) = stdout {
            forward_lines(stdout, on_line);
        }
    });

    child.wait()
}

fn forward_lines(reader: impl Read, on_line: &(dyn Fn(&str) + Sync)) {
    for line in BufReader::new(reader).lines() {
        match line {
            Ok(line) => on_line(&line),
            Err(e) => {
                tracing::debug!("stopped reading process output: {e}");
                break;
            }
        }
    }
}

/// Run `spec` to completion and capture its output
pub fn run_captured(
    spec: &CommandSpec,
    machine: &MachineInfo,
    auth: Option<&MachineAuthenticationInfo>,
) -> io::Result<Output> {
    prepare(spec, machine, auth).stdin(Stdio::null()).output()
}
