use crate::command::{ExitCode, ProcessRunner};
use log::debug;
use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Runs external programs as child processes of the shell.
///
/// The child inherits standard streams, the working directory and the
/// environment. The call blocks until the child has exited or was killed.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&mut self, program: &Path, argv: &[String]) -> io::Result<ExitCode> {
        let mut cmd = Command::new(program);
        if let Some((name, args)) = argv.split_first() {
            set_arg0(&mut cmd, name);
            cmd.args(args);
        }
        let exit_status = cmd.spawn()?.wait()?;
        let code = match exit_status.code() {
            Some(x) => x,
            None => terminated_by_signal(exit_status),
        };
        debug!("{} exited with status {code}", program.display());
        Ok(code)
    }
}

#[cfg(unix)]
fn set_arg0(cmd: &mut Command, name: &str) {
    use std::os::unix::process::CommandExt;
    cmd.arg0(name);
}

#[cfg(not(unix))]
fn set_arg0(_cmd: &mut Command, _name: &str) {}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

/// Resolve a command name to the program to execute.
///
/// Behavior:
/// - Name containing `/`: returned unchanged; whether it exists or is executable
///   is left to the exec.
/// - Otherwise: every `:`-separated entry of `search_paths` (PATH) is tried in
///   order as `entry + "/" + name`, and the first executable file wins.
/// - No PATH or an empty name: `None`.
pub fn find_command_path<'a>(search_paths: Option<&OsStr>, name: &'a str) -> Option<Cow<'a, Path>> {
    if name.contains('/') {
        return Some(Cow::Borrowed(Path::new(name)));
    }
    if name.is_empty() {
        return None;
    }
    find_in_path(search_paths?, name).map(Cow::Owned)
}

fn find_in_path(search_paths: &OsStr, cmd: &str) -> Option<PathBuf> {
    for dir in split_search_paths(search_paths) {
        let mut candidate = OsString::from(dir);
        candidate.push("/");
        candidate.push(cmd);
        let path = PathBuf::from(candidate);
        if is_executable(&path) {
            return Some(path);
        }
    }
    None
}

#[cfg(unix)]
fn split_search_paths(search_paths: &OsStr) -> impl Iterator<Item = &OsStr> {
    use std::os::unix::ffi::OsStrExt;
    search_paths
        .as_bytes()
        .split(|b| *b == b':')
        .map(OsStr::from_bytes)
}

#[cfg(not(unix))]
fn split_search_paths(search_paths: &OsStr) -> impl Iterator<Item = &OsStr> {
    search_paths
        .to_str()
        .into_iter()
        .flat_map(|s| s.split(':'))
        .map(OsStr::new)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    match path.metadata() {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
