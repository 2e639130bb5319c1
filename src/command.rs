use std::io;
use std::path::Path;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// Children killed by a signal are reported as `128 + signal`, as POSIX shells do.
pub type ExitCode = i32;

/// Narrow "spawn and wait" seam between the dispatcher and the operating system.
///
/// The dispatcher only ever hands over an already resolved program path and the
/// full argument vector (`argv[0]` included). Implementations block until the
/// child has exited or was killed by a signal.
pub trait ProcessRunner {
    /// Run `program` with `argv` and wait for it to terminate.
    ///
    /// An `Err` means no child ran to completion (spawn or exec failed).
    fn run(&mut self, program: &Path, argv: &[String]) -> io::Result<ExitCode>;
}
