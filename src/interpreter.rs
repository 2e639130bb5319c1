use crate::builtin::Builtin;
use crate::command::ProcessRunner;
use crate::env::Environment;
use crate::external::{SystemRunner, find_command_path};
use crate::lexer::Lexer;
use crate::reader::{LineReader, ReadOutcome};
use anyhow::Result;
use log::debug;
use std::io::{self, Write};

/// Prompt shown when a fresh command is expected.
pub const PROMPT: &str = "$ ";
/// Prompt shown while a quote or a trailing backslash keeps the command open.
pub const CONTINUATION_PROMPT: &str = "> ";

/// A minimal interactive shell that runs built-in and external commands.
///
/// The interpreter owns an [`Environment`] and a [`ProcessRunner`] used to
/// launch external programs. See [`Default`] for the runner used out of the box.
///
/// Example
/// ```
/// use sh2::{Interpreter, StreamReader};
/// let input = std::io::Cursor::new(b"help\nexit\n".to_vec());
/// let mut reader = StreamReader::new(input, Vec::new());
/// Interpreter::default().repl(&mut reader).unwrap();
/// ```
pub struct Interpreter {
    env: Environment,
    runner: Box<dyn ProcessRunner>,
}

impl Interpreter {
    /// Create a new interpreter launching external commands through `runner`.
    pub fn new(env: Environment, runner: Box<dyn ProcessRunner>) -> Self {
        Self { env, runner }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Read-Eval-Print Loop.
    ///
    /// Returns `Ok(())` when the `exit` built-in runs or the input ends, even in
    /// the middle of an unterminated command.
    pub fn repl(&mut self, reader: &mut dyn LineReader) -> Result<()> {
        while let Some(argv) = Self::read_command(reader)? {
            if !self.dispatch(&argv)? {
                break;
            }
        }
        Ok(())
    }

    /// Reads physical lines until they form one complete, non-empty argument
    /// vector. Returns `None` at end of input.
    pub fn read_command(reader: &mut dyn LineReader) -> Result<Option<Vec<String>>> {
        let mut lexer = Lexer::new();
        loop {
            let prompt = if lexer.is_continuing() {
                CONTINUATION_PROMPT
            } else {
                PROMPT
            };
            match reader.read_line(prompt)? {
                ReadOutcome::Line(line) => {
                    if lexer.feed(&line) {
                        continue;
                    }
                    let argv = lexer.finish()?;
                    if !argv.is_empty() {
                        return Ok(Some(argv));
                    }
                }
                ReadOutcome::Interrupted => lexer.reset(),
                ReadOutcome::Eof => return Ok(None),
            }
        }
    }

    /// Runs one argument vector on the process's standard streams.
    ///
    /// Returns whether the shell should keep prompting.
    pub fn dispatch(&mut self, argv: &[String]) -> Result<bool> {
        self.dispatch_with_output(argv, &mut io::stdout(), &mut io::stderr())
    }

    /// Same as [`Interpreter::dispatch`] with explicit output streams for the
    /// shell's own messages. Children still inherit the process's streams.
    pub fn dispatch_with_output(
        &mut self,
        argv: &[String],
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<bool> {
        let Some(name) = argv.first() else {
            return Ok(true);
        };

        if let Some(builtin) = Builtin::lookup(name) {
            builtin.execute(argv, stdout, stderr, &mut self.env)?;
            stdout.flush()?;
            return Ok(!self.env.should_exit);
        }

        let search_paths = self.env.get_var("PATH");
        let Some(program) = find_command_path(search_paths.as_deref(), name) else {
            writeln!(stderr, "{name}: command not found")?;
            return Ok(true);
        };
        debug!("resolved {name} to {}", program.display());

        stdout.flush()?;
        if let Err(e) = self.runner.run(&program, argv) {
            writeln!(stderr, "sh2: {}: {e}", program.display())?;
        }
        Ok(true)
    }
}

impl Default for Interpreter {
    /// Create an interpreter over the current process environment that runs
    /// external commands with [`SystemRunner`].
    fn default() -> Self {
        Self::new(Environment::new(), Box::new(SystemRunner))
    }
}
