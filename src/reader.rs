//! Sources of physical input lines for the driver loop.

use log::warn;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Result of asking a [`LineReader`] for one physical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A line without its terminator.
    Line(String),
    /// The user interrupted editing (Ctrl-C); any pending command is dropped.
    Interrupted,
    /// End of input.
    Eof,
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("terminal error: {0}")]
    Editor(#[from] ReadlineError),
    #[error("read error: {0}")]
    Io(#[from] io::Error),
}

/// Pulls physical lines from the user, showing `prompt` first.
pub trait LineReader {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome, ReadError>;
}

/// Interactive reader backed by a `rustyline` editor with in-memory history.
pub struct EditorReader {
    editor: DefaultEditor,
}

impl EditorReader {
    pub fn new() -> Result<Self, ReadError> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineReader for EditorReader {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome, ReadError> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(e) = self.editor.add_history_entry(line.as_str()) {
                        warn!("failed to record history entry: {e}");
                    }
                }
                Ok(ReadOutcome::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(err) => Err(err.into()),
        }
    }
}

/// Plain reader over any buffered input, for piped stdin and tests.
///
/// The prompt is written and flushed to `output` before every read. A final
/// line that is not terminated by `\n` is treated as end of input.
pub struct StreamReader<R, W> {
    input: R,
    output: W,
    buf: Vec<u8>,
}

impl<R: BufRead, W: Write> StreamReader<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            buf: Vec::with_capacity(128),
        }
    }

    /// Gives back the prompt sink, e.g. to inspect what was written in tests.
    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> LineReader for StreamReader<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome, ReadError> {
        self.output.write_all(prompt.as_bytes())?;
        self.output.flush()?;

        self.buf.clear();
        self.input.read_until(b'\n', &mut self.buf)?;
        if self.buf.pop() != Some(b'\n') {
            return Ok(ReadOutcome::Eof);
        }
        Ok(ReadOutcome::Line(
            String::from_utf8_lossy(&self.buf).into_owned(),
        ))
    }
}
