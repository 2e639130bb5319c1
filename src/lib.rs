//! A small interactive command shell.
//!
//! The shell reads a line, splits it into an argument vector following the usual
//! quoting rules (single quotes, double quotes, backslash escapes and line
//! continuation), then either runs one of its built-in commands in-process or
//! locates an external program on `PATH`, runs it and waits for it to finish.
//!
//! The main entry point is [`Interpreter`]. It is driven by a [`LineReader`],
//! which is either an interactive [`EditorReader`] or a plain [`StreamReader`]
//! over any buffered input. The [`lexer`] module can be used on its own to
//! tokenize command lines.

mod builtin;
pub mod command;
pub mod env;
mod external;
mod interpreter;
pub mod lexer;
mod reader;

pub use builtin::Builtin;
pub use external::{SystemRunner, find_command_path};
pub use interpreter::{CONTINUATION_PROMPT, Interpreter, PROMPT};
pub use reader::{EditorReader, LineReader, ReadError, ReadOutcome, StreamReader};
