use anyhow::Result;
use sh2::{EditorReader, Interpreter, StreamReader};
use std::io::{self, IsTerminal};

fn main() -> Result<()> {
    env_logger::init();

    let mut sh = Interpreter::default();
    if io::stdin().is_terminal() {
        sh.repl(&mut EditorReader::new()?)
    } else {
        sh.repl(&mut StreamReader::new(io::stdin().lock(), io::stdout()))
    }
}
