use crate::env::Environment;
use anyhow::{Context, Result, bail};
use argh::{EarlyExit, FromArgs};
use log::debug;
use std::env;
use std::io::Write;

/// Built-in commands known to the shell at compile time.
///
/// Built-ins run synchronously inside the shell process and are never forked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Cd,
    Help,
    Exit,
}

impl Builtin {
    /// The built-in table, in the order `help` lists it.
    pub const ALL: [Builtin; 3] = [Builtin::Cd, Builtin::Help, Builtin::Exit];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Cd => Cd::name(),
            Builtin::Help => Help::name(),
            Builtin::Exit => Exit::name(),
        }
    }

    /// Case-sensitive lookup of a command name in the built-in table.
    pub fn lookup(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    /// Runs the built-in with the full argument vector (`argv[0]` included).
    ///
    /// Usage and runtime errors are reported on `stderr` and are not returned;
    /// an `Err` only means one of the streams could not be written.
    pub fn execute(
        self,
        argv: &[String],
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<()> {
        debug!("running builtin {}", self.name());
        match self {
            Builtin::Cd => invoke::<Cd>(argv, stdout, stderr, env),
            Builtin::Help => invoke::<Help>(argv, stdout, stderr, env),
            Builtin::Exit => invoke::<Exit>(argv, stdout, stderr, env),
        }
    }
}

/// A single built-in, parsed using the [`argh`] crate (`FromArgs`).
trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "cd".
    fn name() -> &'static str;

    /// Parses the words following the command name.
    ///
    /// Every word is an operand, even one starting with `-`.
    fn parse(args: &[&str]) -> Result<Self, EarlyExit> {
        parse_operands(args)
    }

    /// Executes the command in-process.
    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<()>;
}

fn invoke<T: BuiltinCommand>(
    argv: &[String],
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
    env: &mut Environment,
) -> Result<()> {
    let args: Vec<&str> = argv.iter().skip(1).map(String::as_str).collect();
    match T::parse(&args) {
        Ok(cmd) => {
            if let Err(e) = cmd.execute(stdout, env) {
                writeln!(stderr, "sh2: {e:#}")?;
            }
        }
        Err(EarlyExit { output, status }) => {
            let sink: &mut dyn Write = if status.is_ok() { stdout } else { stderr };
            write!(sink, "{output}")?;
            if !output.ends_with('\n') {
                writeln!(sink)?;
            }
        }
    }
    Ok(())
}

fn parse_operands<T: BuiltinCommand>(args: &[&str]) -> Result<T, EarlyExit> {
    let operands: Vec<&str> = std::iter::once("--").chain(args.iter().copied()).collect();
    T::from_args(&[T::name()], &operands)
}

#[derive(FromArgs)]
/// Change the current working directory.
pub struct Cd {
    #[argh(positional, greedy)]
    /// directory to switch to; absolute or relative to the current directory.
    /// Arguments after the first are ignored.
    pub args: Vec<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    /// `cd --help` prints usage; any other word is a directory name.
    fn parse(args: &[&str]) -> Result<Self, EarlyExit> {
        if args.first() == Some(&"--help") {
            return Self::from_args(&[Self::name()], &["--help"]);
        }
        parse_operands(args)
    }

    fn execute(self, _stdout: &mut dyn Write, _env: &mut Environment) -> Result<()> {
        let Some(target) = self.args.first() else {
            bail!("expected argument to \"cd\"");
        };
        env::set_current_dir(target).with_context(|| format!("cd: {target}"))?;
        debug!("working directory is now {target}");
        Ok(())
    }
}

#[derive(FromArgs)]
/// List the built-in commands.
pub struct Help {
    #[argh(positional, greedy)]
    /// ignored.
    pub _args: Vec<String>,
}

impl BuiltinCommand for Help {
    fn name() -> &'static str {
        "help"
    }

    fn execute(self, stdout: &mut dyn Write, _env: &mut Environment) -> Result<()> {
        writeln!(stdout, "sh2: a basic shell")?;
        writeln!(stdout, "Built-in commands:")?;
        for builtin in Builtin::ALL {
            writeln!(stdout, "  {}", builtin.name())?;
        }
        Ok(())
    }
}

#[derive(FromArgs)]
/// Exit the shell.
pub struct Exit {
    #[argh(positional, greedy)]
    /// ignored; the shell always exits with status 0.
    pub _args: Vec<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<()> {
        env.should_exit = true;
        Ok(())
    }
}
