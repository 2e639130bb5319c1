//! A module implementing lexical analysis (tokenization) of shell input lines.
//!
//! The [`Lexer`] is a character-level state machine fed one physical line at a
//! time. Quotes and trailing backslashes may keep a logical command open across
//! several lines; the lexer keeps its state between [`Lexer::feed`] calls until
//! the command is complete and [`Lexer::finish`] hands out the argument vector.

use log::trace;
use thiserror::Error;

/// Errors returned when an argument vector is requested from an open command.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LexingError {
    /// A closing quote (single or double) was not found.
    #[error("unterminated quote")]
    UnfinishedQuote,
    /// The input ended right after a backslash.
    #[error("trailing backslash")]
    TrailingEscape,
}

/// State of the tokenizer between two characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LexingState {
    /// Between words; nothing is pending.
    #[default]
    Start,
    /// Inside an unquoted word (the word may currently be empty, e.g. after `''`).
    Unquoted,
    /// Right after an unquoted backslash.
    UnquotedEscape,
    /// Inside `'...'`.
    SingleQuoted,
    /// Inside `"..."`.
    DoubleQuoted,
    /// Right after a backslash inside `"..."`.
    DoubleQuotedEscape,
}

/// Incremental tokenizer for one logical command.
#[derive(Debug, Default)]
pub struct Lexer {
    state: LexingState,
    args: Vec<String>,
    token: String,
    /// Set once the current word has content or an opened quote, so that an
    /// explicit `''` survives even though `token` is empty.
    in_word: bool,
}

impl Lexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LexingState {
        self.state
    }

    /// Whether the last fed line left the logical command open.
    pub fn is_continuing(&self) -> bool {
        self.state != LexingState::Start
    }

    /// Feeds one physical line (without its terminator) into the state machine.
    ///
    /// Returns `true` while the logical command still needs more input, i.e. a
    /// quote is open or the line ended with a backslash. The next line continues
    /// in exactly that state; no newline is inserted into the current word.
    pub fn feed(&mut self, line: &str) -> bool {
        // Backslash-newline joins lines: the escape applies to nothing. A bare
        // `\` between words must not turn into an empty word.
        self.state = match self.state {
            LexingState::UnquotedEscape if !self.in_word => LexingState::Start,
            LexingState::UnquotedEscape => LexingState::Unquoted,
            LexingState::DoubleQuotedEscape => LexingState::DoubleQuoted,
            state => state,
        };

        for ch in line.chars() {
            match self.state {
                LexingState::Start | LexingState::Unquoted => self.handle_unquoted(ch),
                LexingState::UnquotedEscape => {
                    self.token.push(ch);
                    self.in_word = true;
                    self.state = LexingState::Unquoted;
                }
                LexingState::SingleQuoted => self.handle_single_quote(ch),
                LexingState::DoubleQuoted => self.handle_double_quote(ch),
                LexingState::DoubleQuotedEscape => {
                    self.token.push(ch);
                    self.state = LexingState::DoubleQuoted;
                }
            }
        }

        // End of line acts as whitespace for an unquoted word.
        if self.state == LexingState::Unquoted {
            self.emit();
            self.state = LexingState::Start;
        }

        trace!(
            "lexer state {:?} after line, {} word(s) pending",
            self.state,
            self.args.len()
        );
        self.is_continuing()
    }

    /// Hands out the completed argument vector and resets the lexer for the
    /// next logical command.
    ///
    /// Fails without touching the pending words if the command is still open.
    pub fn finish(&mut self) -> Result<Vec<String>, LexingError> {
        match self.state {
            LexingState::Start => {}
            LexingState::Unquoted => {
                unreachable!("an unquoted word is always closed at the end of a line")
            }
            LexingState::SingleQuoted | LexingState::DoubleQuoted => {
                return Err(LexingError::UnfinishedQuote);
            }
            LexingState::UnquotedEscape | LexingState::DoubleQuotedEscape => {
                return Err(LexingError::TrailingEscape);
            }
        }
        debug_assert!(self.token.is_empty());
        Ok(std::mem::take(&mut self.args))
    }

    /// Drops any partially read command.
    pub fn reset(&mut self) {
        self.state = LexingState::Start;
        self.args.clear();
        self.token.clear();
        self.in_word = false;
    }

    fn handle_unquoted(&mut self, ch: char) {
        match ch {
            '\'' => {
                self.in_word = true;
                self.state = LexingState::SingleQuoted;
            }
            '"' => {
                self.in_word = true;
                self.state = LexingState::DoubleQuoted;
            }
            '\\' => self.state = LexingState::UnquotedEscape,
            c if is_blank(c) => {
                if self.state == LexingState::Unquoted {
                    self.emit();
                }
                self.state = LexingState::Start;
            }
            c => {
                self.token.push(c);
                self.in_word = true;
                self.state = LexingState::Unquoted;
            }
        }
    }

    fn handle_single_quote(&mut self, ch: char) {
        match ch {
            '\'' => self.state = LexingState::Unquoted,
            c => self.token.push(c),
        }
    }

    fn handle_double_quote(&mut self, ch: char) {
        match ch {
            '"' => self.state = LexingState::Unquoted,
            '\\' => self.state = LexingState::DoubleQuotedEscape,
            c => self.token.push(c),
        }
    }

    /// Moves the current word into the argument vector.
    fn emit(&mut self) {
        self.args.push(std::mem::take(&mut self.token));
        self.in_word = false;
    }
}

/// Same set as C `isspace` in the "C" locale.
fn is_blank(ch: char) -> bool {
    ch.is_ascii_whitespace() || ch == '\x0b'
}

/// Tokenizes a single, self-contained line.
///
/// # Returns
/// The argument vector, or a [`LexingError`] if the line leaves a quote or a
/// backslash escape open.
pub fn split_into_tokens(line: &str) -> Result<Vec<String>, LexingError> {
    let mut lexer = Lexer::new();
    lexer.feed(line);
    lexer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(line: &str) -> Vec<String> {
        split_into_tokens(line).unwrap()
    }

    fn feed_all(lines: &[&str]) -> Vec<String> {
        let mut lexer = Lexer::new();
        let (last, init) = lines.split_last().unwrap();
        for line in init {
            assert!(lexer.feed(line), "expected {line:?} to need more input");
        }
        assert!(!lexer.feed(last), "expected {last:?} to complete the command");
        lexer.finish().unwrap()
    }

    #[test]
    fn splits_on_whitespace_runs() {
        assert_eq!(words("ls   -la file"), vec!["ls", "-la", "file"]);
        assert_eq!(words("  \tls\t-l  "), vec!["ls", "-l"]);
    }

    #[test]
    fn blank_line_yields_empty_vector() {
        assert!(words("").is_empty());
        assert!(words(" \t \x0b\x0c\r").is_empty());
    }

    #[test]
    fn quotes_are_stripped() {
        assert_eq!(words("echo 'hello world'"), vec!["echo", "hello world"]);
        assert_eq!(words("echo \"a b\""), vec!["echo", "a b"]);
    }

    #[test]
    fn backslash_is_literal_in_single_quotes() {
        assert_eq!(words(r"'a\b'"), vec![r"a\b"]);
        assert_eq!(words(r"'it\'"), vec![r"it\"]);
    }

    #[test]
    fn backslash_escapes_in_double_quotes_and_unquoted() {
        assert_eq!(words(r#""a\"b""#), vec![r#"a"b"#]);
        assert_eq!(words(r"a\ b"), vec!["a b"]);
        assert_eq!(words(r#"\'\"\\"#), vec![r#"'"\"#]);
        assert_eq!(words(r#""\\n""#), vec![r"\n"]);
    }

    #[test]
    fn adjacent_segments_concatenate() {
        assert_eq!(words(r#"foo'bar'"baz"qux"#), vec!["foobarbazqux"]);
        assert_eq!(words(r#"a"b"c"#), vec!["abc"]);
    }

    #[test]
    fn explicit_empty_string_is_a_word() {
        assert_eq!(words("echo '' x"), vec!["echo", "", "x"]);
        assert_eq!(words(r#""""#), vec![""]);
    }

    #[test]
    fn quoted_whitespace_is_not_a_separator() {
        assert_eq!(words("'\t'"), vec!["\t"]);
        assert_eq!(words("\" \""), vec![" "]);
    }

    #[test]
    fn non_ascii_passes_through() {
        assert_eq!(words("echo héllo 'wörld'"), vec!["echo", "héllo", "wörld"]);
    }

    #[test]
    fn quote_continuation_joins_without_newline() {
        assert_eq!(feed_all(&["echo 'line1", "line2'"]), vec!["echo", "line1line2"]);
        assert_eq!(feed_all(&["echo 'line1", " line2'"]), vec!["echo", "line1 line2"]);
        assert_eq!(
            feed_all(&["echo \"a", "", "b\" c"]),
            vec!["echo", "ab", "c"]
        );
    }

    #[test]
    fn trailing_backslash_continues_line() {
        assert_eq!(feed_all(&["echo foo\\", "bar"]), vec!["echo", "foobar"]);
        assert_eq!(feed_all(&["echo foo\\", " bar"]), vec!["echo", "foo", "bar"]);
        assert_eq!(feed_all(&["echo foo\\", ""]), vec!["echo", "foo"]);
    }

    #[test]
    fn trailing_backslash_does_not_escape_next_line() {
        // The first character of the continuation is processed normally.
        assert_eq!(feed_all(&["echo \\", "'x y'"]), vec!["echo", "x y"]);
        assert_eq!(feed_all(&["\\", "ls"]), vec!["ls"]);
    }

    #[test]
    fn bare_trailing_backslash_adds_no_word() {
        assert_eq!(feed_all(&["echo \\", ""]), vec!["echo"]);
        assert_eq!(feed_all(&["echo \\", "  x"]), vec!["echo", "x"]);
    }

    #[test]
    fn quoted_empty_word_survives_line_continuation() {
        assert_eq!(feed_all(&["''\\", " y"]), vec!["", "y"]);
        assert_eq!(feed_all(&["echo \"\"\\", ""]), vec!["echo", ""]);
        assert_eq!(feed_all(&["''\\", "y"]), vec!["y"]);
    }

    #[test]
    fn trailing_backslash_inside_double_quotes() {
        assert_eq!(feed_all(&["\"a\\", "b\""]), vec!["ab"]);
        assert_eq!(feed_all(&["\"a\\", "\"\""]), vec!["a"]);
    }

    #[test]
    fn state_is_kept_between_lines() {
        let mut lexer = Lexer::new();
        assert!(lexer.feed("echo 'open"));
        assert_eq!(lexer.state(), LexingState::SingleQuoted);
        assert!(lexer.feed("still open"));
        assert_eq!(lexer.state(), LexingState::SingleQuoted);
        assert!(!lexer.feed("closed'"));
        assert_eq!(lexer.state(), LexingState::Start);
        assert_eq!(lexer.finish().unwrap(), vec!["echo", "openstill openclosed"]);
    }

    #[test]
    fn finish_on_open_command_errors() {
        let mut lexer = Lexer::new();
        lexer.feed("echo 'abc");
        assert_eq!(lexer.finish(), Err(LexingError::UnfinishedQuote));

        let mut lexer = Lexer::new();
        lexer.feed("echo \"abc");
        assert_eq!(lexer.finish(), Err(LexingError::UnfinishedQuote));

        assert_eq!(split_into_tokens("echo abc\\"), Err(LexingError::TrailingEscape));
        assert_eq!(split_into_tokens("\"abc\\"), Err(LexingError::TrailingEscape));
    }

    #[test]
    fn finish_resets_for_next_command() {
        let mut lexer = Lexer::new();
        assert!(!lexer.feed("first command"));
        assert_eq!(lexer.finish().unwrap(), vec!["first", "command"]);
        assert!(!lexer.feed("second"));
        assert_eq!(lexer.finish().unwrap(), vec!["second"]);
    }

    #[test]
    fn reset_discards_partial_command() {
        let mut lexer = Lexer::new();
        lexer.feed("echo 'half");
        lexer.reset();
        assert!(!lexer.is_continuing());
        assert!(!lexer.feed("ls"));
        assert_eq!(lexer.finish().unwrap(), vec!["ls"]);
    }
}
