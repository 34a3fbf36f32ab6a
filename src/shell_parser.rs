//! Shell command-line parsing for pkghint
//!
//! Splits a raw command line into an ordered sequence of call expressions,
//! recognizing just enough of the POSIX grammar (`&&`, `||`, `;`, `|`, `&`)
//! to tell separate calls apart. Quotes are removed from argument text;
//! nothing is expanded: no variables, no globs, no substitutions.

use serde::{Deserialize, Serialize};

/// A single call expression: the command word and its arguments, in order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallExpr {
    pub args: Vec<String>,
}

/// An ordered sequence of call expressions parsed from one command line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandLineAst {
    pub calls: Vec<CallExpr>,
}

/// Errors raised for malformed shell syntax.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// A single or double quote was never closed.
    UnterminatedQuote,
    /// A sequencing operator with no call expression before it (e.g. `&& ls`).
    EmptyCall,
    /// A `&&`, `||` or `|` with nothing after it.
    DanglingOperator,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::UnterminatedQuote => write!(f, "unterminated quote"),
            ParseError::EmptyCall => write!(f, "operator without a preceding command"),
            ParseError::DanglingOperator => write!(f, "operator without a following command"),
        }
    }
}

impl std::error::Error for ParseError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Between,
    Word,
    SingleQuote,
    DoubleQuote,
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    state: State,
    token: String,
    has_token: bool,
    args: Vec<String>,
    calls: Vec<CallExpr>,
    /// Set after `&&`, `||` or `|`; a call expression must follow.
    needs_operand: bool,
}

impl Parser {
    fn new(raw: &str) -> Self {
        Self {
            chars: raw.chars().collect(),
            pos: 0,
            state: State::Between,
            token: String::new(),
            has_token: false,
            args: Vec::new(),
            calls: Vec::new(),
            needs_operand: false,
        }
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.chars.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn run(mut self) -> Result<CommandLineAst, ParseError> {
        while let Some(ch) = self.next_char() {
            match self.state {
                State::SingleQuote => {
                    if ch == '\'' {
                        self.state = State::Word;
                    } else {
                        self.token.push(ch);
                    }
                }
                State::DoubleQuote => match ch {
                    '"' => self.state = State::Word,
                    '\\' => {
                        // Inside double quotes a backslash escapes the next
                        // character; a trailing one is kept literally.
                        match self.next_char() {
                            Some(escaped) => self.token.push(escaped),
                            None => self.token.push('\\'),
                        }
                    }
                    _ => self.token.push(ch),
                },
                State::Between | State::Word => match ch {
                    c if c.is_whitespace() => self.flush_token(),
                    '\'' => {
                        self.state = State::SingleQuote;
                        self.has_token = true;
                    }
                    '"' => {
                        self.state = State::DoubleQuote;
                        self.has_token = true;
                    }
                    '\\' => {
                        self.has_token = true;
                        self.state = State::Word;
                        match self.next_char() {
                            Some(escaped) => self.token.push(escaped),
                            None => self.token.push('\\'),
                        }
                    }
                    '&' => {
                        if self.peek() == Some('&') {
                            self.next_char();
                            self.end_call(true)?;
                        } else {
                            // A lone `&` sequences like `;` does.
                            self.end_call(false)?;
                        }
                    }
                    '|' => {
                        if self.peek() == Some('|') {
                            self.next_char();
                        }
                        self.end_call(true)?;
                    }
                    ';' => self.end_call(false)?,
                    _ => {
                        self.has_token = true;
                        self.state = State::Word;
                        self.token.push(ch);
                    }
                },
            }
        }

        match self.state {
            State::SingleQuote | State::DoubleQuote => return Err(ParseError::UnterminatedQuote),
            _ => {}
        }

        self.flush_token();
        if !self.args.is_empty() {
            self.calls.push(CallExpr {
                args: std::mem::take(&mut self.args),
            });
        } else if self.needs_operand {
            return Err(ParseError::DanglingOperator);
        }

        Ok(CommandLineAst { calls: self.calls })
    }

    fn flush_token(&mut self) {
        if self.has_token {
            self.args.push(std::mem::take(&mut self.token));
            self.has_token = false;
        }
        self.state = State::Between;
    }

    fn end_call(&mut self, needs_operand: bool) -> Result<(), ParseError> {
        self.flush_token();
        if self.args.is_empty() {
            return Err(ParseError::EmptyCall);
        }
        self.calls.push(CallExpr {
            args: std::mem::take(&mut self.args),
        });
        self.needs_operand = needs_operand;
        Ok(())
    }
}

/// Parse a raw command line into its call expressions.
///
/// Token order is preserved exactly as written. An empty input yields an
/// AST with no calls, which is not an error.
pub fn parse(raw: &str) -> Result<CommandLineAst, ParseError> {
    Parser::new(raw).run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(ast: &CommandLineAst, call: usize) -> Vec<&str> {
        ast.calls[call].args.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_simple_command() {
        let ast = parse("nano file.txt").unwrap();
        assert_eq!(ast.calls.len(), 1);
        assert_eq!(args(&ast, 0), vec!["nano", "file.txt"]);
    }

    #[test]
    fn test_quote_removal() {
        let ast = parse("echo \"hello world\"").unwrap();
        assert_eq!(args(&ast, 0), vec!["echo", "hello world"]);

        let ast = parse("echo 'single quoted'").unwrap();
        assert_eq!(args(&ast, 0), vec!["echo", "single quoted"]);
    }

    #[test]
    fn test_quoted_assignment_stays_one_token() {
        let ast = parse("FOO=\"a b\" nano").unwrap();
        assert_eq!(args(&ast, 0), vec!["FOO=a b", "nano"]);
    }

    #[test]
    fn test_and_chain_splits_calls() {
        let ast = parse("nano && echo 'ok'").unwrap();
        assert_eq!(ast.calls.len(), 2);
        assert_eq!(args(&ast, 0), vec!["nano"]);
        assert_eq!(args(&ast, 1), vec!["echo", "ok"]);
    }

    #[test]
    fn test_all_operators_delimit() {
        let ast = parse("a | b || c ; d && e").unwrap();
        assert_eq!(ast.calls.len(), 5);
        for (i, name) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            assert_eq!(args(&ast, i), vec![*name]);
        }
    }

    #[test]
    fn test_operators_without_spaces() {
        let ast = parse("true&&false").unwrap();
        assert_eq!(ast.calls.len(), 2);
        assert_eq!(args(&ast, 0), vec!["true"]);
        assert_eq!(args(&ast, 1), vec!["false"]);
    }

    #[test]
    fn test_trailing_semicolon_and_ampersand() {
        assert_eq!(parse("ls ;").unwrap().calls.len(), 1);
        assert_eq!(parse("sleep 1 &").unwrap().calls.len(), 1);
    }

    #[test]
    fn test_unterminated_quote() {
        assert_eq!(parse("echo 'oops").unwrap_err(), ParseError::UnterminatedQuote);
        assert_eq!(parse("echo \"oops").unwrap_err(), ParseError::UnterminatedQuote);
    }

    #[test]
    fn test_leading_operator() {
        assert_eq!(parse("&& ls").unwrap_err(), ParseError::EmptyCall);
        assert_eq!(parse("| grep x").unwrap_err(), ParseError::EmptyCall);
    }

    #[test]
    fn test_dangling_operator() {
        assert_eq!(parse("ls &&").unwrap_err(), ParseError::DanglingOperator);
        assert_eq!(parse("ls |").unwrap_err(), ParseError::DanglingOperator);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").unwrap().calls.is_empty());
        assert!(parse("   ").unwrap().calls.is_empty());
    }

    #[test]
    fn test_backslash_escape() {
        let ast = parse("echo hello\\ world").unwrap();
        assert_eq!(args(&ast, 0), vec!["echo", "hello world"]);
    }

    #[test]
    fn test_empty_quoted_argument() {
        let ast = parse("grep '' file").unwrap();
        assert_eq!(args(&ast, 0), vec!["grep", "", "file"]);
    }
}
