//! Yes/no confirmation used before destructive or ambiguous actions.

use std::io::{self, BufRead, Write};

/// Answer to a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Cancelled,
}

impl Confirmation {
    pub fn is_confirmed(self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

/// Something that can ask the user to confirm an action.
pub trait Prompt {
    /// Shows `message` and returns the user's answer.
    fn confirm(&mut self, message: &str) -> io::Result<Confirmation>;
}

/// A fixed answer acts as a prompt that never asks, as with `--yes`.
impl Prompt for Confirmation {
    fn confirm(&mut self, _message: &str) -> io::Result<Confirmation> {
        Ok(*self)
    }
}

/// Line-based prompt over a reader and writer, normally stdin and stderr.
///
/// Answers starting with `y` or `e` (evet) confirm; anything else, including
/// end of input, cancels.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl LinePrompt<io::StdinLock<'static>, io::Stderr> {
    /// Prompt reading from stdin and writing questions to stderr.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> Prompt for LinePrompt<R, W> {
    fn confirm(&mut self, message: &str) -> io::Result<Confirmation> {
        write!(self.output, "{message} [y/N] ")?;
        self.output.flush()?;

        let mut answer = String::new();
        self.input.read_line(&mut answer)?;

        let confirmed = matches!(
            answer.trim().chars().next().map(|c| c.to_ascii_lowercase()),
            Some('y' | 'e')
        );
        Ok(if confirmed {
            Confirmation::Confirmed
        } else {
            Confirmation::Cancelled
        })
    }
}
