//! Blocking prompt surface used by the controller for user input.

use std::io::{self, BufRead, StdinLock, Stdout, Write};

/// A single line consisting of this token cancels the prompt.
pub const CANCEL_TOKEN: &str = ".";

pub trait Prompter {
    /// Asks for one line of text. `Ok(None)` means the user cancelled.
    fn prompt(&mut self, message: &str, default: Option<&str>) -> io::Result<Option<String>>;

    fn alert(&mut self, message: &str) -> io::Result<()>;
}

/// Line-oriented prompter over a reader/writer pair.
///
/// End of input and the [`CANCEL_TOKEN`] cancel; an empty answer takes the
/// pre-filled default when there is one.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl LinePrompter<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn prompt(&mut self, message: &str, default: Option<&str>) -> io::Result<Option<String>> {
        match default {
            Some(default) => write!(self.output, "{message} [{default}]: ")?,
            None => write!(self.output, "{message}: ")?,
        }
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let answer = line.trim_end_matches(&['\r', '\n'][..]);

        if answer == CANCEL_TOKEN {
            return Ok(None);
        }
        if answer.is_empty() {
            if let Some(default) = default {
                return Ok(Some(default.to_string()));
            }
        }
        Ok(Some(answer.to_string()))
    }

    fn alert(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "! {message}")?;
        self.output.flush()
    }
}

#[cfg(test)]
#[path = "tests/prompt_tests.rs"]
mod tests;
