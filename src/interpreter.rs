//! Reading input lines and executing their words against one stack.
use std::io::{self, BufRead, Write};

use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    parser::{self, ParserError, Word},
    vm::{Effect, NoStats, OperationError, State, Tracer, VMOptions},
};

#[cfg(test)]
mod tests;

/// Why a single word failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WordError {
    #[error(transparent)]
    Parse(#[from] ParserError),
    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// A word failed, so the rest of its line was skipped.
///
/// Displays as the diagnostic line written for the failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("error executing word {word} at {index}: {error}")]
pub struct LineError {
    /// The token as written in the input.
    pub word: String,
    /// The 0-based position of the token within its line.
    pub index: usize,
    pub error: WordError,
}

/// An error that ends a session.
#[derive(Debug, Error)]
pub enum RunError {
    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Counters for one call of [`Interpreter::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunResult {
    pub lines_read: u64,
    pub lines_failed: u64,
    pub words_executed: u64,
}

/// Owns the stack and executes lines of words against it.
///
/// The stack survives failed lines: words that ran before the failure keep
/// their effect.
#[derive(Debug, Clone)]
pub struct Interpreter<T: Tracer = NoStats> {
    state: State<T>,
    words_executed: u64,
}

impl Interpreter<NoStats> {
    pub fn new(options: VMOptions) -> Self {
        Interpreter::with_tracer(options, NoStats::default())
    }
}

impl Default for Interpreter<NoStats> {
    fn default() -> Self {
        Interpreter::new(VMOptions::default())
    }
}

impl<T: Tracer> Interpreter<T> {
    pub fn with_tracer(options: VMOptions, tracer: T) -> Self {
        Interpreter { state: State::new(Vec::new(), options, tracer), words_executed: 0 }
    }

    pub fn state(&self) -> &State<T> {
        &self.state
    }

    /// The stack, bottom first.
    pub fn stack(&self) -> &[i64] {
        self.state.stack()
    }

    pub fn tracer(&self) -> &T {
        self.state.tracer()
    }

    /// Empties the stack.
    pub fn reset(&mut self) {
        self.state.clear();
    }

    /// Executes every word of `line` in order, writing `PRINT` and `SHOW`
    /// output to `out`.
    ///
    /// The inner result is the outcome of the line: it stops at the first
    /// failing word. The outer one fails only when writing to `out` fails.
    pub fn execute_line<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<Result<(), LineError>> {
        for (index, token) in parser::tokenize(line).enumerate() {
            let effect = match self.execute_word(token) {
                Ok(effect) => effect,
                Err(error) => return Ok(Err(LineError { word: token.to_string(), index, error })),
            };
            self.words_executed += 1;

            match effect {
                Effect::None => {}
                Effect::Print(value) => writeln!(out, "{value}")?,
                Effect::Show => {
                    for (level, value) in self.state.levels() {
                        writeln!(out, "{level}: {value}")?;
                    }
                }
            }
        }
        Ok(Ok(()))
    }

    fn execute_word(&mut self, token: &str) -> Result<Effect, WordError> {
        let word = parser::parse_word(token)?;
        let effect = match word {
            Word::Number(value) => {
                self.state.push(value)?;
                Effect::None
            }
            Word::Op(op) => self.state.run_op(op)?,
        };
        trace!(?word, depth = self.state.len(), "executed word");
        Ok(effect)
    }

    /// Runs a whole session: every line of `input` is executed, output goes
    /// to `out` and one diagnostic per failed line goes to `err`.
    ///
    /// Only I/O failures end the session early.
    pub fn run<R, W, E>(&mut self, input: R, out: &mut W, err: &mut E) -> Result<RunResult, RunError>
    where
        R: BufRead,
        W: Write,
        E: Write,
    {
        let words_before = self.words_executed;
        let mut result = RunResult::default();

        for line in input.lines() {
            let line = line?;
            result.lines_read += 1;

            if let Err(error) = self.execute_line(&line, out)? {
                debug!(word = %error.word, index = error.index, error = %error.error, "line failed");
                result.lines_failed += 1;
                out.flush()?;
                writeln!(err, "{error}")?;
            }
        }

        out.flush()?;
        err.flush()?;
        result.words_executed = self.words_executed - words_before;
        Ok(result)
    }
}
