//! Operator interaction during reconciliation
//!
//! The reconciler never touches the terminal directly. It talks to a
//! [`Prompter`], so the same algorithm runs against a console or against a
//! scripted responder in tests.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crate::error::{EnvSyncError, Result};

/// Interactive capability injected into the reconciler.
pub trait Prompter {
    /// Ask a yes/no question.
    fn confirm(&mut self, question: &str) -> Result<bool>;

    /// Ask for a value for `key`. The raw answer is returned; an empty answer
    /// means "keep `default`".
    fn ask_value(&mut self, key: &str, default: &str) -> Result<String>;

    /// Show a message to the operator.
    fn notify(&mut self, message: &str) -> Result<()>;
}

/// Only a case-insensitive "y" is affirmative.
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

/// Line-oriented prompter over any reader/writer pair.
pub struct ConsolePrompter<R, W> {
    input: R,
    output: W,
}

impl ConsolePrompter<io::StdinLock<'static>, io::Stdout> {
    /// Prompter bound to the process's stdin/stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsolePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Blocks until a line arrives. EOF reads as an empty answer.
    fn read_answer(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            tracing::debug!("Console input closed, treating as empty answer");
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }
}

impl<R: BufRead, W: Write> Prompter for ConsolePrompter<R, W> {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.read_answer(&format!("{question} (y/n) "))?;
        Ok(is_affirmative(&answer))
    }

    fn ask_value(&mut self, key: &str, default: &str) -> Result<String> {
        self.read_answer(&format!("{key} ({default}): "))
    }

    fn notify(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{message}")?;
        Ok(())
    }
}

/// Replays canned answers in order; records every message and question.
///
/// Running out of answers is an error rather than a silent "no", so a test
/// that triggers an unexpected prompt fails loudly.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    transcript: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            transcript: Vec::new(),
        }
    }

    /// Everything shown to or asked of the operator, in order.
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Number of answers not yet consumed.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next_answer(&mut self, prompt: String) -> Result<String> {
        self.transcript.push(prompt.clone());
        self.answers
            .pop_front()
            .ok_or_else(|| EnvSyncError::Prompt(format!("no scripted answer for: {prompt}")))
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.next_answer(format!("{question} (y/n)"))?;
        Ok(is_affirmative(&answer))
    }

    fn ask_value(&mut self, key: &str, default: &str) -> Result<String> {
        self.next_answer(format!("{key} ({default})"))
    }

    fn notify(&mut self, message: &str) -> Result<()> {
        self.transcript.push(message.to_string());
        Ok(())
    }
}
