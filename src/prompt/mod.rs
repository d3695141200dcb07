//! Blocking prompts for runtime adjustment and port selection

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::warn;

use crate::error::{Error, Result};

/// Source of user answers while the translator is suspended
pub trait AdjustmentPrompt {
    /// Show `prompt` and block for one line of input
    fn request_line(&mut self, prompt: &str) -> Result<String>;

    /// Request a number; anything unparsable is an invalid input
    fn request_float(&mut self, prompt: &str) -> Result<f32> {
        let line = self.request_line(prompt)?;
        let answer = line.trim();
        answer
            .parse::<f32>()
            .map_err(|_| Error::InvalidSensitivityInput(answer.to_string()))
    }
}

/// Prompt on a text stream, normally the terminal
pub struct ConsolePrompt<R, W> {
    reader: R,
    writer: W,
    running: Option<Arc<AtomicBool>>,
}

impl ConsolePrompt<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on stdin/stdout, giving up once `running` is cleared
    pub fn stdio(running: Arc<AtomicBool>) -> Self {
        Self::new(io::stdin().lock(), io::stdout()).with_cancel_flag(running)
    }
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            running: None,
        }
    }

    /// Treat the prompt as closed when this flag goes false
    pub fn with_cancel_flag(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = Some(running);
        self
    }

    fn cancelled(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|r| !r.load(Ordering::SeqCst))
    }
}

impl<R: BufRead, W: Write> AdjustmentPrompt for ConsolePrompt<R, W> {
    fn request_line(&mut self, prompt: &str) -> Result<String> {
        if self.cancelled() {
            return Err(Error::PromptClosed);
        }

        write!(self.writer, "{}", prompt).map_err(|_| Error::PromptClosed)?;
        self.writer.flush().map_err(|_| Error::PromptClosed)?;

        let mut line = String::new();
        let read = self.reader.read_line(&mut line).map_err(|e| {
            warn!(error = %e, "failed to read prompt input");
            Error::PromptClosed
        })?;

        // Ctrl-C while blocked on the read only lands once a line arrives
        if read == 0 || self.cancelled() {
            return Err(Error::PromptClosed);
        }
        Ok(line)
    }
}

/// Ask for an index into `choices` until a valid one is given
pub fn choose_index<P: AdjustmentPrompt + ?Sized>(
    prompt: &mut P,
    question: &str,
    choices: &[String],
) -> Result<usize> {
    for (i, choice) in choices.iter().enumerate() {
        println!("{}: {}", i, choice);
    }

    loop {
        let line = prompt.request_line(question)?;
        match line.trim().parse::<usize>() {
            Ok(index) if index < choices.len() => return Ok(index),
            Ok(_) => println!("Invalid selection, please try again."),
            Err(_) => println!("Invalid input. Please enter a valid number."),
        }
    }
}
