//! User-facing progress output.

use std::io::Write;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Sink for progress messages produced while splitting.
pub trait Output {
    /// Emits a highlighted note, such as the command about to run.
    fn note(&mut self, text: &str) -> std::io::Result<()>;

    /// Emits plain text, such as captured process output.
    fn text(&mut self, text: &str) -> std::io::Result<()>;
}

/// Writes progress to stdout, coloring notes when the terminal supports it.
pub struct ConsoleOutput {
    stdout: StandardStream,
}

impl ConsoleOutput {
    /// Creates a console output with the given color preference.
    pub fn new(color: ColorChoice) -> Self {
        Self {
            stdout: StandardStream::stdout(color),
        }
    }
}

impl Default for ConsoleOutput {
    fn default() -> Self {
        Self::new(ColorChoice::Auto)
    }
}

impl Output for ConsoleOutput {
    fn note(&mut self, text: &str) -> std::io::Result<()> {
        self.stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
        for line in text.lines() {
            writeln!(self.stdout, " ! [NOTE] {line}")?;
        }
        self.stdout.reset()?;
        writeln!(self.stdout)
    }

    fn text(&mut self, text: &str) -> std::io::Result<()> {
        for line in text.lines() {
            writeln!(self.stdout, " {line}")?;
        }
        Ok(())
    }
}

/// A single captured progress message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Produced by [`Output::note`].
    Note(String),
    /// Produced by [`Output::text`].
    Text(String),
}

/// Collects progress messages in memory.
#[derive(Debug, Default)]
pub struct MemoryOutput {
    messages: Vec<Message>,
}

impl MemoryOutput {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages captured so far, in emission order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Text of every captured note.
    pub fn notes(&self) -> Vec<&str> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                Message::Note(text) => Some(text.as_str()),
                Message::Text(_) => None,
            })
            .collect()
    }
}

impl Output for MemoryOutput {
    fn note(&mut self, text: &str) -> std::io::Result<()> {
        self.messages.push(Message::Note(text.to_string()));
        Ok(())
    }

    fn text(&mut self, text: &str) -> std::io::Result<()> {
        self.messages.push(Message::Text(text.to_string()));
        Ok(())
    }
}
