/// Input sources and output sinks the player is driven through.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crate::core::player::PlayError;
use crate::schema::event::Event;

/// Where the player gets acknowledgements and choice selections from.
pub trait InputSource {
    /// Block until the reader is ready to continue.
    fn acknowledge(&mut self) -> Result<(), PlayError>;

    /// Block for a selection among `options`. Returns the raw input; the
    /// player validates it.
    fn select(&mut self, options: &[&str]) -> Result<String, PlayError>;
}

/// Where the player sends everything observable.
pub trait OutputSink {
    /// A rendered dialogue or narration line.
    fn say(&mut self, line: &str);

    /// A presentation event, or an opaque code block in a sub-language the
    /// compiler does not lower.
    fn present(&mut self, event: &Event);

    /// A choice prompt with options numbered from 1.
    fn prompt(&mut self, _options: &[&str]) {}

    /// A selection that was not accepted.
    fn reject(&mut self, _input: &str) {}
}

/// One scripted input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Ack,
    Select(String),
}

impl From<&str> for Input {
    fn from(s: &str) -> Self {
        Input::Select(s.to_string())
    }
}

/// A fixed queue of inputs, for driving the player without a terminal.
///
/// Any input acknowledges a line, and an empty queue keeps acknowledging.
/// A selection prompt given `Ack` sees an empty string; a prompt with no
/// input left closes the source.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    queue: VecDeque<Input>,
}

impl ScriptedInput {
    pub fn new(inputs: impl IntoIterator<Item = Input>) -> Self {
        Self {
            queue: inputs.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl InputSource for ScriptedInput {
    fn acknowledge(&mut self) -> Result<(), PlayError> {
        self.queue.pop_front();
        Ok(())
    }

    fn select(&mut self, _options: &[&str]) -> Result<String, PlayError> {
        match self.queue.pop_front() {
            Some(Input::Select(s)) => Ok(s),
            Some(Input::Ack) => Ok(String::new()),
            None => Err(PlayError::InputClosed),
        }
    }
}

/// Records everything the player emits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    pub lines: Vec<String>,
    pub prompts: Vec<Vec<String>>,
    pub presented: Vec<Event>,
    pub rejected: Vec<String>,
}

impl OutputSink for Transcript {
    fn say(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn present(&mut self, event: &Event) {
        self.presented.push(event.clone());
    }

    fn prompt(&mut self, options: &[&str]) {
        self.prompts
            .push(options.iter().map(|s| s.to_string()).collect());
    }

    fn reject(&mut self, input: &str) {
        self.rejected.push(input.to_string());
    }
}

/// Line-based input from a reader, normally stdin.
pub struct ConsoleInput<R> {
    reader: R,
}

impl ConsoleInput<io::StdinLock<'static>> {
    pub fn stdin() -> Self {
        Self {
            reader: io::stdin().lock(),
        }
    }
}

impl<R: BufRead> ConsoleInput<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    fn read_line(&mut self) -> Result<String, PlayError> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(PlayError::InputClosed);
        }
        Ok(line.trim().to_string())
    }
}

impl<R: BufRead> InputSource for ConsoleInput<R> {
    fn acknowledge(&mut self) -> Result<(), PlayError> {
        self.read_line().map(|_| ())
    }

    fn select(&mut self, _options: &[&str]) -> Result<String, PlayError> {
        self.read_line()
    }
}

/// Plain-text output to a writer, normally stdout.
pub struct ConsoleSink<W> {
    writer: W,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            writer: io::stdout(),
        }
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputSink for ConsoleSink<W> {
    fn say(&mut self, line: &str) {
        writeln!(self.writer, "{}", line).ok();
    }

    fn present(&mut self, event: &Event) {
        writeln!(self.writer, "[{}]", event).ok();
    }

    fn prompt(&mut self, options: &[&str]) {
        writeln!(self.writer, "\nChoose:").ok();
        for (i, option) in options.iter().enumerate() {
            writeln!(self.writer, "  {}. {}", i + 1, option).ok();
        }
        write!(self.writer, "> ").ok();
        self.writer.flush().ok();
    }

    fn reject(&mut self, _input: &str) {
        writeln!(self.writer, "Invalid choice, try again.").ok();
        write!(self.writer, "> ").ok();
        self.writer.flush().ok();
    }
}
