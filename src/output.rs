//! Output targets for dialogue text.
//!
//! The engine decides *what* to emit and *when*; sinks decide where the
//! text goes. A sink failure is logged by the engine and never disturbs
//! dialogue state.

use std::io::{self, Result as IoResult, Stdout, Write};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::session::SessionState;

/// Prefix applied to every emitted line, computed from the session.
///
/// Explicit per-dialogue configuration; there is no shared default state
/// across dialogue instances.
pub type PrefixFn = Arc<dyn Fn(&SessionState) -> String + Send + Sync>;

/// What kind of line the engine is emitting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputKind {
    /// A prompt's rendered text.
    Prompt,
    /// The participant's own input echoed back.
    Echo,
    /// One formatted transcript entry during history replay.
    History,
    /// Engine notices, e.g. the can't-go-back message.
    Notice,
}

/// One line of dialogue output. Serializable so sinks can ship lines over
/// a wire or into a log store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLine {
    pub kind: OutputKind,
    pub text: String,
}

impl OutputLine {
    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            kind: OutputKind::Prompt,
            text: text.into(),
        }
    }

    pub fn echo(text: impl Into<String>) -> Self {
        Self {
            kind: OutputKind::Echo,
            text: text.into(),
        }
    }

    pub fn history(text: impl Into<String>) -> Self {
        Self {
            kind: OutputKind::History,
            text: text.into(),
        }
    }

    pub fn notice(text: impl Into<String>) -> Self {
        Self {
            kind: OutputKind::Notice,
            text: text.into(),
        }
    }
}

/// Abstraction over an output target that consumes full [`OutputLine`]s.
pub trait OutputSink: Send {
    /// Handle one emitted line. The sink decides how to render it.
    fn emit(&mut self, line: &OutputLine) -> IoResult<()>;
}

/// Stdout sink; one line of text per emitted line.
pub struct StdoutSink {
    handle: Stdout,
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self {
            handle: io::stdout(),
        }
    }
}

impl StdoutSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputSink for StdoutSink {
    fn emit(&mut self, line: &OutputLine) -> IoResult<()> {
        writeln!(self.handle, "{}", line.text)?;
        self.handle.flush()
    }
}

/// In-memory sink for testing and snapshots.
#[derive(Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<OutputLine>>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a snapshot of all captured lines.
    #[must_use]
    pub fn snapshot(&self) -> Vec<OutputLine> {
        self.lines.lock().unwrap().clone()
    }

    /// Texts of all captured lines of the given kind, in emission order.
    #[must_use]
    pub fn texts_of(&self, kind: OutputKind) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|line| line.kind == kind)
            .map(|line| line.text.clone())
            .collect()
    }

    /// Clear all captured lines.
    pub fn clear(&self) {
        self.lines.lock().unwrap().clear();
    }
}

impl OutputSink for MemorySink {
    fn emit(&mut self, line: &OutputLine) -> IoResult<()> {
        self.lines.lock().unwrap().push(line.clone());
        Ok(())
    }
}
