//! History formatting.
//!
//! Replay formatting is a caller-supplied pure function invoked once per
//! transcript entry when a show-history keyword fires. It must not have
//! side effects visible to the engine; mutating the transcript or session
//! from a formatter is undefined behavior as far as the dialogue contract
//! is concerned.

use std::sync::Arc;

use crate::session::SessionState;
use crate::transcript::TranscriptEntry;

/// Pure mapping from one transcript entry to one displayable line.
pub type HistoryFormatter = Arc<dyn Fn(&TranscriptEntry, &SessionState) -> String + Send + Sync>;

/// The default formatter: `Q: <prompt text> A: <answer>`.
///
/// Unanswered (auto-advanced) entries show `-` in place of an answer.
#[must_use]
pub fn default_formatter() -> HistoryFormatter {
    Arc::new(|entry, session| {
        format!(
            "Q: {} A: {}",
            entry.prompt.render(session),
            entry.answer.as_deref().unwrap_or("-")
        )
    })
}
