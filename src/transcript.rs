//! Transcript: the undo-capable record of completed dialogue steps.
//!
//! The transcript is a last-in-first-out stack of [`TranscriptEntry`]
//! values owned exclusively by one dialogue. Ordinary answers push entries;
//! go-back pops them; abandonment clears the whole stack. Entries are never
//! mutated after insertion and never looked up by index; only stack-top
//! access and full iteration are needed.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::prompt::Prompt;

/// One completed step: the prompt that was current and the answer given.
///
/// `answer` is `None` for entries recorded while auto-advancing through
/// passive prompts (only produced when auto-step recording is enabled on
/// the dialogue).
#[derive(Clone)]
pub struct TranscriptEntry {
    /// The prompt that was current when this entry was recorded.
    pub prompt: Arc<dyn Prompt>,
    /// The participant's raw answer, absent for auto-advanced steps.
    pub answer: Option<String>,
    /// When the entry was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl TranscriptEntry {
    /// Entry for an interactive prompt answered with `answer`.
    #[must_use]
    pub fn answered(prompt: Arc<dyn Prompt>, answer: impl Into<String>) -> Self {
        Self {
            prompt,
            answer: Some(answer.into()),
            recorded_at: Utc::now(),
        }
    }

    /// Entry for a passive prompt the engine advanced through on its own.
    #[must_use]
    pub fn unanswered(prompt: Arc<dyn Prompt>) -> Self {
        Self {
            prompt,
            answer: None,
            recorded_at: Utc::now(),
        }
    }

    /// Returns `true` if this entry was recorded during auto-advance.
    #[must_use]
    pub fn is_auto(&self) -> bool {
        self.answer.is_none()
    }
}

impl std::fmt::Debug for TranscriptEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranscriptEntry")
            .field("answer", &self.answer)
            .field("recorded_at", &self.recorded_at)
            .finish_non_exhaustive()
    }
}

/// Ordered, undo-capable record of `(prompt, answer)` pairs.
///
/// Stack discipline: entries are pushed in chronological order and only the
/// most recent entry is ever removed, and only by go-back. Cloning produces
/// a disposable copy (entries share their prompts via `Arc`); mutating a
/// clone never affects the original, which is how custom keyword actions
/// receive the history.
#[derive(Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    /// Creates an empty transcript.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. O(1) amortized.
    pub fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    /// Remove and return the most recent entry, if any.
    pub fn pop(&mut self) -> Option<TranscriptEntry> {
        self.entries.pop()
    }

    /// The most recent entry, if any.
    #[must_use]
    pub fn peek(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry. Called when the dialogue ends, normally or not.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate oldest to newest. This is the order history replay uses, so
    /// the newest entry is conceptually last.
    pub fn iter(&self) -> impl Iterator<Item = &TranscriptEntry> {
        self.entries.iter()
    }

    /// Non-destructive snapshot, newest first (stack view).
    #[must_use]
    pub fn entries_newest_first(&self) -> Vec<TranscriptEntry> {
        self.entries.iter().rev().cloned().collect()
    }
}

impl std::fmt::Debug for Transcript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transcript")
            .field("entries", &self.entries)
            .finish()
    }
}
