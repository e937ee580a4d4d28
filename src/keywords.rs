//! Keyword interception tables and classification.
//!
//! Raw participant input is resolved against three keyword classes before
//! it is ever treated as an ordinary answer: go-back, show-history and
//! custom. Classification is pure; invoking the matched action is the
//! engine's job. The three tables must be disjoint by input string, which
//! is enforced once at build time rather than at every dispatch.

use std::sync::Arc;

use miette::Diagnostic;
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::prompt::Prompt;
use crate::session::SessionState;
use crate::transcript::Transcript;

/// Error type keyword actions and abandonment listeners may fail with.
///
/// Failures are isolated by the engine: they are logged and never corrupt
/// the dialogue's own state.
pub type ActionError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Side action triggered by a keyword.
///
/// Receives the session, a transcript and the prompt that was current when
/// the keyword was typed. For custom keywords the transcript is a
/// disposable copy the action may freely mutate; for go-back redo actions
/// it is the live transcript.
pub type KeywordAction =
    Arc<dyn Fn(&mut SessionState, &mut Transcript, &dyn Prompt) -> Result<(), ActionError> + Send + Sync>;

/// Go-back table payload: an optional redo action plus the message shown
/// when there is nothing to go back to.
#[derive(Clone)]
pub struct GoBackRule {
    /// Redo action fired before popping, only when the transcript is
    /// non-empty.
    pub action: Option<KeywordAction>,
    /// Message emitted when go-back is requested on an empty transcript.
    pub cant_go_back: String,
}

/// Result of classifying one raw input string.
///
/// Carries owned handles so the caller can drop the router borrow before
/// acting on the match.
#[derive(Clone)]
pub enum KeywordMatch {
    /// Input triggers the undo path.
    GoBack(GoBackRule),
    /// Input triggers formatted history replay.
    ShowHistory,
    /// Input triggers a registered custom action.
    Custom(KeywordAction),
}

/// The three keyword tables plus pure classification over them.
///
/// Tables are immutable once the dialogue starts; they are configuration,
/// not state. Priority is fixed: go-back beats show-history beats custom
/// beats ordinary answers. Overlap across tables is a configuration error
/// surfaced by [`ensure_disjoint`](Self::ensure_disjoint); classification
/// itself is first-match-wins.
#[derive(Clone, Default)]
pub struct KeywordRouter {
    go_back: FxHashMap<String, GoBackRule>,
    show_history: FxHashSet<String>,
    custom: FxHashMap<String, KeywordAction>,
}

impl KeywordRouter {
    /// Creates an empty router: every input is an ordinary answer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a go-back keyword.
    pub fn insert_go_back(&mut self, keyword: impl Into<String>, rule: GoBackRule) {
        self.go_back.insert(keyword.into(), rule);
    }

    /// Register a show-history keyword.
    pub fn insert_show_history(&mut self, keyword: impl Into<String>) {
        self.show_history.insert(keyword.into());
    }

    /// Register a custom keyword.
    pub fn insert_custom(&mut self, keyword: impl Into<String>, action: KeywordAction) {
        self.custom.insert(keyword.into(), action);
    }

    /// Classify raw input into exactly one keyword class, or `None` for an
    /// ordinary answer. Pure; no side effects.
    #[must_use]
    pub fn classify(&self, input: &str) -> Option<KeywordMatch> {
        if let Some(rule) = self.go_back.get(input) {
            return Some(KeywordMatch::GoBack(rule.clone()));
        }
        if self.show_history.contains(input) {
            return Some(KeywordMatch::ShowHistory);
        }
        if let Some(action) = self.custom.get(input) {
            return Some(KeywordMatch::Custom(Arc::clone(action)));
        }
        None
    }

    /// Returns `true` if the input matches any registered keyword.
    #[must_use]
    pub fn is_keyword(&self, input: &str) -> bool {
        self.go_back.contains_key(input)
            || self.show_history.contains(input)
            || self.custom.contains_key(input)
    }

    /// Verify the three tables are disjoint by input string.
    ///
    /// Called once when the dialogue is built; a violation is reported as a
    /// [`ConfigError`] instead of being silently resolved at dispatch time.
    pub fn ensure_disjoint(&self) -> Result<(), ConfigError> {
        for keyword in self.go_back.keys() {
            if self.show_history.contains(keyword) || self.custom.contains_key(keyword) {
                return Err(ConfigError::OverlappingKeyword {
                    keyword: keyword.clone(),
                });
            }
        }
        for keyword in &self.show_history {
            if self.custom.contains_key(keyword) {
                return Err(ConfigError::OverlappingKeyword {
                    keyword: keyword.clone(),
                });
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for KeywordRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeywordRouter")
            .field("go_back", &self.go_back.keys().collect::<Vec<_>>())
            .field("show_history", &self.show_history)
            .field("custom", &self.custom.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Configuration errors detected while assembling a dialogue.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// The same input string is registered in more than one keyword table.
    #[error("keyword {keyword:?} is registered in more than one table")]
    #[diagnostic(
        code(dialogweave::keywords::overlap),
        help("Go-back, show-history and custom keywords must be disjoint by input string.")
    )]
    OverlappingKeyword { keyword: String },
}
