//! Prompt capability contract for the dialogue graph.
//!
//! This module provides the core abstraction for dialogue graph nodes:
//! the [`Prompt`] trait, the [`Step`] transition type with its terminal
//! sentinel, and the fatal [`PromptError`] type.

use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;

use crate::session::SessionState;

/// Core trait defining a single node in the dialogue graph.
///
/// A `Prompt` renders its text from the session, declares whether it waits
/// for participant input, and computes the next node once input (or no
/// input, for passive prompts) has been consumed. Concrete prompt kinds are
/// implemented by the embedding application; the engine treats them as
/// opaque.
///
/// # Design Principles
///
/// - **Opaque**: the engine never inspects a prompt beyond this contract
/// - **Self-routing**: each prompt chooses its own successor, so arbitrary
///   dialogue trees fall out of the return value of [`advance`](Self::advance)
/// - **Session-driven**: all text and routing may depend on [`SessionState`]
///
/// # Validation
///
/// [`validate`](Self::validate) is optional and defaults to accepting all
/// input. A failed validation does **not** stop the engine from calling
/// `advance` with the raw input; it only keeps the answer out of the
/// transcript. Prompts that want to re-ask are expected to return themselves
/// from `advance` on bad input. This mirrors the upstream conversation
/// contract and is intentional.
///
/// # Examples
///
/// ```rust
/// use dialogweave::prompt::{Prompt, PromptError, Step};
/// use dialogweave::session::SessionState;
/// use serde_json::json;
///
/// struct AskName;
///
/// impl Prompt for AskName {
///     fn render(&self, _session: &SessionState) -> String {
///         "What is your name?".to_string()
///     }
///
///     fn blocks_for_input(&self, _session: &SessionState) -> bool {
///         true
///     }
///
///     fn advance(
///         &self,
///         session: &mut SessionState,
///         input: Option<&str>,
///     ) -> Result<Step, PromptError> {
///         session.insert("name", json!(input.unwrap_or_default()));
///         Ok(Step::End)
///     }
/// }
/// ```
pub trait Prompt: Send + Sync {
    /// Produce the text shown to the participant when this prompt becomes
    /// current.
    fn render(&self, session: &SessionState) -> String;

    /// Whether this prompt waits for participant input. Passive prompts
    /// (`false`) are displayed and advanced through automatically.
    fn blocks_for_input(&self, session: &SessionState) -> bool;

    /// Consume input and compute the next node. `input` is `None` when the
    /// engine auto-advances through a passive prompt.
    ///
    /// Returning an error is fatal for the dialogue; the engine abandons
    /// rather than guessing a recovery prompt.
    fn advance(
        &self,
        session: &mut SessionState,
        input: Option<&str>,
    ) -> Result<Step, PromptError>;

    /// Optional input validation. Controls only whether the raw input is
    /// recorded into the transcript; `advance` runs either way.
    fn validate(&self, _session: &SessionState, _input: &str) -> bool {
        true
    }
}

/// Transition returned by [`Prompt::advance`].
///
/// `End` is the distinguished terminal sentinel: the dialogue is over and
/// the engine abandons with a completed cause.
#[derive(Clone)]
pub enum Step {
    /// Continue the dialogue at the given prompt.
    Next(Arc<dyn Prompt>),
    /// No more prompts; the dialogue completes.
    End,
}

impl Step {
    /// Wrap a concrete prompt as the next step.
    pub fn next(prompt: impl Prompt + 'static) -> Self {
        Step::Next(Arc::new(prompt))
    }

    /// Returns `true` if this is the terminal sentinel.
    #[must_use]
    pub fn is_end(&self) -> bool {
        matches!(self, Step::End)
    }
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Next(_) => f.write_str("Step::Next(..)"),
            Step::End => f.write_str("Step::End"),
        }
    }
}

impl From<Arc<dyn Prompt>> for Step {
    fn from(prompt: Arc<dyn Prompt>) -> Self {
        Step::Next(prompt)
    }
}

/// Fatal errors raised by a prompt while advancing.
///
/// These represent graph contract violations: the prompt could not compute
/// a valid successor. The engine treats them as unrecoverable and abandons
/// the dialogue before propagating.
#[derive(Debug, Error, Diagnostic)]
pub enum PromptError {
    /// The prompt could not compute its successor.
    #[error("prompt failed to advance: {message}")]
    #[diagnostic(
        code(dialogweave::prompt::advance),
        help("The prompt graph is trusted; fix the failing prompt rather than the engine.")
    )]
    Advance { message: String },

    /// A session value the prompt depends on is missing.
    #[error("missing expected session value: {key}")]
    #[diagnostic(
        code(dialogweave::prompt::missing_session_value),
        help("Check that an earlier prompt stored the value under this key.")
    )]
    MissingSessionValue { key: &'static str },

    /// JSON serialization/deserialization error while touching session data.
    #[error(transparent)]
    #[diagnostic(code(dialogweave::prompt::serde_json))]
    Serde(#[from] serde_json::Error),
}
