//! The dialogue engine: graph position, the output/advance loop, keyword
//! dispatch, go-back, and abandonment.
//!
//! A [`DialogueEngine`] owns the current position in the prompt graph and
//! drives one exchange at a time. The caller feeds raw text into
//! [`accept_input`](DialogueEngine::accept_input); the engine either
//! performs a keyword side action and redisplays the current step, or
//! records the answer into the transcript and advances. The output loop
//! then renders the new node, auto-advancing through passive prompts until
//! an interactive one is reached or the graph terminates.
//!
//! Every call runs to completion synchronously; there is no internal
//! background task. One dialogue is driven by one logical thread, except
//! that [`abandon`](DialogueEngine::abandon) may be called by an external
//! scheduler thread, so the abandoned flag lives behind a per-instance
//! lock.

use std::sync::Arc;

use miette::Diagnostic;
use parking_lot::Mutex;
use thiserror::Error;
use uuid::Uuid;

use crate::format::HistoryFormatter;
use crate::keywords::{ActionError, GoBackRule, KeywordMatch, KeywordRouter};
use crate::output::{OutputLine, OutputSink, PrefixFn};
use crate::prompt::{Prompt, PromptError, Step};
use crate::session::SessionState;
use crate::transcript::{Transcript, TranscriptEntry};

/// Default cap on consecutive auto-advanced prompts within one call.
pub const DEFAULT_MAX_AUTO_ADVANCE: usize = 256;

/// Where the engine currently stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialogueStatus {
    /// The current prompt requires input; the engine is idle until the next
    /// [`DialogueEngine::accept_input`] call.
    AwaitingInput,
    /// Terminal. Set by graph completion, a canceller, an explicit abandon
    /// call, or a fatal prompt fault.
    Abandoned,
}

/// Why a dialogue ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AbandonCause {
    /// The graph returned the terminal sentinel.
    Completed,
    /// A cancellation predicate matched the input.
    Cancelled { by: String },
    /// Explicit external abandonment.
    External,
    /// A fatal engine or prompt fault.
    Faulted { reason: String },
}

/// Cancellation predicate evaluated against every raw input before any
/// other processing.
pub trait Canceller: Send + Sync {
    /// Returns `true` if this input should abandon the dialogue.
    fn cancel_based_on_input(&self, session: &SessionState, input: &str) -> bool;

    /// Label carried in the [`AbandonCause::Cancelled`] cause.
    fn describe(&self) -> &str {
        "canceller"
    }
}

/// Canceller matching one exact input string.
pub struct ExactMatchCanceller {
    word: String,
}

impl ExactMatchCanceller {
    #[must_use]
    pub fn new(word: impl Into<String>) -> Self {
        Self { word: word.into() }
    }
}

impl Canceller for ExactMatchCanceller {
    fn cancel_based_on_input(&self, _session: &SessionState, input: &str) -> bool {
        input == self.word
    }

    fn describe(&self) -> &str {
        &self.word
    }
}

/// Observer notified exactly once when the dialogue ends.
///
/// A faulting listener is logged and skipped; it cannot prevent cleanup or
/// the remaining listeners from running.
pub trait AbandonedListener: Send + Sync {
    fn dialogue_abandoned(&self, cause: &AbandonCause) -> Result<(), ActionError>;
}

impl<F> AbandonedListener for F
where
    F: Fn(&AbandonCause) -> Result<(), ActionError> + Send + Sync,
{
    fn dialogue_abandoned(&self, cause: &AbandonCause) -> Result<(), ActionError> {
        self(cause)
    }
}

/// Errors surfaced by dialogue construction and input processing.
#[derive(Debug, Error, Diagnostic)]
pub enum DialogueError {
    /// Keyword tables or other configuration were invalid at build time.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] crate::keywords::ConfigError),

    /// No first prompt was supplied to the builder.
    #[error("dialogue has no first prompt")]
    #[diagnostic(
        code(dialogweave::engine::missing_first_prompt),
        help("Call DialogueBuilder::with_first_prompt before build().")
    )]
    MissingFirstPrompt,

    /// A prompt failed fatally while advancing. The dialogue is abandoned
    /// before this propagates.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Prompt(#[from] PromptError),

    /// The output loop hit the auto-advance cap without reaching an
    /// interactive prompt. The dialogue is abandoned before this propagates.
    #[error("auto-advance exceeded {limit} steps without reaching an interactive prompt")]
    #[diagnostic(
        code(dialogweave::engine::auto_advance_limit),
        help(
            "The prompt graph never blocks for input. Raise the cap with \
             DialogueBuilder::with_max_auto_advance if the run is legitimate."
        )
    )]
    AutoAdvanceLimit { limit: usize },
}

/// Assembled configuration handed over by the builder.
pub(crate) struct EngineParts {
    pub first_prompt: Arc<dyn Prompt>,
    pub session: SessionState,
    pub keywords: KeywordRouter,
    pub formatter: HistoryFormatter,
    pub record_auto_steps: bool,
    pub local_echo: bool,
    pub prefix: Option<PrefixFn>,
    pub max_auto_advance: usize,
    pub cancellers: Vec<Arc<dyn Canceller>>,
    pub listeners: Vec<Arc<dyn AbandonedListener>>,
    pub sink: Box<dyn OutputSink>,
}

/// Stepwise interactive dialogue over a directed graph of prompts.
///
/// Built by [`DialogueBuilder`](crate::builder::DialogueBuilder); the
/// builder runs the output loop once, so a freshly constructed engine has
/// already rendered its first interactive prompt (or completed, for a graph
/// of only passive prompts).
pub struct DialogueEngine {
    id: Uuid,
    position: Step,
    session: SessionState,
    transcript: Transcript,
    keywords: KeywordRouter,
    formatter: HistoryFormatter,
    record_auto_steps: bool,
    local_echo: bool,
    prefix: Option<PrefixFn>,
    max_auto_advance: usize,
    cancellers: Vec<Arc<dyn Canceller>>,
    listeners: Vec<Arc<dyn AbandonedListener>>,
    sink: Box<dyn OutputSink>,
    // Guards the abandoned flag against an external scheduler thread
    // calling abandon() while an input call is in flight.
    abandoned: Mutex<Option<AbandonCause>>,
}

impl DialogueEngine {
    pub(crate) fn new(parts: EngineParts) -> Self {
        Self {
            id: Uuid::new_v4(),
            position: Step::Next(parts.first_prompt),
            session: parts.session,
            transcript: Transcript::new(),
            keywords: parts.keywords,
            formatter: parts.formatter,
            record_auto_steps: parts.record_auto_steps,
            local_echo: parts.local_echo,
            prefix: parts.prefix,
            max_auto_advance: parts.max_auto_advance,
            cancellers: parts.cancellers,
            listeners: parts.listeners,
            sink: parts.sink,
            abandoned: Mutex::new(None),
        }
    }

    /// Unique id of this dialogue instance.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current engine status.
    #[must_use]
    pub fn status(&self) -> DialogueStatus {
        if self.is_abandoned() {
            DialogueStatus::Abandoned
        } else {
            DialogueStatus::AwaitingInput
        }
    }

    /// Why the dialogue ended, once it has.
    #[must_use]
    pub fn abandon_cause(&self) -> Option<AbandonCause> {
        self.abandoned.lock().clone()
    }

    /// The prompt currently awaiting input; `None` once the dialogue ended.
    #[must_use]
    pub fn current_prompt(&self) -> Option<Arc<dyn Prompt>> {
        match &self.position {
            Step::Next(prompt) => Some(Arc::clone(prompt)),
            Step::End => None,
        }
    }

    /// Read-only view of the undo stack.
    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Read-only view of the session data.
    #[must_use]
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Passes participant input into the current prompt. The next prompt,
    /// as determined by the current one, is then displayed. If a keyword is
    /// typed the matching side action runs instead and the dialogue
    /// position is unchanged (go-back excepted).
    ///
    /// Processing order: echo, cancellation predicates, keyword dispatch,
    /// then ordinary answer handling. Validation failure suppresses only
    /// the transcript entry; `advance` always runs.
    #[tracing::instrument(skip_all, fields(dialogue = %self.id))]
    pub fn accept_input(&mut self, input: &str) -> Result<(), DialogueError> {
        if self.is_abandoned() {
            return Ok(());
        }
        let current = match &self.position {
            Step::Next(prompt) => Arc::clone(prompt),
            Step::End => return Ok(()),
        };

        // Echo the input verbatim, but never echo keywords.
        if self.local_echo && !self.keywords.is_keyword(input) {
            self.send(OutputLine::echo(input));
        }

        let cancellers = self.cancellers.clone();
        for canceller in &cancellers {
            if canceller.cancel_based_on_input(&self.session, input) {
                self.abandon_with(AbandonCause::Cancelled {
                    by: canceller.describe().to_string(),
                });
                return Ok(());
            }
        }

        match self.keywords.classify(input) {
            Some(KeywordMatch::GoBack(rule)) => {
                self.go_back(rule, current.as_ref());
                self.run_output_loop()
            }
            Some(KeywordMatch::ShowHistory) => {
                // Pure replay: the dialogue position is untouched, as if no
                // answer had been given.
                let lines: Vec<String> = self
                    .transcript
                    .iter()
                    .map(|entry| (self.formatter)(entry, &self.session))
                    .collect();
                for text in lines {
                    self.send(OutputLine::history(text));
                }
                self.run_output_loop()
            }
            Some(KeywordMatch::Custom(action)) => {
                // The action gets a disposable copy of the transcript; its
                // mutations never reach the real one.
                let mut copy = self.transcript.clone();
                if let Err(fault) = action(&mut self.session, &mut copy, current.as_ref()) {
                    tracing::warn!(error = %fault, "custom keyword action failed");
                }
                self.run_output_loop()
            }
            None => {
                if current.validate(&self.session, input) {
                    self.transcript
                        .push(TranscriptEntry::answered(Arc::clone(&current), input));
                }
                match current.advance(&mut self.session, Some(input)) {
                    Ok(step) => {
                        self.position = step;
                        self.run_output_loop()
                    }
                    Err(fault) => {
                        self.abandon_with(AbandonCause::Faulted {
                            reason: fault.to_string(),
                        });
                        Err(fault.into())
                    }
                }
            }
        }
    }

    /// Abandon the dialogue with an [`AbandonCause::External`] cause.
    pub fn abandon(&mut self) {
        self.abandon_with(AbandonCause::External);
    }

    /// Abandon the dialogue: clear the transcript and notify every
    /// registered listener with the cause. Idempotent; a second call does
    /// not re-clear or re-notify.
    pub fn abandon_with(&mut self, cause: AbandonCause) {
        {
            let mut gate = self.abandoned.lock();
            if gate.is_some() {
                return;
            }
            *gate = Some(cause.clone());
        }
        tracing::debug!(dialogue = %self.id, ?cause, "dialogue abandoned");
        self.transcript.clear();
        self.position = Step::End;
        for listener in &self.listeners {
            if let Err(fault) = listener.dialogue_abandoned(&cause) {
                tracing::warn!(error = %fault, "abandonment listener failed");
            }
        }
    }

    /// Render the current prompt and advance through passive prompts until
    /// one blocks for input or the graph terminates. Iterative on purpose:
    /// long passive runs must not grow the call stack, and the cap turns a
    /// graph that never blocks into a detectable fault instead of a hang.
    pub(crate) fn run_output_loop(&mut self) -> Result<(), DialogueError> {
        let mut auto_steps = 0usize;
        loop {
            let current = match &self.position {
                Step::Next(prompt) => Arc::clone(prompt),
                Step::End => {
                    self.abandon_with(AbandonCause::Completed);
                    return Ok(());
                }
            };

            let text = current.render(&self.session);
            self.send(OutputLine::prompt(text));

            if current.blocks_for_input(&self.session) {
                return Ok(());
            }

            if auto_steps >= self.max_auto_advance {
                self.abandon_with(AbandonCause::Faulted {
                    reason: format!(
                        "auto-advance exceeded {} steps without reaching an interactive prompt",
                        self.max_auto_advance
                    ),
                });
                return Err(DialogueError::AutoAdvanceLimit {
                    limit: self.max_auto_advance,
                });
            }
            auto_steps += 1;

            if self.record_auto_steps {
                self.transcript
                    .push(TranscriptEntry::unanswered(Arc::clone(&current)));
            }
            match current.advance(&mut self.session, None) {
                Ok(step) => self.position = step,
                Err(fault) => {
                    self.abandon_with(AbandonCause::Faulted {
                        reason: fault.to_string(),
                    });
                    return Err(fault.into());
                }
            }
        }
    }

    /// Going back is only possible onto prompts that require input;
    /// passive prompts are skipped. If the transcript holds only passive
    /// entries, going back lands on the oldest entry's prompt even if it is
    /// itself passive.
    fn go_back(&mut self, rule: GoBackRule, current: &dyn Prompt) {
        if self.transcript.is_empty() {
            self.send(OutputLine::notice(rule.cant_go_back));
            return;
        }
        if let Some(action) = rule.action {
            if let Err(fault) = action(&mut self.session, &mut self.transcript, current) {
                tracing::warn!(error = %fault, "go-back action failed");
            }
        }
        // The action saw the live transcript and may have drained it.
        let Some(entry) = self.transcript.pop() else {
            return;
        };
        let mut restored = entry.prompt;
        while !restored.blocks_for_input(&self.session) {
            match self.transcript.pop() {
                Some(entry) => restored = entry.prompt,
                None => break,
            }
        }
        self.position = Step::Next(restored);
    }

    fn is_abandoned(&self) -> bool {
        self.abandoned.lock().is_some()
    }

    fn send(&mut self, mut line: OutputLine) {
        if let Some(prefix) = &self.prefix {
            let prefix = prefix(&self.session);
            line.text = format!("{prefix}{}", line.text);
        }
        if let Err(fault) = self.sink.emit(&line) {
            tracing::warn!(error = %fault, "output sink failed");
        }
    }
}

impl std::fmt::Debug for DialogueEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogueEngine")
            .field("id", &self.id)
            .field("status", &self.status())
            .field("transcript_len", &self.transcript.len())
            .finish_non_exhaustive()
    }
}
