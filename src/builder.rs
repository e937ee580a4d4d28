//! Fluent builder assembling configuration into a ready dialogue.
//!
//! A `DialogueBuilder` is typically created once per conversation template
//! and produces an independent [`DialogueEngine`] per participant. The
//! builder validates configuration (keyword disjointness, presence of a
//! first prompt) and runs the initial output loop, so `build()` hands back
//! an engine that has already rendered its first interactive prompt.
//!
//! # Examples
//!
//! ```rust
//! use dialogweave::builder::DialogueBuilder;
//! use dialogweave::output::MemorySink;
//! use dialogweave::prompt::{Prompt, PromptError, Step};
//! use dialogweave::session::SessionState;
//!
//! struct AskColor;
//!
//! impl Prompt for AskColor {
//!     fn render(&self, _session: &SessionState) -> String {
//!         "Favorite color?".to_string()
//!     }
//!     fn blocks_for_input(&self, _session: &SessionState) -> bool {
//!         true
//!     }
//!     fn advance(
//!         &self,
//!         session: &mut SessionState,
//!         input: Option<&str>,
//!     ) -> Result<Step, PromptError> {
//!         session.insert("color", serde_json::json!(input.unwrap_or_default()));
//!         Ok(Step::End)
//!     }
//! }
//!
//! # fn main() -> Result<(), dialogweave::engine::DialogueError> {
//! let sink = MemorySink::new();
//! let mut dialogue = DialogueBuilder::new()
//!     .with_first_prompt(AskColor)
//!     .with_go_back("back")
//!     .with_show_history("history")
//!     .with_sink(sink.clone())
//!     .build()?;
//!
//! dialogue.accept_input("teal")?;
//! assert_eq!(dialogue.session().get("color"), Some(&serde_json::json!("teal")));
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use serde_json::Value;

use crate::engine::{
    AbandonedListener, Canceller, DialogueEngine, DialogueError, EngineParts,
    DEFAULT_MAX_AUTO_ADVANCE,
};
use crate::format::{default_formatter, HistoryFormatter};
use crate::keywords::{GoBackRule, KeywordAction, KeywordRouter};
use crate::output::{OutputSink, PrefixFn, StdoutSink};
use crate::prompt::Prompt;
use crate::session::SessionState;

/// Message shown when go-back is requested at the start of the dialogue and
/// no per-keyword message was configured.
pub const DEFAULT_CANT_GO_BACK: &str = "Cannot go back further!";

/// Builder for [`DialogueEngine`] instances.
///
/// All configuration is explicit and per-dialogue; there are no implicit
/// mutable defaults shared across instances.
pub struct DialogueBuilder {
    first_prompt: Option<Arc<dyn Prompt>>,
    session: SessionState,
    keywords: KeywordRouter,
    formatter: HistoryFormatter,
    record_auto_steps: bool,
    local_echo: bool,
    prefix: Option<PrefixFn>,
    max_auto_advance: usize,
    cancellers: Vec<Arc<dyn Canceller>>,
    listeners: Vec<Arc<dyn AbandonedListener>>,
    sink: Box<dyn OutputSink>,
}

impl Default for DialogueBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DialogueBuilder {
    /// Creates a builder with an empty keyword table, local echo on,
    /// auto-step recording on, the default history formatter and a stdout
    /// sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            first_prompt: None,
            session: SessionState::new(),
            keywords: KeywordRouter::new(),
            formatter: default_formatter(),
            record_auto_steps: true,
            local_echo: true,
            prefix: None,
            max_auto_advance: DEFAULT_MAX_AUTO_ADVANCE,
            cancellers: Vec::new(),
            listeners: Vec::new(),
            sink: Box::new(StdoutSink::new()),
        }
    }

    /// Sets the entry point into the prompt graph.
    #[must_use]
    pub fn with_first_prompt(mut self, prompt: impl Prompt + 'static) -> Self {
        self.first_prompt = Some(Arc::new(prompt));
        self
    }

    /// Sets the entry point from an already-shared prompt, e.g. one pulled
    /// out of a pre-built graph.
    #[must_use]
    pub fn with_first_prompt_shared(mut self, prompt: Arc<dyn Prompt>) -> Self {
        self.first_prompt = Some(prompt);
        self
    }

    /// Seeds the dialogue's session state. The state is owned by the
    /// dialogue; the caller's original data is never aliased.
    #[must_use]
    pub fn with_initial_session(mut self, session: SessionState) -> Self {
        self.session = session;
        self
    }

    /// Adds a single initial session value.
    #[must_use]
    pub fn with_session_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.session.insert(key, value);
        self
    }

    /// Registers input that moves the dialogue back to the previous
    /// interactive step, with the default can't-go-back message.
    #[must_use]
    pub fn with_go_back(self, keyword: impl Into<String>) -> Self {
        self.with_go_back_message(keyword, DEFAULT_CANT_GO_BACK)
    }

    /// Registers a go-back keyword with the message shown when the start of
    /// the dialogue is reached and going back further is impossible.
    #[must_use]
    pub fn with_go_back_message(
        mut self,
        keyword: impl Into<String>,
        cant_go_back: impl Into<String>,
    ) -> Self {
        self.keywords.insert_go_back(
            keyword,
            GoBackRule {
                action: None,
                cant_go_back: cant_go_back.into(),
            },
        );
        self
    }

    /// Registers a go-back keyword with a redo action fired (against the
    /// live transcript) before the undo pops happen. The action does not
    /// run when there is nothing to go back to.
    #[must_use]
    pub fn with_go_back_action(
        mut self,
        keyword: impl Into<String>,
        cant_go_back: impl Into<String>,
        action: KeywordAction,
    ) -> Self {
        self.keywords.insert_go_back(
            keyword,
            GoBackRule {
                action: Some(action),
                cant_go_back: cant_go_back.into(),
            },
        );
        self
    }

    /// Registers input that replays the formatted transcript. Typing it has
    /// no effect on the current prompt; it behaves as if no answer was
    /// given.
    #[must_use]
    pub fn with_show_history(mut self, keyword: impl Into<String>) -> Self {
        self.keywords.insert_show_history(keyword);
        self
    }

    /// Sets the function used to format each history line.
    #[must_use]
    pub fn with_history_formatter(mut self, formatter: HistoryFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Registers input that triggers a custom action. The action receives
    /// the session, a disposable copy of the transcript (mutations are not
    /// reflected in the real history) and the currently displayed prompt.
    /// Note the current prompt is not itself on the transcript: popping the
    /// copy's top entry removes the previous step, not the displayed one.
    #[must_use]
    pub fn with_custom_keyword(mut self, keyword: impl Into<String>, action: KeywordAction) -> Self {
        self.keywords.insert_custom(keyword, action);
        self
    }

    /// Adds a cancellation predicate evaluated against every input.
    #[must_use]
    pub fn with_canceller(mut self, canceller: impl Canceller + 'static) -> Self {
        self.cancellers.push(Arc::new(canceller));
        self
    }

    /// Adds an abandonment listener notified once when the dialogue ends.
    #[must_use]
    pub fn with_abandoned_listener(mut self, listener: impl AbandonedListener + 'static) -> Self {
        self.listeners.push(Arc::new(listener));
        self
    }

    /// Controls echoing the participant's input back through the sink.
    /// Keywords are never echoed. On by default.
    #[must_use]
    pub fn with_local_echo(mut self, enabled: bool) -> Self {
        self.local_echo = enabled;
        self
    }

    /// Sets a prefix prepended to every emitted line, computed from the
    /// session state.
    #[must_use]
    pub fn with_prefix(
        mut self,
        prefix: impl Fn(&SessionState) -> String + Send + Sync + 'static,
    ) -> Self {
        self.prefix = Some(Arc::new(prefix));
        self
    }

    /// Controls whether passively-displayed (non-interactive) steps are
    /// recorded into the transcript. On by default; when off, such steps
    /// leave no trace.
    #[must_use]
    pub fn record_auto_steps(mut self, enabled: bool) -> Self {
        self.record_auto_steps = enabled;
        self
    }

    /// Caps consecutive auto-advances within one call, turning a graph that
    /// never blocks for input into a reported fault.
    #[must_use]
    pub fn with_max_auto_advance(mut self, limit: usize) -> Self {
        self.max_auto_advance = limit;
        self
    }

    /// Sets the output target. Defaults to stdout.
    #[must_use]
    pub fn with_sink(mut self, sink: impl OutputSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Validate configuration, construct the engine and run the initial
    /// output loop. The returned engine has already displayed its first
    /// prompt and is awaiting input, unless the graph completed (or
    /// faulted) during the initial passive run.
    pub fn build(self) -> Result<DialogueEngine, DialogueError> {
        self.keywords.ensure_disjoint()?;
        let first_prompt = self.first_prompt.ok_or(DialogueError::MissingFirstPrompt)?;

        let mut engine = DialogueEngine::new(EngineParts {
            first_prompt,
            session: self.session,
            keywords: self.keywords,
            formatter: self.formatter,
            record_auto_steps: self.record_auto_steps,
            local_echo: self.local_echo,
            prefix: self.prefix,
            max_auto_advance: self.max_auto_advance,
            cancellers: self.cancellers,
            listeners: self.listeners,
            sink: self.sink,
        });
        engine.run_output_loop()?;
        Ok(engine)
    }
}

impl std::fmt::Debug for DialogueBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogueBuilder")
            .field("keywords", &self.keywords)
            .field("record_auto_steps", &self.record_auto_steps)
            .field("local_echo", &self.local_echo)
            .field("max_auto_advance", &self.max_auto_advance)
            .finish_non_exhaustive()
    }
}
