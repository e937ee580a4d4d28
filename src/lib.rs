//! # Dialogweave: Stepwise Interactive Dialogue Engine
//!
//! Dialogweave walks a participant through a directed graph of prompts,
//! one exchange at a time, layering three cross-cutting behaviors on top
//! of plain graph traversal:
//!
//! - **Go-back**: an undo stack that skips non-interactive prompts
//! - **Transcript replay**: on-demand formatted history of completed steps
//! - **Keyword interception**: registered inputs that divert from normal
//!   advancement without touching graph state
//!
//! ## Core Concepts
//!
//! - [`prompt::Prompt`]: one opaque node of the graph. It renders text,
//!   declares whether it blocks for input and computes the next node
//! - [`prompt::Step::End`]: the terminal sentinel ending the dialogue
//! - [`transcript::Transcript`]: the LIFO undo stack of `(prompt, answer)`
//!   pairs
//! - [`engine::DialogueEngine`]: owns the current position and drives the
//!   output/advance loop
//! - [`builder::DialogueBuilder`]: assembles keyword tables, session data,
//!   cancellers and listeners into a ready engine
//!
//! ## Quick Start
//!
//! ```rust
//! use dialogweave::builder::DialogueBuilder;
//! use dialogweave::engine::DialogueStatus;
//! use dialogweave::output::MemorySink;
//! use dialogweave::prompt::{Prompt, PromptError, Step};
//! use dialogweave::session::SessionState;
//! use serde_json::json;
//!
//! struct AskName;
//!
//! impl Prompt for AskName {
//!     fn render(&self, _session: &SessionState) -> String {
//!         "What is your name?".to_string()
//!     }
//!     fn blocks_for_input(&self, _session: &SessionState) -> bool {
//!         true
//!     }
//!     fn advance(
//!         &self,
//!         session: &mut SessionState,
//!         input: Option<&str>,
//!     ) -> Result<Step, PromptError> {
//!         session.insert("name", json!(input.unwrap_or_default()));
//!         Ok(Step::End)
//!     }
//! }
//!
//! # fn main() -> Result<(), dialogweave::engine::DialogueError> {
//! let sink = MemorySink::new();
//! let mut dialogue = DialogueBuilder::new()
//!     .with_first_prompt(AskName)
//!     .with_go_back("back")
//!     .with_show_history("history")
//!     .with_sink(sink.clone())
//!     .build()?;
//!
//! dialogue.accept_input("Ada")?;
//! assert_eq!(dialogue.status(), DialogueStatus::Abandoned);
//! assert_eq!(dialogue.session().get("name"), Some(&json!("Ada")));
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency Model
//!
//! Every engine call runs to completion synchronously. One dialogue is
//! driven by one logical thread delivering one input event at a time;
//! only [`engine::DialogueEngine::abandon`] is designed to be safe against
//! an external scheduler thread (the abandoned flag sits behind a
//! per-instance lock). Distinct dialogues share no mutable state and
//! parallelize trivially across sessions.
//!
//! ## Module Guide
//!
//! - [`prompt`] - Prompt capability contract and the terminal sentinel
//! - [`session`] - Per-dialogue key/value state
//! - [`transcript`] - The undo stack of completed steps
//! - [`keywords`] - Keyword tables and pure input classification
//! - [`output`] - Output sinks and line types
//! - [`format`] - History line formatting
//! - [`engine`] - The dialogue state machine
//! - [`builder`] - Fluent configuration and construction

pub mod builder;
pub mod engine;
pub mod format;
pub mod keywords;
pub mod output;
pub mod prompt;
pub mod session;
pub mod transcript;
