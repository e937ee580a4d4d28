#![allow(dead_code)]

use std::sync::Arc;

use serde_json::json;

use dialogweave::prompt::{Prompt, PromptError, Step};
use dialogweave::session::SessionState;

/// Interactive prompt that stores its answer in the session under its own
/// name and renders as `"<name>?"`.
pub struct AskPrompt {
    pub name: String,
    pub next: Step,
}

impl AskPrompt {
    pub fn new(name: impl Into<String>, next: Step) -> Self {
        Self {
            name: name.into(),
            next,
        }
    }
}

impl Prompt for AskPrompt {
    fn render(&self, _session: &SessionState) -> String {
        format!("{}?", self.name)
    }

    fn blocks_for_input(&self, _session: &SessionState) -> bool {
        true
    }

    fn advance(
        &self,
        session: &mut SessionState,
        input: Option<&str>,
    ) -> Result<Step, PromptError> {
        session.insert(self.name.clone(), json!(input.unwrap_or_default()));
        Ok(self.next.clone())
    }
}

/// Passive prompt, displayed and advanced through automatically; renders
/// as `"[<name>]"`.
pub struct InfoPrompt {
    pub name: String,
    pub next: Step,
}

impl InfoPrompt {
    pub fn new(name: impl Into<String>, next: Step) -> Self {
        Self {
            name: name.into(),
            next,
        }
    }
}

impl Prompt for InfoPrompt {
    fn render(&self, _session: &SessionState) -> String {
        format!("[{}]", self.name)
    }

    fn blocks_for_input(&self, _session: &SessionState) -> bool {
        false
    }

    fn advance(
        &self,
        _session: &mut SessionState,
        _input: Option<&str>,
    ) -> Result<Step, PromptError> {
        Ok(self.next.clone())
    }
}

/// Interactive prompt that only validates one exact answer. Advancing is
/// unconditional either way, which is exactly the contract under test.
pub struct PickyPrompt {
    pub name: String,
    pub accept: String,
    pub next: Step,
}

impl PickyPrompt {
    pub fn new(name: impl Into<String>, accept: impl Into<String>, next: Step) -> Self {
        Self {
            name: name.into(),
            accept: accept.into(),
            next,
        }
    }
}

impl Prompt for PickyPrompt {
    fn render(&self, _session: &SessionState) -> String {
        format!("{}?", self.name)
    }

    fn blocks_for_input(&self, _session: &SessionState) -> bool {
        true
    }

    fn advance(
        &self,
        session: &mut SessionState,
        input: Option<&str>,
    ) -> Result<Step, PromptError> {
        session.insert(self.name.clone(), json!(input.unwrap_or_default()));
        Ok(self.next.clone())
    }

    fn validate(&self, _session: &SessionState, input: &str) -> bool {
        input == self.accept
    }
}

/// Passive prompt that never reaches an interactive one.
pub struct LoopPrompt;

impl Prompt for LoopPrompt {
    fn render(&self, _session: &SessionState) -> String {
        "looping".to_string()
    }

    fn blocks_for_input(&self, _session: &SessionState) -> bool {
        false
    }

    fn advance(
        &self,
        _session: &mut SessionState,
        _input: Option<&str>,
    ) -> Result<Step, PromptError> {
        Ok(Step::next(LoopPrompt))
    }
}

/// Interactive prompt whose advance always fails fatally.
pub struct FaultyPrompt;

impl Prompt for FaultyPrompt {
    fn render(&self, _session: &SessionState) -> String {
        "doomed?".to_string()
    }

    fn blocks_for_input(&self, _session: &SessionState) -> bool {
        true
    }

    fn advance(
        &self,
        _session: &mut SessionState,
        _input: Option<&str>,
    ) -> Result<Step, PromptError> {
        Err(PromptError::Advance {
            message: "broken graph node".to_string(),
        })
    }
}

/// Build a linear chain of interactive prompts ending in `Step::End`.
pub fn ask_chain<I, S>(names: I) -> Step
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let names: Vec<String> = names.into_iter().map(Into::into).collect();
    names
        .into_iter()
        .rev()
        .fold(Step::End, |next, name| Step::next(AskPrompt::new(name, next)))
}

/// Extract the head prompt of a non-empty chain.
pub fn head(step: Step) -> Arc<dyn Prompt> {
    match step {
        Step::Next(prompt) => prompt,
        Step::End => panic!("chain is empty"),
    }
}

/// Rendered text of the engine's current prompt.
pub fn current_text(engine: &dialogweave::engine::DialogueEngine) -> Option<String> {
    engine
        .current_prompt()
        .map(|prompt| prompt.render(engine.session()))
}
