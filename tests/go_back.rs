mod common;

use std::sync::Arc;

use common::*;
use serde_json::json;

use dialogweave::builder::{DialogueBuilder, DEFAULT_CANT_GO_BACK};
use dialogweave::engine::DialogueStatus;
use dialogweave::output::{MemorySink, OutputKind};
use dialogweave::prompt::Step;

#[test]
fn go_back_on_empty_transcript_emits_message_and_nothing_else() {
    let sink = MemorySink::new();
    let mut dialogue = DialogueBuilder::new()
        .with_first_prompt_shared(head(ask_chain(["A", "B"])))
        .with_go_back("back")
        .with_sink(sink.clone())
        .build()
        .unwrap();

    dialogue.accept_input("back").unwrap();

    assert_eq!(current_text(&dialogue).as_deref(), Some("A?"));
    assert_eq!(
        sink.texts_of(OutputKind::Notice),
        vec![DEFAULT_CANT_GO_BACK]
    );
    // The current prompt is redisplayed after the no-op.
    assert_eq!(sink.texts_of(OutputKind::Prompt), vec!["A?", "A?"]);
    assert_eq!(dialogue.status(), DialogueStatus::AwaitingInput);
}

#[test]
fn go_back_restores_the_previous_interactive_prompt() {
    let mut dialogue = DialogueBuilder::new()
        .with_first_prompt_shared(head(ask_chain(["A", "B", "C"])))
        .with_go_back("back")
        .with_sink(MemorySink::new())
        .build()
        .unwrap();

    dialogue.accept_input("x").unwrap();
    dialogue.accept_input("y").unwrap();
    assert_eq!(current_text(&dialogue).as_deref(), Some("C?"));

    dialogue.accept_input("back").unwrap();

    assert_eq!(current_text(&dialogue).as_deref(), Some("B?"));
    assert_eq!(dialogue.transcript().len(), 1);
    assert_eq!(
        dialogue.transcript().peek().unwrap().answer.as_deref(),
        Some("x")
    );
}

#[test]
fn go_back_skips_recorded_passive_steps() {
    let chain = Step::next(AskPrompt::new(
        "A",
        Step::next(InfoPrompt::new("note", ask_chain(["B"]))),
    ));
    let mut dialogue = DialogueBuilder::new()
        .with_first_prompt_shared(head(chain))
        .with_go_back("back")
        .record_auto_steps(true)
        .with_sink(MemorySink::new())
        .build()
        .unwrap();

    dialogue.accept_input("x").unwrap();
    assert_eq!(current_text(&dialogue).as_deref(), Some("B?"));
    assert_eq!(dialogue.transcript().len(), 2);

    dialogue.accept_input("back").unwrap();

    // The passive entry is skipped over, never returned to.
    assert_eq!(current_text(&dialogue).as_deref(), Some("A?"));
    assert!(dialogue.transcript().is_empty());
}

#[test]
fn go_back_with_only_passive_entries_lands_on_the_oldest() {
    // The first prompt is passive, so the initial output loop records it
    // and settles on A. Going back exhausts the transcript and lands on the
    // passive head, which immediately auto-advances to A again.
    let chain = Step::next(InfoPrompt::new("intro", ask_chain(["A"])));
    let sink = MemorySink::new();
    let mut dialogue = DialogueBuilder::new()
        .with_first_prompt_shared(head(chain))
        .with_go_back("back")
        .record_auto_steps(true)
        .with_sink(sink.clone())
        .build()
        .unwrap();

    assert_eq!(current_text(&dialogue).as_deref(), Some("A?"));
    assert_eq!(dialogue.transcript().len(), 1);

    dialogue.accept_input("back").unwrap();

    assert_eq!(current_text(&dialogue).as_deref(), Some("A?"));
    assert_eq!(dialogue.transcript().len(), 1);
    assert_eq!(
        sink.texts_of(OutputKind::Prompt),
        vec!["[intro]", "A?", "[intro]", "A?"]
    );
}

#[test]
fn n_answers_then_n_go_backs_return_to_the_first_prompt() {
    let mut dialogue = DialogueBuilder::new()
        .with_first_prompt_shared(head(ask_chain(["P0", "P1", "P2", "P3"])))
        .with_go_back("back")
        .with_sink(MemorySink::new())
        .build()
        .unwrap();

    for answer in ["a", "b", "c"] {
        dialogue.accept_input(answer).unwrap();
    }
    assert_eq!(current_text(&dialogue).as_deref(), Some("P3?"));

    for _ in 0..3 {
        dialogue.accept_input("back").unwrap();
    }

    assert_eq!(current_text(&dialogue).as_deref(), Some("P0?"));
    assert!(dialogue.transcript().is_empty());
}

#[test]
fn redo_action_runs_only_when_transcript_is_nonempty() {
    let action: dialogweave::keywords::KeywordAction = Arc::new(|session, _, _| {
        let count = session
            .get("undo_count")
            .and_then(serde_json::Value::as_i64)
            .unwrap_or(0);
        session.insert("undo_count", json!(count + 1));
        Ok(())
    });

    let mut dialogue = DialogueBuilder::new()
        .with_first_prompt_shared(head(ask_chain(["A", "B"])))
        .with_go_back_action("back", "nothing to undo", action)
        .with_sink(MemorySink::new())
        .build()
        .unwrap();

    dialogue.accept_input("back").unwrap();
    assert!(dialogue.session().get("undo_count").is_none());

    dialogue.accept_input("x").unwrap();
    dialogue.accept_input("back").unwrap();
    assert_eq!(dialogue.session().get("undo_count"), Some(&json!(1)));
    assert_eq!(current_text(&dialogue).as_deref(), Some("A?"));
}

#[test]
fn redo_action_draining_the_live_transcript_is_tolerated() {
    let action: dialogweave::keywords::KeywordAction = Arc::new(|_, transcript, _| {
        transcript.clear();
        Ok(())
    });

    let mut dialogue = DialogueBuilder::new()
        .with_first_prompt_shared(head(ask_chain(["A", "B", "C"])))
        .with_go_back_action("back", "nothing to undo", action)
        .with_sink(MemorySink::new())
        .build()
        .unwrap();

    dialogue.accept_input("x").unwrap();
    dialogue.accept_input("back").unwrap();

    // Nothing left to pop after the action ran; position is unchanged and
    // the engine is still consistent.
    assert_eq!(current_text(&dialogue).as_deref(), Some("B?"));
    assert_eq!(dialogue.status(), DialogueStatus::AwaitingInput);
    assert!(dialogue.transcript().is_empty());
}
