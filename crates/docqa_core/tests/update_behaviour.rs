use std::path::PathBuf;
use std::sync::Once;

use docqa_core::{
    update, Answer, AppState, Citation, Effect, HistoryEntry, Message, Msg, RequestFailure,
    RequestId, RequestKind, Role, SessionState, SpeechCommand, ANSWER_FAILED_MESSAGE,
    SUMMARY_FAILED_NOTICE, UPLOAD_FAILED_NOTICE, WELCOME_MESSAGE,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(docqa_logging::initialize_for_tests);
}

fn request_id_of(effects: &[Effect]) -> RequestId {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::UploadDocument { request_id, .. }
            | Effect::AskQuestion { request_id, .. }
            | Effect::FetchSummary { request_id, .. }
            | Effect::DeleteDocument { request_id, .. } => Some(*request_id),
            Effect::Speech(_) => None,
        })
        .expect("request effect")
}

fn failure() -> RequestFailure {
    RequestFailure::new("http status 500", "Internal Server Error")
}

fn select_and_upload(state: AppState) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::FileSelected(PathBuf::from("/papers/paper.pdf")));
    update(state, Msg::UploadClicked)
}

fn ready_session(doc_id: &str) -> AppState {
    let (state, effects) = select_and_upload(AppState::new());
    let (state, _) = update(
        state,
        Msg::UploadFinished {
            request_id: request_id_of(&effects),
            result: Ok(doc_id.to_string()),
        },
    );
    state
}

fn submit_question(state: AppState, input: &str) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::InputChanged(input.to_string()));
    update(state, Msg::QuestionSubmitted)
}

fn answer(text: &str, citations: Vec<Citation>) -> Answer {
    Answer {
        text: text.to_string(),
        citations,
    }
}

#[test]
fn upload_success_opens_session_and_reads_welcome() {
    init_logging();
    let (state, effects) = select_and_upload(AppState::new());
    let request_id = request_id_of(&effects);
    assert_eq!(
        effects,
        vec![Effect::UploadDocument {
            request_id,
            path: PathBuf::from("/papers/paper.pdf"),
        }]
    );
    assert_eq!(state.pending().map(|p| p.kind), Some(RequestKind::Upload));

    let (mut state, effects) = update(
        state,
        Msg::UploadFinished {
            request_id,
            result: Ok("d1".to_string()),
        },
    );

    assert_eq!(state.session_state(), SessionState::DocumentReady);
    assert_eq!(state.document_id(), Some("d1"));
    assert_eq!(state.messages(), &[Message::assistant(WELCOME_MESSAGE)]);
    assert_eq!(
        effects,
        vec![
            Effect::Speech(SpeechCommand::CancelAll),
            Effect::Speech(SpeechCommand::Speak {
                utterance_id: 1,
                text: WELCOME_MESSAGE.to_string(),
            }),
        ]
    );
    let view = state.view();
    assert_eq!(view.file_name.as_deref(), Some("paper.pdf"));
    assert_eq!(view.reading.as_deref(), Some(WELCOME_MESSAGE));
    assert!(view.messages[0].is_reading);
    assert!(view.busy.is_none());
    assert!(state.consume_dirty());
}

#[test]
fn upload_failure_keeps_no_document_and_raises_notice() {
    init_logging();
    let (state, effects) = select_and_upload(AppState::new());
    let (state, effects) = update(
        state,
        Msg::UploadFinished {
            request_id: request_id_of(&effects),
            result: Err(failure()),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.session_state(), SessionState::NoDocument);
    assert!(state.messages().is_empty());
    assert_eq!(state.notice(), Some(UPLOAD_FAILED_NOTICE));
    assert_eq!(state.playback().current_text(), None);

    // The selected file survives so the user can retry.
    let (state, effects) = update(state, Msg::UploadClicked);
    assert_eq!(effects.len(), 1);
    assert_eq!(state.notice(), None);
}

#[test]
fn upload_without_selected_file_is_ignored() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::UploadClicked);
    assert!(effects.is_empty());
    assert!(state.pending().is_none());
    assert!(!state.view().can_upload);
}

#[test]
fn file_selection_is_locked_while_upload_is_pending() {
    init_logging();
    let (mut state, effects) = select_and_upload(AppState::new());
    state.consume_dirty();
    let (mut state, _) = update(state, Msg::FileSelected(PathBuf::from("/papers/other.pdf")));
    assert!(!state.consume_dirty());
    assert_eq!(state.view().file_name.as_deref(), Some("paper.pdf"));

    let (state, _) = update(
        state,
        Msg::UploadFinished {
            request_id: request_id_of(&effects),
            result: Ok("d1".to_string()),
        },
    );
    assert_eq!(state.view().file_name.as_deref(), Some("paper.pdf"));
}

#[test]
fn upload_rejected_once_document_is_ready() {
    init_logging();
    let state = ready_session("d1");
    let (state, _) = update(state, Msg::FileSelected(PathBuf::from("/papers/other.pdf")));
    let (state, effects) = update(state, Msg::UploadClicked);

    assert!(effects.is_empty());
    assert_eq!(state.view().file_name.as_deref(), Some("paper.pdf"));
}

#[test]
fn ask_stops_playback_appends_question_and_sends_prior_history() {
    init_logging();
    let state = ready_session("d1");
    let (state, effects) = submit_question(state, "  what is the method?  ");
    let request_id = request_id_of(&effects);

    assert_eq!(
        effects,
        vec![
            Effect::Speech(SpeechCommand::CancelAll),
            Effect::AskQuestion {
                request_id,
                document_id: "d1".to_string(),
                question: "what is the method?".to_string(),
                history: vec![HistoryEntry {
                    role: Role::Assistant,
                    content: WELCOME_MESSAGE.to_string(),
                }],
            },
        ]
    );
    assert_eq!(state.messages().len(), 2);
    assert_eq!(state.messages()[1], Message::user("what is the method?"));
    assert_eq!(state.draft(), "");
    assert_eq!(state.playback().current_text(), None);
    assert_eq!(state.view().busy, Some(RequestKind::Ask));
}

#[test]
fn ask_success_appends_answer_and_reads_it() {
    init_logging();
    let state = ready_session("d1");
    let (state, effects) = submit_question(state, "what is the method?");
    let citations = vec![Citation {
        page: 3,
        content: "We use gradient descent.".to_string(),
    }];
    let (state, effects) = update(
        state,
        Msg::AnswerReceived {
            request_id: request_id_of(&effects),
            result: Ok(answer("Gradient descent.", citations.clone())),
        },
    );

    let last = state.messages().last().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert_eq!(last.content, "Gradient descent.");
    assert_eq!(last.citations, citations);
    assert!(effects.contains(&Effect::Speech(SpeechCommand::Speak {
        utterance_id: 2,
        text: "Gradient descent.".to_string(),
    })));
    assert!(state.playback().is_reading("Gradient descent."));
}

#[test]
fn ask_failure_appends_apology_without_playback() {
    init_logging();
    let state = ready_session("d1");
    let (state, effects) = submit_question(state, "what is the method?");
    let before = state.messages().len();
    let (state, effects) = update(
        state,
        Msg::AnswerReceived {
            request_id: request_id_of(&effects),
            result: Err(failure()),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.messages().len(), before + 1);
    assert_eq!(
        state.messages().last(),
        Some(&Message::assistant(ANSWER_FAILED_MESSAGE))
    );
    assert!(!state.playback().is_reading(ANSWER_FAILED_MESSAGE));
    assert_eq!(state.session_state(), SessionState::DocumentReady);
    assert!(state.pending().is_none());
}

#[test]
fn history_sent_upstream_excludes_citations() {
    init_logging();
    let state = ready_session("d1");
    let (state, effects) = submit_question(state, "first?");
    let (state, _) = update(
        state,
        Msg::AnswerReceived {
            request_id: request_id_of(&effects),
            result: Ok(answer(
                "first answer",
                vec![Citation {
                    page: 1,
                    content: "excerpt".to_string(),
                }],
            )),
        },
    );

    let (_state, effects) = submit_question(state, "second?");
    let history = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::AskQuestion { history, .. } => Some(history.clone()),
            _ => None,
        })
        .expect("ask effect");

    assert_eq!(
        history,
        vec![
            HistoryEntry {
                role: Role::Assistant,
                content: WELCOME_MESSAGE.to_string(),
            },
            HistoryEntry {
                role: Role::User,
                content: "first?".to_string(),
            },
            HistoryEntry {
                role: Role::Assistant,
                content: "first answer".to_string(),
            },
        ]
    );
}

#[test]
fn blank_question_is_ignored() {
    init_logging();
    let state = ready_session("d1");
    let (mut state, _) = update(state, Msg::InputChanged("   ".to_string()));
    state.consume_dirty();
    let (mut state, effects) = update(state, Msg::QuestionSubmitted);

    assert!(effects.is_empty());
    assert_eq!(state.messages().len(), 1);
    assert!(!state.consume_dirty());
    assert!(state.pending().is_none());
}

#[test]
fn question_without_document_is_ignored() {
    init_logging();
    let (state, effects) = submit_question(AppState::new(), "hello?");
    assert!(effects.is_empty());
    assert!(state.messages().is_empty());
}

#[test]
fn summary_success_replaces_previous_and_reads_it() {
    init_logging();
    let state = ready_session("d1");
    let (state, effects) = update(state, Msg::SummarizeClicked);
    let request_id = request_id_of(&effects);
    assert_eq!(
        effects,
        vec![
            Effect::Speech(SpeechCommand::CancelAll),
            Effect::FetchSummary {
                request_id,
                document_id: "d1".to_string(),
            },
        ]
    );
    let (state, _) = update(
        state,
        Msg::SummaryReceived {
            request_id,
            result: Ok("old summary".to_string()),
        },
    );

    let (state, effects) = update(state, Msg::SummarizeClicked);
    let (state, effects) = update(
        state,
        Msg::SummaryReceived {
            request_id: request_id_of(&effects),
            result: Ok("new summary".to_string()),
        },
    );

    assert_eq!(state.summary(), Some("new summary"));
    assert!(state.playback().is_reading("new summary"));
    assert!(effects.iter().any(|effect| matches!(
        effect,
        Effect::Speech(SpeechCommand::Speak { text, .. }) if text == "new summary"
    )));
    let summary_view = state.view().summary.unwrap();
    assert!(summary_view.is_reading);
}

#[test]
fn summary_failure_keeps_previous_summary() {
    init_logging();
    let state = ready_session("d1");
    let (state, effects) = update(state, Msg::SummarizeClicked);
    let (state, _) = update(
        state,
        Msg::SummaryReceived {
            request_id: request_id_of(&effects),
            result: Ok("kept".to_string()),
        },
    );

    let (state, effects) = update(state, Msg::SummarizeClicked);
    let (state, effects) = update(
        state,
        Msg::SummaryReceived {
            request_id: request_id_of(&effects),
            result: Err(failure()),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.summary(), Some("kept"));
    assert_eq!(state.notice(), Some(SUMMARY_FAILED_NOTICE));
    assert_eq!(state.playback().current_text(), None);

    let (state, _) = update(state, Msg::NoticeDismissed);
    assert_eq!(state.notice(), None);
}

#[test]
fn delete_resets_state_regardless_of_backend_result() {
    init_logging();
    for result in [Ok(()), Err(failure())] {
        let state = ready_session("d1");
        let (state, effects) = update(state, Msg::SummarizeClicked);
        let (state, _) = update(
            state,
            Msg::SummaryReceived {
                request_id: request_id_of(&effects),
                result: Ok("summary".to_string()),
            },
        );

        let (state, effects) = update(state, Msg::DeleteClicked);
        let request_id = request_id_of(&effects);
        assert_eq!(
            effects,
            vec![
                Effect::Speech(SpeechCommand::CancelAll),
                Effect::DeleteDocument {
                    request_id,
                    document_id: "d1".to_string(),
                },
            ]
        );
        assert_eq!(state.playback().current_text(), None);

        let (state, effects) = update(state, Msg::DeleteFinished { request_id, result });
        assert!(effects.is_empty());
        assert_eq!(state.session_state(), SessionState::NoDocument);
        assert_eq!(state.document_id(), None);
        assert!(state.messages().is_empty());
        assert_eq!(state.summary(), None);
        assert_eq!(state.view().file_name, None);
    }
}

#[test]
fn requests_are_rejected_while_one_is_outstanding() {
    init_logging();
    let state = ready_session("d1");
    let (state, effects) = submit_question(state, "first?");
    let pending = state.pending().unwrap();
    assert_eq!(pending.id, request_id_of(&effects));

    let (state, effects) = update(state, Msg::SummarizeClicked);
    assert!(effects.is_empty());
    let (state, effects) = update(state, Msg::DeleteClicked);
    assert!(effects.is_empty());
    let (state, effects) = submit_question(state, "second?");
    assert!(effects.is_empty());

    assert_eq!(state.pending(), Some(pending));
    assert_eq!(state.messages().len(), 2);
    // The rejected draft is left in place for the user to resend.
    assert_eq!(state.draft(), "second?");
}

#[test]
fn stale_responses_are_ignored() {
    init_logging();
    let state = ready_session("d1");
    let (state, effects) = submit_question(state, "question?");
    let request_id = request_id_of(&effects);
    let before = state.clone();

    let (state, effects) = update(
        state,
        Msg::AnswerReceived {
            request_id: request_id + 100,
            result: Ok(answer("late", Vec::new())),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.messages(), before.messages());

    let (state, effects) = update(
        state,
        Msg::SummaryReceived {
            request_id,
            result: Ok("wrong kind".to_string()),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.summary(), None);
    assert_eq!(state.pending(), before.pending());
}

#[test]
fn speech_completion_clears_indicator_but_stale_completion_does_not() {
    init_logging();
    let state = ready_session("d1");
    let welcome_id = state.playback().current_utterance().unwrap();

    let (state, _) = update(state, Msg::ReadAloudToggled("other text".to_string()));
    let (state, _) = update(
        state,
        Msg::SpeechFinished {
            utterance_id: welcome_id,
        },
    );
    assert_eq!(state.view().reading.as_deref(), Some("other text"));

    let current = state.playback().current_utterance().unwrap();
    let (state, _) = update(
        state,
        Msg::SpeechFailed {
            utterance_id: current,
            reason: "audio-busy".to_string(),
        },
    );
    assert_eq!(state.view().reading, None);
}

#[test]
fn toggling_message_twice_stops_it() {
    init_logging();
    let state = ready_session("d1");
    let (state, effects) = update(state, Msg::ReadAloudToggled(WELCOME_MESSAGE.to_string()));
    assert_eq!(effects, vec![Effect::Speech(SpeechCommand::CancelAll)]);
    assert!(!state.view().messages[0].is_reading);

    let (state, effects) = update(state, Msg::ReadAloudToggled(WELCOME_MESSAGE.to_string()));
    assert_eq!(effects.len(), 2);
    assert!(state.view().messages[0].is_reading);
}

#[test]
fn shutdown_cancels_playback() {
    init_logging();
    let state = ready_session("d1");
    let (state, effects) = update(state, Msg::Shutdown);
    assert_eq!(effects, vec![Effect::Speech(SpeechCommand::CancelAll)]);
    assert_eq!(state.playback().current_text(), None);
}
