use docqa_logging::{docqa_debug, docqa_info, docqa_warn};

use crate::{AppState, Effect, Message, Msg, RequestKind, SessionState};

pub const WELCOME_MESSAGE: &str =
    "Document successfully analyzed! What would you like to know about it?";
pub const ANSWER_FAILED_MESSAGE: &str = "Sorry, an error occurred while generating the answer.";
pub const UPLOAD_FAILED_NOTICE: &str = "Error uploading document. Please ensure it is a valid PDF.";
pub const SUMMARY_FAILED_NOTICE: &str = "Error generating summary. Document might be too large.";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FileSelected(path) => {
            // The file picker is only shown while no document is loaded and
            // stays disabled while a request is in flight.
            if state.session_state() == SessionState::NoDocument && state.pending().is_none() {
                state.select_file(path);
            } else {
                docqa_debug!("File selection ignored: {:?}", path);
            }
            Vec::new()
        }
        Msg::UploadClicked => upload_clicked(&mut state),
        Msg::UploadFinished { request_id, result } => {
            if !state.finish_request(request_id, RequestKind::Upload) {
                return (state, Vec::new());
            }
            match result {
                Ok(document_id) => {
                    docqa_info!("Document accepted doc_id={}", document_id);
                    state.open_session(document_id, WELCOME_MESSAGE);
                    state.start_reading(WELCOME_MESSAGE)
                }
                Err(failure) => {
                    docqa_warn!("Upload failed: {}", failure);
                    state.set_notice(UPLOAD_FAILED_NOTICE);
                    Vec::new()
                }
            }
        }
        Msg::InputChanged(text) => {
            state.set_draft(text);
            Vec::new()
        }
        Msg::QuestionSubmitted => question_submitted(&mut state),
        Msg::AnswerReceived { request_id, result } => {
            if !state.finish_request(request_id, RequestKind::Ask) {
                return (state, Vec::new());
            }
            match result {
                Ok(answer) => {
                    let text = answer.text.clone();
                    state.push_message(Message::answer(answer));
                    state.start_reading(&text)
                }
                Err(failure) => {
                    // Failures are appended but never narrated.
                    docqa_warn!("Ask failed: {}", failure);
                    state.push_message(Message::assistant(ANSWER_FAILED_MESSAGE));
                    Vec::new()
                }
            }
        }
        Msg::SummarizeClicked => summarize_clicked(&mut state),
        Msg::SummaryReceived { request_id, result } => {
            if !state.finish_request(request_id, RequestKind::Summary) {
                return (state, Vec::new());
            }
            match result {
                Ok(summary) => {
                    state.set_summary(summary.clone());
                    state.start_reading(&summary)
                }
                Err(failure) => {
                    docqa_warn!("Summary failed: {}", failure);
                    state.set_notice(SUMMARY_FAILED_NOTICE);
                    Vec::new()
                }
            }
        }
        Msg::DeleteClicked => delete_clicked(&mut state),
        Msg::DeleteFinished { request_id, result } => {
            if !state.finish_request(request_id, RequestKind::Delete) {
                return (state, Vec::new());
            }
            // Best-effort: local state is reset whatever the backend said.
            if let Err(failure) = result {
                docqa_warn!("Delete failed, clearing local session anyway: {}", failure);
            }
            state.close_session();
            Vec::new()
        }
        Msg::ReadAloudToggled(text) => state.toggle_reading(&text),
        Msg::StopReadingClicked | Msg::Shutdown => vec![state.stop_reading()],
        Msg::SpeechFinished { utterance_id } => {
            state.speech_finished(utterance_id);
            Vec::new()
        }
        Msg::SpeechFailed {
            utterance_id,
            reason,
        } => {
            state.speech_failed(utterance_id, &reason);
            Vec::new()
        }
        Msg::NoticeDismissed => {
            state.dismiss_notice();
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn upload_clicked(state: &mut AppState) -> Vec<Effect> {
    if !request_allowed(state, RequestKind::Upload, SessionState::NoDocument) {
        return Vec::new();
    }
    let Some(path) = state.selected_file().map(ToOwned::to_owned) else {
        docqa_debug!("Upload ignored: no file selected");
        return Vec::new();
    };
    let request_id = state.begin_request(RequestKind::Upload);
    vec![Effect::UploadDocument { request_id, path }]
}

fn question_submitted(state: &mut AppState) -> Vec<Effect> {
    let question = state.draft().trim().to_owned();
    if question.is_empty() {
        return Vec::new();
    }
    if !request_allowed(state, RequestKind::Ask, SessionState::DocumentReady) {
        return Vec::new();
    }
    let Some(document_id) = state.document_id().map(ToOwned::to_owned) else {
        return Vec::new();
    };

    let mut effects = vec![state.stop_reading()];
    // History is captured before the new question joins the log.
    let history = state.history();
    state.push_message(Message::user(question.clone()));
    state.clear_draft();
    let request_id = state.begin_request(RequestKind::Ask);
    effects.push(Effect::AskQuestion {
        request_id,
        document_id,
        question,
        history,
    });
    effects
}

fn summarize_clicked(state: &mut AppState) -> Vec<Effect> {
    if !request_allowed(state, RequestKind::Summary, SessionState::DocumentReady) {
        return Vec::new();
    }
    let Some(document_id) = state.document_id().map(ToOwned::to_owned) else {
        return Vec::new();
    };
    let stop = state.stop_reading();
    let request_id = state.begin_request(RequestKind::Summary);
    vec![
        stop,
        Effect::FetchSummary {
            request_id,
            document_id,
        },
    ]
}

fn delete_clicked(state: &mut AppState) -> Vec<Effect> {
    if !request_allowed(state, RequestKind::Delete, SessionState::DocumentReady) {
        return Vec::new();
    }
    let Some(document_id) = state.document_id().map(ToOwned::to_owned) else {
        return Vec::new();
    };
    let stop = state.stop_reading();
    let request_id = state.begin_request(RequestKind::Delete);
    vec![
        stop,
        Effect::DeleteDocument {
            request_id,
            document_id,
        },
    ]
}

/// Single-slot guard: one outstanding backend request at a time, and only
/// from the session state the request belongs to.
fn request_allowed(state: &AppState, kind: RequestKind, required: SessionState) -> bool {
    if state.session_state() != required {
        docqa_debug!(
            "{:?} rejected in session state {:?}",
            kind,
            state.session_state()
        );
        return false;
    }
    if let Some(pending) = state.pending() {
        docqa_debug!(
            "{:?} rejected while {:?} request {} is outstanding",
            kind,
            pending.kind,
            pending.id
        );
        return false;
    }
    true
}
