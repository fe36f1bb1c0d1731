use std::path::{Path, PathBuf};

use docqa_logging::docqa_debug;

use crate::view_model::{AppViewModel, MessageView, SummaryView};
use crate::{Effect, HistoryEntry, Message, PlaybackController, UtteranceId};

pub type RequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    NoDocument,
    DocumentReady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Upload,
    Ask,
    Summary,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRequest {
    pub id: RequestId,
    pub kind: RequestKind,
}

/// The uploaded document the conversation is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub document_id: String,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    session: Option<Session>,
    selected_file: Option<PathBuf>,
    draft: String,
    messages: Vec<Message>,
    summary: Option<String>,
    pending: Option<PendingRequest>,
    last_request_id: RequestId,
    notice: Option<String>,
    playback: PlaybackController,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let messages = self
            .messages
            .iter()
            .map(|message| MessageView {
                role: message.role,
                content: message.content.clone(),
                citations: message.citations.clone(),
                is_reading: self.playback.is_reading(&message.content),
            })
            .collect();
        let summary = self.summary.as_ref().map(|text| SummaryView {
            text: text.clone(),
            is_reading: self.playback.is_reading(text),
        });
        let file_name = match &self.session {
            Some(session) => Some(session.file_name.clone()),
            None => self.selected_file.as_deref().map(display_name),
        };

        AppViewModel {
            session: self.session_state(),
            file_name,
            messages,
            summary,
            busy: self.pending.map(|pending| pending.kind),
            notice: self.notice.clone(),
            reading: self.playback.current_text().map(ToOwned::to_owned),
            can_upload: self.session.is_none()
                && self.selected_file.is_some()
                && self.pending.is_none(),
        }
    }

    /// Returns whether the state changed since the last call and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn session_state(&self) -> SessionState {
        if self.session.is_some() {
            SessionState::DocumentReady
        } else {
            SessionState::NoDocument
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn document_id(&self) -> Option<&str> {
        self.session
            .as_ref()
            .map(|session| session.document_id.as_str())
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn selected_file(&self) -> Option<&Path> {
        self.selected_file.as_deref()
    }

    pub fn pending(&self) -> Option<PendingRequest> {
        self.pending
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    /// Conversation so far, reduced to what the backend accepts as history.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.messages.iter().map(Message::to_history).collect()
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn select_file(&mut self, path: PathBuf) {
        self.selected_file = Some(path);
        self.mark_dirty();
    }

    pub(crate) fn set_draft(&mut self, text: String) {
        if self.draft != text {
            self.draft = text;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_notice(&mut self, notice: &str) {
        self.notice = Some(notice.to_owned());
        self.mark_dirty();
    }

    pub(crate) fn dismiss_notice(&mut self) {
        if self.notice.take().is_some() {
            self.mark_dirty();
        }
    }

    /// Claims the single request slot. Callers check `pending()` first.
    pub(crate) fn begin_request(&mut self, kind: RequestKind) -> RequestId {
        self.last_request_id += 1;
        let id = self.last_request_id;
        self.pending = Some(PendingRequest { id, kind });
        self.notice = None;
        self.mark_dirty();
        id
    }

    /// Releases the request slot if `request_id` is the outstanding request.
    pub(crate) fn finish_request(&mut self, request_id: RequestId, kind: RequestKind) -> bool {
        match self.pending {
            Some(pending) if pending.id == request_id && pending.kind == kind => {
                self.pending = None;
                self.mark_dirty();
                true
            }
            _ => {
                docqa_debug!(
                    "Ignoring stale {:?} response request_id={} pending={:?}",
                    kind,
                    request_id,
                    self.pending
                );
                false
            }
        }
    }

    pub(crate) fn open_session(&mut self, document_id: String, welcome: &str) {
        let file_name = self
            .selected_file
            .as_deref()
            .map(display_name)
            .unwrap_or_default();
        self.session = Some(Session {
            document_id,
            file_name,
        });
        self.messages = vec![Message::assistant(welcome)];
        self.summary = None;
        self.mark_dirty();
    }

    pub(crate) fn close_session(&mut self) {
        self.session = None;
        self.selected_file = None;
        self.draft.clear();
        self.messages.clear();
        self.summary = None;
        self.mark_dirty();
    }

    pub(crate) fn push_message(&mut self, message: Message) {
        self.messages.push(message);
        self.mark_dirty();
    }

    pub(crate) fn clear_draft(&mut self) {
        self.set_draft(String::new());
    }

    pub(crate) fn set_summary(&mut self, summary: String) {
        self.summary = Some(summary);
        self.mark_dirty();
    }

    pub(crate) fn start_reading(&mut self, text: &str) -> Vec<Effect> {
        let commands = self.playback.start(text);
        if !commands.is_empty() {
            self.mark_dirty();
        }
        commands.into_iter().map(Effect::Speech).collect()
    }

    pub(crate) fn stop_reading(&mut self) -> Effect {
        if self.playback.current_text().is_some() {
            self.mark_dirty();
        }
        Effect::Speech(self.playback.stop())
    }

    pub(crate) fn toggle_reading(&mut self, text: &str) -> Vec<Effect> {
        let commands = self.playback.toggle(text);
        if !commands.is_empty() {
            self.mark_dirty();
        }
        commands.into_iter().map(Effect::Speech).collect()
    }

    pub(crate) fn speech_finished(&mut self, utterance_id: UtteranceId) {
        if self.playback.finished(utterance_id) {
            self.mark_dirty();
        }
    }

    pub(crate) fn speech_failed(&mut self, utterance_id: UtteranceId, reason: &str) {
        if self.playback.failed(utterance_id, reason) {
            self.mark_dirty();
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
