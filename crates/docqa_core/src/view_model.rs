use crate::{Citation, RequestKind, Role, SessionState};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub session: SessionState,
    /// Uploaded document name, or the selected file before upload.
    pub file_name: Option<String>,
    pub messages: Vec<MessageView>,
    pub summary: Option<SummaryView>,
    pub busy: Option<RequestKind>,
    pub notice: Option<String>,
    /// Text currently being read aloud.
    pub reading: Option<String>,
    pub can_upload: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub role: Role,
    pub content: String,
    pub citations: Vec<Citation>,
    /// Drives the Listen/Stop label.
    pub is_reading: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryView {
    pub text: String,
    pub is_reading: bool,
}
