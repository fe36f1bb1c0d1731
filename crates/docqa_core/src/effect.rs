use std::path::PathBuf;

use crate::{HistoryEntry, RequestId, SpeechCommand};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    UploadDocument {
        request_id: RequestId,
        path: PathBuf,
    },
    AskQuestion {
        request_id: RequestId,
        document_id: String,
        question: String,
        history: Vec<HistoryEntry>,
    },
    FetchSummary {
        request_id: RequestId,
        document_id: String,
    },
    DeleteDocument {
        request_id: RequestId,
        document_id: String,
    },
    Speech(SpeechCommand),
}
