use std::fmt;
use std::path::PathBuf;

use crate::{Answer, RequestId, UtteranceId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked a file to upload.
    FileSelected(PathBuf),
    /// User clicked Upload.
    UploadClicked,
    /// Backend answered the upload with a document id.
    UploadFinished {
        request_id: RequestId,
        result: Result<String, RequestFailure>,
    },
    /// User edited the question input.
    InputChanged(String),
    /// User submitted the current question.
    QuestionSubmitted,
    /// Backend answered a question.
    AnswerReceived {
        request_id: RequestId,
        result: Result<Answer, RequestFailure>,
    },
    /// User asked for a summary.
    SummarizeClicked,
    SummaryReceived {
        request_id: RequestId,
        result: Result<String, RequestFailure>,
    },
    /// User clicked Delete.
    DeleteClicked,
    DeleteFinished {
        request_id: RequestId,
        result: Result<(), RequestFailure>,
    },
    /// User clicked Listen/Stop next to a message or the summary.
    ReadAloudToggled(String),
    /// User asked to silence playback.
    StopReadingClicked,
    /// Speech engine finished an utterance.
    SpeechFinished { utterance_id: UtteranceId },
    /// Speech engine failed an utterance.
    SpeechFailed {
        utterance_id: UtteranceId,
        reason: String,
    },
    /// User acknowledged the blocking notice.
    NoticeDismissed,
    /// The hosting app is going away.
    Shutdown,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}

/// Engine-agnostic description of a failed backend request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFailure {
    pub kind: String,
    pub message: String,
}

impl RequestFailure {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}
