//! DocQA core: pure session state machine, read-aloud playback controller
//! and view-model helpers.
mod conversation;
mod effect;
mod msg;
mod playback;
mod state;
mod update;
mod view_model;

pub use conversation::{Answer, Citation, HistoryEntry, Message, Role};
pub use effect::Effect;
pub use msg::{Msg, RequestFailure};
pub use playback::{PlaybackController, SpeechCommand, UtteranceId};
pub use state::{AppState, PendingRequest, RequestId, RequestKind, Session, SessionState};
pub use update::{
    update, ANSWER_FAILED_MESSAGE, SUMMARY_FAILED_NOTICE, UPLOAD_FAILED_NOTICE, WELCOME_MESSAGE,
};
pub use view_model::{AppViewModel, MessageView, SummaryView};
