//! DocQA engine: backend REST client, speech output and effect execution.
mod backend;
mod engine;
mod speech;
mod types;

pub use backend::{Backend, BackendSettings, ReqwestBackend};
pub use engine::{upload_file, BackendRequest, ChannelEventSink, EngineHandle, EventSink};
pub use speech::{CommandSpeechEngine, Narrator, SpeechEngine, SpeechError, SpeechSettings};
pub use types::{
    ApiError, AskRequest, AskResponse, CitationDto, EngineEvent, FailureKind, HistoryTurn,
    RequestId, SummaryResponse, UploadResponse, UtteranceId,
};
