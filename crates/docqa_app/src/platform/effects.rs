use std::sync::{mpsc, Arc};

use docqa_core::{Answer, Citation, Effect, HistoryEntry, Msg, RequestFailure, SpeechCommand};
use docqa_engine::{
    ApiError, AskRequest, BackendRequest, EngineEvent, EngineHandle, EventSink, HistoryTurn,
};
use docqa_logging::{docqa_debug, docqa_info};

use super::config::AppConfig;
use super::AppEvent;

/// Executes core effects on the engine and feeds engine events back as messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(config: &AppConfig, events: mpsc::Sender<AppEvent>) -> Result<Self, ApiError> {
        let sink = Arc::new(MsgSink { tx: events });
        let engine = EngineHandle::with_settings(
            config.backend_settings(),
            config.speech_settings(),
            sink,
        )?;
        Ok(Self { engine })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::UploadDocument { request_id, path } => {
                    docqa_info!("UploadDocument request_id={} path={:?}", request_id, path);
                    self.engine.submit(request_id, BackendRequest::Upload { path });
                }
                Effect::AskQuestion {
                    request_id,
                    document_id,
                    question,
                    history,
                } => {
                    docqa_info!(
                        "AskQuestion request_id={} doc_id={} history_len={}",
                        request_id,
                        document_id,
                        history.len()
                    );
                    self.engine.submit(
                        request_id,
                        BackendRequest::Ask(ask_request(document_id, question, history)),
                    );
                }
                Effect::FetchSummary {
                    request_id,
                    document_id,
                } => {
                    docqa_info!("FetchSummary request_id={} doc_id={}", request_id, document_id);
                    self.engine.submit(
                        request_id,
                        BackendRequest::Summary {
                            doc_id: document_id,
                        },
                    );
                }
                Effect::DeleteDocument {
                    request_id,
                    document_id,
                } => {
                    docqa_info!("DeleteDocument request_id={} doc_id={}", request_id, document_id);
                    self.engine.submit(
                        request_id,
                        BackendRequest::Delete {
                            doc_id: document_id,
                        },
                    );
                }
                Effect::Speech(SpeechCommand::Speak { utterance_id, text }) => {
                    docqa_debug!("Speak utterance_id={} chars={}", utterance_id, text.len());
                    self.engine.speak(utterance_id, text);
                }
                Effect::Speech(SpeechCommand::CancelAll) => self.engine.cancel_speech(),
            }
        }
    }
}

struct MsgSink {
    tx: mpsc::Sender<AppEvent>,
}

impl EventSink for MsgSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(AppEvent::Engine(map_event(event)));
    }
}

fn ask_request(document_id: String, question: String, history: Vec<HistoryEntry>) -> AskRequest {
    AskRequest {
        doc_id: document_id,
        question,
        history: history
            .into_iter()
            .map(|entry| HistoryTurn {
                role: entry.role.as_str().to_string(),
                content: entry.content,
            })
            .collect(),
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::UploadFinished { request_id, result } => Msg::UploadFinished {
            request_id,
            result: result.map_err(map_failure),
        },
        EngineEvent::AnswerReceived { request_id, result } => Msg::AnswerReceived {
            request_id,
            result: result.map_err(map_failure).map(|response| Answer {
                text: response.answer,
                citations: response
                    .citations
                    .into_iter()
                    .map(|citation| Citation {
                        page: citation.page,
                        content: citation.content,
                    })
                    .collect(),
            }),
        },
        EngineEvent::SummaryReceived { request_id, result } => Msg::SummaryReceived {
            request_id,
            result: result.map_err(map_failure),
        },
        EngineEvent::DeleteFinished { request_id, result } => Msg::DeleteFinished {
            request_id,
            result: result.map_err(map_failure),
        },
        EngineEvent::SpeechFinished { utterance_id } => Msg::SpeechFinished { utterance_id },
        EngineEvent::SpeechFailed {
            utterance_id,
            reason,
        } => Msg::SpeechFailed {
            utterance_id,
            reason,
        },
    }
}

fn map_failure(err: ApiError) -> RequestFailure {
    RequestFailure::new(err.kind.to_string(), err.message)
}
