use std::io;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use docqa_logging::{docqa_debug, docqa_info};

use crate::backend::{Backend, BackendSettings, ReqwestBackend};
use crate::speech::{CommandSpeechEngine, Narrator, SpeechEngine, SpeechSettings};
use crate::{ApiError, AskRequest, EngineEvent, FailureKind, RequestId, UtteranceId};

/// Receives engine events; called from runtime worker threads.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendRequest {
    Upload { path: PathBuf },
    Ask(AskRequest),
    Summary { doc_id: String },
    Delete { doc_id: String },
}

enum EngineCommand {
    Request {
        request_id: RequestId,
        request: BackendRequest,
    },
    Speak {
        utterance_id: UtteranceId,
        text: String,
    },
    CancelSpeech,
    Shutdown,
}

/// Executes backend requests and speech on a background tokio runtime.
///
/// Requests run concurrently; speech is limited to one utterance. Dropping
/// the handle cancels speech and stops the runtime.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    worker: Option<thread::JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(
        backend: Arc<dyn Backend>,
        speech: Arc<dyn SpeechEngine>,
        sink: Arc<dyn EventSink>,
    ) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("docqa-engine")
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();

        let worker = thread::Builder::new()
            .name("docqa-engine-commands".to_string())
            .spawn(move || {
                let mut narrator = Narrator::new(speech, sink.clone(), runtime.handle().clone());
                while let Ok(command) = cmd_rx.recv() {
                    match command {
                        EngineCommand::Request {
                            request_id,
                            request,
                        } => {
                            let backend = backend.clone();
                            let sink = sink.clone();
                            runtime.spawn(async move {
                                let event =
                                    execute_request(backend.as_ref(), request_id, request).await;
                                sink.emit(event);
                            });
                        }
                        EngineCommand::Speak { utterance_id, text } => {
                            narrator.speak(utterance_id, text);
                        }
                        EngineCommand::CancelSpeech => narrator.cancel_all(),
                        EngineCommand::Shutdown => break,
                    }
                }
                narrator.cancel_all();
                runtime.shutdown_timeout(Duration::from_millis(500));
                docqa_info!("Engine stopped");
            })?;

        Ok(Self {
            cmd_tx,
            worker: Some(worker),
        })
    }

    /// Engine talking to the REST backend and a command-line synthesizer.
    pub fn with_settings(
        backend: BackendSettings,
        speech: SpeechSettings,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, ApiError> {
        let backend = Arc::new(ReqwestBackend::new(backend)?);
        let speech = Arc::new(CommandSpeechEngine::new(speech));
        Self::new(backend, speech, sink)
            .map_err(|err| ApiError::new(FailureKind::Io, err.to_string()))
    }

    pub fn submit(&self, request_id: RequestId, request: BackendRequest) {
        self.send(EngineCommand::Request {
            request_id,
            request,
        });
    }

    pub fn speak(&self, utterance_id: UtteranceId, text: impl Into<String>) {
        self.send(EngineCommand::Speak {
            utterance_id,
            text: text.into(),
        });
    }

    pub fn cancel_speech(&self) {
        self.send(EngineCommand::CancelSpeech);
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            docqa_debug!("Engine command dropped: worker has stopped");
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.send(EngineCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

async fn execute_request(
    backend: &dyn Backend,
    request_id: RequestId,
    request: BackendRequest,
) -> EngineEvent {
    match request {
        BackendRequest::Upload { path } => EngineEvent::UploadFinished {
            request_id,
            result: upload_file(backend, &path).await,
        },
        BackendRequest::Ask(ask) => EngineEvent::AnswerReceived {
            request_id,
            result: backend.ask(&ask).await,
        },
        BackendRequest::Summary { doc_id } => EngineEvent::SummaryReceived {
            request_id,
            result: backend.summary(&doc_id).await,
        },
        BackendRequest::Delete { doc_id } => EngineEvent::DeleteFinished {
            request_id,
            result: backend.delete(&doc_id).await,
        },
    }
}

/// Reads a local PDF and hands it to the backend.
pub async fn upload_file(backend: &dyn Backend, path: &Path) -> Result<String, ApiError> {
    let is_pdf = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        return Err(ApiError::new(
            FailureKind::InvalidFile,
            format!("{} is not a PDF", path.display()),
        ));
    }
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.pdf".to_string());
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|err| ApiError::new(FailureKind::Io, format!("{}: {err}", path.display())))?;
    docqa_info!("Uploading {} ({} bytes)", file_name, bytes.len());
    backend.upload(&file_name, bytes).await
}
