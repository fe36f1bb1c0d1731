//! Read-aloud output.
//!
//! [`SpeechEngine`] plays one text to completion. [`Narrator`] owns the
//! single in-flight utterance: a new `speak` cancels the previous one, and
//! a cancelled utterance never reports back.

use std::io;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use docqa_logging::{docqa_debug, docqa_warn};
use thiserror::Error;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, EventSink, UtteranceId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechSettings {
    /// Text-to-speech program; the text is passed as its last argument.
    pub program: String,
    pub args: Vec<String>,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            program: "espeak-ng".to_string(),
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("failed to start speech program {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("failed waiting for speech program: {0}")]
    Wait(#[source] io::Error),
    #[error("speech program exited with {0}")]
    ExitStatus(ExitStatus),
}

#[async_trait::async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Plays `text` and resolves when playback ends. Dropping the future
    /// must silence the output.
    async fn speak(&self, text: &str) -> Result<(), SpeechError>;
}

/// Runs an external synthesizer such as `espeak-ng` or `say`.
#[derive(Debug, Clone)]
pub struct CommandSpeechEngine {
    settings: SpeechSettings,
}

impl CommandSpeechEngine {
    pub fn new(settings: SpeechSettings) -> Self {
        Self { settings }
    }
}

#[async_trait::async_trait]
impl SpeechEngine for CommandSpeechEngine {
    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        let mut child = Command::new(&self.settings.program)
            .args(&self.settings.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            // Cancellation drops this future; the child must die with it.
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SpeechError::Spawn {
                program: self.settings.program.clone(),
                source,
            })?;

        let status = child.wait().await.map_err(SpeechError::Wait)?;
        if status.success() {
            Ok(())
        } else {
            Err(SpeechError::ExitStatus(status))
        }
    }
}

pub struct Narrator {
    engine: Arc<dyn SpeechEngine>,
    sink: Arc<dyn EventSink>,
    runtime: tokio::runtime::Handle,
    current: Option<(UtteranceId, CancellationToken)>,
}

impl Narrator {
    pub fn new(
        engine: Arc<dyn SpeechEngine>,
        sink: Arc<dyn EventSink>,
        runtime: tokio::runtime::Handle,
    ) -> Self {
        Self {
            engine,
            sink,
            runtime,
            current: None,
        }
    }

    pub fn speak(&mut self, utterance_id: UtteranceId, text: String) {
        self.cancel_all();

        let token = CancellationToken::new();
        self.current = Some((utterance_id, token.clone()));
        let engine = self.engine.clone();
        let sink = self.sink.clone();
        self.runtime.spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    docqa_debug!("Utterance {} cancelled", utterance_id);
                }
                result = engine.speak(&text) => match result {
                    Ok(()) => sink.emit(EngineEvent::SpeechFinished { utterance_id }),
                    Err(err) => {
                        docqa_warn!("Utterance {} failed: {}", utterance_id, err);
                        sink.emit(EngineEvent::SpeechFailed {
                            utterance_id,
                            reason: err.to_string(),
                        });
                    }
                },
            }
        });
    }

    /// Cancels the in-flight utterance, if any. Idempotent.
    pub fn cancel_all(&mut self) {
        if let Some((utterance_id, token)) = self.current.take() {
            docqa_debug!("Cancelling utterance {}", utterance_id);
            token.cancel();
        }
    }
}

impl Drop for Narrator {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
