//! Read-aloud playback controller.
//!
//! The controller never talks to a speech engine itself. Every operation
//! returns the [`SpeechCommand`]s the platform has to forward, and the
//! engine reports back through [`PlaybackController::finished`] and
//! [`PlaybackController::failed`] with the utterance id it was given.

use docqa_logging::{docqa_debug, docqa_warn};

/// Sequence number stamped on every started utterance.
pub type UtteranceId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechCommand {
    /// Synthesize and play `text`; completion is reported with `utterance_id`.
    Speak {
        utterance_id: UtteranceId,
        text: String,
    },
    /// Cancel whatever is playing or queued. Idempotent.
    CancelAll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Utterance {
    id: UtteranceId,
    text: String,
}

/// Owns the single "currently reading" value.
///
/// At most one utterance is current at any time. Completion and error
/// events only reset the state when they carry the id of the current
/// utterance, so a superseded utterance can never clear a newer one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaybackController {
    current: Option<Utterance>,
    last_id: UtteranceId,
}

impl PlaybackController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels any playback and clears the current utterance.
    pub fn stop(&mut self) -> SpeechCommand {
        if let Some(utterance) = self.current.take() {
            docqa_debug!("Playback stopped utterance_id={}", utterance.id);
        }
        SpeechCommand::CancelAll
    }

    /// Starts reading `text`, pre-empting anything already playing.
    ///
    /// Blank text is a no-op and leaves current playback untouched.
    pub fn start(&mut self, text: &str) -> Vec<SpeechCommand> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let cancel = self.stop();
        self.last_id += 1;
        let utterance_id = self.last_id;
        self.current = Some(Utterance {
            id: utterance_id,
            text: text.to_owned(),
        });
        docqa_debug!(
            "Playback started utterance_id={} text={:?}",
            utterance_id,
            docqa_logging::excerpt(text, 40)
        );
        vec![
            cancel,
            SpeechCommand::Speak {
                utterance_id,
                text: text.to_owned(),
            },
        ]
    }

    /// Stops if `text` is the one being read, otherwise starts reading it.
    pub fn toggle(&mut self, text: &str) -> Vec<SpeechCommand> {
        if self.is_reading(text) {
            vec![self.stop()]
        } else {
            self.start(text)
        }
    }

    /// Natural completion of an utterance. Returns true if state changed.
    pub fn finished(&mut self, utterance_id: UtteranceId) -> bool {
        self.settle(utterance_id)
    }

    /// Playback error. Absorbed and treated like completion.
    pub fn failed(&mut self, utterance_id: UtteranceId, reason: &str) -> bool {
        docqa_warn!("Speech failed utterance_id={utterance_id}: {reason}");
        self.settle(utterance_id)
    }

    pub fn is_reading(&self, text: &str) -> bool {
        self.current_text() == Some(text)
    }

    pub fn current_text(&self) -> Option<&str> {
        self.current.as_ref().map(|utterance| utterance.text.as_str())
    }

    pub fn current_utterance(&self) -> Option<UtteranceId> {
        self.current.as_ref().map(|utterance| utterance.id)
    }

    fn settle(&mut self, utterance_id: UtteranceId) -> bool {
        match &self.current {
            Some(utterance) if utterance.id == utterance_id => {
                self.current = None;
                true
            }
            _ => {
                docqa_debug!("Discarding stale speech event utterance_id={utterance_id}");
                false
            }
        }
    }
}
