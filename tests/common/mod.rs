//! Shared test utilities
#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use neural_terminal::client::{
    ChatExchangeRequest, Clipboard, ExportSink, Gateway, GatewayError, GatewayReply,
    KeyValueStore, Transcription,
};
use neural_terminal::session::Severity;
use neural_terminal::voice::{AudioChunk, AudioPayload, AudioSource, CaptureFormat, CaptureHandle};
use neural_terminal::{Error, Result, SessionController};

#[derive(Default)]
struct GatewayState {
    chat_requests: Vec<ChatExchangeRequest>,
    uploads: Vec<AudioPayload>,
    replies: VecDeque<std::result::Result<GatewayReply, GatewayError>>,
    transcriptions: VecDeque<std::result::Result<Transcription, GatewayError>>,
}

/// Gateway that records every call and answers from a script
///
/// Unscripted chat calls echo the message back; unscripted transcriptions
/// recognize nothing.
#[derive(Clone, Default)]
pub struct FakeGateway {
    state: Arc<Mutex<GatewayState>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_reply(&self, reply: std::result::Result<GatewayReply, GatewayError>) {
        self.state.lock().unwrap().replies.push_back(reply);
    }

    pub fn reply_with(&self, text: &str) {
        self.push_reply(Ok(GatewayReply {
            reply: text.to_string(),
            debug: None,
        }));
    }

    pub fn push_transcription(&self, result: std::result::Result<Transcription, GatewayError>) {
        self.state.lock().unwrap().transcriptions.push_back(result);
    }

    pub fn transcribe_as(&self, text: &str) {
        self.push_transcription(Ok(Transcription {
            text: text.to_string(),
            confidence: None,
        }));
    }

    pub fn chat_requests(&self) -> Vec<ChatExchangeRequest> {
        self.state.lock().unwrap().chat_requests.clone()
    }

    pub fn uploads(&self) -> Vec<AudioPayload> {
        self.state.lock().unwrap().uploads.clone()
    }

    /// Chat and transcription calls combined
    pub fn call_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.chat_requests.len() + state.uploads.len()
    }

    pub fn shared(&self) -> Arc<dyn Gateway> {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn chat(
        &self,
        request: ChatExchangeRequest,
    ) -> std::result::Result<GatewayReply, GatewayError> {
        let mut state = self.state.lock().unwrap();
        let echo = format!("echo: {}", request.message);
        state.chat_requests.push(request);
        state.replies.pop_front().unwrap_or(Ok(GatewayReply {
            reply: echo,
            debug: None,
        }))
    }

    async fn transcribe(
        &self,
        audio: AudioPayload,
    ) -> std::result::Result<Transcription, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.uploads.push(audio);
        state.transcriptions.pop_front().unwrap_or(Ok(Transcription {
            text: String::new(),
            confidence: None,
        }))
    }
}

/// Key-value store whose contents outlive the controller
#[derive(Clone, Default)]
pub struct SharedStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl SharedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn put(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }
}

impl KeyValueStore for SharedStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.raw(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.put(key, value);
        Ok(())
    }
}

/// Store that refuses every write
pub struct ReadOnlyStore;

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
        Err(Error::Storage("read-only".to_string()))
    }
}

/// Clipboard that remembers what was copied
#[derive(Clone, Default)]
pub struct RecordingClipboard {
    copied: Arc<Mutex<Vec<String>>>,
}

impl RecordingClipboard {
    pub fn copied(&self) -> Vec<String> {
        self.copied.lock().unwrap().clone()
    }
}

impl Clipboard for RecordingClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        self.copied.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Clipboard with no display server behind it
pub struct FailingClipboard;

impl Clipboard for FailingClipboard {
    fn write_text(&mut self, _text: &str) -> Result<()> {
        Err(Error::Clipboard("no display".to_string()))
    }
}

/// Audio source that either grants a fixed recording or is denied
pub struct ScriptedAudio {
    recording: Option<Vec<u8>>,
}

impl ScriptedAudio {
    pub fn granted(bytes: &[u8]) -> Self {
        Self {
            recording: Some(bytes.to_vec()),
        }
    }

    pub fn denied() -> Self {
        Self { recording: None }
    }
}

impl AudioSource for ScriptedAudio {
    fn begin_capture(&mut self) -> Result<CaptureHandle> {
        let bytes = self
            .recording
            .clone()
            .ok_or_else(|| Error::Microphone("permission denied".to_string()))?;

        let handle = CaptureHandle::new(CaptureFormat::Encoded {
            mime_type: "audio/webm".to_string(),
            file_name: "recording.webm".to_string(),
        });
        // Two chunks so the handle has something to concatenate
        let (head, tail) = bytes.split_at(bytes.len() / 2);
        handle.sink().push(AudioChunk::Encoded(head.to_vec()));
        handle.sink().push(AudioChunk::Encoded(tail.to_vec()));
        Ok(handle)
    }
}

/// Export sink that keeps documents in memory
#[derive(Clone, Default)]
pub struct MemoryExports {
    written: Arc<Mutex<Vec<(String, String)>>>,
}

impl MemoryExports {
    pub fn written(&self) -> Vec<(String, String)> {
        self.written.lock().unwrap().clone()
    }
}

impl ExportSink for MemoryExports {
    fn write(&mut self, file_name: &str, contents: &str) -> Result<String> {
        self.written
            .lock()
            .unwrap()
            .push((file_name.to_string(), contents.to_string()));
        Ok(format!("memory://{file_name}"))
    }
}

/// Controller wired to a fake gateway with inert collaborators
pub fn controller(gateway: &FakeGateway) -> SessionController {
    SessionController::builder(gateway.shared())
        .store(SharedStore::new())
        .clipboard(RecordingClipboard::default())
        .export_sink(MemoryExports::default())
        .build()
}

/// Whether any transcript line contains `needle`
pub fn transcript_contains(controller: &SessionController, needle: &str) -> bool {
    controller.transcript().lines().any(|l| l.contains(needle))
}

/// Severity of the newest error-log entry
pub fn last_severity(controller: &SessionController) -> Option<Severity> {
    controller.error_log().last().map(|e| e.level)
}
