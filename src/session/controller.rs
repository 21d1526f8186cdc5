//! Terminal session controller
//!
//! Owns every piece of per-session state and is the single writer to it.
//! Gateway calls are split into `begin_*` (state moves to a busy state and a
//! pending ticket is returned) and `complete_*` (the result is applied). Each
//! ticket carries the session generation it was issued under; `reset` bumps
//! the generation, so a reply that arrives after a reset is dropped.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{Local, Utc};
use serde_json::json;
use uuid::Uuid;

use super::buffer::{BoundedLog, ERROR_LOG_CAPACITY, Transcript};
use super::command::LocalCommand;
use super::export::{SessionExport, export_file_name};
use super::render::{self, ERROR_PANEL_ENTRIES, StatusSnapshot};
use super::settings::{SETTINGS_KEY, SessionSettings, deserialize_settings, serialize_settings};
use super::types::{
    ChatMessage, ErrorLogEntry, Severity, SystemStats, TranscriptionEntry, estimate_tokens,
};
use crate::client::{
    ChatExchangeRequest, Clipboard, DirectoryExportSink, ExportSink, Gateway, GatewayError,
    GatewayReply, KeyValueStore, MemoryStore, NoClipboard, Transcription,
};
use crate::providers::ModelSelector;
use crate::voice::{AudioPayload, AudioSource, CaptureHandle, UnavailableAudioSource};

/// Confidence recorded when the gateway does not report one
pub const DEFAULT_CONFIDENCE: f32 = 0.95;

/// Controller state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Recording,
    Transcribing,
    AwaitingReply,
}

/// What `submit` did with its input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Blank input
    Empty,
    /// A local command ran; no gateway call was made
    Command(LocalCommand),
    /// The input was sent to the provider gateway
    Exchange,
    /// A chat message arrived while another operation was in flight
    Busy,
}

/// A chat exchange waiting for its reply
#[derive(Debug)]
pub struct PendingExchange {
    generation: u64,
    selector: ModelSelector,
    request: ChatExchangeRequest,
    started: Instant,
}

impl PendingExchange {
    #[must_use]
    pub const fn request(&self) -> &ChatExchangeRequest {
        &self.request
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// A recording waiting for its transcription
#[derive(Debug)]
pub struct PendingTranscription {
    generation: u64,
    audio: AudioPayload,
    started: Instant,
}

impl PendingTranscription {
    #[must_use]
    pub const fn audio(&self) -> &AudioPayload {
        &self.audio
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// Builder for [`SessionController`]
pub struct SessionControllerBuilder {
    gateway: Arc<dyn Gateway>,
    store: Box<dyn KeyValueStore>,
    clipboard: Box<dyn Clipboard>,
    audio: Box<dyn AudioSource>,
    exports: Box<dyn ExportSink>,
    model: ModelSelector,
}

impl SessionControllerBuilder {
    /// Key-value store used for settings
    #[must_use]
    pub fn store(mut self, store: impl KeyValueStore + 'static) -> Self {
        self.store = Box::new(store);
        self
    }

    #[must_use]
    pub fn clipboard(mut self, clipboard: impl Clipboard + 'static) -> Self {
        self.clipboard = Box::new(clipboard);
        self
    }

    #[must_use]
    pub fn audio_source(mut self, audio: impl AudioSource + 'static) -> Self {
        self.audio = Box::new(audio);
        self
    }

    #[must_use]
    pub fn export_sink(mut self, exports: impl ExportSink + 'static) -> Self {
        self.exports = Box::new(exports);
        self
    }

    /// Initially selected model
    #[must_use]
    pub const fn model(mut self, model: ModelSelector) -> Self {
        self.model = model;
        self
    }

    /// Restore saved settings and print the banner
    #[must_use]
    pub fn build(self) -> SessionController {
        let now = Utc::now();
        let mut controller = SessionController {
            gateway: self.gateway,
            store: self.store,
            clipboard: self.clipboard,
            audio: self.audio,
            exports: self.exports,
            state: SessionState::Idle,
            model: self.model,
            settings: SessionSettings::default(),
            session_id: Uuid::new_v4(),
            generation: 0,
            transcript: Transcript::new(),
            chat_history: Vec::new(),
            transcriptions: Vec::new(),
            error_log: BoundedLog::new(ERROR_LOG_CAPACITY),
            stats: SystemStats::new(now),
            capture: None,
            draft: String::new(),
            history_open: false,
            errors_open: false,
            show_tokens: false,
            connected: true,
        };

        controller.restore_settings(false);
        controller.print_banner();
        controller.log(Severity::Info, "Neural Terminal initialized successfully", None);
        controller
    }
}

/// The terminal session
pub struct SessionController {
    gateway: Arc<dyn Gateway>,
    store: Box<dyn KeyValueStore>,
    clipboard: Box<dyn Clipboard>,
    audio: Box<dyn AudioSource>,
    exports: Box<dyn ExportSink>,

    state: SessionState,
    model: ModelSelector,
    settings: SessionSettings,
    session_id: Uuid,
    generation: u64,

    transcript: Transcript,
    chat_history: Vec<ChatMessage>,
    transcriptions: Vec<TranscriptionEntry>,
    error_log: BoundedLog<ErrorLogEntry>,
    stats: SystemStats,

    capture: Option<CaptureHandle>,
    draft: String,
    history_open: bool,
    errors_open: bool,
    show_tokens: bool,
    connected: bool,
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("state", &self.state)
            .field("model", &self.model)
            .field("session_id", &self.session_id)
            .field("generation", &self.generation)
            .field("messages", &self.chat_history.len())
            .finish_non_exhaustive()
    }
}

impl SessionController {
    /// Start building a controller around a gateway
    ///
    /// Every other capability defaults to an inert in-memory version.
    #[must_use]
    pub fn builder(gateway: Arc<dyn Gateway>) -> SessionControllerBuilder {
        SessionControllerBuilder {
            gateway,
            store: Box::new(MemoryStore::new()),
            clipboard: Box::new(NoClipboard),
            audio: Box::new(UnavailableAudioSource),
            exports: Box::new(DirectoryExportSink::new(".")),
            model: ModelSelector::default(),
        }
    }

    // ---- Accessors ----

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub const fn model(&self) -> ModelSelector {
        self.model
    }

    #[must_use]
    pub const fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    #[must_use]
    pub const fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    #[must_use]
    pub fn chat_history(&self) -> &[ChatMessage] {
        &self.chat_history
    }

    #[must_use]
    pub fn transcriptions(&self) -> &[TranscriptionEntry] {
        &self.transcriptions
    }

    #[must_use]
    pub const fn error_log(&self) -> &BoundedLog<ErrorLogEntry> {
        &self.error_log
    }

    #[must_use]
    pub const fn stats(&self) -> &SystemStats {
        &self.stats
    }

    #[must_use]
    pub const fn session_id(&self) -> Uuid {
        self.session_id
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Text waiting to be sent, usually a transcription that was not auto-sent
    #[must_use]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    #[must_use]
    pub const fn show_tokens(&self) -> bool {
        self.show_tokens
    }

    #[must_use]
    pub const fn history_open(&self) -> bool {
        self.history_open
    }

    #[must_use]
    pub const fn errors_open(&self) -> bool {
        self.errors_open
    }

    /// Whether the last gateway call got an answer
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.connected
    }

    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.stats.uptime(Utc::now())
    }

    // ---- Input ----

    /// Interpret one line of input as a local command or a chat message
    pub async fn submit(&mut self, input: &str) -> Submission {
        let text = input.trim();
        if text.is_empty() {
            return Submission::Empty;
        }

        if let Some(command) = LocalCommand::parse(text) {
            self.draft.clear();
            self.run_command(command);
            return Submission::Command(command);
        }

        match self.begin_exchange(text) {
            Some(pending) => {
                self.dispatch_exchange(pending).await;
                Submission::Exchange
            }
            None => Submission::Busy,
        }
    }

    /// Submit the current draft
    ///
    /// A draft refused while the session is busy is kept for a later try.
    pub async fn submit_draft(&mut self) -> Submission {
        let draft = self.draft.clone();
        self.submit(&draft).await
    }

    /// Run a local command
    pub fn run_command(&mut self, command: LocalCommand) {
        tracing::debug!(%command, "local command");
        match command {
            LocalCommand::Help => self.push_lines(render::help_panel()),
            LocalCommand::Status => {
                let lines = render::status_panel(&StatusSnapshot {
                    model: self.model,
                    settings: &self.settings,
                    uptime: self.uptime(),
                    errors: self.stats.errors,
                    connected: self.connected,
                });
                self.push_lines(lines);
            }
            LocalCommand::Clear => {
                self.transcript.clear();
                self.push_line("> TERMINAL BUFFER CLEARED");
            }
            LocalCommand::History => {
                self.history_open = !self.history_open;
                if self.history_open {
                    self.push_line("> OPENING NEURAL HISTORY VIEWER...");
                    let lines = render::history_panel(&self.chat_history, self.show_tokens);
                    self.push_lines(lines);
                } else {
                    self.push_line("> CLOSING HISTORY VIEWER");
                }
            }
            LocalCommand::Errors => {
                self.errors_open = !self.errors_open;
                self.push_line("> ERROR LOG VIEWER TOGGLED");
                if self.errors_open {
                    let lines = render::error_panel(
                        self.error_log.last_n(ERROR_PANEL_ENTRIES),
                        self.error_log.len(),
                        self.settings.debug_mode,
                    );
                    self.push_lines(lines);
                }
            }
            LocalCommand::Export => self.export(),
            LocalCommand::Stats => {
                let lines =
                    render::stats_panel(&self.stats, self.transcriptions.len(), self.uptime());
                self.push_lines(lines);
            }
            LocalCommand::Debug => {
                self.settings.debug_mode = !self.settings.debug_mode;
                let mode = if self.settings.debug_mode {
                    "ENABLED"
                } else {
                    "DISABLED"
                };
                self.push_line(format!("> DEBUG MODE: {mode}"));
            }
            LocalCommand::Reset => self.reset(),
        }
    }

    // ---- Chat exchange ----

    /// Echo a typed message and prepare its gateway request
    ///
    /// Returns `None` for blank input or while another operation is in flight.
    pub fn begin_exchange(&mut self, input: &str) -> Option<PendingExchange> {
        let text = input.trim();
        if text.is_empty() {
            return None;
        }
        if self.state != SessionState::Idle {
            tracing::warn!(state = ?self.state, "message submitted while busy");
            self.push_line("> BUSY: WAIT FOR CURRENT OPERATION");
            return None;
        }

        self.draft.clear();
        self.push_line(format!("> USER: {text}"));
        Some(self.start_exchange(text))
    }

    fn start_exchange(&mut self, text: &str) -> PendingExchange {
        let history = if self.settings.conversation_memory {
            let start = self
                .chat_history
                .len()
                .saturating_sub(self.settings.history_window);
            self.chat_history[start..]
                .iter()
                .map(ChatMessage::to_completion)
                .collect()
        } else {
            Vec::new()
        };

        let selector = self.model;
        self.log(
            Severity::Info,
            format!(
                "Sending message to {selector}: {} characters",
                text.chars().count()
            ),
            None,
        );
        self.state = SessionState::AwaitingReply;

        PendingExchange {
            generation: self.generation,
            selector,
            request: ChatExchangeRequest {
                message: text.to_string(),
                model: selector.wire_id().to_string(),
                history,
                settings: self.settings.for_selector(selector),
            },
            started: Instant::now(),
        }
    }

    /// Send a pending exchange through the gateway and apply the result
    pub async fn dispatch_exchange(&mut self, pending: PendingExchange) {
        let gateway = Arc::clone(&self.gateway);
        let result = gateway.chat(pending.request.clone()).await;
        self.complete_exchange(pending, result);
    }

    /// Apply a gateway reply
    ///
    /// Returns `false` if the exchange belongs to an earlier generation and
    /// was discarded.
    pub fn complete_exchange(
        &mut self,
        pending: PendingExchange,
        result: Result<GatewayReply, GatewayError>,
    ) -> bool {
        if pending.generation != self.generation {
            tracing::warn!(
                generation = pending.generation,
                current = self.generation,
                "discarding stale chat reply"
            );
            return false;
        }

        let elapsed = pending.started.elapsed();
        let selector = pending.selector;
        self.state = SessionState::Idle;

        match result {
            Ok(reply) => self.apply_reply(selector, &pending.request.message, reply, elapsed),
            Err(err) => self.apply_chat_error(err),
        }
        true
    }

    fn apply_reply(
        &mut self,
        selector: ModelSelector,
        message: &str,
        reply: GatewayReply,
        elapsed: Duration,
    ) {
        self.connected = true;
        let now = Utc::now();
        let tokens = estimate_tokens(message.chars().count() + reply.reply.chars().count());

        self.chat_history.push(ChatMessage::user(message, now));
        self.chat_history.push(ChatMessage::assistant(
            reply.reply.as_str(),
            selector.display_name(),
            now,
        ));
        self.stats.record_exchange(tokens, elapsed);

        self.push_line(format!("> {selector}: {}", reply.reply));
        if self.show_tokens {
            self.push_line(format!(
                "> TOKENS: ~{tokens} | TIME: {}ms",
                elapsed.as_millis()
            ));
        }
        if let (true, Some(debug)) = (self.settings.debug_mode, &reply.debug) {
            self.push_line(format!("> DEBUG: {debug}"));
        }

        match self.clipboard.write_text(&reply.reply) {
            Ok(()) => self.push_line("> RESPONSE COPIED TO CLIPBOARD"),
            Err(e) => {
                self.push_line("> CLIPBOARD COPY FAILED");
                self.log(
                    Severity::Warn,
                    "Clipboard write failed",
                    Some(json!({ "error": e.to_string() })),
                );
            }
        }

        self.log(
            Severity::Info,
            format!("Response received successfully from {selector}"),
            None,
        );
    }

    fn apply_chat_error(&mut self, err: GatewayError) {
        match err {
            GatewayError::CredentialMissing(message) => {
                self.connected = true;
                self.push_line("> ERROR: CREDENTIAL MISSING");
                self.push_line(format!("> {message}"));
                self.log(
                    Severity::Error,
                    "API request failed",
                    Some(json!({ "status": 400, "error": message })),
                );
            }
            GatewayError::Upstream {
                status,
                message,
                debug,
            } => {
                self.connected = true;
                self.push_line(format!("> ERROR: CONNECTION FAILED [{status}]"));
                self.push_line(format!("> {message}"));
                if let (true, Some(debug)) = (self.settings.debug_mode, &debug) {
                    self.push_line(format!("> DEBUG: {debug}"));
                }
                self.log(
                    Severity::Error,
                    "API request failed",
                    Some(json!({ "status": status, "error": message })),
                );
            }
            GatewayError::Network(message) => {
                self.connected = false;
                self.push_line(format!("> NEURAL LINK ERROR: {message}"));
                self.log(
                    Severity::Error,
                    "Neural link failed",
                    Some(json!({ "error": message })),
                );
            }
        }
    }

    // ---- Voice ----

    /// Start recording when idle, stop and transcribe when recording
    pub async fn toggle_voice(&mut self) {
        match self.state {
            SessionState::Idle => {
                self.start_recording();
            }
            SessionState::Recording => self.stop_recording().await,
            SessionState::Transcribing | SessionState::AwaitingReply => {
                tracing::warn!(state = ?self.state, "voice toggle ignored while busy");
            }
        }
    }

    /// Open the audio source
    ///
    /// Returns whether recording started. A refused device leaves the
    /// session idle with the failure reported.
    pub fn start_recording(&mut self) -> bool {
        if self.state != SessionState::Idle {
            tracing::warn!(state = ?self.state, "recording requested while busy");
            return false;
        }

        self.log(Severity::Info, "Starting voice recording", None);
        match self.audio.begin_capture() {
            Ok(handle) => {
                self.capture = Some(handle);
                self.state = SessionState::Recording;
                self.push_line("> VOICE CAPTURE INITIATED");
                self.push_line("> NEURAL PROCESSING READY...");
                self.log(Severity::Info, "Voice recording started successfully", None);
                true
            }
            Err(e) => {
                self.push_line("> ERROR: MICROPHONE ACCESS DENIED");
                self.push_line("> CHECK DEVICE PERMISSIONS");
                self.log(
                    Severity::Error,
                    "Failed to start voice recording",
                    Some(json!({ "error": e.to_string() })),
                );
                false
            }
        }
    }

    /// Stop recording, transcribe, and auto-send if enabled
    pub async fn stop_recording(&mut self) {
        let Some(pending) = self.begin_transcription() else {
            return;
        };

        let gateway = Arc::clone(&self.gateway);
        let result = gateway.transcribe(pending.audio.clone()).await;

        if let Some(exchange) = self.complete_transcription(pending, result) {
            self.dispatch_exchange(exchange).await;
        }
    }

    /// Close the capture and hand back the assembled recording
    pub fn begin_transcription(&mut self) -> Option<PendingTranscription> {
        if self.state != SessionState::Recording {
            return None;
        }
        let handle = self.capture.take()?;
        tracing::debug!(elapsed = ?handle.elapsed(), "closing capture");

        self.push_line("> ENDING VOICE CAPTURE");
        self.push_line("> WHISPER AI TRANSCRIBING...");
        self.log(Severity::Info, "Voice recording stopped", None);

        match handle.end_capture() {
            Ok(audio) => {
                self.log(
                    Severity::Info,
                    format!("Processing audio: {} bytes", audio.len()),
                    None,
                );
                self.state = SessionState::Transcribing;
                Some(PendingTranscription {
                    generation: self.generation,
                    audio,
                    started: Instant::now(),
                })
            }
            Err(e) => {
                self.state = SessionState::Idle;
                self.push_line(format!("> PROCESSING ERROR: {e}"));
                self.log(
                    Severity::Error,
                    "Audio processing failed",
                    Some(json!({ "error": e.to_string() })),
                );
                None
            }
        }
    }

    /// Apply a transcription result
    ///
    /// When voice auto-send is on and speech was recognized, the follow-up
    /// chat exchange is begun and returned for dispatch.
    pub fn complete_transcription(
        &mut self,
        pending: PendingTranscription,
        result: Result<Transcription, GatewayError>,
    ) -> Option<PendingExchange> {
        if pending.generation != self.generation {
            tracing::warn!(
                generation = pending.generation,
                current = self.generation,
                "discarding stale transcription"
            );
            return None;
        }

        let elapsed = pending.started.elapsed();
        self.state = SessionState::Idle;

        let transcription = match result {
            Ok(t) => t,
            Err(GatewayError::Network(message)) => {
                self.connected = false;
                self.push_line(format!("> PROCESSING ERROR: {message}"));
                self.log(
                    Severity::Error,
                    "Audio processing failed",
                    Some(json!({ "error": message })),
                );
                return None;
            }
            Err(err) => {
                self.connected = true;
                let status = err.status().unwrap_or_default();
                self.push_line(format!("> TRANSCRIPTION FAILED: {status}"));
                self.push_line(format!("> ERROR: {err}"));
                self.log(
                    Severity::Error,
                    "Transcription API error",
                    Some(json!({ "status": status, "error": err.to_string() })),
                );
                return None;
            }
        };
        self.connected = true;

        let text = transcription.text.trim().to_string();
        if text.is_empty() {
            self.push_line("> NO SPEECH DETECTED");
            self.push_line("> TRY SPEAKING LOUDER OR CLOSER TO MIC");
            self.log(Severity::Warn, "No speech detected in audio", None);
            return None;
        }

        let confidence = transcription
            .confidence
            .map_or(DEFAULT_CONFIDENCE, |c| c.clamp(0.0, 1.0));
        self.push_line(format!("> TRANSCRIPT: \"{text}\""));
        self.push_line(format!(
            "> CONFIDENCE: {:.0}%",
            (confidence * 100.0).round()
        ));
        self.push_line(format!("> PROCESSING TIME: {}ms", elapsed.as_millis()));
        self.transcriptions.push(TranscriptionEntry {
            text: text.clone(),
            timestamp: Utc::now(),
            confidence: Some(confidence),
        });
        self.log(
            Severity::Info,
            format!("Transcription successful: {} characters", text.chars().count()),
            None,
        );

        if self.settings.voice_auto_send {
            self.push_line("> AUTO-SENDING TO NEURAL NETWORK...");
            self.draft.clear();
            Some(self.start_exchange(&text))
        } else {
            self.push_line("> READY TO SEND (PRESS ENTER)");
            self.draft = text;
            None
        }
    }

    // ---- Settings and view controls ----

    pub fn select_model(&mut self, model: ModelSelector) {
        self.model = model;
        self.push_line(format!("> ACTIVE MODEL: {model}"));
    }

    /// Replace all settings at once
    pub fn update_settings(&mut self, settings: SessionSettings) {
        tracing::debug!(?settings, "settings updated");
        self.settings = settings;
    }

    /// Change one setting by name
    ///
    /// Returns whether the value was accepted.
    pub fn set_setting(&mut self, key: &str, value: &str) -> bool {
        match self.settings.set_field(key, value) {
            Ok(()) => {
                let shown = if key.to_ascii_lowercase().contains("key") {
                    "[REDACTED]"
                } else {
                    value.trim()
                };
                self.push_line(format!("> SETTING UPDATED: {key} = {shown}"));
                true
            }
            Err(e) => {
                self.push_line(format!("> ERROR: {e}"));
                false
            }
        }
    }

    pub fn toggle_show_tokens(&mut self) {
        self.show_tokens = !self.show_tokens;
        let mode = if self.show_tokens { "ENABLED" } else { "DISABLED" };
        self.push_line(format!("> TOKEN DISPLAY: {mode}"));
    }

    /// Persist settings to the key-value store
    pub fn save_settings(&mut self) -> bool {
        let stored = serialize_settings(&self.settings)
            .and_then(|raw| self.store.set(SETTINGS_KEY, &raw));
        match stored {
            Ok(()) => {
                self.push_line("> SETTINGS SAVED TO LOCAL STORAGE");
                self.log(Severity::Info, "Settings saved successfully", None);
                true
            }
            Err(e) => {
                self.push_line("> ERROR: FAILED TO SAVE SETTINGS");
                self.log(
                    Severity::Error,
                    "Failed to save settings",
                    Some(json!({ "error": e.to_string() })),
                );
                false
            }
        }
    }

    /// Replace settings with the stored blob, merged over defaults
    pub fn load_settings(&mut self) -> bool {
        self.restore_settings(true)
    }

    fn restore_settings(&mut self, announce: bool) -> bool {
        let loaded = self
            .store
            .get(SETTINGS_KEY)
            .and_then(|raw| raw.map(|r| deserialize_settings(&r)).transpose());

        match loaded {
            Ok(Some(settings)) => {
                self.settings = settings;
                if announce {
                    self.push_line("> SETTINGS LOADED FROM LOCAL STORAGE");
                }
                self.log(Severity::Info, "Settings loaded from local storage", None);
                true
            }
            Ok(None) => {
                if announce {
                    self.push_line("> NO SAVED SETTINGS FOUND");
                }
                false
            }
            Err(e) => {
                if announce {
                    self.push_line("> ERROR: FAILED TO LOAD SETTINGS");
                }
                self.log(
                    Severity::Error,
                    "Failed to load settings",
                    Some(json!({ "error": e.to_string() })),
                );
                false
            }
        }
    }

    // ---- Session lifecycle ----

    fn export(&mut self) {
        let now = Utc::now();
        let written = SessionExport::new(
            now,
            self.session_id,
            &self.chat_history,
            &self.transcriptions,
            &self.error_log,
            &self.settings,
            &self.stats,
        )
        .to_json()
        .and_then(|doc| self.exports.write(&export_file_name(now), &doc));

        match written {
            Ok(location) => {
                self.push_line("> CHAT HISTORY EXPORTED SUCCESSFULLY");
                self.push_line(format!("> FILE WRITTEN TO {location}"));
                self.log(Severity::Info, "Chat history exported successfully", None);
            }
            Err(e) => {
                self.push_line(format!("> EXPORT FAILED: {e}"));
                self.log(
                    Severity::Error,
                    "Export failed",
                    Some(json!({ "error": e.to_string() })),
                );
            }
        }
    }

    /// Drop all session state and start over
    ///
    /// Settings and the selected model survive. Any in-flight reply or
    /// transcription becomes stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.capture = None;
        self.state = SessionState::Idle;
        self.session_id = Uuid::new_v4();

        self.chat_history.clear();
        self.transcriptions.clear();
        self.error_log.clear();
        self.stats = SystemStats::new(Utc::now());
        self.draft.clear();
        self.history_open = false;
        self.errors_open = false;
        self.connected = true;

        self.transcript.clear();
        self.print_banner();
        self.push_line("> NEURAL INTERFACE RESET COMPLETE");
        tracing::info!(generation = self.generation, session = %self.session_id, "session reset");
    }

    fn print_banner(&mut self) {
        self.push_lines(render::banner(self.model));
    }

    // ---- Output ----

    fn push_line(&mut self, text: impl Into<String>) {
        let text = text.into();
        let line = if self.settings.show_timestamps {
            format!("[{}] {text}", Local::now().format("%H:%M:%S"))
        } else {
            text
        };
        self.transcript.push(line);
    }

    fn push_lines(&mut self, lines: Vec<String>) {
        for line in lines {
            self.push_line(line);
        }
    }

    /// Record a diagnostic and mirror it to tracing
    fn log(
        &mut self,
        level: Severity,
        message: impl Into<String>,
        details: Option<serde_json::Value>,
    ) {
        let message = message.into();
        match level {
            Severity::Error => {
                tracing::error!(details = ?details, "{message}");
                self.stats.record_error();
            }
            Severity::Warn => tracing::warn!(details = ?details, "{message}"),
            Severity::Info if self.settings.debug_mode => {
                tracing::info!(details = ?details, "{message}");
            }
            Severity::Info => tracing::debug!(details = ?details, "{message}"),
        }

        self.error_log.push(ErrorLogEntry {
            timestamp: Utc::now(),
            level,
            message,
            details,
        });
    }
}
