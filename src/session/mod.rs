//! Terminal session: state, command interpretation, and rendering

mod buffer;
mod command;
mod controller;
mod export;
pub mod render;
mod settings;
mod types;

pub use buffer::{
    BoundedLog, ERROR_LOG_CAPACITY, TRANSCRIPT_CAPACITY, Transcript, TranscriptCursor,
    TranscriptDelta,
};
pub use command::LocalCommand;
pub use controller::{
    DEFAULT_CONFIDENCE, PendingExchange, PendingTranscription, SessionController,
    SessionControllerBuilder, SessionState, Submission,
};
pub use export::{SessionExport, export_file_name};
pub use settings::{
    DEFAULT_HISTORY_WINDOW, SETTINGS_KEY, SessionSettings, deserialize_settings,
    serialize_settings,
};
pub use types::{
    ChatMessage, ErrorLogEntry, LATENCY_SMOOTHING, Role, Severity, SystemStats,
    TranscriptionEntry, estimate_tokens,
};
