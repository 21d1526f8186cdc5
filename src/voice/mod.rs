//! Voice processing module
//!
//! Handles audio capture and speech-to-text.

mod capture;
pub mod stt;

#[cfg(feature = "microphone")]
pub use capture::MicrophoneSource;
pub use capture::{
    AudioChunk, AudioPayload, AudioSource, CaptureFormat, CaptureHandle, ChunkSink,
    FileAudioSource, SAMPLE_RATE, UnavailableAudioSource, mime_for_path, samples_to_wav,
};
pub use stt::SpeechToText;
