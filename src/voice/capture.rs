//! Two-phase audio capture
//!
//! `AudioSource::begin_capture` hands out a `CaptureHandle` that owns the chunk
//! buffer for the recording; `CaptureHandle::end_capture` releases the device
//! and assembles the chunks into a single `AudioPayload`.

use std::any::Any;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::{Error, Result};

/// Sample rate for audio capture (16kHz for speech)
pub const SAMPLE_RATE: u32 = 16000;

/// A complete audio upload: container bytes plus how to label them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub file_name: String,
}

impl AudioPayload {
    #[must_use]
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            file_name: file_name.into(),
        }
    }

    /// WAV payload named `recording.wav`
    #[must_use]
    pub fn wav(bytes: Vec<u8>) -> Self {
        Self::new(bytes, "audio/wav", "recording.wav")
    }

    /// Read an audio file, labelling it by extension
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is empty
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        if bytes.is_empty() {
            return Err(Error::NoAudio);
        }
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("recording")
            .to_string();
        Ok(Self::new(bytes, mime_for_path(path), file_name))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }
}

/// Guess an audio MIME type from a file extension
#[must_use]
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("wav") => "audio/wav",
        Some("webm") => "audio/webm",
        Some("mp3" | "mpga" | "mpeg") => "audio/mpeg",
        Some("m4a" | "mp4") => "audio/mp4",
        Some("ogg" | "oga") => "audio/ogg",
        Some("flac") => "audio/flac",
        _ => "application/octet-stream",
    }
}

/// One unit of captured audio
#[derive(Debug, Clone)]
pub enum AudioChunk {
    /// Already-encoded container bytes
    Encoded(Vec<u8>),
    /// Mono f32 samples in [-1.0, 1.0]
    Samples(Vec<f32>),
}

/// How a handle turns its chunks into a payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureFormat {
    /// Concatenate encoded chunks as-is
    Encoded { mime_type: String, file_name: String },
    /// Flatten sample chunks and encode them as 16-bit WAV
    Pcm { sample_rate: u32 },
}

/// Write side of a capture buffer, cloneable into device callbacks
#[derive(Debug, Clone, Default)]
pub struct ChunkSink(Arc<Mutex<Vec<AudioChunk>>>);

impl ChunkSink {
    /// Append a chunk
    pub fn push(&self, chunk: AudioChunk) {
        if let Ok(mut chunks) = self.0.lock() {
            chunks.push(chunk);
        }
    }

    fn take(&self) -> Vec<AudioChunk> {
        self.0
            .lock()
            .map(|mut chunks| std::mem::take(&mut *chunks))
            .unwrap_or_default()
    }
}

/// An in-progress recording
///
/// Holds the device stream (if any) alive until `end_capture`.
pub struct CaptureHandle {
    sink: ChunkSink,
    format: CaptureFormat,
    started: Instant,
    stream: Option<Box<dyn Any>>,
}

impl std::fmt::Debug for CaptureHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureHandle")
            .field("format", &self.format)
            .field("live_stream", &self.stream.is_some())
            .finish_non_exhaustive()
    }
}

impl CaptureHandle {
    #[must_use]
    pub fn new(format: CaptureFormat) -> Self {
        Self {
            sink: ChunkSink::default(),
            format,
            started: Instant::now(),
            stream: None,
        }
    }

    /// Attach a device stream that stops when dropped
    #[must_use]
    pub fn with_stream(mut self, stream: Box<dyn Any>) -> Self {
        self.stream = Some(stream);
        self
    }

    /// Writer for device callbacks
    #[must_use]
    pub fn sink(&self) -> ChunkSink {
        self.sink.clone()
    }

    /// Time since capture began
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Stop the device and assemble the recording
    ///
    /// # Errors
    ///
    /// Returns error if chunks do not match the capture format or encoding fails
    pub fn end_capture(mut self) -> Result<AudioPayload> {
        drop(self.stream.take());
        let chunks = self.sink.take();
        tracing::debug!(chunks = chunks.len(), "audio capture ended");

        match self.format {
            CaptureFormat::Encoded {
                mime_type,
                file_name,
            } => {
                let mut bytes = Vec::new();
                for chunk in chunks {
                    match chunk {
                        AudioChunk::Encoded(data) => bytes.extend_from_slice(&data),
                        AudioChunk::Samples(_) => {
                            return Err(Error::Audio(
                                "raw samples in an encoded capture".to_string(),
                            ));
                        }
                    }
                }
                Ok(AudioPayload::new(bytes, mime_type, file_name))
            }
            CaptureFormat::Pcm { sample_rate } => {
                let mut samples = Vec::new();
                for chunk in chunks {
                    match chunk {
                        AudioChunk::Samples(data) => samples.extend_from_slice(&data),
                        AudioChunk::Encoded(_) => {
                            return Err(Error::Audio(
                                "encoded bytes in a PCM capture".to_string(),
                            ));
                        }
                    }
                }
                if samples.is_empty() {
                    return Ok(AudioPayload::wav(Vec::new()));
                }
                Ok(AudioPayload::wav(samples_to_wav(&samples, sample_rate)?))
            }
        }
    }
}

/// Something that can start recordings
pub trait AudioSource {
    /// Start a recording
    ///
    /// # Errors
    ///
    /// Returns `Error::Microphone` if the device cannot be opened
    fn begin_capture(&mut self) -> Result<CaptureHandle>;
}

impl<S: AudioSource + ?Sized> AudioSource for Box<S> {
    fn begin_capture(&mut self) -> Result<CaptureHandle> {
        (**self).begin_capture()
    }
}

/// Source for builds or hosts without an input device
#[derive(Debug, Default)]
pub struct UnavailableAudioSource;

impl AudioSource for UnavailableAudioSource {
    fn begin_capture(&mut self) -> Result<CaptureHandle> {
        Err(Error::Microphone("no input device available".to_string()))
    }
}

/// Replays a prerecorded file as if it had just been captured
#[derive(Debug)]
pub struct FileAudioSource {
    path: std::path::PathBuf,
}

impl FileAudioSource {
    #[must_use]
    pub const fn new(path: std::path::PathBuf) -> Self {
        Self { path }
    }
}

impl AudioSource for FileAudioSource {
    fn begin_capture(&mut self) -> Result<CaptureHandle> {
        let payload = AudioPayload::from_file(&self.path)
            .map_err(|e| Error::Microphone(format!("{}: {e}", self.path.display())))?;
        let handle = CaptureHandle::new(CaptureFormat::Encoded {
            mime_type: payload.mime_type,
            file_name: payload.file_name,
        });
        handle.sink().push(AudioChunk::Encoded(payload.bytes));
        Ok(handle)
    }
}

/// Captures audio from the default input device
#[cfg(feature = "microphone")]
#[derive(Debug, Default)]
pub struct MicrophoneSource;

#[cfg(feature = "microphone")]
impl AudioSource for MicrophoneSource {
    fn begin_capture(&mut self) -> Result<CaptureHandle> {
        use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
        use cpal::SampleRate;

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| Error::Microphone("no input device available".to_string()))?;

        let supported_config = device
            .supported_input_configs()
            .map_err(|e| Error::Microphone(e.to_string()))?
            .find(|c| {
                c.channels() == 1
                    && c.min_sample_rate() <= SampleRate(SAMPLE_RATE)
                    && c.max_sample_rate() >= SampleRate(SAMPLE_RATE)
            })
            .ok_or_else(|| Error::Microphone("no suitable audio config found".to_string()))?;

        let config = supported_config
            .with_sample_rate(SampleRate(SAMPLE_RATE))
            .config();

        let handle = CaptureHandle::new(CaptureFormat::Pcm {
            sample_rate: SAMPLE_RATE,
        });
        let sink = handle.sink();

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    sink.push(AudioChunk::Samples(data.to_vec()));
                },
                |err| {
                    tracing::error!(error = %err, "audio capture error");
                },
                None,
            )
            .map_err(|e| Error::Microphone(e.to_string()))?;

        stream.play().map_err(|e| Error::Microphone(e.to_string()))?;

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = SAMPLE_RATE,
            "audio capture started"
        );
        Ok(handle.with_stream(Box::new(stream)))
    }
}

/// Convert f32 samples to WAV bytes for STT APIs
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| Error::Audio(e.to_string()))?;

        for &sample in samples {
            // Convert f32 [-1.0, 1.0] to i16
            #[allow(clippy::cast_possible_truncation)]
            let sample_i16 = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer
                .write_sample(sample_i16)
                .map_err(|e| Error::Audio(e.to_string()))?;
        }

        writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}
