//! Voice capture integration tests
//!
//! Tests capture and encoding without requiring audio hardware

use std::io::Cursor;

use neural_terminal::voice::{
    AudioChunk, AudioPayload, AudioSource, CaptureFormat, CaptureHandle, FileAudioSource,
    SAMPLE_RATE, UnavailableAudioSource, mime_for_path, samples_to_wav,
};
use neural_terminal::Error;

/// Generate sine wave audio samples
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn generate_sine_samples(frequency: f32, duration_secs: f32, amplitude: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect()
}

#[test]
fn test_samples_to_wav() {
    let samples = generate_sine_samples(440.0, 0.5, 0.5);
    let wav_data = samples_to_wav(&samples, SAMPLE_RATE).unwrap();

    // WAV header is 44 bytes, then 2 bytes per sample
    assert_eq!(wav_data.len(), 44 + samples.len() * 2);
    assert_eq!(&wav_data[0..4], b"RIFF");
    assert_eq!(&wav_data[8..12], b"WAVE");
}

#[test]
fn test_wav_roundtrip() {
    let original_samples = generate_sine_samples(440.0, 0.1, 0.5);
    let wav_data = samples_to_wav(&original_samples, SAMPLE_RATE).unwrap();

    let mut reader = hound::WavReader::new(Cursor::new(wav_data)).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, SAMPLE_RATE);

    let decoded: Vec<f32> = reader
        .samples::<i16>()
        .map(|s| f32::from(s.unwrap()) / 32767.0)
        .collect();
    assert_eq!(decoded.len(), original_samples.len());
    for (a, b) in original_samples.iter().zip(&decoded) {
        assert!((a - b).abs() < 0.001);
    }
}

#[test]
fn test_streamed_samples_are_encoded_once_on_end() {
    let handle = CaptureHandle::new(CaptureFormat::Pcm {
        sample_rate: SAMPLE_RATE,
    });
    let sink = handle.sink();

    // Device callbacks deliver small buffers from another thread
    let writer = std::thread::spawn(move || {
        for chunk in generate_sine_samples(220.0, 0.25, 0.3).chunks(512) {
            sink.push(AudioChunk::Samples(chunk.to_vec()));
        }
    });
    writer.join().unwrap();

    let payload = handle.end_capture().unwrap();
    assert_eq!(payload.mime_type, "audio/wav");
    assert_eq!(payload.file_name, "recording.wav");

    let reader = hound::WavReader::new(Cursor::new(payload.bytes)).unwrap();
    assert_eq!(reader.len(), 4000);
}

#[test]
fn test_empty_recording_yields_empty_payload() {
    let handle = CaptureHandle::new(CaptureFormat::Pcm {
        sample_rate: SAMPLE_RATE,
    });
    let payload = handle.end_capture().unwrap();
    assert!(payload.is_empty());
}

#[test]
fn test_file_source_replays_recording() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hello.wav");
    let wav = samples_to_wav(&generate_sine_samples(440.0, 0.05, 0.5), SAMPLE_RATE).unwrap();
    std::fs::write(&path, &wav).unwrap();

    let mut source = FileAudioSource::new(path.clone());
    let first = source.begin_capture().unwrap().end_capture().unwrap();
    let second = source.begin_capture().unwrap().end_capture().unwrap();

    assert_eq!(first.bytes, wav);
    assert_eq!(first, second);
    assert_eq!(first.file_name, "hello.wav");
    assert_eq!(first.mime_type, mime_for_path(&path));
}

#[test]
fn test_missing_file_is_a_microphone_error() {
    let mut source = FileAudioSource::new("/nonexistent/recording.webm".into());
    assert!(matches!(source.begin_capture(), Err(Error::Microphone(_))));
}

#[test]
fn test_empty_file_is_no_audio() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("silence.webm");
    std::fs::write(&path, b"").unwrap();

    assert!(matches!(AudioPayload::from_file(&path), Err(Error::NoAudio)));
}

#[test]
fn test_unavailable_source_refuses_capture() {
    let mut source = UnavailableAudioSource;
    assert!(matches!(source.begin_capture(), Err(Error::Microphone(_))));
}

#[test]
fn test_payload_from_file_keeps_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("memo.mp3");
    std::fs::write(&path, b"ID3").unwrap();

    let payload = AudioPayload::from_file(&path).unwrap();
    assert_eq!(payload.file_name, "memo.mp3");
    assert_eq!(payload.mime_type, "audio/mpeg");
    assert_eq!(payload.len(), 3);
}
