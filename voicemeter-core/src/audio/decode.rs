//! Audio decoding collaborator.
//!
//! The core only needs a mono f32 buffer and its sample rate. Container and
//! codec handling lives behind [`AudioDecoder`]; the bundled [`WavDecoder`]
//! covers RIFF WAV, anything else is reported as a decode error.

use std::io::Cursor;

use tracing::debug;

use super::signal::AudioSignal;
use crate::error::{AnalysisError, Result};

/// Turns raw uploaded bytes into a mono sample buffer.
pub trait AudioDecoder: Send + Sync {
    /// # Errors
    /// `AnalysisError::Decode` when the payload cannot be parsed.
    fn decode(&self, bytes: &[u8]) -> Result<AudioSignal>;
}

/// `hound`-backed decoder for PCM integer and IEEE float WAV files.
#[derive(Debug, Default, Clone, Copy)]
pub struct WavDecoder;

impl AudioDecoder for WavDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<AudioSignal> {
        let reader = hound::WavReader::new(Cursor::new(bytes))
            .map_err(|e| AnalysisError::Decode(e.to_string()))?;
        let spec = reader.spec();
        let channels = usize::from(spec.channels.max(1));

        let interleaved = read_interleaved(reader)?;

        debug!(
            sample_rate = spec.sample_rate,
            channels,
            bits = spec.bits_per_sample,
            frames = interleaved.len() / channels,
            "decoded wav payload"
        );

        if channels == 1 {
            return Ok(AudioSignal::new(interleaved, spec.sample_rate));
        }

        let mut mono = Vec::with_capacity(interleaved.len() / channels);
        for frame in interleaved.chunks(channels) {
            let sum = frame.iter().copied().sum::<f32>();
            mono.push(sum / channels as f32);
        }
        Ok(AudioSignal::new(mono, spec.sample_rate))
    }
}

fn read_interleaved(mut reader: hound::WavReader<Cursor<&[u8]>>) -> Result<Vec<f32>> {
    let spec = reader.spec();
    let decode_err = |e: hound::Error| AnalysisError::Decode(e.to_string());

    match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map_err(decode_err))
            .collect(),
        hound::SampleFormat::Int => {
            if spec.bits_per_sample <= 8 {
                reader
                    .samples::<i8>()
                    .map(|s| s.map(|v| v as f32 / 128.0).map_err(decode_err))
                    .collect()
            } else if spec.bits_per_sample <= 16 {
                reader
                    .samples::<i16>()
                    .map(|s| s.map(|v| v as f32 / 32768.0).map_err(decode_err))
                    .collect()
            } else {
                let max = ((1_i64 << (spec.bits_per_sample - 1)) - 1) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / max).map_err(decode_err))
                    .collect()
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Encode mono/stereo i16 PCM into an in-memory WAV file.
    pub(crate) fn wav_bytes(samples: &[f32], sample_rate: u32, channels: u16) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("wav writer");
            for s in samples {
                writer
                    .write_sample((s.clamp(-1.0, 1.0) * 32767.0) as i16)
                    .expect("write sample");
            }
            writer.finalize().expect("finalize wav");
        }
        cursor.into_inner()
    }

    #[test]
    fn decodes_mono_pcm16() {
        let samples: Vec<f32> = (0..1600).map(|i| ((i % 16) as f32 - 8.0) / 16.0).collect();
        let bytes = wav_bytes(&samples, 16_000, 1);
        let signal = WavDecoder.decode(&bytes).expect("decode");
        assert_eq!(signal.sample_rate, 16_000);
        assert_eq!(signal.samples.len(), 1600);
        assert!((signal.samples[0] - samples[0]).abs() < 1e-3);
    }

    #[test]
    fn downmixes_stereo_by_averaging() {
        // L = 0.5, R = -0.1 for every frame.
        let interleaved: Vec<f32> = (0..200)
            .map(|i| if i % 2 == 0 { 0.5 } else { -0.1 })
            .collect();
        let bytes = wav_bytes(&interleaved, 8_000, 2);
        let signal = WavDecoder.decode(&bytes).expect("decode");
        assert_eq!(signal.samples.len(), 100);
        assert!((signal.samples[10] - 0.2).abs() < 1e-3, "{}", signal.samples[10]);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = WavDecoder.decode(b"definitely not a riff header").unwrap_err();
        assert!(matches!(err, AnalysisError::Decode(_)));
        assert!(err.is_validation());
    }
}
