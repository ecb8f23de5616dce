//! Audio intake: decoding, validation and conversion to the analysis rate.
//!
//! ```text
//! bytes ──► AudioDecoder::decode ──► validate duration ──► resample_signal ──► AudioSignal
//! ```
//!
//! Everything here runs once per request and the resulting buffer is owned by
//! that request alone.

pub mod decode;
pub mod resample;
pub mod signal;

pub use decode::{AudioDecoder, WavDecoder};
pub use signal::AudioSignal;

use tracing::debug;

use crate::{
    config::AudioConfig,
    error::{AnalysisError, Result},
};

/// Decode, validate and resample an uploaded clip.
///
/// # Errors
/// - `EmptyPayload` for a zero-length upload.
/// - `Decode` when the decoder rejects the bytes.
/// - `AudioTooShort` below `config.min_duration_secs`.
/// - `Internal` if the signal is empty after conversion.
pub fn prepare_bytes(
    bytes: &[u8],
    decoder: &dyn AudioDecoder,
    config: &AudioConfig,
) -> Result<AudioSignal> {
    if bytes.is_empty() {
        return Err(AnalysisError::EmptyPayload);
    }
    let signal = decoder.decode(bytes)?;
    prepare_signal(signal, config)
}

/// Validate and resample an already decoded clip.
pub fn prepare_signal(signal: AudioSignal, config: &AudioConfig) -> Result<AudioSignal> {
    let duration_secs = signal.duration_secs();
    if duration_secs < config.min_duration_secs {
        return Err(AnalysisError::AudioTooShort {
            duration_secs,
            min_secs: config.min_duration_secs,
        });
    }

    let source_rate = signal.sample_rate;
    let signal = resample::resample_signal(signal, config.analysis_sample_rate)?;
    if signal.is_empty() {
        return Err(AnalysisError::Internal(
            "signal is empty after resampling".into(),
        ));
    }

    debug!(
        source_rate,
        analysis_rate = signal.sample_rate,
        duration_secs,
        "audio prepared"
    );
    Ok(signal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::decode::tests::wav_bytes;

    #[test]
    fn empty_payload_is_rejected_before_decoding() {
        let err = prepare_bytes(&[], &WavDecoder, &AudioConfig::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyPayload));
    }

    #[test]
    fn half_second_clip_is_too_short() {
        let bytes = wav_bytes(&vec![0.1; 8_000], 16_000, 1);
        let err = prepare_bytes(&bytes, &WavDecoder, &AudioConfig::default()).unwrap_err();
        match err {
            AnalysisError::AudioTooShort { duration_secs, .. } => {
                assert!((duration_secs - 0.5).abs() < 1e-6)
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn valid_clip_lands_on_analysis_rate() {
        let bytes = wav_bytes(&vec![0.1; 32_000], 16_000, 1);
        let config = AudioConfig::default();
        let signal = prepare_bytes(&bytes, &WavDecoder, &config).expect("prepare");
        assert_eq!(signal.sample_rate, config.analysis_sample_rate);
        assert!((signal.duration_secs() - 2.0).abs() < 0.1);
    }
}
