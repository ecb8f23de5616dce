//! Sample-rate conversion using a rubato `FastFixedIn` resampler.
//!
//! ## Design
//!
//! Uploaded clips arrive at whatever rate the recorder used (44.1 kHz, 48 kHz,
//! 16 kHz, ...). Onset peak-picking windows and VAD frames are expressed in
//! samples, so every clip is brought to one analysis rate first.
//!
//! When source rate == target rate, `RateConverter` is a passthrough and no
//! rubato session is created at all.
//!
//! ## Usage
//!
//! ```ignore
//! let mut rc = RateConverter::new(48_000, 22_050, 1024)?;
//! let mut out = rc.process(&samples)?;
//! out.extend(rc.finish()?);
//! ```

use rubato::{FastFixedIn, PolynomialDegree, Resampler};
use tracing::debug;

use super::signal::AudioSignal;
use crate::error::{AnalysisError, Result};

/// Input frame count per rubato call when converting whole clips.
pub const RESAMPLE_CHUNK: usize = 1024;

/// Converts f32 mono audio from one fixed sample rate to another.
pub struct RateConverter {
    /// `None` when source rate == target rate (passthrough mode).
    resampler: Option<FastFixedIn<f32>>,
    /// Input not yet handed to rubato.
    input_buf: Vec<f32>,
    /// How many input samples rubato expects per process call.
    chunk_size: usize,
    /// Pre-allocated output buffer: `[1][output_frames_max]`.
    output_buf: Vec<Vec<f32>>,
}

impl RateConverter {
    /// Create a new converter.
    ///
    /// # Errors
    /// Returns `AnalysisError::Internal` if rubato fails to initialise.
    pub fn new(source_rate: u32, target_rate: u32, chunk_size: usize) -> Result<Self> {
        if source_rate == target_rate {
            return Ok(Self {
                resampler: None,
                input_buf: Vec::new(),
                chunk_size,
                output_buf: Vec::new(),
            });
        }
        if source_rate == 0 || target_rate == 0 {
            return Err(AnalysisError::Internal(format!(
                "cannot resample between {source_rate} Hz and {target_rate} Hz"
            )));
        }

        let ratio = target_rate as f64 / source_rate as f64;

        let resampler = FastFixedIn::<f32>::new(
            ratio,
            1.0,
            PolynomialDegree::Cubic,
            chunk_size,
            1, // mono
        )
        .map_err(|e| AnalysisError::Internal(format!("resampler init: {e}")))?;

        let max_out = resampler.output_frames_max();
        let output_buf = vec![vec![0f32; max_out]; 1];

        debug!(source_rate, target_rate, chunk_size, max_out, "resampler ready");

        Ok(Self {
            resampler: Some(resampler),
            input_buf: Vec::new(),
            chunk_size,
            output_buf,
        })
    }

    /// Process incoming samples, returning resampled output (may be empty).
    ///
    /// Samples are accumulated internally until a full `chunk_size` block is
    /// available for rubato. Any remainder is kept for the next call or for
    /// [`RateConverter::finish`].
    ///
    /// # Errors
    /// `AnalysisError::Internal` if rubato rejects a block.
    pub fn process(&mut self, samples: &[f32]) -> Result<Vec<f32>> {
        let Some(ref mut resampler) = self.resampler else {
            return Ok(samples.to_vec());
        };

        self.input_buf.extend_from_slice(samples);

        let mut result = Vec::new();
        let mut offset = 0;
        while self.input_buf.len() - offset >= self.chunk_size {
            let block = &self.input_buf[offset..offset + self.chunk_size];
            let (_consumed, produced) = resampler
                .process_into_buffer(&[block], &mut self.output_buf, None)
                .map_err(|e| AnalysisError::Internal(format!("resampling failed: {e}")))?;
            result.extend_from_slice(&self.output_buf[0][..produced]);
            offset += self.chunk_size;
        }
        self.input_buf.drain(..offset);

        Ok(result)
    }

    /// Flush the tail that never filled a whole chunk.
    ///
    /// # Errors
    /// `AnalysisError::Internal` if rubato rejects the partial block.
    pub fn finish(&mut self) -> Result<Vec<f32>> {
        let Some(ref mut resampler) = self.resampler else {
            return Ok(Vec::new());
        };
        if self.input_buf.is_empty() {
            return Ok(Vec::new());
        }

        let tail = std::mem::take(&mut self.input_buf);
        let wave_in: [&[f32]; 1] = [tail.as_slice()];
        let (_consumed, produced) = resampler
            .process_partial_into_buffer(Some(&wave_in[..]), &mut self.output_buf, None)
            .map_err(|e| AnalysisError::Internal(format!("resampler flush failed: {e}")))?;
        Ok(self.output_buf[0][..produced].to_vec())
    }

    /// Returns `true` when source rate == target rate (no resampling occurs).
    pub fn is_passthrough(&self) -> bool {
        self.resampler.is_none()
    }
}

/// Convert a whole clip to `target_rate`.
pub fn resample_signal(signal: AudioSignal, target_rate: u32) -> Result<AudioSignal> {
    if signal.sample_rate == target_rate {
        return Ok(signal);
    }
    let mut rc = RateConverter::new(signal.sample_rate, target_rate, RESAMPLE_CHUNK)?;
    let mut out = rc.process(&signal.samples)?;
    out.extend(rc.finish()?);
    Ok(AudioSignal::new(out, target_rate))
}
