//! Voice activity segmentation.
//!
//! The `VoiceActivitySegmenter` trait is the seam: `AdaptiveEnergyVad` is the
//! default, and any other frame classifier can be swapped in without touching
//! the rate or pause analyzers.
//!
//! ## Algorithm (`AdaptiveEnergyVad`)
//!
//! 1. Frame RMS over centered, reflect-padded frames.
//! 2. Threshold = p_low + fraction × (p_high − p_low) of the RMS distribution.
//! 3. If p_low ≥ continuous_ratio × p_high the clip has no silence contrast;
//!    every frame above the absolute floor is speech.
//! 4. Otherwise frames strictly above the threshold are speech.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::frames::{frame_rms, frame_count};
use crate::{audio::AudioSignal, config::VadConfig};

/// Per-frame speech/silence decisions on a centered hop grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceActivityMask {
    pub active: Vec<bool>,
    pub hop_length: usize,
    pub sample_rate: u32,
    pub total_duration: f64,
    /// RMS level the frames were compared against.
    pub threshold: f32,
}

impl VoiceActivityMask {
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn frame_to_time(&self, frame: usize) -> f64 {
        (frame * self.hop_length) as f64 / self.sample_rate as f64
    }

    /// Frame containing `secs`, clamped to the grid.
    pub fn time_to_frame(&self, secs: f64) -> usize {
        if self.active.is_empty() || secs <= 0.0 {
            return 0;
        }
        let frame = (secs * self.sample_rate as f64 / self.hop_length as f64).floor() as usize;
        frame.min(self.active.len() - 1)
    }

    pub fn is_active(&self, frame: usize) -> bool {
        self.active.get(frame).copied().unwrap_or(false)
    }

    pub fn active_frames(&self) -> usize {
        self.active.iter().filter(|a| **a).count()
    }

    pub fn active_ratio(&self) -> f64 {
        if self.active.is_empty() {
            0.0
        } else {
            self.active_frames() as f64 / self.active.len() as f64
        }
    }

    pub fn active_duration(&self) -> f64 {
        self.active_ratio() * self.total_duration
    }

    pub fn silence_duration(&self) -> f64 {
        self.total_duration - self.active_duration()
    }
}

/// Trait for whole-clip speech/silence segmenters.
pub trait VoiceActivitySegmenter: Send + Sync {
    fn segment(&self, signal: &AudioSignal) -> VoiceActivityMask;
}

#[derive(Debug, Clone, Default)]
pub struct AdaptiveEnergyVad {
    config: VadConfig,
}

impl AdaptiveEnergyVad {
    pub fn new(config: VadConfig) -> Self {
        Self { config }
    }
}

impl VoiceActivitySegmenter for AdaptiveEnergyVad {
    fn segment(&self, signal: &AudioSignal) -> VoiceActivityMask {
        let cfg = &self.config;
        let rms = frame_rms(&signal.samples, cfg.frame_length, cfg.hop_length);
        debug_assert_eq!(rms.len(), frame_count(signal.samples.len(), cfg.hop_length));

        let mut sorted = rms.clone();
        sorted.sort_by(f32::total_cmp);
        let low = percentile(&sorted, cfg.low_percentile);
        let high = percentile(&sorted, cfg.high_percentile);

        let continuous = high > cfg.absolute_floor && low >= cfg.continuous_ratio * high;
        let (threshold, active): (f32, Vec<bool>) = if continuous {
            let floor = cfg.absolute_floor;
            (floor, rms.iter().map(|r| *r > floor).collect())
        } else {
            let t = (low + cfg.threshold_fraction * (high - low)).max(cfg.absolute_floor);
            (t, rms.iter().map(|r| *r > t).collect())
        };

        let mask = VoiceActivityMask {
            active,
            hop_length: cfg.hop_length,
            sample_rate: signal.sample_rate,
            total_duration: signal.duration_secs(),
            threshold,
        };
        debug!(
            frames = mask.len(),
            active_ratio = mask.active_ratio(),
            threshold,
            continuous,
            "voice activity segmented"
        );
        mask
    }
}

/// Percentile of an ascending slice with linear interpolation between ranks.
pub fn percentile(sorted: &[f32], pct: f64) -> f32 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = (pct.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            let frac = (rank - lo as f64) as f32;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}
