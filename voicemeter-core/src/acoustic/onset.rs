//! Syllable-nucleus proxy: spectral-flux onsets over a log-mel spectrogram.
//!
//! ## Algorithm
//!
//! 1. Power STFT (Hann, centered) folded into a Slaney mel filterbank.
//! 2. Power → dB, clipped `top_db` below the loudest bin.
//! 3. Onset strength per frame = mean over mel bands of the positive
//!    difference to the previous frame.
//! 4. Envelope normalized to [0, 1], then peak-picked with local max / local
//!    mean / minimum-wait guards.
//! 5. Each peak is optionally moved back to the preceding envelope minimum.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::frames::PowerStft;
use crate::{audio::AudioSignal, config::OnsetConfig};

/// Ordered onset frames and their timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnsetSet {
    pub frames: Vec<usize>,
    pub times: Vec<f64>,
}

impl OnsetSet {
    pub fn from_frames(frames: Vec<usize>, hop: usize, sample_rate: u32) -> Self {
        let times = frames
            .iter()
            .map(|&f| (f * hop) as f64 / sample_rate as f64)
            .collect();
        Self { frames, times }
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Onsets per second over `duration_secs`.
    pub fn density(&self, duration_secs: f64) -> f64 {
        if duration_secs <= 0.0 {
            0.0
        } else {
            self.len() as f64 / duration_secs
        }
    }
}

pub struct SpectralFluxOnsetDetector {
    config: OnsetConfig,
}

impl SpectralFluxOnsetDetector {
    pub fn new(config: OnsetConfig) -> Self {
        Self { config }
    }

    pub fn detect(&self, signal: &AudioSignal) -> OnsetSet {
        let cfg = &self.config;
        if signal.is_empty() || signal.peak() < cfg.silence_peak_floor {
            debug!("near-silent clip, no onsets");
            return OnsetSet::default();
        }

        let mut envelope = self.onset_strength(signal);
        if !normalize_envelope(&mut envelope) {
            return OnsetSet::default();
        }

        let frames_per_sec = signal.sample_rate as f64 / cfg.hop_length as f64;
        let to_frames = |secs: f64| (secs * frames_per_sec).floor().max(0.0) as usize;
        let params = PeakPickParams {
            pre_max: to_frames(cfg.pre_max_secs),
            post_max: to_frames(cfg.post_max_secs) + 1,
            pre_avg: to_frames(cfg.pre_avg_secs),
            post_avg: to_frames(cfg.post_avg_secs) + 1,
            delta: cfg.delta,
            wait: to_frames(cfg.wait_secs),
        };

        let mut peaks = peak_pick(&envelope, &params);
        if cfg.backtrack {
            peaks = backtrack(&peaks, &envelope);
        }

        debug!(
            onsets = peaks.len(),
            frames = envelope.len(),
            "onset detection done"
        );
        OnsetSet::from_frames(peaks, cfg.hop_length, signal.sample_rate)
    }

    /// Raw (unnormalized) onset strength, one value per centered frame.
    pub fn onset_strength(&self, signal: &AudioSignal) -> Vec<f32> {
        let cfg = &self.config;
        let stft = PowerStft::new(cfg.n_fft, cfg.hop_length);
        let bank = MelBank::new(
            cfg.n_fft,
            signal.sample_rate,
            cfg.n_mels,
            0.0,
            signal.sample_rate as f32 / 2.0,
        );

        let mut mel_db: Vec<Vec<f32>> = Vec::new();
        stft.for_each_frame(&signal.samples, |_, power| {
            mel_db.push(bank.apply_db(power));
        });

        let max_db = mel_db
            .iter()
            .flatten()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max);
        let floor = max_db - cfg.top_db;
        for frame in mel_db.iter_mut() {
            for v in frame.iter_mut() {
                *v = v.max(floor);
            }
        }

        let mut envelope = vec![0.0f32; mel_db.len()];
        for t in 1..mel_db.len() {
            let (prev, cur) = (&mel_db[t - 1], &mel_db[t]);
            let flux: f32 = cur
                .iter()
                .zip(prev.iter())
                .map(|(c, p)| (c - p).max(0.0))
                .sum();
            envelope[t] = flux / cur.len().max(1) as f32;
        }
        envelope
    }
}

/// Shift to zero minimum and scale to unit maximum. Returns `false` for a
/// flat envelope.
fn normalize_envelope(envelope: &mut [f32]) -> bool {
    let min = envelope.iter().copied().fold(f32::INFINITY, f32::min);
    let max = envelope.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let range = max - min;
    if !range.is_finite() || range <= f32::EPSILON {
        return false;
    }
    for v in envelope.iter_mut() {
        *v = (*v - min) / range;
    }
    true
}

/// Peak-picking windows, all in frames.
#[derive(Debug, Clone, Copy)]
pub struct PeakPickParams {
    pub pre_max: usize,
    pub post_max: usize,
    pub pre_avg: usize,
    pub post_avg: usize,
    pub delta: f32,
    pub wait: usize,
}

/// Frame `n` is a peak when it is the maximum of `x[n-pre_max .. n+post_max]`,
/// at least `delta` above the mean of `x[n-pre_avg .. n+post_avg]`, and more
/// than `wait` frames after the previous peak. Windows are truncated at the
/// edges.
pub fn peak_pick(x: &[f32], p: &PeakPickParams) -> Vec<usize> {
    let len = x.len();
    let mut peaks = Vec::new();
    let mut last: Option<usize> = None;

    for n in 0..len {
        let max_lo = n.saturating_sub(p.pre_max);
        let max_hi = (n + p.post_max).min(len).max(n + 1);
        let local_max = x[max_lo..max_hi]
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max);
        if x[n] != local_max {
            continue;
        }

        let avg_lo = n.saturating_sub(p.pre_avg);
        let avg_hi = (n + p.post_avg).min(len).max(n + 1);
        let window = &x[avg_lo..avg_hi];
        let mean = window.iter().sum::<f32>() / window.len() as f32;
        if x[n] < mean + p.delta {
            continue;
        }

        if let Some(prev) = last {
            if n <= prev + p.wait {
                continue;
            }
        }
        peaks.push(n);
        last = Some(n);
    }
    peaks
}

/// Move each event back to the closest preceding local minimum of
/// `energy` (frame 0 counts as a minimum).
pub fn backtrack(events: &[usize], energy: &[f32]) -> Vec<usize> {
    let mut minima = vec![0usize];
    for i in 1..energy.len().saturating_sub(1) {
        if energy[i] <= energy[i - 1] && energy[i] < energy[i + 1] {
            minima.push(i);
        }
    }
    events
        .iter()
        .map(|&e| {
            let idx = minima.partition_point(|&m| m <= e);
            minima[idx.saturating_sub(1)]
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Mel filterbank
// ---------------------------------------------------------------------------

/// Slaney-normalized triangular mel filters, stored sparsely.
struct MelBank {
    /// (first bin, weights) per mel band.
    filters: Vec<(usize, Vec<f32>)>,
}

impl MelBank {
    fn new(n_fft: usize, sr: u32, n_mels: usize, fmin: f32, fmax: f32) -> Self {
        let n_freqs = n_fft / 2 + 1;
        let mel_min = hz_to_mel_slaney(fmin);
        let mel_max = hz_to_mel_slaney(fmax);
        let hz_pts: Vec<f32> = (0..=(n_mels + 1))
            .map(|i| mel_min + (mel_max - mel_min) * i as f32 / (n_mels + 1) as f32)
            .map(mel_to_hz_slaney)
            .collect();
        let bin_hz = sr as f32 / n_fft as f32;

        let filters = (0..n_mels)
            .map(|m| {
                let (lower, center, upper) = (hz_pts[m], hz_pts[m + 1], hz_pts[m + 2]);
                let down = (center - lower).max(1e-10);
                let up = (upper - center).max(1e-10);
                let enorm = 2.0 / (upper - lower).max(1e-10);

                let mut first = None;
                let mut weights = Vec::new();
                for k in 0..n_freqs {
                    let freq = k as f32 * bin_hz;
                    let w = if freq >= lower && freq <= center {
                        (freq - lower) / down
                    } else if freq > center && freq <= upper {
                        (upper - freq) / up
                    } else {
                        0.0
                    };
                    if w > 0.0 {
                        first.get_or_insert(k);
                        weights.push(w * enorm);
                    } else if first.is_some() {
                        break;
                    }
                }
                (first.unwrap_or(0), weights)
            })
            .collect();
        Self { filters }
    }

    /// Mel power in dB (`10·log10(max(S, 1e-10))`).
    fn apply_db(&self, power: &[f32]) -> Vec<f32> {
        self.filters
            .iter()
            .map(|(first, weights)| {
                let energy: f32 = weights
                    .iter()
                    .zip(&power[*first..])
                    .map(|(w, p)| w * p)
                    .sum();
                10.0 * energy.max(1e-10).log10()
            })
            .collect()
    }
}

fn hz_to_mel_slaney(hz: f32) -> f32 {
    let f_sp = 200.0 / 3.0;
    let min_log_hz = 1_000.0;
    let min_log_mel = min_log_hz / f_sp;
    let logstep = (6.4_f32).ln() / 27.0;
    if hz >= min_log_hz {
        min_log_mel + (hz / min_log_hz).ln() / logstep
    } else {
        hz / f_sp
    }
}

fn mel_to_hz_slaney(mel: f32) -> f32 {
    let f_sp = 200.0 / 3.0;
    let min_log_hz = 1_000.0;
    let min_log_mel = min_log_hz / f_sp;
    let logstep = (6.4_f32).ln() / 27.0;
    if mel >= min_log_mel {
        min_log_hz * (logstep * (mel - min_log_mel)).exp()
    } else {
        mel * f_sp
    }
}
