//! Shared framing primitives: centered reflect padding, Hann window, STFT
//! power frames and frame RMS.
//!
//! Every analyzer uses centered framing, so a signal of `n` samples always
//! yields `1 + n / hop` frames and frame `i` is centred on sample `i * hop`.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Number of centered frames for `n_samples` at `hop`.
pub fn frame_count(n_samples: usize, hop: usize) -> usize {
    if hop == 0 {
        return 0;
    }
    1 + n_samples / hop
}

/// Periodic Hann window.
pub fn hann_window(n: usize) -> Vec<f32> {
    use std::f32::consts::PI;
    (0..n)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / n as f32).cos()))
        .collect()
}

/// Mirror `pad` samples onto each side (edge sample not repeated).
pub fn reflect_pad(samples: &[f32], pad: usize) -> Vec<f32> {
    if pad == 0 {
        return samples.to_vec();
    }
    if samples.is_empty() {
        return vec![0.0; pad * 2];
    }
    if samples.len() == 1 {
        return vec![samples[0]; 1 + pad * 2];
    }

    let n = samples.len() as isize;
    let mut out = Vec::with_capacity(samples.len() + 2 * pad);
    for i in -(pad as isize)..(n + pad as isize) {
        out.push(samples[reflect_index(i, samples.len())]);
    }
    out
}

fn reflect_index(mut i: isize, len: usize) -> usize {
    let max = len as isize - 1;
    while i < 0 || i > max {
        if i < 0 {
            i = -i;
        } else {
            i = 2 * max - i;
        }
    }
    i as usize
}

/// RMS of each centered frame.
pub fn frame_rms(samples: &[f32], frame_length: usize, hop: usize) -> Vec<f32> {
    let frames = frame_count(samples.len(), hop);
    if frames == 0 || frame_length == 0 {
        return Vec::new();
    }
    let padded = reflect_pad(samples, frame_length / 2);
    (0..frames)
        .map(|f| {
            let start = f * hop;
            let end = (start + frame_length).min(padded.len());
            rms(&padded[start..end])
        })
        .collect()
}

pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Short-time power spectrum over centered, Hann-windowed frames.
pub struct PowerStft {
    n_fft: usize,
    hop: usize,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
}

impl PowerStft {
    pub fn new(n_fft: usize, hop: usize) -> Self {
        Self {
            n_fft,
            hop,
            window: hann_window(n_fft),
            fft: FftPlanner::<f32>::new().plan_fft_forward(n_fft),
        }
    }

    pub fn n_bins(&self) -> usize {
        self.n_fft / 2 + 1
    }

    /// Calls `visit(frame_index, power_bins)` once per frame, in order.
    pub fn for_each_frame(&self, samples: &[f32], mut visit: impl FnMut(usize, &[f32])) {
        let frames = frame_count(samples.len(), self.hop);
        let padded = reflect_pad(samples, self.n_fft / 2);
        let n_bins = self.n_bins();
        let mut buf = vec![Complex::new(0.0f32, 0.0); self.n_fft];
        let mut power = vec![0.0f32; n_bins];

        for frame in 0..frames {
            let start = frame * self.hop;
            for (i, slot) in buf.iter_mut().enumerate() {
                let s = padded.get(start + i).copied().unwrap_or(0.0);
                *slot = Complex::new(s * self.window[i], 0.0);
            }
            self.fft.process(&mut buf);
            for (p, c) in power.iter_mut().zip(buf.iter().take(n_bins)) {
                *p = c.norm_sqr();
            }
            visit(frame, &power);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn reflect_pad_mirrors_without_edge_repeat() {
        let padded = reflect_pad(&[1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(padded, vec![3.0, 2.0, 1.0, 2.0, 3.0, 4.0, 3.0, 2.0]);
    }

    #[test]
    fn reflect_pad_handles_pad_longer_than_signal() {
        let padded = reflect_pad(&[1.0, 2.0], 3);
        assert_eq!(padded.len(), 8);
        assert!(padded.iter().all(|v| *v == 1.0 || *v == 2.0));
    }

    #[test]
    fn centered_frame_count() {
        assert_eq!(frame_count(22_050, 512), 44);
        assert_eq!(frame_count(0, 512), 1);
        assert_eq!(frame_rms(&vec![0.5; 22_050], 2048, 512).len(), 44);
    }

    #[test]
    fn rms_of_square_wave() {
        let samples: Vec<f32> = (0..256)
            .map(|i| if i % 2 == 0 { 0.5 } else { -0.5 })
            .collect();
        assert_relative_eq!(rms(&samples), 0.5, epsilon = 1e-5);
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    fn hann_window_is_zero_at_start_and_peaks_mid() {
        let w = hann_window(8);
        assert_relative_eq!(w[0], 0.0, epsilon = 1e-6);
        assert_relative_eq!(w[4], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn stft_concentrates_sine_energy_in_its_bin() {
        let sr = 8_000.0f32;
        let n_fft = 256;
        // 1000 Hz lands exactly on bin 32.
        let samples: Vec<f32> = (0..2048)
            .map(|i| (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / sr).sin())
            .collect();
        let stft = PowerStft::new(n_fft, 64);
        let mut frames = 0;
        stft.for_each_frame(&samples, |idx, power| {
            frames += 1;
            if idx == 10 {
                let peak = power
                    .iter()
                    .enumerate()
                    .max_by(|a, b| a.1.total_cmp(b.1))
                    .map(|(k, _)| k);
                assert_eq!(peak, Some(32));
            }
        });
        assert_eq!(frames, frame_count(samples.len(), 64));
    }
}
