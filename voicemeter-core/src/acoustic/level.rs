//! Loudness statistics and detection confidence.

use super::frames::frame_rms;
use crate::{audio::AudioSignal, report::LevelMetrics};

const ENVELOPE_POINTS: usize = 50;
const SPEECH_FRACTION_OF_PEAK: f32 = 0.2;

pub fn measure(signal: &AudioSignal, frame_length: usize, hop: usize) -> LevelMetrics {
    let rms = frame_rms(&signal.samples, frame_length, hop);
    if rms.is_empty() {
        return LevelMetrics {
            confidence: 0.0,
            min_db: to_db(0.0),
            max_db: to_db(0.0),
            avg_db: to_db(0.0),
            envelope_db: Vec::new(),
        };
    }

    let peak = rms.iter().copied().fold(0.0f32, f32::max);
    let threshold = peak * SPEECH_FRACTION_OF_PEAK;
    let loud = rms.iter().filter(|r| **r > threshold).count();
    let confidence = loud as f64 / rms.len() as f64 * 100.0;

    let db: Vec<f32> = rms.iter().map(|r| to_db(*r)).collect();
    let min_db = db.iter().copied().fold(f32::INFINITY, f32::min);
    let max_db = db.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let avg_db = db.iter().sum::<f32>() / db.len() as f32;

    LevelMetrics {
        confidence,
        min_db,
        max_db,
        avg_db,
        envelope_db: downsample(&db, ENVELOPE_POINTS),
    }
}

/// dBFS of an RMS amplitude.
pub fn to_db(rms: f32) -> f32 {
    20.0 * rms.max(1e-10).log10()
}

/// Mean of evenly sized buckets so the result has at most `points` values.
fn downsample(values: &[f32], points: usize) -> Vec<f32> {
    if values.len() <= points {
        return values.to_vec();
    }
    let bucket = values.len().div_ceil(points);
    values
        .chunks(bucket)
        .map(|c| c.iter().sum::<f32>() / c.len() as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn half_silent_clip_has_half_confidence() {
        let mut samples = vec![0.5f32; 22_050];
        samples.extend(vec![0.0; 22_050]);
        let levels = measure(&AudioSignal::new(samples, 22_050), 2048, 512);
        assert!((levels.confidence - 50.0).abs() < 5.0, "{}", levels.confidence);
        assert_relative_eq!(levels.max_db, to_db(0.5), epsilon = 0.01);
        assert_relative_eq!(levels.min_db, -200.0, epsilon = 0.01);
    }

    #[test]
    fn envelope_is_capped_at_fifty_points() {
        let levels = measure(&AudioSignal::new(vec![0.1; 22_050 * 10], 22_050), 2048, 512);
        assert!(levels.envelope_db.len() <= 50);
        assert!(!levels.envelope_db.is_empty());
        assert!(levels.envelope_db.iter().all(|d| (d - to_db(0.1)).abs() < 0.01));
    }

    #[test]
    fn digital_silence_has_no_confident_frames() {
        let levels = measure(&AudioSignal::new(vec![0.0; 22_050], 22_050), 2048, 512);
        assert_eq!(levels.confidence, 0.0);
    }

    #[test]
    fn to_db_floors_zero() {
        assert_relative_eq!(to_db(1.0), 0.0);
        assert_relative_eq!(to_db(0.0), -200.0);
    }
}
