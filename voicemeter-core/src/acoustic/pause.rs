//! Pause extraction from the VAD mask.

use super::vad::VoiceActivityMask;
use crate::{
    config::PauseConfig,
    report::{PauseMetrics, PauseSegment},
};

/// Silence runs bounded by speech on both sides and longer than the pause
/// floor, ordered by start time. Leading and trailing silence is ignored.
pub fn extract_pauses(mask: &VoiceActivityMask, cfg: &PauseConfig) -> Vec<PauseSegment> {
    let mut segments = Vec::new();
    let mut seen_speech = false;
    let mut silence_start: Option<usize> = None;

    for (frame, &active) in mask.active.iter().enumerate() {
        match (active, silence_start) {
            (true, Some(start)) => {
                let duration = mask.frame_to_time(frame - start);
                if duration > cfg.min_pause_secs {
                    segments.push(PauseSegment {
                        start: mask.frame_to_time(start),
                        end: mask.frame_to_time(frame),
                        duration,
                    });
                }
                silence_start = None;
                seen_speech = true;
            }
            (true, None) => seen_speech = true,
            (false, None) if seen_speech => silence_start = Some(frame),
            _ => {}
        }
    }
    segments
}

pub fn analyze(mask: &VoiceActivityMask, cfg: &PauseConfig) -> PauseMetrics {
    let segments = extract_pauses(mask, cfg);
    let total = mask.total_duration;

    let (mut short, mut medium, mut long, mut extended) = (0, 0, 0, 0);
    for seg in &segments {
        if seg.duration < cfg.short_below_secs {
            short += 1;
        } else if seg.duration < cfg.medium_below_secs {
            medium += 1;
        } else if seg.duration < cfg.long_below_secs {
            long += 1;
        } else {
            extended += 1;
        }
    }

    let total_pause_duration: f64 = segments.iter().map(|s| s.duration).sum();
    let average_pause_duration = if segments.is_empty() {
        0.0
    } else {
        total_pause_duration / segments.len() as f64
    };
    let longest_pause = segments.iter().map(|s| s.duration).fold(0.0, f64::max);
    let (pauses_per_minute, pause_ratio) = if total > 0.0 {
        (
            segments.len() as f64 / (total / 60.0),
            (total_pause_duration / total).clamp(0.0, 1.0),
        )
    } else {
        (0.0, 0.0)
    };

    PauseMetrics {
        total_pauses: segments.len(),
        short_pauses: short,
        medium_pauses: medium,
        long_pauses: long,
        extended_pauses: extended,
        total_pause_duration,
        average_pause_duration,
        longest_pause,
        pauses_per_minute,
        pause_ratio,
        silence_ratio: (1.0 - mask.active_ratio()).clamp(0.0, 1.0),
        segments,
    }
}
