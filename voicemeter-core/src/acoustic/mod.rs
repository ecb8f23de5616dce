//! Signal-side analyzers.
//!
//! ```text
//! AudioSignal ──► onset ──────────┬──► rate ──┐
//!             └─► vad (mask) ─────┼──► pause ─┼──► intelligibility
//!                                 └──► pacing ┘
//!             └─► level
//! ```
//!
//! Every analyzer is a pure function of its inputs plus a config section;
//! the staged orchestration (with cancellation checks) lives in
//! `engine::pipeline`.

pub mod frames;
pub mod intelligibility;
pub mod level;
pub mod onset;
pub mod pacing;
pub mod pause;
pub mod rate;
pub mod vad;

pub use onset::{OnsetSet, SpectralFluxOnsetDetector};
pub use vad::{AdaptiveEnergyVad, VoiceActivityMask, VoiceActivitySegmenter};
