//! Transcription parameter types and result types.
//!
//! [`TranscribeParams`] carries all settings that control a single Whisper
//! inference run.  [`Transcript`] is what an [`SttEngine`](crate::stt::SttEngine)
//! returns; [`TranscriptionResult`] is the flattened outcome handed back to
//! HTTP callers.

use crate::config::SttConfig;

// ---------------------------------------------------------------------------
// SamplingStrategy
// ---------------------------------------------------------------------------

/// Mirrors `whisper_rs::SamplingStrategy` but is owned and `Clone`.
#[derive(Debug, Clone, PartialEq)]
pub enum SamplingStrategy {
    /// Greedy (single-pass) decoding.
    Greedy {
        /// Number of candidate tokens evaluated per step.
        best_of: i32,
    },
    /// Beam-search decoding.
    BeamSearch {
        /// Number of beams to maintain in parallel.
        beam_size: i32,
        /// Beam-search patience factor; `-1.0` keeps whisper.cpp's default.
        patience: f32,
    },
}

impl SamplingStrategy {
    pub fn beam(beam_size: i32) -> Self {
        Self::BeamSearch {
            beam_size,
            patience: -1.0,
        }
    }

    /// Beam search for widths above 1, single-candidate greedy otherwise.
    pub fn from_beam_size(beam_size: i32) -> Self {
        if beam_size > 1 {
            Self::beam(beam_size)
        } else {
            Self::Greedy { best_of: 1 }
        }
    }
}

impl Default for SamplingStrategy {
    fn default() -> Self {
        Self::beam(5)
    }
}

// ---------------------------------------------------------------------------
// TranscribeParams
// ---------------------------------------------------------------------------

/// All parameters for a single Whisper transcription run.
///
/// ```
/// use chatbot_gateway::stt::{SamplingStrategy, TranscribeParams};
///
/// let params = TranscribeParams {
///     language: "en".into(),
///     ..TranscribeParams::default()
/// };
/// assert_eq!(params.strategy, SamplingStrategy::beam(5));
/// ```
#[derive(Debug, Clone)]
pub struct TranscribeParams {
    /// ISO-639-1 language code (e.g. `"en"`), or `"auto"` to let Whisper
    /// detect the language.
    pub language: String,

    /// Decoding strategy.
    pub strategy: SamplingStrategy,

    /// Number of CPU threads handed to Whisper.
    pub n_threads: i32,

    /// Suppress Whisper's progress output to stderr.
    pub suppress_progress: bool,
}

impl Default for TranscribeParams {
    fn default() -> Self {
        Self {
            language: "auto".into(),
            strategy: SamplingStrategy::default(),
            n_threads: optimal_threads(),
            suppress_progress: true,
        }
    }
}

impl TranscribeParams {
    pub fn from_config(config: &SttConfig) -> Self {
        Self {
            language: config.language.clone(),
            strategy: SamplingStrategy::from_beam_size(config.beam_size),
            n_threads: config.n_threads.unwrap_or_else(optimal_threads),
            suppress_progress: true,
        }
    }
}

/// Returns the number of CPU threads to use for inference, capped at 8.
pub(crate) fn optimal_threads() -> i32 {
    std::thread::available_parallelism()
        .map(|n| n.get().min(8) as i32)
        .unwrap_or(4)
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// A single time-aligned text chunk produced by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Segment text, untrimmed (Whisper usually emits a leading space).
    pub text: String,
    /// Segment start time in milliseconds from the start of the audio.
    pub start_ms: u64,
    /// Segment end time in milliseconds from the start of the audio.
    pub end_ms: u64,
}

impl Segment {
    pub fn new(text: impl Into<String>, start_ms: u64, end_ms: u64) -> Self {
        Self {
            text: text.into(),
            start_ms,
            end_ms,
        }
    }
}

/// Raw engine output: segments in the order produced plus detected language.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    pub segments: Vec<Segment>,
    pub language: Option<String>,
}

/// The outcome of one `/transcribe` call.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionResult {
    /// Every segment's text concatenated in order, then trimmed.
    pub text: String,
    /// Language reported by the engine, if any.
    pub language: Option<String>,
    /// Number of segments the engine produced.
    pub segment_count: usize,
}

impl From<Transcript> for TranscriptionResult {
    fn from(transcript: Transcript) -> Self {
        let text: String = transcript
            .segments
            .iter()
            .map(|s| s.text.as_str())
            .collect();

        Self {
            text: text.trim().to_string(),
            language: transcript.language,
            segment_count: transcript.segments.len(),
        }
    }
}
