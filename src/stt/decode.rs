//! Audio decoding: arbitrary upload → 16 kHz mono f32 PCM.
//!
//! Whisper only accepts raw PCM, while clients upload whatever their
//! recorder produced (webm, ogg, wav, mp3 …).  [`FfmpegDecoder`] runs the
//! `ffmpeg` CLI against the scratch file and reads little-endian f32
//! samples from its stdout.

use std::path::Path;
use std::process::{Command, Stdio};

use crate::stt::engine::SttError;

/// Sample rate Whisper expects.
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// Turns the file at `path` into 16 kHz mono f32 samples.
///
/// Called from a blocking worker thread, so implementations may block.
pub trait AudioDecoder: Send + Sync {
    fn decode(&self, path: &Path) -> Result<Vec<f32>, SttError>;
}

/// Decoder backed by the `ffmpeg` executable.
#[derive(Debug, Clone)]
pub struct FfmpegDecoder {
    binary: String,
}

impl FfmpegDecoder {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl AudioDecoder for FfmpegDecoder {
    fn decode(&self, path: &Path) -> Result<Vec<f32>, SttError> {
        let rate = WHISPER_SAMPLE_RATE.to_string();
        let output = Command::new(&self.binary)
            .arg("-nostdin")
            .args(["-hide_banner", "-loglevel", "error", "-i"])
            .arg(path)
            .args(["-f", "f32le", "-acodec", "pcm_f32le", "-ar", &rate, "-ac", "1", "-"])
            .stdin(Stdio::null())
            .output()
            .map_err(|e| SttError::Decode(format!("failed to spawn {}: {e}", self.binary)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SttError::Decode(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                stderr.trim()
            )));
        }

        pcm_f32le_to_samples(&output.stdout)
    }
}

/// Reinterpret raw little-endian f32 PCM bytes as samples.
pub fn pcm_f32le_to_samples(bytes: &[u8]) -> Result<Vec<f32>, SttError> {
    let sample_size = std::mem::size_of::<f32>();
    if bytes.len() % sample_size != 0 {
        return Err(SttError::Decode(format!(
            "misaligned PCM output ({} bytes, not a multiple of {sample_size})",
            bytes.len()
        )));
    }

    // `pod_collect_to_vec` copies, so the byte buffer's alignment is irrelevant.
    let samples: Vec<f32> = bytemuck::pod_collect_to_vec(bytes);
    Ok(samples)
}
